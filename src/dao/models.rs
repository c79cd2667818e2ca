use indexmap::IndexMap;
use time::OffsetDateTime;

/// Identifier of a fixture in the sports-data provider.
pub type FixtureId = u64;
/// Identifier of a team in the sports-data provider.
pub type TeamId = u64;

/// Team reference as exposed by the sports-data provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    /// Provider identifier of the team.
    pub id: TeamId,
    /// Display name of the team.
    pub name: String,
}

/// Competition a fixture belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    /// Provider identifier of the competition.
    pub id: u64,
    /// Display name (e.g. "Serie A").
    pub name: String,
    /// Raw round string (e.g. "Regular Season - 12"), when the provider sends one.
    pub round: Option<String>,
}

/// Normalized match status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureStatus {
    /// Not started yet.
    Scheduled,
    /// Ball in play (either half, extra time, penalties, interruptions).
    InProgress,
    /// Half-time break.
    HalfTime,
    /// Finished after regular time, extra time or penalties.
    Finished,
    /// Abandoned; `with_result` is set when a final result was awarded.
    Abandoned {
        /// Whether the match was settled with an awarded result.
        with_result: bool,
    },
    /// Postponed or cancelled.
    Postponed,
}

impl FixtureStatus {
    /// Whether the match has a final result and the post-match phase can begin.
    ///
    /// An abandonment without an awarded result is not terminal.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FixtureStatus::Finished | FixtureStatus::Abandoned { with_result: true }
        )
    }

    /// Whether the scoreline is final and should be labelled "Full Time".
    pub fn is_full_time(self) -> bool {
        self.is_terminal()
    }
}

/// Kind of a match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Goal, including penalties, own goals and missed penalties (see `detail`).
    Goal,
    /// Yellow or red card (see `detail`).
    Card,
    /// Player substitution.
    Substitution,
    /// Video assistant referee decision.
    Var,
    /// Anything the provider adds later.
    Other,
}

/// A single event of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEvent {
    /// Event category.
    pub kind: EventKind,
    /// Elapsed minute, when known.
    pub minute: Option<u16>,
    /// Team the event belongs to.
    pub team: Option<TeamRef>,
    /// Main player of the event (scorer, booked player, player replaced).
    pub player: Option<String>,
    /// Secondary player (assist provider, player coming on).
    pub assist: Option<String>,
    /// Provider detail string (e.g. "Penalty", "Yellow Card").
    pub detail: String,
}

impl MatchEvent {
    /// Penalty kicks that did not result in a goal are reported as goal events.
    pub fn is_missed_penalty(&self) -> bool {
        self.kind == EventKind::Goal && self.detail == "Missed Penalty"
    }

    /// Goal events that changed the score.
    pub fn is_scored_goal(&self) -> bool {
        self.kind == EventKind::Goal && !self.is_missed_penalty()
    }

    /// Whether the event belongs to the given team.
    pub fn is_for_team(&self, team_id: TeamId) -> bool {
        self.team.as_ref().is_some_and(|team| team.id == team_id)
    }
}

/// Lineup of one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineup {
    /// Team the lineup belongs to.
    pub team: TeamRef,
    /// Head coach, when known.
    pub coach: Option<String>,
    /// Starting eleven player names.
    pub starting_xi: Vec<String>,
    /// Bench player names.
    pub substitutes: Vec<String>,
}

impl Lineup {
    /// Both starting eleven and bench are known.
    pub fn is_complete(&self) -> bool {
        !self.starting_xi.is_empty() && !self.substitutes.is_empty()
    }
}

/// Lineups of both sides, present only when the provider reports both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLineups {
    /// Home side lineup.
    pub home: Lineup,
    /// Away side lineup.
    pub away: Lineup,
}

/// Named metric values for one side, in provider order. `None` is an unset value.
pub type TeamStatistics = IndexMap<String, Option<String>>;

/// Statistics of both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStatistics {
    /// Home side metrics.
    pub home: TeamStatistics,
    /// Away side metrics.
    pub away: TeamStatistics,
}

/// Immutable per-fetch view of a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSnapshot {
    /// Provider identifier.
    pub id: FixtureId,
    /// Home side.
    pub home: TeamRef,
    /// Away side.
    pub away: TeamRef,
    /// Competition and round.
    pub competition: Competition,
    /// Kickoff instant.
    pub kickoff: OffsetDateTime,
    /// Stadium name.
    pub venue: Option<String>,
    /// Referee name.
    pub referee: Option<String>,
    /// Normalized status.
    pub status: FixtureStatus,
    /// Minutes played.
    pub elapsed: Option<u16>,
    /// Home goals.
    pub home_goals: Option<u16>,
    /// Away goals.
    pub away_goals: Option<u16>,
    /// Match events in chronological order.
    pub events: Vec<MatchEvent>,
    /// Lineups, once announced.
    pub lineups: Option<MatchLineups>,
    /// Statistics, once available.
    pub statistics: Option<MatchStatistics>,
}

impl FixtureSnapshot {
    /// Whether the ball has been kicked according to the provider clock.
    pub fn has_started(&self) -> bool {
        self.elapsed.is_some_and(|minutes| minutes > 0)
    }
}

/// Player unavailable for a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injury {
    /// Player name.
    pub player: String,
    /// Reason (e.g. "Knee Injury", "Suspended").
    pub reason: String,
    /// Availability (e.g. "Missing Fixture", "Questionable").
    pub status: String,
    /// Team name.
    pub team: String,
}

/// One row of a standings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    /// Position.
    pub rank: u32,
    /// Team.
    pub team: TeamRef,
    /// Matches played.
    pub played: u32,
    /// Goal difference.
    pub goal_diff: i32,
    /// Points.
    pub points: u32,
}

/// Standings of a competition; league formats have one group, group stages several.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StandingsTable {
    /// Groups in provider order.
    pub groups: Vec<Vec<StandingRow>>,
}

impl StandingsTable {
    /// Group containing the given team, falling back to the first one.
    pub fn group_for(&self, team_id: TeamId) -> Option<&[StandingRow]> {
        self.groups
            .iter()
            .find(|group| group.iter().any(|row| row.team.id == team_id))
            .or_else(|| self.groups.first())
            .map(Vec::as_slice)
    }
}

/// Read-only view of a post on the community platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    /// Platform identifier (without kind prefix).
    pub id: String,
    /// Post title.
    pub title: String,
    /// Public URL.
    pub url: String,
}

/// Comment on the community platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    /// Platform identifier (without kind prefix).
    pub id: String,
    /// Author account name, when the account still exists.
    pub author: Option<String>,
    /// Raw body text.
    pub body: String,
    /// Whether the bot already marked this comment as handled.
    pub handled: bool,
}

/// Content of a post to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Post title.
    pub title: String,
    /// Markdown body.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_final_results_are_terminal() {
        assert!(FixtureStatus::Finished.is_terminal());
        assert!(FixtureStatus::Abandoned { with_result: true }.is_terminal());
        assert!(!FixtureStatus::Abandoned { with_result: false }.is_terminal());
        assert!(!FixtureStatus::Postponed.is_terminal());
        assert!(!FixtureStatus::HalfTime.is_terminal());
    }
}
