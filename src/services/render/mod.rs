//! Markdown bodies and titles of the discussion threads.
//!
//! Everything here is pure: the callers fetch the data, the renderer only formats it.

pub mod format;
pub mod live_match;
pub mod pre_match;
pub mod titles;

pub use self::live_match::render_live_match;
pub use self::pre_match::{PreMatchData, render_pre_match};
pub use self::titles::{match_thread_title, post_match_title, pre_match_title};

/// Horizontal rule separating the body sections.
const SEPARATOR: &str = "\n\n---\n\n";

#[cfg(test)]
pub(crate) mod test_fixtures {
    use time::macros::datetime;

    use crate::dao::models::{
        Competition, EventKind, FixtureSnapshot, FixtureStatus, MatchEvent, TeamRef,
    };

    pub fn inter() -> TeamRef {
        TeamRef {
            id: 505,
            name: "Inter".into(),
        }
    }

    pub fn milan() -> TeamRef {
        TeamRef {
            id: 489,
            name: "Milan".into(),
        }
    }

    pub fn fixture() -> FixtureSnapshot {
        FixtureSnapshot {
            id: 1_208_021,
            home: inter(),
            away: milan(),
            competition: Competition {
                id: 135,
                name: "Serie A".into(),
                round: Some("Regular Season - 12".into()),
            },
            kickoff: datetime!(2026-10-19 19:45 UTC),
            venue: Some("Stadio Giuseppe Meazza".into()),
            referee: Some("D. Orsato".into()),
            status: FixtureStatus::Scheduled,
            elapsed: None,
            home_goals: None,
            away_goals: None,
            events: Vec::new(),
            lineups: None,
            statistics: None,
        }
    }

    pub fn event(
        kind: EventKind,
        minute: u16,
        team: TeamRef,
        player: &str,
        assist: Option<&str>,
        detail: &str,
    ) -> MatchEvent {
        MatchEvent {
            kind,
            minute: Some(minute),
            team: Some(team),
            player: Some(player.into()),
            assist: assist.map(Into::into),
            detail: detail.into(),
        }
    }
}
