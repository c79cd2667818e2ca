//! API-Football v3 payloads and their conversion into domain snapshots.
//!
//! Every field is optional on the wire; conversion decides which gaps are fatal.

use serde::Deserialize;
use serde_json::Value;
use serde_with::{DefaultOnNull, serde_as};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dao::models::{
    Competition, EventKind, FixtureSnapshot, FixtureStatus, Injury, Lineup, MatchEvent,
    MatchLineups, MatchStatistics, StandingRow, StandingsTable, TeamRef, TeamStatistics,
};

use super::normalize::{normalize_opt, normalize_text};

/// Common `{ "errors": …, "response": [...] }` wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<Vec<T>>,
    #[serde(default)]
    pub errors: Value,
}

impl<T> Envelope<T> {
    /// Response items, empty when the provider sent none.
    pub fn into_items(self) -> Vec<T> {
        self.response.unwrap_or_default()
    }

    /// API-level error message, when the provider reports one alongside a 200.
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            Value::Object(map) if !map.is_empty() => Some(
                map.iter()
                    .map(|(key, value)| match value {
                        Value::String(text) => format!("{key}: {text}"),
                        other => format!("{key}: {other}"),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Array(items) if !items.is_empty() => Some(
                items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawFixtureItem {
    pub fixture: Option<RawFixtureInfo>,
    pub league: Option<RawLeague>,
    pub teams: Option<RawTeams>,
    pub goals: Option<RawGoals>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub lineups: Vec<RawLineup>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub statistics: Vec<RawTeamStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct RawFixtureInfo {
    pub id: Option<u64>,
    pub referee: Option<String>,
    pub date: Option<String>,
    pub timestamp: Option<i64>,
    pub venue: Option<RawVenue>,
    pub status: Option<RawStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RawVenue {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawStatus {
    pub short: Option<String>,
    pub elapsed: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct RawLeague {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub round: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTeams {
    pub home: Option<RawTeam>,
    pub away: Option<RawTeam>,
}

#[derive(Debug, Deserialize)]
pub struct RawTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawGoals {
    pub home: Option<u16>,
    pub away: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct RawEvent {
    pub time: Option<RawEventTime>,
    pub team: Option<RawTeam>,
    pub player: Option<RawPerson>,
    pub assist: Option<RawPerson>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawEventTime {
    pub elapsed: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct RawPerson {
    pub name: Option<String>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawLineup {
    pub team: Option<RawTeam>,
    pub coach: Option<RawPerson>,
    #[serde(rename = "startXI", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub start_xi: Vec<RawLineupEntry>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub substitutes: Vec<RawLineupEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RawLineupEntry {
    pub player: Option<RawPerson>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawTeamStatistics {
    pub team: Option<RawTeam>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub statistics: Vec<RawStatistic>,
}

#[derive(Debug, Deserialize)]
pub struct RawStatistic {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct RawInjuryItem {
    pub player: Option<RawInjuredPlayer>,
    pub team: Option<RawTeam>,
}

#[derive(Debug, Deserialize)]
pub struct RawInjuredPlayer {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawStandingsItem {
    pub league: Option<RawStandingsLeague>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub struct RawStandingsLeague {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub standings: Vec<Vec<RawStandingRow>>,
}

#[derive(Debug, Deserialize)]
pub struct RawStandingRow {
    pub rank: Option<u32>,
    pub team: Option<RawTeam>,
    pub points: Option<u32>,
    #[serde(rename = "goalsDiff")]
    pub goals_diff: Option<i32>,
    pub all: Option<RawRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub played: Option<u32>,
}

/// Map an API-Football status short code onto the normalized status.
pub fn parse_status(short: Option<&str>) -> FixtureStatus {
    match short.unwrap_or_default() {
        "1H" | "2H" | "ET" | "BT" | "P" | "LIVE" | "INT" | "SUSP" => FixtureStatus::InProgress,
        "HT" => FixtureStatus::HalfTime,
        "FT" | "AET" | "PEN" => FixtureStatus::Finished,
        "AWD" | "WO" => FixtureStatus::Abandoned { with_result: true },
        "ABD" => FixtureStatus::Abandoned { with_result: false },
        "PST" | "CANC" => FixtureStatus::Postponed,
        _ => FixtureStatus::Scheduled,
    }
}

fn parse_event_kind(kind: Option<&str>) -> EventKind {
    match kind.unwrap_or_default() {
        "Goal" => EventKind::Goal,
        "Card" => EventKind::Card,
        "subst" => EventKind::Substitution,
        "Var" => EventKind::Var,
        _ => EventKind::Other,
    }
}

fn statistic_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn parse_kickoff(info: &RawFixtureInfo) -> Option<OffsetDateTime> {
    info.date
        .as_deref()
        .and_then(|date| OffsetDateTime::parse(date, &Rfc3339).ok())
        .or_else(|| {
            info.timestamp
                .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
        })
}

impl TryFrom<RawTeam> for TeamRef {
    type Error = &'static str;

    fn try_from(raw: RawTeam) -> Result<Self, Self::Error> {
        Ok(TeamRef {
            id: raw.id.ok_or("team without id")?,
            name: raw.name.map(normalize_text).unwrap_or_default(),
        })
    }
}

fn person_name(person: Option<RawPerson>) -> Option<String> {
    normalize_opt(person.and_then(|p| p.name)).filter(|name| !name.is_empty())
}

impl From<RawEvent> for MatchEvent {
    fn from(raw: RawEvent) -> Self {
        MatchEvent {
            kind: parse_event_kind(raw.kind.as_deref()),
            minute: raw.time.and_then(|t| t.elapsed),
            team: raw.team.and_then(|team| TeamRef::try_from(team).ok()),
            player: person_name(raw.player),
            assist: person_name(raw.assist),
            detail: raw.detail.unwrap_or_default(),
        }
    }
}

fn convert_lineup(raw: RawLineup) -> Option<Lineup> {
    let team = TeamRef::try_from(raw.team?).ok()?;
    let names = |entries: Vec<RawLineupEntry>| -> Vec<String> {
        entries
            .into_iter()
            .map(|entry| person_name(entry.player).unwrap_or_else(|| "Unknown Player".into()))
            .collect()
    };
    Some(Lineup {
        team,
        coach: person_name(raw.coach),
        starting_xi: names(raw.start_xi),
        substitutes: names(raw.substitutes),
    })
}

fn convert_statistics(raw: RawTeamStatistics) -> TeamStatistics {
    raw.statistics
        .into_iter()
        .filter_map(|stat| Some((stat.kind?, statistic_value(stat.value))))
        .collect()
}

impl TryFrom<RawFixtureItem> for FixtureSnapshot {
    type Error = &'static str;

    fn try_from(raw: RawFixtureItem) -> Result<Self, Self::Error> {
        let info = raw.fixture.ok_or("missing fixture block")?;
        let id = info.id.ok_or("missing fixture id")?;
        let kickoff = parse_kickoff(&info).ok_or("missing or invalid kickoff date")?;
        let teams = raw.teams.ok_or("missing teams")?;
        let home = TeamRef::try_from(teams.home.ok_or("missing home team")?)?;
        let away = TeamRef::try_from(teams.away.ok_or("missing away team")?)?;

        let competition = match raw.league {
            Some(league) => Competition {
                id: league.id.unwrap_or_default(),
                name: league.name.map(normalize_text).unwrap_or_default(),
                round: league.round.filter(|round| !round.is_empty()),
            },
            None => Competition {
                id: 0,
                name: String::new(),
                round: None,
            },
        };

        let (status, elapsed) = match info.status {
            Some(status) => (parse_status(status.short.as_deref()), status.elapsed),
            None => (FixtureStatus::Scheduled, None),
        };
        let (home_goals, away_goals) = raw
            .goals
            .map(|goals| (goals.home, goals.away))
            .unwrap_or_default();

        // Blocks are matched to a side by team id, never by position.
        let (mut home_lineup, mut away_lineup) = (None, None);
        for lineup in raw.lineups.into_iter().filter_map(convert_lineup) {
            if lineup.team.id == home.id {
                home_lineup = Some(lineup);
            } else if lineup.team.id == away.id {
                away_lineup = Some(lineup);
            }
        }
        let lineups = home_lineup
            .zip(away_lineup)
            .map(|(home, away)| MatchLineups { home, away });

        let (mut home_stats, mut away_stats) = (None, None);
        for block in raw.statistics {
            let team_id = block.team.as_ref().and_then(|team| team.id);
            if team_id == Some(home.id) {
                home_stats = Some(convert_statistics(block));
            } else if team_id == Some(away.id) {
                away_stats = Some(convert_statistics(block));
            }
        }
        let statistics = home_stats
            .zip(away_stats)
            .map(|(home, away)| MatchStatistics { home, away });

        Ok(FixtureSnapshot {
            id,
            home,
            away,
            competition,
            kickoff,
            venue: normalize_opt(info.venue.and_then(|venue| venue.name)),
            referee: normalize_opt(info.referee),
            status,
            elapsed,
            home_goals,
            away_goals,
            events: raw.events.into_iter().map(MatchEvent::from).collect(),
            lineups,
            statistics,
        })
    }
}

impl From<RawInjuryItem> for Injury {
    fn from(raw: RawInjuryItem) -> Self {
        let (player, status, reason) = match raw.player {
            Some(player) => (player.name, player.kind, player.reason),
            None => (None, None, None),
        };
        Injury {
            player: normalize_opt(player).unwrap_or_else(|| "Unknown Player".into()),
            reason: reason.unwrap_or_default(),
            status: status.unwrap_or_default(),
            team: normalize_opt(raw.team.and_then(|team| team.name)).unwrap_or_default(),
        }
    }
}

/// Flatten the standings response into groups, skipping rows without a team.
pub fn convert_standings(items: Vec<RawStandingsItem>) -> StandingsTable {
    let groups = items
        .into_iter()
        .filter_map(|item| item.league)
        .flat_map(|league| league.standings)
        .map(|group| {
            group
                .into_iter()
                .filter_map(|row| {
                    let team = TeamRef::try_from(row.team?).ok()?;
                    Some(StandingRow {
                        rank: row.rank.unwrap_or_default(),
                        team,
                        played: row.all.and_then(|all| all.played).unwrap_or_default(),
                        goal_diff: row.goals_diff.unwrap_or_default(),
                        points: row.points.unwrap_or_default(),
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect();

    StandingsTable { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture_payload() -> Value {
        json!({
            "fixture": {
                "id": 1208021,
                "referee": "D. Orsato",
                "date": "2024-05-19T18:45:00+00:00",
                "timestamp": 1716144300,
                "venue": { "id": 907, "name": "Stadio Giuseppe Meazza" },
                "status": { "long": "Second Half", "short": "2H", "elapsed": 57 }
            },
            "league": { "id": 135, "name": "Serie A", "round": "Regular Season - 37" },
            "teams": {
                "home": { "id": 505, "name": "Inter" },
                "away": { "id": 489, "name": "AC Milan" }
            },
            "goals": { "home": 1, "away": null },
            "events": [
                {
                    "time": { "elapsed": 12, "extra": null },
                    "team": { "id": 505, "name": "Inter" },
                    "player": { "id": 1, "name": "H. Ã‡alhanoÄŸlu" },
                    "assist": { "id": null, "name": null },
                    "type": "Goal",
                    "detail": "Penalty"
                }
            ],
            "lineups": [],
            "statistics": [
                { "team": { "id": 505 }, "statistics": [
                    { "type": "Ball Possession", "value": "61%" },
                    { "type": "Total Shots", "value": 9 },
                    { "type": "Red Cards", "value": null }
                ]},
                { "team": { "id": 489 }, "statistics": [
                    { "type": "Ball Possession", "value": "39%" }
                ]}
            ]
        })
    }

    #[test]
    fn converts_a_full_fixture() {
        let raw: RawFixtureItem = serde_json::from_value(fixture_payload()).unwrap();
        let snapshot = FixtureSnapshot::try_from(raw).unwrap();

        assert_eq!(snapshot.id, 1208021);
        assert_eq!(snapshot.home.name, "Inter");
        assert_eq!(snapshot.competition.round.as_deref(), Some("Regular Season - 37"));
        assert_eq!(snapshot.status, FixtureStatus::InProgress);
        assert_eq!(snapshot.elapsed, Some(57));
        assert_eq!((snapshot.home_goals, snapshot.away_goals), (Some(1), None));
        assert_eq!(snapshot.kickoff.unix_timestamp(), 1716144300);

        let goal = &snapshot.events[0];
        assert_eq!(goal.kind, EventKind::Goal);
        assert_eq!(goal.player.as_deref(), Some("H. Çalhanoğlu"));
        assert_eq!(goal.assist, None);

        let stats = snapshot.statistics.unwrap();
        assert_eq!(stats.home["Total Shots"].as_deref(), Some("9"));
        assert_eq!(stats.home["Red Cards"], None);
        assert!(!stats.away.contains_key("Total Shots"));
        assert!(snapshot.lineups.is_none());
    }

    #[test]
    fn sides_are_paired_by_team_id() {
        let mut payload = fixture_payload();
        let side = |id: u64, name: &str, coach: &str| {
            json!({
                "team": { "id": id, "name": name },
                "coach": { "name": coach },
                "startXI": [{ "player": { "name": format!("{name} starter") } }],
                "substitutes": [{ "player": { "name": format!("{name} sub") } }]
            })
        };
        payload["lineups"] = json!([
            { "team": null, "startXI": [], "substitutes": [] },
            side(489, "AC Milan", "P. Fonseca"),
            side(505, "Inter", "S. Inzaghi")
        ]);
        let stats = payload["statistics"].as_array().unwrap().clone();
        payload["statistics"] = json!([stats[1], stats[0]]);

        let raw: RawFixtureItem = serde_json::from_value(payload).unwrap();
        let snapshot = FixtureSnapshot::try_from(raw).unwrap();

        let lineups = snapshot.lineups.unwrap();
        assert_eq!(lineups.home.team.id, 505);
        assert_eq!(lineups.home.coach.as_deref(), Some("S. Inzaghi"));
        assert_eq!(lineups.away.starting_xi, vec!["AC Milan starter"]);

        let stats = snapshot.statistics.unwrap();
        assert_eq!(stats.home["Ball Possession"].as_deref(), Some("61%"));
        assert_eq!(stats.away["Ball Possession"].as_deref(), Some("39%"));
    }

    #[test]
    fn null_collections_become_empty() {
        let mut payload = fixture_payload();
        payload["events"] = Value::Null;
        payload["statistics"] = Value::Null;
        let raw: RawFixtureItem = serde_json::from_value(payload).unwrap();
        let snapshot = FixtureSnapshot::try_from(raw).unwrap();

        assert!(snapshot.events.is_empty());
        assert!(snapshot.statistics.is_none());
    }

    #[test]
    fn missing_teams_are_malformed() {
        let mut payload = fixture_payload();
        payload["teams"]["away"] = Value::Null;
        let raw: RawFixtureItem = serde_json::from_value(payload).unwrap();

        assert!(FixtureSnapshot::try_from(raw).is_err());
    }

    #[test]
    fn status_codes_map_to_normalized_status() {
        assert_eq!(parse_status(Some("NS")), FixtureStatus::Scheduled);
        assert_eq!(parse_status(Some("HT")), FixtureStatus::HalfTime);
        assert_eq!(parse_status(Some("PEN")), FixtureStatus::Finished);
        assert_eq!(
            parse_status(Some("AWD")),
            FixtureStatus::Abandoned { with_result: true }
        );
        assert_eq!(parse_status(Some("PST")), FixtureStatus::Postponed);
        assert_eq!(parse_status(None), FixtureStatus::Scheduled);
    }

    #[test]
    fn standings_skip_rows_without_team() {
        let items: Vec<RawStandingsItem> = serde_json::from_value(json!([{
            "league": { "standings": [[
                { "rank": 1, "team": { "id": 505, "name": "Inter" }, "points": 94,
                  "goalsDiff": 67, "all": { "played": 38 } },
                { "rank": 2, "team": null, "points": 75 }
            ]]}
        }]))
        .unwrap();

        let table = convert_standings(items);
        assert_eq!(table.groups.len(), 1);
        assert_eq!(table.groups[0].len(), 1);
        assert_eq!(table.groups[0][0].played, 38);
    }

    #[test]
    fn envelope_reports_api_errors() {
        let envelope: Envelope<RawFixtureItem> =
            serde_json::from_value(json!({ "errors": { "token": "invalid key" }, "response": [] }))
                .unwrap();
        assert_eq!(envelope.error_message().as_deref(), Some("token: invalid key"));

        let envelope: Envelope<RawFixtureItem> =
            serde_json::from_value(json!({ "errors": [], "response": null })).unwrap();
        assert!(envelope.error_message().is_none());
        assert!(envelope.into_items().is_empty());
    }
}
