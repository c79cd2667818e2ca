use crate::{
    config::{AppConfig, HouseTeam},
    dao::models::{
        EventKind, FixtureSnapshot, FixtureStatus, Lineup, MatchEvent, MatchLineups,
        MatchStatistics,
    },
};

use super::{
    SEPARATOR,
    format::{goals, minute},
};

/// Provider metric name and the label shown in the stats table, in display order.
const STAT_ROWS: [(&str, &str); 15] = [
    ("Ball Possession", "Ball Possession"),
    ("Total Shots", "Total Shots"),
    ("Shots on Goal", "Shots On-Goal"),
    ("Shots off Goal", "Shots Off-Goal"),
    ("Blocked Shots", "Blocked Shots"),
    ("Shots insidebox", "Shots Inside Box"),
    ("Shots outsidebox", "Shots Outside Box"),
    ("Fouls", "Fouls"),
    ("Corner Kicks", "Corner Kicks"),
    ("Offsides", "Offsides"),
    ("Yellow Cards", "Yellow Cards"),
    ("Red Cards", "Red Cards"),
    ("Total passes", "Total passes"),
    ("Passes accurate", "Accurate passes"),
    ("Passes %", "Passing accuracy"),
];

const UNKNOWN_TEAM: &str = "Unknown Team";
const UNKNOWN_PLAYER: &str = "Unknown Player";

/// Full body of the live match thread; also staged as the post-match body.
pub fn render_live_match(fixture: &FixtureSnapshot, config: &AppConfig) -> String {
    let mut body = String::from(SEPARATOR);
    body.push_str(&scoreline(fixture));
    body.push_str(&scorers(fixture));
    body.push_str(SEPARATOR);

    if let Some(venue) = &fixture.venue {
        body.push_str(&format!("**Venue:** {venue}\n\n"));
    }
    if let Some(referee) = &fixture.referee {
        body.push_str(&format!("**Referee:** {referee}\n\n"));
    }

    if let Some(lineups) = fixture
        .lineups
        .as_ref()
        .filter(|lineups| lineups.home.is_complete() && lineups.away.is_complete())
    {
        body.push_str(SEPARATOR);
        body.push_str(&lineups_section(fixture, lineups));
    }

    if !fixture.events.is_empty() {
        body.push_str(SEPARATOR);
        body.push_str("### Match Events\n\n| Min | Event |\n|:-:|:--|\n");
        for row in fixture
            .events
            .iter()
            .filter_map(|event| event_row(event, &config.house_team))
        {
            body.push_str(&row);
        }
    }

    if let Some(statistics) = &fixture.statistics {
        body.push_str(SEPARATOR);
        body.push_str(&statistics_section(fixture, statistics));
    }

    body.push_str(SEPARATOR);
    body
}

fn scoreline(fixture: &FixtureSnapshot) -> String {
    let score = format!(
        "{} {}-{} {}",
        fixture.home.name,
        goals(fixture.home_goals),
        goals(fixture.away_goals),
        fixture.away.name
    );
    if fixture.status.is_full_time() {
        format!("# Full Time: {score}\n\n")
    } else if fixture.status == FixtureStatus::HalfTime {
        format!("# Half Time: {score}\n\n")
    } else if let Some(elapsed) = fixture.elapsed {
        format!("# {}: {score}\n\n", minute(Some(elapsed)))
    } else {
        format!(
            "# {} vs {} - Match Not Started\n\n",
            fixture.home.name, fixture.away.name
        )
    }
}

fn scorers(fixture: &FixtureSnapshot) -> String {
    let side = |team_id| {
        fixture
            .events
            .iter()
            .filter(|event| event.is_scored_goal() && event.is_for_team(team_id))
            .map(|event| {
                format!(
                    "{} ({})",
                    event.player.as_deref().unwrap_or(UNKNOWN_PLAYER),
                    minute(event.minute)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = String::new();
    for (name, goals) in [
        (&fixture.home.name, side(fixture.home.id)),
        (&fixture.away.name, side(fixture.away.id)),
    ] {
        if !goals.is_empty() {
            lines.push_str(&format!(" **{name}:** {goals}.\n\n"));
        }
    }
    lines
}

fn lineups_section(fixture: &FixtureSnapshot, lineups: &MatchLineups) -> String {
    let mut section = String::from("### Lineups\n\n");
    for (name, lineup) in [
        (&fixture.home.name, &lineups.home),
        (&fixture.away.name, &lineups.away),
    ] {
        section.push_str(&lineup_block(name, lineup));
    }
    section
}

fn lineup_block(name: &str, lineup: &Lineup) -> String {
    let mut block = format!(
        "#### {name}\n\n **Starting XI:** {}\n\n **Substitutes:** {}\n\n",
        lineup.starting_xi.join(", "),
        lineup.substitutes.join(", ")
    );
    if let Some(coach) = &lineup.coach {
        block.push_str(&format!(" **Coach:** {coach}\n\n"));
    }
    block
}

fn event_row(event: &MatchEvent, house_team: &HouseTeam) -> Option<String> {
    let at = minute(event.minute);
    let team = event
        .team
        .as_ref()
        .map_or(UNKNOWN_TEAM, |team| team.name.as_str());
    let player = event.player.as_deref().unwrap_or(UNKNOWN_PLAYER);
    let assist = event.assist.as_deref().filter(|name| *name != "Unknown");

    let text = match event.kind {
        EventKind::Goal if event.is_missed_penalty() => {
            format!("❌ **Missed Penalty ({team}):** {player}.")
        }
        EventKind::Goal => {
            let assist = assist
                .map(|name| format!(", assist by {name}"))
                .unwrap_or_default();
            let penalty = if event.detail == "Penalty" {
                " (Penalty)"
            } else {
                ""
            };
            if event.is_for_team(house_team.id) {
                let cheer = format!("{}** {}", house_team.goal_cheer, house_team.emoji);
                format!(
                    "⚽ **GOAAAAAAAL ({}): {player}{assist}{penalty}. {}",
                    house_team.name,
                    cheer.trim_end()
                )
            } else {
                format!("⚽ **Goal ({team}): {player}{assist}{penalty}.**")
            }
        }
        EventKind::Card if event.detail == "Yellow Card" => {
            format!("**🟨 Yellow card ({team}):** {player}.")
        }
        EventKind::Card if event.detail == "Red Card" => {
            format!("**🟥 Red card ({team}):** {player}.")
        }
        EventKind::Substitution => {
            let incoming = assist?;
            format!("**🔄 Sub ({team}):** {incoming} replaces {player}.")
        }
        EventKind::Card | EventKind::Var | EventKind::Other => return None,
    };
    Some(format!("| {at} | {text} |\n"))
}

fn statistics_section(fixture: &FixtureSnapshot, statistics: &MatchStatistics) -> String {
    let mut section = format!(
        "### Match Stats\n\n| {} |  | {} |\n|:-:|:-:|:-:|\n",
        fixture.home.name, fixture.away.name
    );
    for (metric, label) in STAT_ROWS {
        let (Some(home), Some(away)) = (statistics.home.get(metric), statistics.away.get(metric))
        else {
            continue;
        };
        section.push_str(&format!(
            "| {} | {label} | {} |\n",
            home.as_deref().unwrap_or("0"),
            away.as_deref().unwrap_or("0")
        ));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{TeamRef, TeamStatistics};
    use crate::services::render::test_fixtures::{event, fixture, inter, milan};

    fn live(status: FixtureStatus, elapsed: Option<u16>) -> FixtureSnapshot {
        let mut fixture = fixture();
        fixture.status = status;
        fixture.elapsed = elapsed;
        fixture.home_goals = Some(2);
        fixture.away_goals = Some(1);
        fixture
    }

    fn render(fixture: &FixtureSnapshot) -> String {
        render_live_match(fixture, &AppConfig::default())
    }

    fn lineup(team: TeamRef, coach: Option<&str>) -> Lineup {
        Lineup {
            team,
            coach: coach.map(Into::into),
            starting_xi: vec!["Sommer".into(), "Bastoni".into()],
            substitutes: vec!["Martinez".into()],
        }
    }

    #[test]
    fn header_follows_the_status() {
        assert!(render(&live(FixtureStatus::HalfTime, Some(45))).contains("# Half Time: Inter 2-1 Milan\n\n"));
        assert!(render(&live(FixtureStatus::Finished, Some(90))).contains("# Full Time: Inter 2-1 Milan\n\n"));
        assert!(render(&live(FixtureStatus::InProgress, Some(57))).contains("# 57′: Inter 2-1 Milan\n\n"));
        assert!(
            render(&live(FixtureStatus::Abandoned { with_result: true }, Some(70)))
                .contains("# Full Time: Inter 2-1 Milan")
        );
        assert!(
            render(&live(FixtureStatus::Abandoned { with_result: false }, Some(70)))
                .contains("# 70′: Inter 2-1 Milan")
        );
        assert!(render(&fixture()).contains("# Inter vs Milan - Match Not Started\n\n"));
    }

    #[test]
    fn unset_goals_render_as_zero() {
        let mut fixture = live(FixtureStatus::InProgress, Some(3));
        fixture.home_goals = None;
        fixture.away_goals = None;
        assert!(render(&fixture).contains("# 3′: Inter 0-0 Milan"));
    }

    #[test]
    fn scorer_lines_skip_missed_penalties() {
        let mut fixture = live(FixtureStatus::InProgress, Some(60));
        fixture.events = vec![
            event(EventKind::Goal, 12, inter(), "Lautaro Martínez", None, "Normal Goal"),
            event(EventKind::Goal, 30, milan(), "Leão", None, "Penalty"),
            event(EventKind::Goal, 41, milan(), "Pulisic", None, "Missed Penalty"),
            event(EventKind::Goal, 55, inter(), "Thuram", None, "Normal Goal"),
        ];
        let body = render(&fixture);

        assert!(body.contains(" **Inter:** Lautaro Martínez (12′), Thuram (55′).\n\n"));
        assert!(body.contains(" **Milan:** Leão (30′).\n\n"));
        assert!(!body.contains("Pulisic (41′)"));
    }

    #[test]
    fn event_rows_highlight_house_team_goals() {
        let mut fixture = live(FixtureStatus::InProgress, Some(80));
        fixture.events = vec![
            event(EventKind::Goal, 12, inter(), "Thuram", Some("Barella"), "Normal Goal"),
            event(EventKind::Goal, 30, milan(), "Leão", None, "Penalty"),
            event(EventKind::Goal, 41, milan(), "Pulisic", None, "Missed Penalty"),
            event(EventKind::Card, 50, inter(), "Bastoni", None, "Yellow Card"),
            event(EventKind::Card, 60, milan(), "Tomori", None, "Red Card"),
            event(EventKind::Substitution, 70, inter(), "Thuram", Some("Taremi"), "Substitution 1"),
            event(EventKind::Substitution, 71, inter(), "Dimarco", None, "Substitution 2"),
            event(EventKind::Var, 75, milan(), "Leão", None, "Goal cancelled"),
        ];
        let body = render(&fixture);

        assert!(body.contains("### Match Events\n\n| Min | Event |\n|:-:|:--|\n"));
        assert!(body.contains(
            "| 12′ | ⚽ **GOAAAAAAAL (Inter): Thuram, assist by Barella. Forza Inter!** ⚫🔵 |\n"
        ));
        assert!(body.contains("| 30′ | ⚽ **Goal (Milan): Leão (Penalty).** |\n"));
        assert!(body.contains("| 41′ | ❌ **Missed Penalty (Milan):** Pulisic. |\n"));
        assert!(body.contains("| 50′ | **🟨 Yellow card (Inter):** Bastoni. |\n"));
        assert!(body.contains("| 60′ | **🟥 Red card (Milan):** Tomori. |\n"));
        assert!(body.contains("| 70′ | **🔄 Sub (Inter):** Taremi replaces Thuram. |\n"));
        assert!(!body.contains("| 71′ |"));
        assert!(!body.contains("| 75′ |"));
    }

    #[test]
    fn lineups_require_both_complete_sides() {
        let mut fixture = live(FixtureStatus::InProgress, Some(10));
        fixture.lineups = Some(MatchLineups {
            home: lineup(inter(), Some("C. Chivu")),
            away: lineup(milan(), None),
        });
        let body = render(&fixture);
        assert!(body.contains(
            "### Lineups\n\n#### Inter\n\n **Starting XI:** Sommer, Bastoni\n\n **Substitutes:** Martinez\n\n **Coach:** C. Chivu\n\n#### Milan\n\n"
        ));

        if let Some(lineups) = fixture.lineups.as_mut() {
            lineups.away.substitutes.clear();
        }
        assert!(!render(&fixture).contains("### Lineups"));
    }

    #[test]
    fn statistics_skip_metrics_missing_on_either_side() {
        let home: TeamStatistics = [
            ("Ball Possession".to_owned(), Some("58%".to_owned())),
            ("Shots on Goal".to_owned(), None),
            ("Fouls".to_owned(), Some("9".to_owned())),
            ("expected_goals".to_owned(), Some("1.7".to_owned())),
        ]
        .into_iter()
        .collect();
        let away: TeamStatistics = [
            ("Shots on Goal".to_owned(), Some("3".to_owned())),
            ("Ball Possession".to_owned(), Some("42%".to_owned())),
            ("expected_goals".to_owned(), Some("0.9".to_owned())),
        ]
        .into_iter()
        .collect();
        let mut fixture = live(FixtureStatus::InProgress, Some(70));
        fixture.statistics = Some(MatchStatistics { home, away });
        let body = render(&fixture);

        let stats = "### Match Stats\n\n| Inter |  | Milan |\n|:-:|:-:|:-:|\n\
                     | 58% | Ball Possession | 42% |\n\
                     | 0 | Shots On-Goal | 3 |\n";
        assert!(body.contains(stats));
        assert!(!body.contains("Fouls"));
        assert!(!body.contains("expected_goals"));
    }

    #[test]
    fn body_is_framed_by_separators() {
        let body = render(&live(FixtureStatus::InProgress, Some(5)));
        assert!(body.starts_with("\n\n---\n\n# 5′"));
        assert!(body.ends_with("\n\n---\n\n"));
        assert!(body.contains("**Venue:** Stadio Giuseppe Meazza\n\n**Referee:** D. Orsato\n\n"));
    }
}
