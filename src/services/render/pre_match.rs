use std::cmp::{Ordering, Reverse};

use crate::{
    config::AppConfig,
    dao::models::{FixtureSnapshot, FixtureStatus, Injury, StandingRow, StandingsTable},
};

use super::{
    SEPARATOR,
    format::{clock, goals, long_date, round_number, short_date, uses_matchdays},
};

/// Head-to-head results listed in the pre-match thread.
const LATEST_RESULTS: usize = 8;

/// Auxiliary data fetched once for the pre-match thread.
#[derive(Debug, Clone, Default)]
pub struct PreMatchData {
    /// Table of the competition, when it is one that shows standings.
    pub standings: Option<StandingsTable>,
    /// Unavailable players of both sides.
    pub injuries: Vec<Injury>,
    /// Previous meetings of the two teams.
    pub head_to_head: Vec<FixtureSnapshot>,
}

/// Match info, standings, injuries and head-to-head sections.
pub fn render_pre_match(fixture: &FixtureSnapshot, data: &PreMatchData, config: &AppConfig) -> String {
    let mut body = String::from("---\n\n## 📋 Match Info 📋\n\n");
    body.push_str(&match_info(fixture, config));
    body.push_str(SEPARATOR);

    if let Some(group) = data
        .standings
        .as_ref()
        .and_then(|table| table.group_for(config.house_team.id))
        .filter(|group| !group.is_empty())
    {
        body.push_str(&standings(&fixture.competition.name, group, config.house_team.id));
        body.push_str(SEPARATOR);
    }

    if !data.injuries.is_empty() {
        body.push_str(&injuries(&data.injuries));
        body.push_str(SEPARATOR);
    }

    if !data.head_to_head.is_empty() {
        body.push_str(&head_to_head(fixture, &data.head_to_head, config));
        body.push_str(SEPARATOR);
    }

    body
}

fn match_info(fixture: &FixtureSnapshot, config: &AppConfig) -> String {
    let offset = config.display_offset;
    let mut info = format!(
        "\n- **Date:** {}\n- **Time:** {}",
        long_date(fixture.kickoff, offset),
        clock(fixture.kickoff, offset)
    );
    if let Some(venue) = &fixture.venue {
        info.push_str(&format!("\n- **Venue:** {venue}"));
    }
    info.push_str(&format!("\n- **Competition:** {}", fixture.competition.name));

    let roundless = config
        .roundless_competitions
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&fixture.competition.name));
    if roundless {
        return info;
    }

    let matchday = uses_matchdays(&fixture.competition, &config.matchday_competitions)
        .then(|| round_number(&fixture.competition))
        .flatten();
    match (matchday, fixture.competition.round.as_deref()) {
        (Some(number), _) => info.push_str(&format!("\n- **Matchday:** {number}")),
        (None, Some(round)) if !round.trim().is_empty() => {
            info.push_str(&format!("\n- **Round:** {round}"));
        }
        _ => {}
    }
    info
}

fn standings(name: &str, group: &[StandingRow], house_team: u64) -> String {
    let mut table = format!(
        "\n### {name}\n| # | Team | PL | GD | Pts |\n|:-:|:--|:-:|:-:|:-:|\n"
    );
    for row in group {
        let line = if row.team.id == house_team {
            format!(
                "| **{}** | **{}** | **{}** | **{}** | **{}** |\n",
                row.rank, row.team.name, row.played, row.goal_diff, row.points
            )
        } else {
            format!(
                "| {} | {} | {} | {} | {} |\n",
                row.rank, row.team.name, row.played, row.goal_diff, row.points
            )
        };
        table.push_str(&line);
    }
    table
}

fn injuries(injuries: &[Injury]) -> String {
    let mut section = String::from(
        "## 🏥 Injured/Suspended Players 🏥\n\n\
         ^(*This bot feature is still in beta, information could be inaccurate.*)\n\n\
         | Player | Reason | Status | Team |\n|:--|:-:|:-:|:-:|\n",
    );
    for injury in injuries {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            injury.player, injury.reason, injury.status, injury.team
        ));
    }
    section
}

/// Win/draw counts from the perspective of the upcoming fixture's sides.
#[derive(Debug, Default, PartialEq, Eq)]
struct HeadToHeadRecord {
    played: usize,
    home_wins: usize,
    away_wins: usize,
}

impl HeadToHeadRecord {
    fn draws(&self) -> usize {
        self.played - self.home_wins - self.away_wins
    }
}

fn head_to_head_record(fixture: &FixtureSnapshot, completed: &[&FixtureSnapshot]) -> HeadToHeadRecord {
    let mut record = HeadToHeadRecord {
        played: completed.len(),
        ..HeadToHeadRecord::default()
    };
    for meeting in completed {
        let (home, away) = (goals(meeting.home_goals), goals(meeting.away_goals));
        let winner = if home > away {
            &meeting.home
        } else if away > home {
            &meeting.away
        } else {
            continue;
        };
        if winner.id == fixture.home.id {
            record.home_wins += 1;
        } else {
            record.away_wins += 1;
        }
    }
    record
}

fn head_to_head(fixture: &FixtureSnapshot, meetings: &[FixtureSnapshot], config: &AppConfig) -> String {
    let mut completed: Vec<&FixtureSnapshot> = meetings
        .iter()
        .filter(|meeting| meeting.status == FixtureStatus::Finished)
        .collect();
    let record = head_to_head_record(fixture, &completed);

    let mut section = String::from(
        "## ⚔️ Head-to-Head ⚔️\n\n### Statistics\n\n\
         ^(*H2H statistics may include only fixtures from recent years and may not represent overall historical data.*)\n\n",
    );
    section.push_str(&format!(
        "| Total Played | {} Win | Draw | {} Win |\n|:-:|:-:|:-:|:-:|\n| {} | {} | {} | {} |\n",
        fixture.home.name,
        fixture.away.name,
        record.played,
        record.home_wins,
        record.draws(),
        record.away_wins
    ));

    completed.sort_by_key(|meeting| Reverse(meeting.kickoff));
    completed.truncate(LATEST_RESULTS);
    if completed.is_empty() {
        return section;
    }

    section.push_str(
        "\n### Latest Results\n\n| Home | Score | Away | Date | Competition |\n|:-:|:-:|:-:|:-:|:-:|\n",
    );
    for meeting in completed {
        let (home_goals, away_goals) = (goals(meeting.home_goals), goals(meeting.away_goals));
        let (home, away) = match home_goals.cmp(&away_goals) {
            Ordering::Greater => (format!("**{}**", meeting.home.name), meeting.away.name.clone()),
            Ordering::Less => (meeting.home.name.clone(), format!("**{}**", meeting.away.name)),
            Ordering::Equal => (meeting.home.name.clone(), meeting.away.name.clone()),
        };
        section.push_str(&format!(
            "| {home} | {home_goals}-{away_goals} | {away} | {} | {} |\n",
            short_date(meeting.kickoff, config.display_offset),
            meeting.competition.name
        ));
    }
    section
}
