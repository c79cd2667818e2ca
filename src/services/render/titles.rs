//! Canonical thread titles.
//!
//! Titles are the idempotency key of every thread: the same fixture data must
//! always produce the same string.

use crate::dao::models::FixtureSnapshot;

use super::format::{goals, round_label};

fn context(fixture: &FixtureSnapshot, matchday_competitions: &[String]) -> String {
    match round_label(&fixture.competition, matchday_competitions) {
        Some(round) => format!("({}, {round})", fixture.competition.name),
        None => format!("({})", fixture.competition.name),
    }
}

pub fn pre_match_title(fixture: &FixtureSnapshot, matchday_competitions: &[String]) -> String {
    format!(
        "[Pre-Match Discussion Thread] {} vs {} {}",
        fixture.home.name,
        fixture.away.name,
        context(fixture, matchday_competitions)
    )
}

pub fn match_thread_title(fixture: &FixtureSnapshot, matchday_competitions: &[String]) -> String {
    format!(
        "[Match Thread] {} vs {} {}",
        fixture.home.name,
        fixture.away.name,
        context(fixture, matchday_competitions)
    )
}

pub fn post_match_title(fixture: &FixtureSnapshot, matchday_competitions: &[String]) -> String {
    format!(
        "[Post-Match Discussion Thread] {} {}:{} {} {}",
        fixture.home.name,
        goals(fixture.home_goals),
        goals(fixture.away_goals),
        fixture.away.name,
        context(fixture, matchday_competitions)
    )
}
