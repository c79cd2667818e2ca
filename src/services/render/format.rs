use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::dao::models::Competition;

const REGULAR_SEASON_PREFIX: &str = "Regular Season - ";

/// `57′`, or `0′` when the provider did not report the minute.
pub fn minute(value: Option<u16>) -> String {
    format!("{}′", value.unwrap_or(0))
}

/// Goals with unset values rendered as `0`.
pub fn goals(value: Option<u16>) -> u16 {
    value.unwrap_or(0)
}

/// `Sunday, 19 October 2026` in the display offset.
pub fn long_date(instant: OffsetDateTime, offset: UtcOffset) -> String {
    instant
        .to_offset(offset)
        .format(format_description!(
            "[weekday], [day] [month repr:long] [year]"
        ))
        .unwrap_or_default()
}

/// `19 Oct 2026` in the display offset.
pub fn short_date(instant: OffsetDateTime, offset: UtcOffset) -> String {
    instant
        .to_offset(offset)
        .format(format_description!("[day] [month repr:short] [year]"))
        .unwrap_or_default()
}

/// `20:45 (GMT+1)` in the display offset.
pub fn clock(instant: OffsetDateTime, offset: UtcOffset) -> String {
    let time = instant
        .to_offset(offset)
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_default();
    format!("{time} ({})", gmt_label(offset))
}

fn gmt_label(offset: UtcOffset) -> String {
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    match minutes.unsigned_abs() {
        0 => format!("GMT{sign}{}", hours.unsigned_abs()),
        minutes => format!("GMT{sign}{}:{minutes:02}", hours.unsigned_abs()),
    }
}

/// Round label shown in titles: `Matchday N` for matchday competitions, `Round N` otherwise.
///
/// Round strings that are not regular-season rounds ("Quarter-finals") pass through.
pub fn round_label(competition: &Competition, matchday_competitions: &[String]) -> Option<String> {
    let round = competition.round.as_deref()?.trim();
    if round.is_empty() {
        return None;
    }
    let label = match round.strip_prefix(REGULAR_SEASON_PREFIX) {
        Some(number) if uses_matchdays(competition, matchday_competitions) => {
            format!("Matchday {number}")
        }
        Some(number) => format!("Round {number}"),
        None => round.to_owned(),
    };
    Some(label)
}

/// Bare round number of a regular-season round, for the `Matchday:` info line.
pub fn round_number(competition: &Competition) -> Option<&str> {
    competition
        .round
        .as_deref()
        .and_then(|round| round.trim().strip_prefix(REGULAR_SEASON_PREFIX))
}

/// Whether rounds of `competition` are labelled "Matchday".
pub fn uses_matchdays(competition: &Competition, matchday_competitions: &[String]) -> bool {
    matchday_competitions
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&competition.name))
}
