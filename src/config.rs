//! Application-level configuration loading: community, house team, windows and intervals.
//!
//! Secrets never live here; the collaborator clients read them from the environment.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use thiserror::Error;
use time::UtcOffset;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default location on disk where the bot looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCH_THREAD_BOT_CONFIG_PATH";

/// Club followed by the bot; its goals get the highlighted event row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HouseTeam {
    /// Sports-data provider id of the club.
    pub id: u64,
    /// Short display name used in the goal highlight.
    pub name: String,
    /// Line appended to every house-team goal.
    pub goal_cheer: String,
    /// Club emoji shown after the cheer.
    #[serde(default)]
    pub emoji: String,
}

impl Default for HouseTeam {
    fn default() -> Self {
        Self {
            id: 505,
            name: "Inter".into(),
            goal_cheer: "Forza Inter!".into(),
            emoji: "⚫🔵".into(),
        }
    }
}

/// Polling intervals, lifecycle windows and timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Time before kickoff when the pre-match thread is created.
    pub pre_match_window: Duration,
    /// Time before kickoff when the live match thread is created.
    pub live_window: Duration,
    /// Creation loop period.
    pub fixture_check_interval: Duration,
    /// Live-update loop period.
    pub live_update_interval: Duration,
    /// Comment-command loop period.
    pub comment_poll_interval: Duration,
    /// Fixed pause after the comment listing fails.
    pub comment_failure_backoff: Duration,
    /// Pause between refetches when events go missing mid-match.
    pub events_retry_delay: Duration,
    /// Per-request HTTP timeout of both collaborator clients.
    pub request_timeout: Duration,
    /// Upper bound for the work of one lifecycle transition.
    pub transition_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            pre_match_window: Duration::from_secs(24 * 60 * 60),
            live_window: Duration::from_secs(60 * 60),
            fixture_check_interval: Duration::from_secs(30 * 60),
            live_update_interval: Duration::from_secs(2 * 60),
            comment_poll_interval: Duration::from_secs(30),
            comment_failure_backoff: Duration::from_secs(60),
            events_retry_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            transition_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Community name without the `r/` prefix.
    pub community: String,
    /// Account the bot posts with; its own comments are ignored.
    pub bot_username: String,
    /// Lowercased accounts allowed to run thread commands.
    pub approved_users: Vec<String>,
    /// Comment prefix of the thread commands (e.g. `!inter`).
    pub command_prefix: String,
    /// Club followed by the bot.
    pub house_team: HouseTeam,
    /// Competitions whose rounds are labelled "Matchday".
    pub matchday_competitions: Vec<String>,
    /// Competitions whose table is shown in the pre-match thread.
    pub standings_competitions: Vec<String>,
    /// Competitions whose round is left out of the pre-match info (e.g. club friendlies).
    pub roundless_competitions: Vec<String>,
    /// Flair applied to created threads.
    pub flair_template_id: Option<String>,
    /// Offset used for dates and times shown in thread bodies.
    pub display_offset: UtcOffset,
    /// Windows, intervals and timeouts.
    pub timings: Timings,
    /// How many recent posts the duplicate check scans.
    pub recent_post_scan: usize,
    /// How many recent comments each command poll reads.
    pub recent_comment_scan: usize,
    /// Refetches allowed when events disappear mid-match.
    pub events_retry_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into_config()
    }
}

/// Reasons a configuration file is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has mistyped fields.
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        community = %config.community,
                        house_team = %config.house_team.name,
                        "loaded bot config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "rejected config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse and validate a JSON document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        raw.validate()?;
        Ok(raw.into_config())
    }

    /// Whether `user` may run thread commands.
    pub fn is_approved(&self, user: &str) -> bool {
        let user = user.to_lowercase();
        self.approved_users.iter().any(|approved| *approved == user)
    }
}

#[serde_as]
#[derive(Debug, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_windows"))]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[validate(length(min = 1))]
    community: String,
    #[validate(length(min = 1))]
    bot_username: String,
    approved_users: Vec<String>,
    #[validate(length(min = 1))]
    command_prefix: String,
    house_team: HouseTeam,
    matchday_competitions: Vec<String>,
    standings_competitions: Vec<String>,
    roundless_competitions: Vec<String>,
    flair_template_id: Option<String>,
    #[validate(range(min = -720, max = 840))]
    utc_offset_minutes: i32,
    #[serde_as(as = "DurationSeconds<u64>")]
    pre_match_window_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    live_window_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[validate(custom(function = "non_zero"))]
    fixture_check_interval_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[validate(custom(function = "non_zero"))]
    live_update_interval_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[validate(custom(function = "non_zero"))]
    comment_poll_interval_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    comment_failure_backoff_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    events_retry_delay_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[validate(custom(function = "non_zero"))]
    request_timeout_secs: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[validate(custom(function = "non_zero"))]
    transition_timeout_secs: Duration,
    #[validate(range(min = 1, max = 100))]
    recent_post_scan: usize,
    #[validate(range(min = 1, max = 100))]
    recent_comment_scan: usize,
    #[validate(range(max = 10))]
    events_retry_limit: u32,
}

impl Default for RawConfig {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            community: "FCInterMilan".into(),
            bot_username: "FCInterMilan".into(),
            approved_users: Vec::new(),
            command_prefix: "!inter".into(),
            house_team: HouseTeam::default(),
            matchday_competitions: vec!["Serie A".into()],
            standings_competitions: vec![
                "Serie A".into(),
                "UEFA Champions League".into(),
                "FIFA Club World Cup".into(),
            ],
            roundless_competitions: vec!["Friendlies Clubs".into()],
            flair_template_id: None,
            utc_offset_minutes: 60,
            pre_match_window_secs: timings.pre_match_window,
            live_window_secs: timings.live_window,
            fixture_check_interval_secs: timings.fixture_check_interval,
            live_update_interval_secs: timings.live_update_interval,
            comment_poll_interval_secs: timings.comment_poll_interval,
            comment_failure_backoff_secs: timings.comment_failure_backoff,
            events_retry_delay_secs: timings.events_retry_delay,
            request_timeout_secs: timings.request_timeout,
            transition_timeout_secs: timings.transition_timeout,
            recent_post_scan: 50,
            recent_comment_scan: 100,
            events_retry_limit: 2,
        }
    }
}

impl RawConfig {
    fn into_config(self) -> AppConfig {
        AppConfig {
            community: self.community,
            bot_username: self.bot_username,
            approved_users: self
                .approved_users
                .into_iter()
                .map(|user| user.to_lowercase())
                .collect(),
            command_prefix: self.command_prefix.to_lowercase(),
            house_team: self.house_team,
            matchday_competitions: self.matchday_competitions,
            standings_competitions: self.standings_competitions,
            roundless_competitions: self.roundless_competitions,
            flair_template_id: self.flair_template_id.filter(|id| !id.is_empty()),
            display_offset: UtcOffset::from_whole_seconds(self.utc_offset_minutes * 60)
                .unwrap_or(UtcOffset::UTC),
            timings: Timings {
                pre_match_window: self.pre_match_window_secs,
                live_window: self.live_window_secs,
                fixture_check_interval: self.fixture_check_interval_secs,
                live_update_interval: self.live_update_interval_secs,
                comment_poll_interval: self.comment_poll_interval_secs,
                comment_failure_backoff: self.comment_failure_backoff_secs,
                events_retry_delay: self.events_retry_delay_secs,
                request_timeout: self.request_timeout_secs,
                transition_timeout: self.transition_timeout_secs,
            },
            recent_post_scan: self.recent_post_scan,
            recent_comment_scan: self.recent_comment_scan,
            events_retry_limit: self.events_retry_limit,
        }
    }
}

fn non_zero(value: &Duration) -> Result<(), ValidationError> {
    if value.is_zero() {
        let mut err = ValidationError::new("duration_zero");
        err.message = Some("interval must be at least one second".into());
        return Err(err);
    }
    Ok(())
}

fn validate_windows(raw: &RawConfig) -> Result<(), ValidationError> {
    if raw.live_window_secs >= raw.pre_match_window_secs {
        let mut err = ValidationError::new("live_window_order");
        err.message = Some("live window must be shorter than the pre-match window".into());
        return Err(err);
    }
    Ok(())
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
