mod config;
mod error;
mod models;
mod normalize;
mod source;

pub use config::RapidApiConfig;
pub use error::{RapidApiError, RapidApiResult};
pub use normalize::normalize_text;
pub use source::{RapidApiFixtureSource, active_season};
