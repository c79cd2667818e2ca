use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::lifecycle::VisiblePhase;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always "ok" while the process serves requests.
    pub status: String,
    /// Current lifecycle phase.
    pub phase: VisiblePhase,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(phase: VisiblePhase) -> Self {
        Self {
            status: "ok".to_string(),
            phase,
        }
    }
}
