use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness along with the current lifecycle phase.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let phase = state.lifecycle_phase().await.kind();
    HealthResponse::ok(phase.into())
}
