use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::lifecycle::{FixtureSummaryResponse, LifecycleResponse},
    error::AppError,
    services::lifecycle_service,
    state::SharedState,
};

/// Read-only endpoints exposing the match-thread lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/lifecycle", get(get_lifecycle))
        .route("/lifecycle/fixture", get(get_tracked_fixture))
}

#[utoipa::path(
    get,
    path = "/lifecycle",
    tag = "lifecycle",
    responses((status = 200, description = "Current lifecycle record", body = LifecycleResponse))
)]
/// Return the phase, tracked fixture and live thread of the lifecycle.
pub async fn get_lifecycle(State(state): State<SharedState>) -> Json<LifecycleResponse> {
    Json(lifecycle_service::lifecycle_status(&state).await)
}

#[utoipa::path(
    get,
    path = "/lifecycle/fixture",
    tag = "lifecycle",
    responses(
        (status = 200, description = "Tracked fixture", body = FixtureSummaryResponse),
        (status = 404, description = "No fixture is tracked"),
        (status = 503, description = "Sports-data provider unavailable")
    )
)]
/// Return a fresh summary of the tracked fixture.
pub async fn get_tracked_fixture(
    State(state): State<SharedState>,
) -> Result<Json<FixtureSummaryResponse>, AppError> {
    let payload = lifecycle_service::tracked_fixture(&state).await?;
    Ok(Json(payload))
}
