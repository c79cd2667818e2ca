//! Read-only projections of the lifecycle record.

use tracing::warn;

use crate::{
    dto::lifecycle::{FixtureSummaryResponse, LifecycleResponse},
    error::ServiceError,
    state::SharedState,
};

/// Current lifecycle snapshot.
pub async fn lifecycle_status(state: &SharedState) -> LifecycleResponse {
    state.snapshot().await.into()
}

/// Fetch the tracked fixture from the sports-data provider.
pub async fn tracked_fixture(state: &SharedState) -> Result<FixtureSummaryResponse, ServiceError> {
    let fixture_id = state
        .lifecycle_phase()
        .await
        .active_fixture_id()
        .ok_or_else(|| ServiceError::NotFound("no fixture is tracked".into()))?;

    let fixture = state.fixtures().fixture(fixture_id).await.map_err(|err| {
        warn!(fixture_id, error = %err, "failed to fetch tracked fixture");
        ServiceError::from(err)
    })?;
    Ok(fixture.into())
}
