use axum::Router;

use crate::state::SharedState;

pub mod health;
pub mod lifecycle;

/// Compose all route trees and attach the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(lifecycle::router())
        .with_state(state)
}
