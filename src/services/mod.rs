/// Manual thread commands posted as comments.
pub mod comment_commands;
/// Creation loop opening the pre-match and live threads.
pub mod creation_loop;
/// OpenAPI documentation generation.
pub mod documentation;
/// Post-match thread creation and lifecycle reset.
pub mod finalizer;
/// Health check service.
pub mod health_service;
/// Duplicate-thread detection among recent posts.
pub mod idempotency;
/// Read-only lifecycle projections.
pub mod lifecycle_service;
/// Live-update loop refreshing the match thread.
pub mod live_update_loop;
/// Thread titles and markdown bodies.
pub mod render;
/// Idempotent thread creation behind lifecycle transitions.
pub mod thread_service;
