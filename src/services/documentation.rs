use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the match-thread bot status API.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::lifecycle::get_lifecycle,
        crate::routes::lifecycle::get_tracked_fixture,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::lifecycle::LifecycleResponse,
            crate::dto::lifecycle::FixtureSummaryResponse,
            crate::dto::lifecycle::VisiblePhase,
            crate::dto::lifecycle::VisibleTransition,
            crate::dto::lifecycle::VisibleStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lifecycle", description = "Match-thread lifecycle status"),
    )
)]
pub struct ApiDoc;
