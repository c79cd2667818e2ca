//! Match-thread bot entrypoint wiring the collaborator clients, lifecycle loops and status API.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_thread_bot::{
    config::AppConfig,
    dao::{
        fixture_source::rapidapi::{RapidApiConfig, RapidApiFixtureSource},
        forum::reddit::{RedditConfig, RedditForum},
    },
    routes,
    services::{comment_commands, creation_loop, live_update_loop},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let request_timeout = config.timings.request_timeout;

    let fixtures = RapidApiFixtureSource::new(
        RapidApiConfig::from_env(config.house_team.id)
            .context("loading sports-data credentials")?
            .with_timeout(request_timeout),
    )
    .context("building sports-data client")?;
    let forum = RedditForum::new(
        RedditConfig::from_env(config.community.clone())
            .context("loading community platform credentials")?
            .with_flair(config.flair_template_id.clone())
            .with_timeout(request_timeout),
    )
    .context("building community platform client")?;

    let app_state = AppState::new(config, Arc::new(forum), Arc::new(fixtures));

    tokio::spawn(creation_loop::run(app_state.clone()));
    tokio::spawn(live_update_loop::run(app_state.clone()));
    tokio::spawn(comment_commands::run(app_state.clone()));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting status server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
