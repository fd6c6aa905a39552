mod config;
mod profile;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tether_api::state::{AppState, AppStateInner};
use tether_db::Database;
use tether_gateway::Dispatcher;
use tether_relations::{QueryFacade, RelationshipEngine};
use tether_types::profile::{NoProfiles, ProfileResolver};

use crate::config::Config;
use crate::profile::HttpProfileResolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Arc::new(Database::open(&config.db_path)?);

    let profiles: Arc<dyn ProfileResolver> = match &config.profile_url {
        Some(url) => {
            info!("Resolving profiles from {}", url);
            Arc::new(HttpProfileResolver::new(
                url.clone(),
                config.profile_timeout,
                tokio::runtime::Handle::current(),
            ))
        }
        None => {
            info!("TETHER_PROFILE_URL not set, lists will carry no profiles");
            Arc::new(NoProfiles)
        }
    };

    // The dispatcher is both the device registry and the event publisher.
    let dispatcher = Dispatcher::new();
    let state: AppState = Arc::new(AppStateInner {
        engine: RelationshipEngine::new(db.clone(), Arc::new(dispatcher.clone())),
        queries: QueryFacade::new(db, profiles),
        dispatcher,
    });

    let app = tether_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Tether server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
