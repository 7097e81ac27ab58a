mod middleware;
mod routes;
mod structs;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use middleware::logger_middleware::logger_middleware;
use routes::all_tweets_route::all_tweets_route;
use routes::tweets_by_date_route::tweets_by_date_route;
use routes::tweets_by_tweeter_route::tweets_by_tweeter_route;
use routes::tweets_on_date_by_tweeter_route::tweets_on_date_by_tweeter_route;
use utils::config::Config;
use utils::cql_session::CqlSession;
use utils::tweet_store::TweetStore;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TweetStore>,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/tweets", get(all_tweets_route))
        .route("/tweets/date/:date", get(tweets_by_date_route))
        .route("/tweets/tweeter/:tweeter", get(tweets_by_tweeter_route))
        .route("/tweets/:date/:tweeter", get(tweets_on_date_by_tweeter_route))
        .layer(axum_middleware::from_fn(logger_middleware))
        .with_state(app_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C : {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM : {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let session = Arc::new(CqlSession::open(&config).await?);

    let app_state = AppState {
        store: session.clone(),
    };

    let router = router(app_state);
    info!("routes initialized");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = axum::Server::try_bind(&addr)?.serve(router.into_make_service());
    info!("Listening on {addr}");

    server.with_graceful_shutdown(shutdown_signal()).await?;

    match Arc::try_unwrap(session) {
        Ok(session) => session.close(),
        Err(_) => warn!("CQL session still shared at shutdown, dropping it with the process"),
    }

    Ok(())
}
