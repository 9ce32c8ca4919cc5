use axum::{
    Json, Router,
    http::StatusCode,
    routing::get,
};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use rz_api_types::{AiService, MiniAppManifest, Restaurant};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

mod catalog;
mod config;
mod manifest;

use config::ServiceConfig;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Clone)]
struct AppState {
    restaurants: Arc<Vec<Restaurant>>,
    ai_services: Arc<Vec<AiService>>,
    manifest: Arc<MiniAppManifest>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;

    let state = AppState {
        restaurants: Arc::new(catalog::load_catalog(&config.restaurants_path).await?),
        ai_services: Arc::new(catalog::load_catalog(&config.ai_services_path).await?),
        manifest: Arc::new(manifest::build_manifest(
            &config.public_url,
            config.account_association.clone(),
        )),
    };

    let app = router(state);
    let addr = config.bind_addr;

    let handle = Handle::new();
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        });
    }

    match &config.tls {
        Some(tls) => {
            if rustls::crypto::ring::default_provider().install_default().is_err() {
                warn!("rustls crypto provider was already installed");
            }
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!("miniapp-service listening on https://{}", addr);
            axum_server::bind_rustls(addr, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("miniapp-service listening on http://{}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/catalog/restaurants", get(catalog::restaurants))
        .route("/catalog/ai-services", get(catalog::ai_services))
        .route("/.well-known/farcaster.json", get(manifest::farcaster_manifest))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "miniapp-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "miniapp-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}
