pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use partsdb_core::store::PartStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::TokenAuth;

/// Version prefix of the KiCad HTTP library API.
pub const API_PREFIX: &str = "/kicad-api/v1";

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(store: Arc<dyn PartStore>, auth: TokenAuth) -> Router {
    let app_state = state::AppState::new(store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let kicad_api = Router::new()
        .route(API_PREFIX, get(routes::kicad::index))
        .route(&format!("{API_PREFIX}/"), get(routes::kicad::index))
        .route(
            &format!("{API_PREFIX}/categories.json"),
            get(routes::kicad::list_categories),
        )
        .route(
            &format!("{API_PREFIX}/parts/category/{{file}}"),
            get(routes::kicad::parts_for_category),
        )
        .route(
            &format!("{API_PREFIX}/parts/{{file}}"),
            get(routes::kicad::part_detail),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::new(auth),
            auth::auth_middleware,
        ));

    Router::new()
        .merge(kicad_api)
        .route("/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the KiCad API server on `addr` (e.g. `0.0.0.0:8000`).
pub async fn serve(addr: &str, store: Arc<dyn PartStore>, auth: TokenAuth) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, store, auth).await
}

/// Start the server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    listener: tokio::net::TcpListener,
    store: Arc<dyn PartStore>,
    auth: TokenAuth,
) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    let authenticated = auth.token.is_some();
    let app = build_router(store, auth);

    tracing::info!(
        "KiCad HTTP library listening on http://{local}{API_PREFIX}/ (auth: {})",
        if authenticated { "token" } else { "off" }
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
