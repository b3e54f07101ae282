//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    default_icon_handler, health_handler, image_handler, manifest_handler, proxy_icon_handler,
    redirect_handler, website_infos_handler, AppState,
};
use super::rate_limit::rate_limit;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /app/manifest.json` - Web app manifest for a wrapped page
/// - `GET /app/icon.png` - Default app icon
/// - `GET /redirect` - Forwards an installed app to its page
/// - `GET /getWebsiteInfos` - Title and icon of a page (rate limited)
/// - `GET /icon` - Proxies an icon into the image store (rate limited)
/// - `GET /images/:key` - Serves a proxied icon
///
/// # Middleware
/// - Rate limiting on the routes that make outbound requests
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let outbound = Router::new()
        .route("/getWebsiteInfos", get(website_infos_handler))
        .route("/icon", get(proxy_icon_handler))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/app/manifest.json", get(manifest_handler))
        .route("/app/icon.png", get(default_icon_handler))
        .route("/redirect", get(redirect_handler))
        .route("/images/:key", get(image_handler))
        .merge(outbound)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
