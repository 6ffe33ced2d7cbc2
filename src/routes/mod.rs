pub mod admin;
pub mod api;
pub mod auth;
pub mod graphql;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full HTTP surface
pub fn app(state: AppState) -> Router {
    let mut app = Router::new()
        .merge(api::router(&state.config.media))
        .merge(auth::router())
        .merge(graphql::router())
        .merge(admin::router());

    if let Some(cors) = cors_layer(&state.config.server.allowed_origins) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// `"*"` allows any origin without credentials; a comma-separated list allows
/// those origins with cookies; empty means same-origin only.
fn cors_layer(allowed_origins: &str) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.trim();
    if allowed_origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", o);
                None
            }
        })
        .collect();

    Some(layer.allow_origin(origins).allow_credentials(true))
}
