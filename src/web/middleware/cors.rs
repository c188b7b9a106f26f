//! CORS middleware configuration.

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

const METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

/// Any origin, no credentials.
fn permissive() -> CorsLayer {
    CorsLayer::new()
        .allow_methods(METHODS)
        .allow_headers(Any)
        .allow_origin(Any)
}

/// Create a CORS layer from the configured origins.
///
/// An empty list, or one where no entry parses as a header value, allows
/// any origin without credentials. Otherwise only the listed origins are
/// allowed and credentials are enabled.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if allowed.is_empty() {
        return permissive();
    }

    CorsLayer::new()
        .allow_methods(METHODS)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .allow_credentials(true)
        .allow_origin(allowed)
}
