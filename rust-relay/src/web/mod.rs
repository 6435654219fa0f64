//! Web server module for receiving Shopify webhooks.
//!
//! Routes:
//! - `GET /health`: liveness probe
//! - `POST /webhooks/shopify/products`: product create/update webhooks

pub mod handlers;
pub mod signature;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, not_found, product_webhook, AppState, HealthResponse};
pub use signature::{
    compute_signature_base64, verify_shopify_hmac, AuthError, SHOPIFY_HMAC_HEADER,
};

/// Path Shopify product webhooks are delivered to.
pub const PRODUCT_WEBHOOK_PATH: &str = "/webhooks/shopify/products";

/// Build the application router.
///
/// Wrong methods on the webhook path fall back to the same empty 404 as unknown
/// paths, so the endpoint's existence is never revealed. The body limit comes
/// from config; the handler turns an oversized body into that same 404.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/health", get(health))
        .route(
            PRODUCT_WEBHOOK_PATH,
            post(product_webhook)
                .fallback(not_found)
                .layer(body_limit),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
