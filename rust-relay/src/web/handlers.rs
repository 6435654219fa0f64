//! Webhook endpoint handlers.
//!
//! A webhook that fails authentication gets the same empty 404 as a route
//! that does not exist. Everything after authentication answers 200; decode
//! and dispatch problems only show up in the logs.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::dispatch::TriggerDispatcher;
use crate::pipeline::process_product_webhook;
use crate::web::signature::SHOPIFY_HMAC_HEADER;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: TriggerDispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: TriggerDispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Empty 404, shared by unknown routes and rejected webhooks.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

// =============================================================================
// Shopify Product Webhook
// =============================================================================

/// Shopify product webhook endpoint.
///
/// The body is taken as raw bytes so the HMAC is computed over exactly what
/// Shopify signed. A body that cannot be read, including one over the size
/// limit, is rejected with the same empty 404 as a bad signature.
pub async fn product_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(
                reason = %e,
                max_body_bytes = state.config.max_body_bytes,
                "shopify_webhook_body_unreadable"
            );
            return StatusCode::NOT_FOUND;
        }
    };

    let hmac_header = header_value(&headers, SHOPIFY_HMAC_HEADER);

    info!(
        topic = ?header_value(&headers, "X-Shopify-Topic"),
        shop_domain = ?header_value(&headers, "X-Shopify-Shop-Domain"),
        webhook_id = ?header_value(&headers, "X-Shopify-Webhook-Id"),
        body_length = body.len(),
        has_signature = hmac_header.is_some(),
        "shopify_webhook_received"
    );

    match process_product_webhook(&state.config, &state.dispatcher, hmac_header, &body).await {
        Ok(summary) => {
            info!(
                product_id = ?summary.product_id,
                triggers_dispatched = summary.triggers_dispatched(),
                "shopify_webhook_handled"
            );
            StatusCode::OK
        }
        Err(e) => {
            warn!(reason = %e, "shopify_webhook_rejected");
            StatusCode::NOT_FOUND
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
