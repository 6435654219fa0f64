//! Refersion affiliate trigger client.
//!
//! Refersion gracefully declines triggers for unknown affiliate codes and for
//! SKUs that already have a trigger, so every response is logged and the caller
//! carries on. There is no retry.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;

/// Trigger type for SKU-based affiliate triggers.
pub const TRIGGER_TYPE_SKU: &str = "SKU";

/// Longest slice of an upstream response body copied into logs.
const BODY_PREVIEW_LIMIT: usize = 500;

/// Form body of a `new_affiliate_trigger` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRequest<'a> {
    pub refersion_public_key: &'a str,
    pub refersion_secret_key: &'a str,
    pub affiliate_code: &'a str,
    #[serde(rename = "type")]
    pub trigger_type: &'static str,
    pub trigger: &'a str,
}

/// What happened to a single trigger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Upstream answered 2xx
    Accepted { status: u16 },
    /// Upstream answered with a non-success status
    Declined { status: u16 },
    /// Upstream could not be reached or timed out
    Failed,
}

/// Sends affiliate triggers to the configured Refersion endpoint.
#[derive(Clone)]
pub struct TriggerDispatcher {
    client: Client,
    endpoint: Url,
    public_key: String,
    secret_key: String,
    timeout: Duration,
}

impl TriggerDispatcher {
    /// Create a dispatcher sharing the given HTTP client.
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.refersion_api_url.clone(),
            public_key: config.refersion_public_key.clone(),
            secret_key: config.refersion_secret_key.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    /// Build the form body for one trigger.
    pub fn trigger_request<'a>(&'a self, affiliate_code: &'a str, sku: &'a str) -> TriggerRequest<'a> {
        TriggerRequest {
            refersion_public_key: &self.public_key,
            refersion_secret_key: &self.secret_key,
            affiliate_code,
            trigger_type: TRIGGER_TYPE_SKU,
            trigger: sku,
        }
    }

    /// Send one trigger and report the outcome. Never fails.
    pub async fn dispatch(&self, affiliate_code: &str, sku: &str) -> DispatchOutcome {
        info!(
            affiliate_code = affiliate_code,
            sku = sku,
            endpoint = %self.endpoint,
            timeout_seconds = self.timeout.as_secs_f64(),
            "trigger_dispatch_starting"
        );

        let form = self.trigger_request(affiliate_code, sku);
        let request = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .form(&form);

        match request.send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.bytes().await.unwrap_or_default();
                let body_preview =
                    String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_LIMIT)]);

                if status.is_success() {
                    info!(
                        affiliate_code = affiliate_code,
                        sku = sku,
                        status_code = status.as_u16(),
                        body_preview = %body_preview,
                        "trigger_dispatch_complete"
                    );
                    DispatchOutcome::Accepted {
                        status: status.as_u16(),
                    }
                } else {
                    warn!(
                        affiliate_code = affiliate_code,
                        sku = sku,
                        status_code = status.as_u16(),
                        body_preview = %body_preview,
                        "trigger_dispatch_declined"
                    );
                    DispatchOutcome::Declined {
                        status: status.as_u16(),
                    }
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    error!(
                        affiliate_code = affiliate_code,
                        sku = sku,
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "trigger_dispatch_timeout"
                    );
                } else {
                    error!(
                        affiliate_code = affiliate_code,
                        sku = sku,
                        error = %e,
                        "trigger_dispatch_error"
                    );
                }
                DispatchOutcome::Failed
            }
        }
    }
}
