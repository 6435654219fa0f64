//! Webhook pipeline - authenticate, decode, extract, dispatch.
//!
//! ```text
//! raw body ─► verify_shopify_hmac ─► decode_product ─► per variant:
//!                  │ fail                                extract_affiliate_code
//!                  ▼                                          │ Some(code)
//!               Rejected                                      ▼
//!                                                    TriggerDispatcher::dispatch
//! ```

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatch::{DispatchOutcome, TriggerDispatcher};
use crate::product::{decode_product, extract_affiliate_code};
use crate::web::signature::{verify_shopify_hmac, AuthError};

/// Result of processing one authenticated webhook.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WebhookSummary {
    /// Shopify product id, when the payload carried one
    pub product_id: Option<Value>,
    /// Whether the body failed to decode as a product
    pub decode_failed: bool,
    /// Number of variants in the payload
    pub variants_seen: usize,
    /// Triggers accepted by Refersion
    pub triggers_accepted: usize,
    /// Triggers Refersion answered with a non-success status
    pub triggers_declined: usize,
    /// Triggers that never got an answer
    pub triggers_failed: usize,
}

impl WebhookSummary {
    /// Total number of outbound trigger calls made.
    pub fn triggers_dispatched(&self) -> usize {
        self.triggers_accepted + self.triggers_declined + self.triggers_failed
    }

    fn record(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Accepted { .. } => self.triggers_accepted += 1,
            DispatchOutcome::Declined { .. } => self.triggers_declined += 1,
            DispatchOutcome::Failed => self.triggers_failed += 1,
        }
    }
}

/// Process a single product webhook.
///
/// This function:
/// 1. Verifies the HMAC over the raw body, before anything else touches it
/// 2. Decodes the body as a product; a malformed body counts as zero variants
/// 3. For each variant in order, extracts the affiliate code from its SKU
/// 4. Sends one trigger per variant that carries a code
///
/// Only authentication can fail. Decode and dispatch problems are logged and
/// reflected in the returned summary.
pub async fn process_product_webhook(
    config: &Config,
    dispatcher: &TriggerDispatcher,
    hmac_header: Option<&str>,
    body: &[u8],
) -> Result<WebhookSummary, AuthError> {
    verify_shopify_hmac(&config.shopify_app_secret, body, hmac_header)?;

    let mut summary = WebhookSummary::default();

    let product = match decode_product(body) {
        Ok(product) => product,
        Err(e) => {
            warn!(
                error = %e,
                body_length = body.len(),
                "product_payload_decode_failed"
            );
            summary.decode_failed = true;
            return Ok(summary);
        }
    };

    summary.product_id = product.id.clone();
    summary.variants_seen = product.variants.len();

    if product.variants.is_empty() {
        info!(product_id = ?product.id, "product_has_no_variants");
    }

    for variant in &product.variants {
        let sku = variant.sku();

        let Some(affiliate_code) = extract_affiliate_code(sku) else {
            continue;
        };

        info!(
            product_id = ?product.id,
            variant_id = ?variant.id,
            sku = sku,
            affiliate_code = affiliate_code,
            "variant_affiliate_code_found"
        );

        let outcome = dispatcher.dispatch(affiliate_code, sku).await;
        summary.record(&outcome);
    }

    info!(
        product_id = ?summary.product_id,
        variants_seen = summary.variants_seen,
        triggers_dispatched = summary.triggers_dispatched(),
        triggers_accepted = summary.triggers_accepted,
        triggers_declined = summary.triggers_declined,
        triggers_failed = summary.triggers_failed,
        "product_webhook_processed"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::DEFAULT_MAX_BODY_BYTES;
    use crate::web::signature::compute_signature_base64;

    const SECRET: &str = "shpss_pipeline";

    fn config_for(endpoint: &str) -> Config {
        Config {
            shopify_app_secret: SECRET.to_string(),
            refersion_public_key: "pub".to_string(),
            refersion_secret_key: "sec".to_string(),
            refersion_api_url: Url::parse(endpoint).unwrap(),
            request_timeout_ms: 2000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            port: 0,
        }
    }

    #[tokio::test]
    async fn test_one_qualifying_variant_dispatches_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("affiliate_code=777"))
            .and(body_string_contains("trigger=shirt-blue-rfsnadid%3A777"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body = br#"{"id":9,"variants":[{"sku":"shirt-blue-rfsnadid:777"},{"sku":"shirt-red"}]}"#;
        let signature = compute_signature_base64(SECRET, body);

        let summary = process_product_webhook(&config, &dispatcher, Some(&signature), body)
            .await
            .unwrap();

        assert_eq!(summary.product_id, Some(Value::from(9)));
        assert_eq!(summary.variants_seen, 2);
        assert_eq!(summary.triggers_accepted, 1);
        assert_eq!(summary.triggers_dispatched(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_id_types_still_dispatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("affiliate_code=777"))
            .and(body_string_contains("trigger=x-rfsnadid%3A777"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body =
            br#"{"id":"gid://shopify/Product/1","variants":[{"id":1.5,"sku":"x-rfsnadid:777"}]}"#;
        let signature = compute_signature_base64(SECRET, body);

        let summary = process_product_webhook(&config, &dispatcher, Some(&signature), body)
            .await
            .unwrap();

        assert!(!summary.decode_failed);
        assert_eq!(summary.triggers_accepted, 1);
    }

    #[tokio::test]
    async fn test_bad_signature_never_dispatches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body = br#"{"variants":[{"sku":"a-rfsnadid:1"}]}"#;

        let missing = process_product_webhook(&config, &dispatcher, None, body).await;
        assert_eq!(missing, Err(AuthError::MissingSignature));

        let wrong = compute_signature_base64("not-the-secret", body);
        let mismatched = process_product_webhook(&config, &dispatcher, Some(&wrong), body).await;
        assert_eq!(mismatched, Err(AuthError::SignatureMismatch));
    }

    #[tokio::test]
    async fn test_malformed_body_processes_zero_variants() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body = b"{not json rfsnadid:1";
        let signature = compute_signature_base64(SECRET, body);

        let summary = process_product_webhook(&config, &dispatcher, Some(&signature), body)
            .await
            .unwrap();

        assert!(summary.decode_failed);
        assert_eq!(summary.variants_seen, 0);
        assert_eq!(summary.triggers_dispatched(), 0);
    }

    #[tokio::test]
    async fn test_declined_and_failed_triggers_do_not_stop_iteration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("affiliate_code=bad"))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("affiliate_code=good"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body = br#"{"variants":[
            {"sku":"a-rfsnadid:bad"},
            {"sku":null},
            {"sku":"b-rfsnadid:"},
            {"sku":"c-rfsnadid:good"}
        ]}"#;
        let signature = compute_signature_base64(SECRET, body);

        let summary = process_product_webhook(&config, &dispatcher, Some(&signature), body)
            .await
            .unwrap();

        assert_eq!(summary.variants_seen, 4);
        assert_eq!(summary.triggers_declined, 1);
        assert_eq!(summary.triggers_accepted, 1);
        assert_eq!(summary.triggers_failed, 0);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_counted_not_raised() {
        let config = config_for("http://127.0.0.1:9/trigger");
        let dispatcher = TriggerDispatcher::new(Client::new(), &config);
        let body = br#"{"variants":[{"sku":"a-rfsnadid:1"},{"sku":"b-rfsnadid:2"}]}"#;
        let signature = compute_signature_base64(SECRET, body);

        let summary = process_product_webhook(&config, &dispatcher, Some(&signature), body)
            .await
            .unwrap();

        assert_eq!(summary.triggers_failed, 2);
    }
}
