//! Refersion relay - Shopify product webhooks to affiliate triggers.
//!
//! Merchants embed an affiliate code in a variant SKU (`prod-abc-rfsnadid:12345`).
//! When Shopify reports the product, the relay verifies the webhook, pulls the
//! code out of each SKU and creates a SKU trigger for that affiliate in Refersion.
//!
//! ## Architecture
//!
//! ```text
//! Shopify → web (HMAC check) → pipeline → product::sku → dispatch → Refersion
//! ```

pub mod config;
pub mod dispatch;
pub mod pipeline;
pub mod product;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{DispatchOutcome, TriggerDispatcher};
pub use pipeline::{process_product_webhook, WebhookSummary};
pub use product::{extract_affiliate_code, ProductPayload, Variant};
pub use web::AppState;
