//! Product webhook payload types.
//!
//! Only variant SKUs are read. Ids are kept as raw JSON for logging, so an
//! unexpected id shape never rejects an otherwise usable body.

use serde::Deserialize;
use serde_json::Value;

/// Product body of a `products/create` or `products/update` webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPayload {
    /// Shopify product id, whatever JSON type it arrives as
    #[serde(default)]
    pub id: Option<Value>,
    /// Variants in the order Shopify sent them
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A single purchasable variant of a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variant {
    /// Shopify variant id, whatever JSON type it arrives as
    #[serde(default)]
    pub id: Option<Value>,
    /// Stock-keeping unit; Shopify sends `null` when none is set
    #[serde(default)]
    pub sku: Option<String>,
}

impl Variant {
    /// The SKU, with an unset SKU read as empty.
    pub fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or("")
    }
}

/// Decode a raw webhook body into a product.
pub fn decode_product(body: &[u8]) -> Result<ProductPayload, serde_json::Error> {
    serde_json::from_slice(body)
}
