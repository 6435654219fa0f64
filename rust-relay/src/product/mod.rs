//! Shopify product payloads and SKU affiliate extraction.
//!
//! ## Processing Flow
//!
//! ```text
//! raw body → decode_product() → ProductPayload → Variant.sku → extract_affiliate_code()
//! ```

pub mod sku;
pub mod types;

pub use sku::{extract_affiliate_code, AFFILIATE_MARKER, SKU_DELIMITER};
pub use types::{decode_product, ProductPayload, Variant};
