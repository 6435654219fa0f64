//! Affiliate code extraction from variant SKUs.
//!
//! Merchants tag a variant by appending the marker and the affiliate code to the
//! SKU, e.g. `prod-abc-rfsnadid:12345`.

/// Substring that marks a SKU as carrying an affiliate code.
pub const AFFILIATE_MARKER: &str = "rfsnadid:";

/// Separator between SKU segments.
pub const SKU_DELIMITER: char = ':';

/// Extract the affiliate code from a SKU.
///
/// The marker only gates extraction. The code is always the last `:` segment,
/// so colons earlier in the SKU (a region, a product code) are tolerated.
/// An empty final segment counts as no code. The code is not validated.
///
/// For "prod-abc-rfsnadid:region:99", returns Some("99").
/// For "prod-abc-no-marker", returns None.
pub fn extract_affiliate_code(sku: &str) -> Option<&str> {
    if !sku.contains(AFFILIATE_MARKER) {
        return None;
    }

    sku.rsplit(SKU_DELIMITER)
        .next()
        .filter(|code| !code.is_empty())
}
