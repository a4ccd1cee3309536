//! Deterministic drop identity.
//!
//! Two differently-worded posts about the same physical drop must produce
//! the same fingerprint. Identity is derived from normalized brand +
//! category + a $10 price bucket + a title slug with release-phase wording
//! stripped, hashed with SHA-256. Missing fields degrade to a URL-derived
//! (and finally id-derived) fingerprint; generation never fails.

use crate::models::ProductItem;
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Words that indicate release phase rather than product identity.
///
/// Stripped from title slugs so "Coming Soon" and "Available Now" posts
/// about the same drop collide. Weekday names are included because
/// announcement titles routinely carry the drop day.
static STATE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // release-phase phrasing
        "coming", "soon", "available", "now", "live", "drop", "drops", "dropping", "dropped",
        "release", "released", "releasing", "restock", "restocked", "preorder", "preorders",
        "launches", "launching", "launched", "just", "today", "tomorrow", "tonight", "out",
        "sale", "instock",
        // weekday names
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ]
    .into_iter()
    .collect()
});

/// Width of the price bucket in whole currency units.
///
/// Minor price jitter between retailers collides; genuinely different
/// SKUs do not.
const PRICE_BUCKET_WIDTH: f64 = 10.0;

/// Fingerprint generator for product drops.
///
/// Pure and deterministic: insensitive to field ordering, letter case,
/// whitespace, and release-phase phrasing in the title.
///
/// # Example
///
/// ```rust
/// use dropgate::ProductItem;
/// use dropgate::dedupe::FingerprintGenerator;
///
/// let announce = ProductItem::new("a")
///     .with_title("Jordan 1 - Drops Thursday")
///     .with_brand("Jordan")
///     .with_price(179.0);
/// let live = ProductItem::new("b")
///     .with_title("Jordan 1 - Available Now")
///     .with_brand("JORDAN")
///     .with_price(175.0);
///
/// assert_eq!(
///     FingerprintGenerator::fingerprint(&announce),
///     FingerprintGenerator::fingerprint(&live),
/// );
/// ```
pub struct FingerprintGenerator;

impl FingerprintGenerator {
    /// Computes the fingerprint for an item.
    ///
    /// Returns a lowercase hex SHA-256 digest (64 characters). Missing
    /// brand and title degrade to the URL; a bare item degrades to its ID.
    #[must_use]
    pub fn fingerprint(item: &ProductItem) -> String {
        let brand = item.brand.as_deref().map(Self::normalize);
        let slug = item.title.as_deref().map(Self::title_slug);

        // A slug stripped down to nothing carries no identity.
        let slug = slug.filter(|s| !s.is_empty());

        if brand.is_none() && slug.is_none() {
            return Self::fallback_fingerprint(item);
        }

        let category = item
            .category
            .as_deref()
            .map_or_else(String::new, Self::normalize);
        let canonical = format!(
            "{}|{}|{}|{}",
            brand.unwrap_or_default(),
            category,
            Self::price_bucket(item.price),
            slug.unwrap_or_default(),
        );
        Self::digest(&canonical)
    }

    /// Canonicalizes a title into an identity slug.
    ///
    /// Lowercases, strips punctuation, drops state-indicating words, and
    /// joins the remainder with `-`.
    #[must_use]
    pub fn title_slug(title: &str) -> String {
        title
            .to_lowercase()
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
            })
            .filter(|word| !word.is_empty() && !STATE_WORDS.contains(word.as_str()))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Normalizes a free-form field: trim, lowercase, collapse whitespace.
    #[must_use]
    pub fn normalize(value: &str) -> String {
        value
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Buckets a price into a $10-wide band label.
    ///
    /// Missing, negative, or non-finite prices map to `"none"`.
    #[must_use]
    pub fn price_bucket(price: Option<f64>) -> String {
        match price {
            Some(p) if p.is_finite() && p >= 0.0 => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let bucket = ((p / PRICE_BUCKET_WIDTH).floor() * PRICE_BUCKET_WIDTH) as u64;
                bucket.to_string()
            },
            _ => "none".to_string(),
        }
    }

    /// Fallback identity when neither brand nor title survives
    /// normalization: the URL if present, otherwise the item ID.
    fn fallback_fingerprint(item: &ProductItem) -> String {
        item.url.as_deref().map_or_else(
            || Self::digest(&format!("id|{}", item.id.as_str())),
            |url| Self::digest(&format!("url|{}", Self::normalize(url))),
        )
    }

    fn digest(canonical: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_64_char_hex() {
        let item = ProductItem::new("x").with_title("Jordan 1").with_brand("Jordan");
        let fp = FingerprintGenerator::fingerprint(&item);
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_state_phrasing_collides() {
        let a = ProductItem::new("a")
            .with_title("Jordan 1 - Drops Thursday")
            .with_brand("Jordan");
        let b = ProductItem::new("b")
            .with_title("Jordan 1 - Available Now")
            .with_brand("Jordan");
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let a = ProductItem::new("a")
            .with_title("Jordan 1 Retro")
            .with_brand("  JORDAN ");
        let b = ProductItem::new("b")
            .with_title("jordan   1   retro")
            .with_brand("jordan");
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_price_jitter_collides_within_bucket() {
        let a = ProductItem::new("a")
            .with_title("Jordan 1")
            .with_brand("Jordan")
            .with_price(172.0);
        let b = ProductItem::new("b")
            .with_title("Jordan 1")
            .with_brand("Jordan")
            .with_price(179.99);
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_different_price_bucket_diverges() {
        let a = ProductItem::new("a")
            .with_title("Jordan 1")
            .with_brand("Jordan")
            .with_price(170.0);
        let b = ProductItem::new("b")
            .with_title("Jordan 1")
            .with_brand("Jordan")
            .with_price(250.0);
        assert_ne!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_different_products_diverge() {
        let a = ProductItem::new("a").with_title("Jordan 1").with_brand("Jordan");
        let b = ProductItem::new("b").with_title("Jordan 4").with_brand("Jordan");
        assert_ne!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_missing_brand_and_title_uses_url() {
        let a = ProductItem::new("a").with_url("https://shop.example/p/123");
        let b = ProductItem::new("b").with_url("HTTPS://SHOP.EXAMPLE/P/123");
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_bare_item_uses_id_and_never_panics() {
        let a = ProductItem::new("only-id");
        let fp = FingerprintGenerator::fingerprint(&a);
        assert_eq!(fp.len(), 64);

        // Distinct bare items do not collide.
        let b = ProductItem::new("other-id");
        assert_ne!(fp, FingerprintGenerator::fingerprint(&b));
    }

    #[test]
    fn test_title_made_entirely_of_state_words_degrades() {
        // "Drops Thursday" strips to nothing; the URL takes over.
        let a = ProductItem::new("a")
            .with_title("Drops Thursday")
            .with_url("https://shop.example/p/9");
        let b = ProductItem::new("b")
            .with_title("Available Now")
            .with_url("https://shop.example/p/9");
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }

    #[test]
    fn test_title_slug_strips_punctuation_and_state_words() {
        assert_eq!(
            FingerprintGenerator::title_slug("Jordan 1 - Drops Thursday!"),
            "jordan-1"
        );
        assert_eq!(
            FingerprintGenerator::title_slug("PS5 Pro: Available Now"),
            "ps5-pro"
        );
    }

    #[test]
    fn test_price_bucket_edges() {
        assert_eq!(FingerprintGenerator::price_bucket(Some(0.0)), "0");
        assert_eq!(FingerprintGenerator::price_bucket(Some(9.99)), "0");
        assert_eq!(FingerprintGenerator::price_bucket(Some(10.0)), "10");
        assert_eq!(FingerprintGenerator::price_bucket(Some(199.5)), "190");
        assert_eq!(FingerprintGenerator::price_bucket(None), "none");
        assert_eq!(FingerprintGenerator::price_bucket(Some(f64::NAN)), "none");
        assert_eq!(FingerprintGenerator::price_bucket(Some(-5.0)), "none");
    }

    #[test]
    fn test_brand_only_item_fingerprints() {
        // Brand without title still carries identity (no URL fallback).
        let a = ProductItem::new("a").with_brand("Nike").with_url("https://x");
        let b = ProductItem::new("b").with_brand("Nike").with_url("https://y");
        assert_eq!(
            FingerprintGenerator::fingerprint(&a),
            FingerprintGenerator::fingerprint(&b)
        );
    }
}
