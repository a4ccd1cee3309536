//! Curated scoring tables.
//!
//! Hand-maintained lists and weights. Ordering and values are part of the
//! scoring contract: changing them changes every priority in the queue.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Component weight: hype signal.
pub const WEIGHT_HYPE: f64 = 0.30;
/// Component weight: brand tier.
pub const WEIGHT_BRAND: f64 = 0.25;
/// Component weight: recency.
pub const WEIGHT_RECENCY: f64 = 0.20;
/// Component weight: engagement.
pub const WEIGHT_ENGAGEMENT: f64 = 0.15;
/// Component weight: scarcity.
pub const WEIGHT_SCARCITY: f64 = 0.10;

/// Brand tiers with their multipliers, most hyped first.
///
/// Matching is exact and case-insensitive on the normalized brand. The
/// brand component is the tier multiplier normalized to the top tier's.
pub const BRAND_TIERS: &[(&[&str], f64)] = &[
    (&["jordan", "nike", "supreme", "yeezy"], 1.0),
    (&["adidas", "new balance", "sony", "apple", "lego"], 0.8),
    (&["asics", "puma", "reebok", "nvidia", "valve"], 0.6),
];

/// Brand component for a brand missing from every tier.
pub const UNKNOWN_BRAND_SCORE: f64 = 0.3;
/// Brand component when the item has no brand at all.
pub const MISSING_BRAND_SCORE: f64 = 0.2;

/// Recency component for a date string that does not parse.
pub const UNPARSEABLE_DATE_SCORE: f64 = 0.3;
/// Recency component when the item has no release date.
pub const MISSING_DATE_SCORE: f64 = 0.5;

/// Engagement component for storefront-discovery sources.
pub const STOREFRONT_ENGAGEMENT: f64 = 0.6;
/// Engagement component for unknown sources.
pub const UNKNOWN_SOURCE_ENGAGEMENT: f64 = 0.4;

/// Scarcity contribution for limited-edition drops.
pub const LIMITED_EDITION_BONUS: f64 = 0.6;
/// Scarcity contribution per keyword hit in the title.
pub const SCARCITY_KEYWORD_BONUS: f64 = 0.1;
/// Cap on total keyword contribution.
pub const SCARCITY_KEYWORD_CAP: f64 = 0.3;

/// Transition bonus when the dedupe store confirms upcoming → live.
pub const TRANSITION_BONUS_CONFIRMED: f64 = 10.0;
/// Transition bonus from the title heuristic without dedupe context.
pub const TRANSITION_BONUS_HEURISTIC: f64 = 5.0;

/// Source reliability when the source is unknown or missing.
pub const DEFAULT_SOURCE_RELIABILITY: f64 = 0.5;
/// Category multiplier when the category is unknown or missing.
pub const DEFAULT_CATEGORY_MULTIPLIER: f64 = 1.0;

/// Per-source reliability multipliers.
pub static SOURCE_RELIABILITY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("twitter", 0.9),
        ("amazon-movers", 0.85),
        ("reddit", 0.8),
        ("shopify-monitor", 0.75),
        ("rss", 0.7),
    ])
});

/// Sources that are storefront discovery feeds rather than social signal.
pub static STOREFRONT_SOURCES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["amazon-movers", "shopify-monitor"]));

/// Per-category value multipliers.
pub static CATEGORY_MULTIPLIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("electronics", 2.2),
        ("sneakers", 1.8),
        ("collectibles", 1.6),
    ])
});

/// Title keywords that signal scarcity.
pub static SCARCITY_KEYWORDS: &[&str] = &[
    "limited",
    "exclusive",
    "rare",
    "numbered",
    "sold out",
    "last chance",
    "while supplies last",
    "one per customer",
];

/// Title keywords that suggest an upcoming drop just went live.
pub static TRANSITION_KEYWORDS: &[&str] = &[
    "now live",
    "just dropped",
    "available now",
    "in stock now",
    "out now",
    "live now",
];
