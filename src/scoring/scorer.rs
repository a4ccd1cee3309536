//! Weighted priority scoring.
//!
//! Pure and stateless: the same item yields the same score on every
//! call, so batches may be scored from any number of threads without
//! locking. The only external read is the optional dedupe-store lookup
//! behind the state-transition bonus.

use crate::dedupe::{DedupeStore, FingerprintGenerator};
use crate::models::{ProductItem, ReleaseState, StockStatus};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::time::Instant;

use super::breakdown::{ProductScore, ScoreBreakdown, ScoredItem};
use super::constants::{
    BRAND_TIERS, CATEGORY_MULTIPLIERS, DEFAULT_CATEGORY_MULTIPLIER, DEFAULT_SOURCE_RELIABILITY,
    LIMITED_EDITION_BONUS, MISSING_BRAND_SCORE, MISSING_DATE_SCORE, SCARCITY_KEYWORD_BONUS,
    SCARCITY_KEYWORD_CAP, SCARCITY_KEYWORDS, SOURCE_RELIABILITY, STOREFRONT_ENGAGEMENT,
    STOREFRONT_SOURCES, TRANSITION_BONUS_CONFIRMED, TRANSITION_BONUS_HEURISTIC,
    TRANSITION_KEYWORDS, UNKNOWN_BRAND_SCORE, UNKNOWN_SOURCE_ENGAGEMENT, UNPARSEABLE_DATE_SCORE,
    WEIGHT_BRAND, WEIGHT_ENGAGEMENT, WEIGHT_HYPE, WEIGHT_RECENCY, WEIGHT_SCARCITY,
};

/// Priority scorer for product items.
///
/// Produces a score in [0, 100] plus a full [`ScoreBreakdown`]. Scoring
/// never fails outward: any internal error is converted into a zero
/// score with the reason recorded in the breakdown.
///
/// # Example
///
/// ```rust
/// use dropgate::{ProductItem, ProductScorer};
///
/// let scorer = ProductScorer::new();
/// let item = ProductItem::new("drop-1")
///     .with_title("Jordan 1 Retro")
///     .with_brand("Jordan")
///     .with_category("sneakers")
///     .with_hype_score(80.0)
///     .with_source("twitter");
///
/// let score = scorer.score(&item);
/// assert!(score.value >= 0.0 && score.value <= 100.0);
/// assert!(score.breakdown.error.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductScorer;

impl ProductScorer {
    /// Creates a scorer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scores an item without dedupe context.
    ///
    /// The state-transition bonus falls back to the title heuristic.
    #[must_use]
    pub fn score(&self, item: &ProductItem) -> ProductScore {
        self.score_inner(item, None)
    }

    /// Scores an item with dedupe context.
    ///
    /// A fingerprint whose recorded state is still `upcoming` earns the
    /// full transition bonus when the incoming item is live.
    #[must_use]
    pub fn score_with_store(&self, item: &ProductItem, store: &DedupeStore) -> ProductScore {
        self.score_inner(item, Some(store))
    }

    /// Scores a batch, returning items sorted by score descending.
    ///
    /// The sort is stable: ties keep their original insertion order.
    #[must_use]
    pub fn score_batch(&self, items: &[ProductItem]) -> Vec<ScoredItem> {
        let mut scored: Vec<ScoredItem> = items
            .iter()
            .map(|item| ScoredItem {
                item: item.clone(),
                score: self.score(item),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .value
                .partial_cmp(&a.score.value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }

    #[allow(clippy::cast_possible_truncation)]
    fn score_inner(&self, item: &ProductItem, store: Option<&DedupeStore>) -> ProductScore {
        let start = Instant::now();
        let result = Self::try_score(item, store).unwrap_or_else(|e| {
            tracing::warn!(item_id = %item.id, error = %e, "Scoring failed, returning zero");
            ProductScore::failed(e.to_string())
        });

        metrics::histogram!("scoring_duration_ms").record(start.elapsed().as_millis() as f64);
        result
    }

    fn try_score(item: &ProductItem, store: Option<&DedupeStore>) -> Result<ProductScore> {
        let hype = (item.hype_score.unwrap_or(0.0) / 100.0).clamp(0.0, 1.0);
        let brand_tier = Self::brand_component(item.brand.as_deref());
        let recency = Self::recency_component(item.release_date.as_deref());
        let engagement = Self::engagement_component(item);
        let scarcity = Self::scarcity_component(item);

        let weighted_base = hype * WEIGHT_HYPE
            + brand_tier * WEIGHT_BRAND
            + recency * WEIGHT_RECENCY
            + engagement * WEIGHT_ENGAGEMENT
            + scarcity * WEIGHT_SCARCITY;

        let source_reliability = Self::source_reliability(item.source.as_deref());
        let category_multiplier = Self::category_multiplier(item.category.as_deref());
        let transition_bonus = Self::transition_bonus(item, store);

        let raw = weighted_base * source_reliability * category_multiplier * 100.0;
        let final_score = Self::round2((raw + transition_bonus).clamp(0.0, 100.0));

        if !final_score.is_finite() {
            return Err(Error::InvalidInput(
                "non-finite score from item fields".to_string(),
            ));
        }

        Ok(ProductScore {
            value: final_score,
            breakdown: ScoreBreakdown {
                hype,
                brand_tier,
                recency,
                engagement,
                scarcity,
                weighted_base,
                source_reliability,
                category_multiplier,
                transition_bonus,
                final_score,
                error: None,
            },
        })
    }

    /// Brand tier, normalized to the top tier's multiplier.
    fn brand_component(brand: Option<&str>) -> f64 {
        let Some(brand) = brand else {
            return MISSING_BRAND_SCORE;
        };

        let normalized = FingerprintGenerator::normalize(brand);
        let (_, top_multiplier) = BRAND_TIERS[0];
        for (brands, multiplier) in BRAND_TIERS {
            if brands.contains(&normalized.as_str()) {
                return multiplier / top_multiplier;
            }
        }
        UNKNOWN_BRAND_SCORE
    }

    /// Exponential freshness decay: `exp(-0.1 * age_hours)`.
    fn recency_component(release_date: Option<&str>) -> f64 {
        let Some(raw) = release_date else {
            return MISSING_DATE_SCORE;
        };

        let Some(parsed) = Self::parse_release_date(raw) else {
            return UNPARSEABLE_DATE_SCORE;
        };

        #[allow(clippy::cast_precision_loss)]
        let age_hours = (Utc::now() - parsed).num_seconds() as f64 / 3600.0;
        (-0.1 * age_hours).exp().clamp(0.0, 1.0)
    }

    /// Parses RFC 3339, then `%Y-%m-%d %H:%M:%S`, then bare `%Y-%m-%d`.
    fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
        None
    }

    /// Source-specific engagement signal.
    fn engagement_component(item: &ProductItem) -> f64 {
        let Some(source) = item.source.as_deref() else {
            return UNKNOWN_SOURCE_ENGAGEMENT;
        };
        let source = FingerprintGenerator::normalize(source);

        match source.as_str() {
            "twitter" | "x" => {
                let engagement = item.meta_f64("engagement").unwrap_or(0.0).max(0.0);
                ((engagement + 1.0).log10() / 4.0).clamp(0.0, 1.0)
            },
            "reddit" => {
                // Each term clamps on its own, so runaway velocity cannot
                // mask zero upvotes.
                let upvotes = (item.meta_f64("upvotes").unwrap_or(0.0).max(0.0) / 500.0)
                    .clamp(0.0, 1.0);
                let velocity = (item.meta_f64("velocity").unwrap_or(0.0).max(0.0) / 100.0)
                    .clamp(0.0, 1.0);
                (upvotes + velocity) / 2.0
            },
            s if STOREFRONT_SOURCES.contains(s) => STOREFRONT_ENGAGEMENT,
            _ => UNKNOWN_SOURCE_ENGAGEMENT,
        }
    }

    /// Limited flag + stock level + title keywords, clamped to [0, 1].
    fn scarcity_component(item: &ProductItem) -> f64 {
        let mut score = 0.0;

        if item.limited_edition {
            score += LIMITED_EDITION_BONUS;
        }

        score += match item.effective_stock_status() {
            StockStatus::Low => 0.3,
            StockStatus::InStock => 0.2,
            StockStatus::OutOfStock => 0.1,
            StockStatus::Unknown => 0.0,
        };

        if let Some(title) = item.title.as_deref() {
            let lowered = title.to_lowercase();
            let hits = SCARCITY_KEYWORDS
                .iter()
                .filter(|kw| lowered.contains(*kw))
                .count();
            #[allow(clippy::cast_precision_loss)]
            let keyword_score = (hits as f64 * SCARCITY_KEYWORD_BONUS).min(SCARCITY_KEYWORD_CAP);
            score += keyword_score;
        }

        score.clamp(0.0, 1.0)
    }

    fn source_reliability(source: Option<&str>) -> f64 {
        source
            .map(|s| FingerprintGenerator::normalize(s))
            .and_then(|s| SOURCE_RELIABILITY.get(s.as_str()).copied())
            .unwrap_or(DEFAULT_SOURCE_RELIABILITY)
    }

    fn category_multiplier(category: Option<&str>) -> f64 {
        category
            .map(|c| FingerprintGenerator::normalize(c))
            .and_then(|c| CATEGORY_MULTIPLIERS.get(c.as_str()).copied())
            .unwrap_or(DEFAULT_CATEGORY_MULTIPLIER)
    }

    /// State-transition bonus: rewards catching the moment a tracked
    /// upcoming drop goes live.
    ///
    /// - Full bonus when the dedupe store still records `upcoming` for
    ///   this fingerprint
    /// - Half bonus when no dedupe context is available but the title
    ///   reads like a transition announcement
    /// - Zero otherwise
    fn transition_bonus(item: &ProductItem, store: Option<&DedupeStore>) -> f64 {
        if !item.limited_edition || item.effective_release_state() != ReleaseState::Live {
            return 0.0;
        }

        match store {
            Some(store) => {
                if store.recorded_state(item) == Some(ReleaseState::Upcoming) {
                    TRANSITION_BONUS_CONFIRMED
                } else {
                    0.0
                }
            },
            None => {
                let title = item.title.as_deref().unwrap_or_default().to_lowercase();
                if TRANSITION_KEYWORDS.iter().any(|kw| title.contains(kw)) {
                    TRANSITION_BONUS_HEURISTIC
                } else {
                    0.0
                }
            },
        }
    }

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn base_item() -> ProductItem {
        ProductItem::new("drop-1")
            .with_title("Jordan 1 Retro High OG")
            .with_brand("Jordan")
            .with_category("sneakers")
            .with_hype_score(80.0)
            .with_source("twitter")
            .with_meta("engagement", 500)
    }

    #[test]
    fn test_score_in_bounds() {
        let scorer = ProductScorer::new();
        let score = scorer.score(&base_item());
        assert!(score.value >= 0.0);
        assert!(score.value <= 100.0);
        assert!(score.breakdown.error.is_none());
    }

    #[test]
    fn test_score_deterministic() {
        let scorer = ProductScorer::new();
        let item = base_item();
        let first = scorer.score(&item);
        for _ in 0..10 {
            assert!(approx_eq(scorer.score(&item).value, first.value));
        }
    }

    #[test]
    fn test_empty_item_scores_without_error() {
        let scorer = ProductScorer::new();
        let score = scorer.score(&ProductItem::new("bare"));
        assert!(score.breakdown.error.is_none());
        assert!(score.value >= 0.0);
        // Missing-field defaults: brand 0.2, date 0.5, source 0.4.
        assert!(approx_eq(score.breakdown.brand_tier, 0.2));
        assert!(approx_eq(score.breakdown.recency, 0.5));
        assert!(approx_eq(score.breakdown.engagement, 0.4));
    }

    #[test]
    fn test_brand_tiers() {
        assert!(approx_eq(ProductScorer::brand_component(Some("Jordan")), 1.0));
        assert!(approx_eq(ProductScorer::brand_component(Some("ADIDAS")), 0.8));
        assert!(approx_eq(ProductScorer::brand_component(Some("puma")), 0.6));
        assert!(approx_eq(
            ProductScorer::brand_component(Some("no-name brand")),
            UNKNOWN_BRAND_SCORE
        ));
        assert!(approx_eq(
            ProductScorer::brand_component(None),
            MISSING_BRAND_SCORE
        ));
    }

    #[test]
    fn test_recency_defaults() {
        assert!(approx_eq(
            ProductScorer::recency_component(None),
            MISSING_DATE_SCORE
        ));
        assert!(approx_eq(
            ProductScorer::recency_component(Some("not a date")),
            UNPARSEABLE_DATE_SCORE
        ));
    }

    #[test]
    fn test_recency_decay() {
        let now = Utc::now().to_rfc3339();
        let fresh = ProductScorer::recency_component(Some(&now));
        assert!(fresh > 0.99);

        let day_old = (Utc::now() - Duration::hours(24)).to_rfc3339();
        let stale = ProductScorer::recency_component(Some(&day_old));
        // exp(-2.4) ≈ 0.0907
        assert!(stale < 0.1);
        assert!(stale > 0.05);

        // Future dates clamp to 1.0 rather than exceeding it.
        let future = (Utc::now() + Duration::hours(48)).to_rfc3339();
        assert!(approx_eq(ProductScorer::recency_component(Some(&future)), 1.0));
    }

    #[test]
    fn test_recency_accepts_plain_formats() {
        assert!(ProductScorer::parse_release_date("2026-08-01 10:30:00").is_some());
        assert!(ProductScorer::parse_release_date("2026-08-01").is_some());
        assert!(ProductScorer::parse_release_date("August 1st").is_none());
    }

    #[test]
    fn test_twitter_engagement_log_curve() {
        let item = ProductItem::new("x")
            .with_source("twitter")
            .with_meta("engagement", 9_999);
        // log10(10000) / 4 = 1.0
        assert!(approx_eq(ProductScorer::engagement_component(&item), 1.0));

        let quiet = ProductItem::new("y").with_source("twitter");
        // log10(1) / 4 = 0.0
        assert!(approx_eq(ProductScorer::engagement_component(&quiet), 0.0));
    }

    #[test]
    fn test_reddit_engagement_averages_clamped_terms() {
        let item = ProductItem::new("x")
            .with_source("reddit")
            .with_meta("upvotes", 250)
            .with_meta("velocity", 50);
        // (0.5 + 0.5) / 2
        assert!(approx_eq(ProductScorer::engagement_component(&item), 0.5));

        // Velocity far past its cap cannot exceed 0.5 alone.
        let viral = ProductItem::new("y")
            .with_source("reddit")
            .with_meta("velocity", 100_000);
        assert!(approx_eq(ProductScorer::engagement_component(&viral), 0.5));
    }

    #[test]
    fn test_storefront_and_unknown_engagement() {
        let storefront = ProductItem::new("x").with_source("amazon-movers");
        assert!(approx_eq(
            ProductScorer::engagement_component(&storefront),
            STOREFRONT_ENGAGEMENT
        ));

        let unknown = ProductItem::new("y").with_source("carrier-pigeon");
        assert!(approx_eq(
            ProductScorer::engagement_component(&unknown),
            UNKNOWN_SOURCE_ENGAGEMENT
        ));
    }

    #[test]
    fn test_scarcity_sums_and_clamps() {
        let item = ProductItem::new("x")
            .with_title("Limited exclusive rare numbered drop")
            .with_limited_edition(true)
            .with_stock_status("low");
        // 0.6 + 0.3 + capped 0.3 = 1.2 → clamped to 1.0
        assert!(approx_eq(ProductScorer::scarcity_component(&item), 1.0));

        let plain = ProductItem::new("y").with_title("Ordinary thing");
        assert!(approx_eq(ProductScorer::scarcity_component(&plain), 0.0));
    }

    #[test]
    fn test_multiplier_lookups() {
        assert!(approx_eq(ProductScorer::source_reliability(Some("twitter")), 0.9));
        assert!(approx_eq(
            ProductScorer::source_reliability(Some("somewhere-new")),
            DEFAULT_SOURCE_RELIABILITY
        ));
        assert!(approx_eq(ProductScorer::source_reliability(None), 0.5));

        assert!(approx_eq(
            ProductScorer::category_multiplier(Some("electronics")),
            2.2
        ));
        assert!(approx_eq(
            ProductScorer::category_multiplier(Some("gardening")),
            DEFAULT_CATEGORY_MULTIPLIER
        ));
    }

    #[test]
    fn test_transition_bonus_with_store_context() {
        let scorer = ProductScorer::new();
        let store = DedupeStore::new();

        let upcoming = ProductItem::new("a")
            .with_title("Jordan 1 - Drops Thursday")
            .with_brand("Jordan")
            .with_limited_edition(true)
            .with_release_state("upcoming");
        assert!(store.add(&upcoming));

        let live = ProductItem::new("b")
            .with_title("Jordan 1 - Available Now")
            .with_brand("Jordan")
            .with_limited_edition(true)
            .with_release_state("live");

        let with_context = scorer.score_with_store(&live, &store);
        let without_context = scorer.score(&live);

        assert!(approx_eq(with_context.breakdown.transition_bonus, 10.0));
        assert!(with_context.value > without_context.value);
    }

    #[test]
    fn test_transition_bonus_heuristic_without_store() {
        let live = ProductItem::new("b")
            .with_title("Jordan 1 just dropped")
            .with_brand("Jordan")
            .with_limited_edition(true)
            .with_release_state("live");

        assert!(approx_eq(
            ProductScorer::transition_bonus(&live, None),
            TRANSITION_BONUS_HEURISTIC
        ));
    }

    #[test]
    fn test_transition_bonus_zero_cases() {
        let store = DedupeStore::new();

        // Not limited-edition.
        let plain = ProductItem::new("a")
            .with_title("Gadget now live")
            .with_release_state("live");
        assert!(approx_eq(ProductScorer::transition_bonus(&plain, None), 0.0));

        // Upcoming, not live.
        let upcoming = ProductItem::new("b")
            .with_title("Jordan 1 now live")
            .with_limited_edition(true)
            .with_release_state("upcoming");
        assert!(approx_eq(
            ProductScorer::transition_bonus(&upcoming, None),
            0.0
        ));

        // Store context present but no upcoming record: heuristic does
        // not apply.
        let live = ProductItem::new("c")
            .with_title("Jordan 1 just dropped")
            .with_brand("Jordan")
            .with_limited_edition(true)
            .with_release_state("live");
        assert!(approx_eq(
            ProductScorer::transition_bonus(&live, Some(&store)),
            0.0
        ));
    }

    #[test]
    fn test_score_rounded_to_two_decimals() {
        let scorer = ProductScorer::new();
        let score = scorer.score(&base_item());
        assert!(approx_eq(score.value, ProductScorer::round2(score.value)));
    }

    #[test]
    fn test_non_finite_input_yields_zero_with_error() {
        let scorer = ProductScorer::new();
        let item = base_item().with_hype_score(f64::NAN);

        let score = scorer.score(&item);
        assert!(approx_eq(score.value, 0.0));
        assert!(score.breakdown.error.is_some());
    }

    #[test]
    fn test_score_batch_sorted_descending_stable() {
        let scorer = ProductScorer::new();

        let hot = base_item();
        let mild = ProductItem::new("mild").with_brand("puma").with_category("sneakers");
        // Two identical items tie; insertion order must hold.
        let twin_a = ProductItem::new("twin-a").with_brand("Sony");
        let twin_b = ProductItem::new("twin-b").with_brand("Sony");

        let batch = vec![twin_a, mild, hot, twin_b];
        let ranked = scorer.score_batch(&batch);

        assert_eq!(ranked[0].item.id.as_str(), "drop-1");
        for pair in ranked.windows(2) {
            assert!(pair[0].score.value >= pair[1].score.value);
        }

        let a_pos = ranked.iter().position(|s| s.item.id.as_str() == "twin-a").unwrap();
        let b_pos = ranked.iter().position(|s| s.item.id.as_str() == "twin-b").unwrap();
        assert!(a_pos < b_pos, "stable sort must preserve tie order");
    }
}
