//! Score result types.

use crate::models::ProductItem;
use serde::{Deserialize, Serialize};

/// Per-component explanation of a priority score.
///
/// Transient: recomputed on every scoring call and never persisted by
/// this crate. The posting layer serializes it alongside each queue
/// entry for operator visibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Hype component in [0, 1].
    pub hype: f64,
    /// Brand tier component in [0, 1].
    pub brand_tier: f64,
    /// Recency component in [0, 1].
    pub recency: f64,
    /// Engagement component in [0, 1].
    pub engagement: f64,
    /// Scarcity component in [0, 1].
    pub scarcity: f64,
    /// Weighted sum of the five components.
    pub weighted_base: f64,
    /// Source reliability multiplier applied.
    pub source_reliability: f64,
    /// Category value multiplier applied.
    pub category_multiplier: f64,
    /// State-transition bonus applied (0, 5, or 10).
    pub transition_bonus: f64,
    /// Final clamped, rounded score in [0, 100].
    pub final_score: f64,
    /// Present when scoring failed; the score is 0.0 in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreBreakdown {
    /// Creates the breakdown for a failed scoring attempt.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// A priority score with its explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductScore {
    /// The score in [0, 100], rounded to 2 decimals.
    pub value: f64,
    /// How the score was assembled.
    pub breakdown: ScoreBreakdown,
}

impl ProductScore {
    /// The zero score produced when scoring fails.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            value: 0.0,
            breakdown: ScoreBreakdown::failed(reason),
        }
    }
}

/// An item paired with its score, as returned by batch scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    /// The scored item.
    pub item: ProductItem,
    /// Its score and breakdown.
    pub score: ProductScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_breakdown_zeroes_components() {
        let breakdown = ScoreBreakdown::failed("boom");
        assert_eq!(breakdown.error.as_deref(), Some("boom"));
        assert!(breakdown.final_score.abs() < f64::EPSILON);
        assert!(breakdown.weighted_base.abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_score_is_zero() {
        let score = ProductScore::failed("boom");
        assert!(score.value.abs() < f64::EPSILON);
        assert!(score.breakdown.error.is_some());
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let json = serde_json::to_string(&ScoreBreakdown::default()).unwrap();
        assert!(!json.contains("error"));
    }
}
