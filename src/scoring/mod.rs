//! Priority scoring for admitted product drops.
//!
//! Five weighted components (hype, brand tier, recency, engagement,
//! scarcity) produce a base in [0, 1]; source-reliability and
//! category-value multipliers scale it to [0, 100]; a state-transition
//! bonus rewards catching the moment a tracked upcoming drop goes live.
//! Every score comes with a full breakdown.

mod breakdown;
pub mod constants;
mod scorer;

pub use breakdown::{ProductScore, ScoreBreakdown, ScoredItem};
pub use scorer::ProductScorer;
