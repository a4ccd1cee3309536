//! Dedupe check result types.

use crate::models::{ItemId, ReleaseState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How an incoming item relates to the recorded state for its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// No record exists for the fingerprint.
    None,
    /// A record exists and the item is not limited-edition (or the record
    /// is inconsistent with the item); blocked outright.
    ExactDuplicate,
    /// Limited-edition repeat of an upcoming announcement.
    UpcomingDuplicate,
    /// Limited-edition repeat of a live post.
    LiveDuplicate,
    /// The one legal limited-edition transition: upcoming → live.
    StateTransitionAllowed,
    /// Limited-edition attempt to move live → upcoming.
    BackwardsStateTransition,
}

impl MatchType {
    /// Returns the match type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ExactDuplicate => "exact_duplicate",
            Self::UpcomingDuplicate => "upcoming_duplicate",
            Self::LiveDuplicate => "live_duplicate",
            Self::StateTransitionAllowed => "state_transition_allowed",
            Self::BackwardsStateTransition => "backwards_state_transition",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of an admission check.
///
/// Non-mutating: repeated checks for the same store state return the same
/// outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheck {
    /// Whether admission would be blocked.
    pub is_duplicate: bool,
    /// The item that first claimed the fingerprint, if any record exists.
    pub existing_id: Option<ItemId>,
    /// How the incoming item relates to the recorded state.
    pub match_type: MatchType,
    /// The fingerprint the decision was made against.
    pub fingerprint: String,
    /// Duration of the check in milliseconds.
    pub check_duration_ms: u64,
}

impl DuplicateCheck {
    /// Creates a result admitting a first-seen fingerprint.
    #[must_use]
    pub const fn admissible(fingerprint: String, duration_ms: u64) -> Self {
        Self {
            is_duplicate: false,
            existing_id: None,
            match_type: MatchType::None,
            fingerprint,
            check_duration_ms: duration_ms,
        }
    }

    /// Creates a result admitting the legal upcoming → live transition.
    #[must_use]
    pub const fn transition(fingerprint: String, existing_id: ItemId, duration_ms: u64) -> Self {
        Self {
            is_duplicate: false,
            existing_id: Some(existing_id),
            match_type: MatchType::StateTransitionAllowed,
            fingerprint,
            check_duration_ms: duration_ms,
        }
    }

    /// Creates a blocked result.
    #[must_use]
    pub const fn blocked(
        fingerprint: String,
        existing_id: Option<ItemId>,
        match_type: MatchType,
        duration_ms: u64,
    ) -> Self {
        Self {
            is_duplicate: true,
            existing_id,
            match_type,
            fingerprint,
            check_duration_ms: duration_ms,
        }
    }
}

/// Aggregate statistics for a dedupe store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DedupeStats {
    /// Total successful admissions (transitions count as admissions).
    pub total_items: u64,
    /// Successful admissions of limited-edition items.
    pub limited_edition_items: u64,
    /// Number of fingerprints currently tracked.
    pub product_states: usize,
    /// Tracked fingerprints by current release state.
    pub state_breakdown: HashMap<ReleaseState, usize>,
}

/// Result of a retention cleanup pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupResult {
    /// Records examined.
    pub records_checked: usize,
    /// Records evicted (or that would be, on a dry run).
    pub records_evicted: usize,
    /// Evictions by release state.
    pub by_state: HashMap<ReleaseState, usize>,
    /// Whether this was a dry run (no actual changes made).
    pub dry_run: bool,
    /// Duration of the cleanup pass in milliseconds.
    pub duration_ms: u64,
}
