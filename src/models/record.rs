//! Per-fingerprint admission state.

use super::{ItemId, ReleaseState};
use serde::{Deserialize, Serialize};

/// The recorded admission state for one product fingerprint.
///
/// Exactly one record exists per fingerprint. Only `state` and
/// `last_transition` ever mutate, and only on the single legal transition
/// (limited-edition `upcoming` → `live`). `item_id` always names the item
/// that first claimed the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStateRecord {
    /// The fingerprint this record tracks.
    pub fingerprint: String,
    /// Current recorded release state.
    pub state: ReleaseState,
    /// Unix timestamp of first admission.
    pub first_seen: u64,
    /// Unix timestamp of the most recent admission (equals `first_seen`
    /// until a transition occurs). Retention cleanup ages records from
    /// this field, so a drop that just went live is not evicted on its
    /// announcement clock.
    pub last_transition: u64,
    /// The item that first claimed this fingerprint.
    pub item_id: ItemId,
    /// Whether the fingerprint belongs to a limited-edition drop.
    pub limited_edition: bool,
}

impl ProductStateRecord {
    /// Creates a record for a first admission.
    #[must_use]
    pub fn new(
        fingerprint: impl Into<String>,
        state: ReleaseState,
        item_id: ItemId,
        limited_edition: bool,
        now: u64,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            state,
            first_seen: now,
            last_transition: now,
            item_id,
            limited_edition,
        }
    }

    /// Age of the record in seconds, measured from the latest admission.
    #[must_use]
    pub const fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_transition)
    }
}
