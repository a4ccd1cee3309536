//! The posting queue.

use crate::dedupe::DedupeStore;
use crate::models::{ItemId, ProductItem, ReleaseState};
use crate::current_timestamp;
use crate::scoring::{ProductScore, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;

/// An admitted item awaiting posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    /// The admitted item.
    pub item: ProductItem,
    /// Priority score at admission time.
    pub score: f64,
    /// Score explanation, for the posting layer's logs.
    pub breakdown: ScoreBreakdown,
    /// Unix timestamp of admission.
    pub admitted_at: u64,
    /// Release state the item was admitted under.
    pub state: ReleaseState,
    /// Monotonic admission sequence; breaks score ties first-come-first.
    pub sequence: u64,
}

/// Aggregate statistics for the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    /// Entries currently queued.
    pub total_items: usize,
    /// Queued limited-edition entries.
    pub limited_edition_items: usize,
    /// Queued entries by admitted release state.
    pub state_counts: HashMap<ReleaseState, usize>,
}

/// The ordered, admitted-item collection.
///
/// Never an independent duplication authority: every insert defers to
/// [`DedupeStore::add`], whose single write-lock decide-and-commit is the
/// gate. The queue inserts strictly after that commit succeeds, so a
/// failed commit leaves the queue untouched.
///
/// Ordering: score descending, ties broken by earliest admission.
///
/// # Example
///
/// ```rust
/// use dropgate::{DedupeStore, ProductItem, ProductScorer, QueueManager};
///
/// let store = DedupeStore::new();
/// let scorer = ProductScorer::new();
/// let queue = QueueManager::new();
///
/// let item = ProductItem::new("drop-1").with_title("PS5 Pro").with_brand("Sony");
/// let score = scorer.score_with_store(&item, &store);
///
/// assert!(queue.add_item(&item, score, &store));
/// assert_eq!(queue.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct QueueManager {
    entries: RwLock<Vec<QueueEntry>>,
    sequence: AtomicU64,
}

impl QueueManager {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to admit and enqueue an item.
    ///
    /// Re-checks admission through the dedupe store even when the caller
    /// already gated on [`DedupeStore::is_duplicate`] — callers bypassing
    /// the gate must not be able to double-post. On a duplicate, nothing
    /// mutates and `false` is returned.
    #[instrument(skip(self, item, score, dedupe_store), fields(operation = "queue_add", item_id = %item.id))]
    pub fn add_item(&self, item: &ProductItem, score: ProductScore, dedupe_store: &DedupeStore) -> bool {
        // Advisory pre-check: cheap rejection with a loggable match type.
        let check = dedupe_store.is_duplicate(item);
        if check.is_duplicate {
            tracing::debug!(
                fingerprint = %check.fingerprint,
                match_type = %check.match_type,
                "Rejected at queue gate"
            );
            return false;
        }

        // Authoritative decide-and-commit. A concurrent submitter may win
        // the race between the pre-check and here; only one commit
        // succeeds either way.
        if !dedupe_store.add(item) {
            tracing::debug!(fingerprint = %check.fingerprint, "Lost admission race");
            return false;
        }

        let entry = QueueEntry {
            item: item.clone(),
            score: score.value,
            breakdown: score.breakdown,
            admitted_at: current_timestamp(),
            state: item.effective_release_state(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };

        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!(item_id = %entry.item.id, "Queue lock poisoned, dropping entry");
            return false;
        };

        let position = entries.partition_point(|existing| {
            existing.score > entry.score
                || (existing.score == entry.score && existing.sequence < entry.sequence)
        });
        entries.insert(position, entry);

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("queue_depth").set(entries.len() as f64);
        metrics::counter!("queue_admissions_total").increment(1);
        drop(entries);

        tracing::info!(item_id = %item.id, score = score.value, "Enqueued item");
        true
    }

    /// Returns the queued entries in priority order.
    ///
    /// The posting layer reads from here; removal after an actual
    /// publication is its responsibility, via [`QueueManager::pop_next`]
    /// or [`QueueManager::remove_entry`].
    #[must_use]
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Removes and returns the highest-priority entry.
    #[must_use]
    pub fn pop_next(&self) -> Option<QueueEntry> {
        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!("Queue lock poisoned, nothing popped");
            return None;
        };

        if entries.is_empty() {
            return None;
        }
        let entry = entries.remove(0);

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("queue_depth").set(entries.len() as f64);
        Some(entry)
    }

    /// Removes a specific entry, returning whether it was present.
    pub fn remove_entry(&self, item_id: &ItemId) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            tracing::warn!("Queue lock poisoned, nothing removed");
            return false;
        };

        let before = entries.len();
        entries.retain(|e| &e.item.id != item_id);
        let removed = entries.len() < before;

        if removed {
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!("queue_depth").set(entries.len() as f64);
        }
        removed
    }

    /// Returns aggregate statistics.
    #[must_use]
    pub fn get_queue_stats(&self) -> QueueStats {
        let Ok(entries) = self.entries.read() else {
            return QueueStats::default();
        };

        let mut state_counts = HashMap::new();
        let mut limited = 0;
        for entry in entries.iter() {
            *state_counts.entry(entry.state).or_insert(0) += 1;
            if entry.item.limited_edition {
                limited += 1;
            }
        }

        QueueStats {
            total_items: entries.len(),
            limited_edition_items: limited,
            state_counts,
        }
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
            metrics::gauge!("queue_depth").set(0.0);
        }
    }
}
