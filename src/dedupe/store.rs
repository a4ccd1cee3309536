//! The admission authority.
//!
//! `DedupeStore` owns the fingerprint → state map and is the only
//! component allowed to decide admission. The scorer and the queue
//! consult it; neither owns it.
//!
//! # Decision table (limited-edition items)
//!
//! | prior state | incoming state | result |
//! |---|---|---|
//! | none | upcoming | allowed |
//! | none | live | allowed |
//! | upcoming | upcoming | blocked (`upcoming_duplicate`) |
//! | upcoming | live | allowed (`state_transition_allowed`) |
//! | live | live | blocked (`live_duplicate`) |
//! | live | upcoming | blocked (`backwards_state_transition`) |
//!
//! Non-limited items: any prior record blocks, regardless of state.
//!
//! # Thread Safety
//!
//! The map and its admission counters live under a single `RwLock`.
//! [`DedupeStore::add`] takes the write lock once and performs
//! decide-and-commit inside that one critical section, so two
//! near-simultaneous submissions of the same fingerprint+state yield
//! exactly one success. Cleanup takes the same lock and can never evict a
//! record mid-decision.
//!
//! # Lock Poisoning
//!
//! Handled fail-closed: a poisoned lock denies admission and reports
//! duplicates. A false block costs one missed post; a false admit costs a
//! double post, which is the failure this store exists to prevent.

use crate::models::{ProductItem, ProductStateRecord, ReleaseState};
use crate::{Result, current_timestamp};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;
use tracing::instrument;

use super::config::RetentionPolicy;
use super::fingerprint::FingerprintGenerator;
use super::snapshot::{DedupeSnapshot, SNAPSHOT_VERSION};
use super::types::{CleanupResult, DedupeStats, DuplicateCheck, MatchType};

/// Map plus counters, guarded together so admission and bookkeeping
/// cannot diverge.
#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<String, ProductStateRecord>,
    total_admitted: u64,
    limited_admitted: u64,
}

/// Outcome of the shared decision function.
enum Decision {
    Admit { transition: bool },
    Block { match_type: MatchType },
}

/// The fingerprint → state map and sole authority on admission.
///
/// Explicitly constructed and passed by reference; there is no hidden
/// process-wide instance.
///
/// # Example
///
/// ```rust
/// use dropgate::{DedupeStore, MatchType, ProductItem};
///
/// let store = DedupeStore::new();
/// let item = ProductItem::new("drop-1")
///     .with_title("Jordan 1 - Drops Thursday")
///     .with_brand("Jordan")
///     .with_limited_edition(true)
///     .with_release_state("upcoming");
///
/// assert!(store.add(&item));
///
/// let repeat = store.is_duplicate(&item);
/// assert!(repeat.is_duplicate);
/// assert_eq!(repeat.match_type, MatchType::UpcomingDuplicate);
/// ```
#[derive(Debug, Default)]
pub struct DedupeStore {
    inner: RwLock<StoreInner>,
}

impl DedupeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the admission rule to a recorded state and an incoming
    /// item. Pure; called under whichever lock the caller holds.
    fn decide(
        record: Option<&ProductStateRecord>,
        incoming: ReleaseState,
        limited_edition: bool,
    ) -> Decision {
        let Some(record) = record else {
            return Decision::Admit { transition: false };
        };

        // A record whose limited flag disagrees with the incoming item is
        // inconsistent; fail closed rather than risk a double post.
        if record.limited_edition != limited_edition || !limited_edition {
            return Decision::Block {
                match_type: MatchType::ExactDuplicate,
            };
        }

        match (record.state, incoming) {
            (ReleaseState::Upcoming, ReleaseState::Live) => Decision::Admit { transition: true },
            (ReleaseState::Upcoming, ReleaseState::Upcoming) => Decision::Block {
                match_type: MatchType::UpcomingDuplicate,
            },
            (ReleaseState::Live, ReleaseState::Live) => Decision::Block {
                match_type: MatchType::LiveDuplicate,
            },
            (ReleaseState::Live, ReleaseState::Upcoming) => Decision::Block {
                match_type: MatchType::BackwardsStateTransition,
            },
        }
    }

    /// Checks whether an item would be admitted, without mutating.
    ///
    /// Idempotent: repeated calls against the same store state return the
    /// same outcome. The authoritative decision is re-made inside
    /// [`DedupeStore::add`]; this read path exists for gating and
    /// observability.
    #[allow(clippy::cast_possible_truncation)]
    #[instrument(skip(self, item), fields(operation = "dedupe_check", item_id = %item.id))]
    pub fn is_duplicate(&self, item: &ProductItem) -> DuplicateCheck {
        let start = Instant::now();
        let fingerprint = FingerprintGenerator::fingerprint(item);
        let incoming = item.effective_release_state();

        let Ok(inner) = self.inner.read() else {
            tracing::warn!(fingerprint = %fingerprint, "Dedupe store lock poisoned, failing closed");
            return DuplicateCheck::blocked(
                fingerprint,
                None,
                MatchType::ExactDuplicate,
                start.elapsed().as_millis() as u64,
            );
        };

        let record = inner.records.get(&fingerprint);
        let existing_id = record.map(|r| r.item_id.clone());
        let decision = Self::decide(record, incoming, item.limited_edition);
        drop(inner);

        let duration_ms = start.elapsed().as_millis() as u64;
        metrics::counter!("dedupe_checks_total").increment(1);

        match decision {
            Decision::Admit { transition: false } => {
                tracing::debug!(fingerprint = %fingerprint, "No prior record, admissible");
                DuplicateCheck::admissible(fingerprint, duration_ms)
            },
            Decision::Admit { transition: true } => {
                tracing::debug!(
                    fingerprint = %fingerprint,
                    "Upcoming record found, live transition admissible"
                );
                DuplicateCheck::transition(
                    fingerprint,
                    existing_id.unwrap_or_else(|| item.id.clone()),
                    duration_ms,
                )
            },
            Decision::Block { match_type } => {
                tracing::debug!(
                    fingerprint = %fingerprint,
                    match_type = %match_type,
                    "Duplicate"
                );
                metrics::counter!(
                    "dedupe_duplicates_total",
                    "match_type" => match_type.as_str()
                )
                .increment(1);
                DuplicateCheck::blocked(fingerprint, existing_id, match_type, duration_ms)
            },
        }
    }

    /// Attempts to admit an item, committing its record on success.
    ///
    /// Decide-and-commit happens inside one write-lock critical section;
    /// there is no window between the check and the mutation. Returns
    /// `false` without mutating anything when the item is a duplicate.
    #[instrument(skip(self, item), fields(operation = "dedupe_add", item_id = %item.id))]
    pub fn add(&self, item: &ProductItem) -> bool {
        let fingerprint = FingerprintGenerator::fingerprint(item);
        let incoming = item.effective_release_state();

        let Ok(mut inner) = self.inner.write() else {
            tracing::warn!(fingerprint = %fingerprint, "Dedupe store lock poisoned, denying admission");
            return false;
        };

        match Self::decide(inner.records.get(&fingerprint), incoming, item.limited_edition) {
            Decision::Block { match_type } => {
                tracing::debug!(
                    fingerprint = %fingerprint,
                    match_type = %match_type,
                    "Admission denied"
                );
                false
            },
            Decision::Admit { transition } => {
                let now = current_timestamp();
                if transition {
                    if let Some(record) = inner.records.get_mut(&fingerprint) {
                        record.state = incoming;
                        record.last_transition = now;
                        tracing::info!(
                            fingerprint = %fingerprint,
                            first_item = %record.item_id,
                            "Recorded upcoming → live transition"
                        );
                    }
                } else {
                    inner.records.insert(
                        fingerprint.clone(),
                        ProductStateRecord::new(
                            fingerprint.clone(),
                            incoming,
                            item.id.clone(),
                            item.limited_edition,
                            now,
                        ),
                    );
                    tracing::info!(
                        fingerprint = %fingerprint,
                        state = %incoming,
                        "Recorded first admission"
                    );
                }

                inner.total_admitted += 1;
                if item.limited_edition {
                    inner.limited_admitted += 1;
                }

                #[allow(clippy::cast_precision_loss)]
                metrics::gauge!("dedupe_tracked_fingerprints").set(inner.records.len() as f64);
                true
            },
        }
    }

    /// Returns the recorded release state for an item's fingerprint, if
    /// any. Read hook used by the scorer's transition bonus.
    #[must_use]
    pub fn recorded_state(&self, item: &ProductItem) -> Option<ReleaseState> {
        let fingerprint = FingerprintGenerator::fingerprint(item);
        self.recorded_state_for(&fingerprint)
    }

    /// Returns the recorded release state for a fingerprint, if any.
    #[must_use]
    pub fn recorded_state_for(&self, fingerprint: &str) -> Option<ReleaseState> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.records.get(fingerprint).map(|r| r.state))
    }

    /// Returns aggregate statistics.
    #[must_use]
    pub fn get_stats(&self) -> DedupeStats {
        let Ok(inner) = self.inner.read() else {
            return DedupeStats::default();
        };

        let mut state_breakdown = HashMap::new();
        for record in inner.records.values() {
            *state_breakdown.entry(record.state).or_insert(0) += 1;
        }

        DedupeStats {
            total_items: inner.total_admitted,
            limited_edition_items: inner.limited_admitted,
            product_states: inner.records.len(),
            state_breakdown,
        }
    }

    /// Evicts records older than their effective retention.
    ///
    /// Limited-edition records use the extended retention so a drop whose
    /// "upcoming" and "live" posts are days apart is not forgotten in
    /// between. Takes the same write lock as admission, so no record can
    /// be evicted mid-decision. With `policy.dry_run` set, reports what
    /// would be evicted without mutating.
    #[allow(clippy::cast_possible_truncation)]
    #[instrument(skip(self, policy), fields(operation = "dedupe_cleanup", dry_run = policy.dry_run))]
    pub fn cleanup_old_entries(&self, policy: &RetentionPolicy) -> CleanupResult {
        let start = Instant::now();
        let now = current_timestamp();

        let Ok(mut inner) = self.inner.write() else {
            tracing::warn!("Dedupe store lock poisoned, skipping cleanup");
            return CleanupResult {
                dry_run: policy.dry_run,
                duration_ms: start.elapsed().as_millis() as u64,
                ..CleanupResult::default()
            };
        };

        let records_checked = inner.records.len();
        let mut by_state: HashMap<ReleaseState, usize> = HashMap::new();

        let expired: Vec<String> = inner
            .records
            .values()
            .filter(|r| r.age_secs(now) > policy.effective(r.limited_edition).as_secs())
            .map(|r| r.fingerprint.clone())
            .collect();

        for fingerprint in &expired {
            if let Some(record) = inner.records.get(fingerprint) {
                *by_state.entry(record.state).or_insert(0) += 1;
            }
            if !policy.dry_run {
                inner.records.remove(fingerprint);
            }
        }

        if !policy.dry_run {
            #[allow(clippy::cast_precision_loss)]
            metrics::gauge!("dedupe_tracked_fingerprints").set(inner.records.len() as f64);
        }
        drop(inner);

        let result = CleanupResult {
            records_checked,
            records_evicted: expired.len(),
            by_state,
            dry_run: policy.dry_run,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            checked = result.records_checked,
            evicted = result.records_evicted,
            dry_run = result.dry_run,
            "Retention cleanup complete"
        );

        result
    }

    /// Exports the current map and counters as a snapshot.
    ///
    /// The snapshot format exists only to survive process restarts; it is
    /// not an authoritative wire format.
    #[must_use]
    pub fn export_snapshot(&self) -> DedupeSnapshot {
        let Ok(inner) = self.inner.read() else {
            return DedupeSnapshot::empty();
        };

        DedupeSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: current_timestamp(),
            total_admitted: inner.total_admitted,
            limited_admitted: inner.limited_admitted,
            records: inner.records.values().cloned().collect(),
        }
    }

    /// Replaces the store contents with a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Snapshot`] for unknown snapshot versions;
    /// the import fails closed rather than guessing at record semantics.
    pub fn import_snapshot(&self, snapshot: DedupeSnapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(crate::Error::Snapshot {
                cause: format!("unknown version {}", snapshot.version),
            });
        }

        let Ok(mut inner) = self.inner.write() else {
            return Err(crate::Error::OperationFailed {
                operation: "import_snapshot".to_string(),
                cause: "store lock poisoned".to_string(),
            });
        };

        inner.records = snapshot
            .records
            .into_iter()
            .map(|r| (r.fingerprint.clone(), r))
            .collect();
        inner.total_admitted = snapshot.total_admitted;
        inner.limited_admitted = snapshot.limited_admitted;

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("dedupe_tracked_fingerprints").set(inner.records.len() as f64);

        tracing::info!(records = inner.records.len(), "Imported dedupe snapshot");
        Ok(())
    }

    /// Number of fingerprints currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    /// Returns true if no fingerprints are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
