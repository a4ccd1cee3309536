//! # Dropgate
//!
//! Admission control, priority scoring, and posting-queue management for
//! product drop pipelines.
//!
//! Dropgate decides, for each candidate product listing flowing through a
//! deal-tracking pipeline, whether it may be admitted into the posting
//! queue and at what priority. The same physical drop is never published
//! more than policy allows: limited-edition items get exactly one
//! "upcoming" post and one later "now live" post; everything else gets
//! one post, ever.
//!
//! ## Components
//!
//! - [`dedupe::DedupeStore`] — the sole admission authority, keyed by a
//!   deterministic drop fingerprint
//! - [`scoring::ProductScorer`] — pure weighted scoring with a full
//!   breakdown per item
//! - [`queue::QueueManager`] — the ordered, admitted-item collection
//!
//! ## Example
//!
//! ```rust
//! use dropgate::{DedupeStore, ProductItem, ProductScorer, QueueManager};
//!
//! let store = DedupeStore::new();
//! let scorer = ProductScorer::new();
//! let queue = QueueManager::new();
//!
//! let item = ProductItem::new("drop-1")
//!     .with_title("Jordan 1 Retro High OG")
//!     .with_brand("Jordan")
//!     .with_category("sneakers")
//!     .with_limited_edition(true)
//!     .with_release_state("upcoming");
//!
//! let score = scorer.score_with_store(&item, &store);
//! assert!(queue.add_item(&item, score, &store));
//!
//! // Same drop again: blocked at the gate.
//! let rescore = scorer.score_with_store(&item, &store);
//! assert!(!queue.add_item(&item, rescore, &store));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod dedupe;
pub mod models;
pub mod queue;
pub mod scoring;

// Re-exports for convenience
pub use dedupe::{
    CleanupResult, DedupeSnapshot, DedupeStats, DedupeStore, DuplicateCheck, MatchType,
    RetentionPolicy,
};
pub use models::{ItemId, ProductItem, ProductStateRecord, ReleaseState, StockStatus};
pub use queue::{QueueEntry, QueueManager, QueueStats};
pub use scoring::{ProductScore, ProductScorer, ScoreBreakdown, ScoredItem};

/// Error type for dropgate operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait
/// implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Non-finite numeric fields reach the scorer |
/// | `OperationFailed` | Snapshot file I/O or JSON encoding fails |
/// | `Snapshot` | A snapshot is structurally valid but unusable |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A numeric item field (price, hype, engagement) is NaN or infinite
    /// - A caller-supplied value cannot participate in scoring
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Snapshot files cannot be read or written
    /// - JSON encoding or decoding of a snapshot fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A snapshot could not be imported.
    ///
    /// Raised when:
    /// - The snapshot version is unknown (import fails closed rather than
    ///   guessing at record semantics)
    #[error("snapshot rejected: {cause}")]
    Snapshot {
        /// The reason the snapshot was rejected.
        cause: String,
    },
}

/// Result type alias for dropgate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Centralized clock accessor so admission, cleanup, and queue ordering
/// all agree on one time source. Falls back to 0 if the system clock is
/// before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use dropgate::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
