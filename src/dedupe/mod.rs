//! Duplicate suppression for product drops.
//!
//! This module decides whether a candidate listing may be posted at all:
//!
//! 1. **Fingerprinting**: a deterministic identity over normalized item
//!    attributes, insensitive to release-phase phrasing
//! 2. **Admission**: a release-state transition guard that allows exactly
//!    one "upcoming" and one later "live" post for limited-edition drops,
//!    and one post ever for everything else
//! 3. **Retention**: time-based eviction with an extended window for
//!    limited-edition records
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       DedupeStore                          │
//! │  ┌───────────────────┐  ┌───────────────────────────────┐  │
//! │  │ Fingerprint       │  │ fingerprint → record map      │  │
//! │  │ Generator         │  │ + admission counters          │  │
//! │  │                   │  │                               │  │
//! │  │ SHA256 over       │  │ one RwLock: decide-and-commit │  │
//! │  │ normalized fields │  │ in a single critical section  │  │
//! │  └───────────────────┘  └───────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod fingerprint;
mod snapshot;
mod store;
mod types;

pub use config::{DEFAULT_LIMITED_RETENTION_DAYS, DEFAULT_RETENTION_DAYS, RetentionPolicy};
pub use fingerprint::FingerprintGenerator;
pub use snapshot::{DedupeSnapshot, SNAPSHOT_VERSION};
pub use store::DedupeStore;
pub use types::{CleanupResult, DedupeStats, DuplicateCheck, MatchType};
