//! The ordered posting queue.
//!
//! Holds admitted items in priority order (score descending, earliest
//! admission first on ties) for the downstream posting layer to consume.
//! Admission itself always defers to the dedupe store.

mod manager;

pub use manager::{QueueEntry, QueueManager, QueueStats};
