//! Retention policy configuration.
//!
//! Limited-edition records must outlive ordinary ones: days can pass
//! between a drop's "upcoming" announcement and its "now live" post, and
//! evicting the record in between would let the live post through twice.
//!
//! # Environment Variables
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `DROPGATE_RETENTION_DAYS` | u64 | `7` | Retention for ordinary records |
//! | `DROPGATE_LIMITED_RETENTION_DAYS` | u64 | `21` | Retention for limited-edition records |

use std::time::Duration;

/// Default retention for ordinary records, in days.
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Default retention for limited-edition records, in days.
pub const DEFAULT_LIMITED_RETENTION_DAYS: u64 = 21;

/// Safety floor: retention never drops below one day.
const MINIMUM_RETENTION_DAYS: u64 = 1;

const SECONDS_PER_DAY: u64 = 86_400;

/// Retention policy for dedupe records.
///
/// # Example
///
/// ```rust
/// use dropgate::RetentionPolicy;
/// use std::time::Duration;
///
/// let policy = RetentionPolicy::default();
/// assert_eq!(policy.standard, Duration::from_secs(7 * 86_400));
/// assert_eq!(policy.limited_edition, Duration::from_secs(21 * 86_400));
/// ```
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// How long ordinary records are kept.
    pub standard: Duration,
    /// How long limited-edition records are kept.
    pub limited_edition: Duration,
    /// When set, cleanup reports what it would evict without mutating.
    pub dry_run: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            standard: Duration::from_secs(DEFAULT_RETENTION_DAYS * SECONDS_PER_DAY),
            limited_edition: Duration::from_secs(DEFAULT_LIMITED_RETENTION_DAYS * SECONDS_PER_DAY),
            dry_run: false,
        }
    }
}

impl RetentionPolicy {
    /// Creates a policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let standard_days = std::env::var("DROPGATE_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETENTION_DAYS)
            .max(MINIMUM_RETENTION_DAYS);

        let limited_days = std::env::var("DROPGATE_LIMITED_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LIMITED_RETENTION_DAYS)
            .max(MINIMUM_RETENTION_DAYS);

        Self {
            standard: Duration::from_secs(standard_days * SECONDS_PER_DAY),
            limited_edition: Duration::from_secs(limited_days * SECONDS_PER_DAY),
            dry_run: false,
        }
    }

    /// Sets the standard retention.
    #[must_use]
    pub const fn with_standard(mut self, retention: Duration) -> Self {
        self.standard = retention;
        self
    }

    /// Sets the limited-edition retention.
    #[must_use]
    pub const fn with_limited_edition(mut self, retention: Duration) -> Self {
        self.limited_edition = retention;
        self
    }

    /// Sets the dry-run flag.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Effective retention for a record, given its limited-edition flag.
    #[must_use]
    pub const fn effective(&self, limited_edition: bool) -> Duration {
        if limited_edition {
            self.limited_edition
        } else {
            self.standard
        }
    }
}
