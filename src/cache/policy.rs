//! Cache expiration policy

use chrono::{DateTime, Duration, Utc};

/// Decides whether a cached snapshot is still fresh
///
/// A snapshot expires once it is seven days old; the boundary itself counts
/// as expired.
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    /// Maximum age of a cached feed, in days
    pub const MAX_CACHE_AGE_DAYS: i64 = 7;

    /// Returns `true` if a snapshot cached at `timestamp` is still valid at `against`
    pub fn validate(timestamp: DateTime<Utc>, against: DateTime<Utc>) -> bool {
        match timestamp.checked_add_signed(Duration::days(Self::MAX_CACHE_AGE_DAYS)) {
            Some(max_age) => against < max_age,
            None => false,
        }
    }
}
