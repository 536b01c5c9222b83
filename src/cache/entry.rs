//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value, replaced wholesale on overwrite
    pub value: String,
    /// Absolute deadline, None = no expiration
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry from a relative TTL in seconds.
    ///
    /// A TTL of zero or less means the entry never expires.
    pub fn new(value: String, ttl_seconds: i64) -> Self {
        Self {
            value,
            expires_at: deadline_from_ttl(Instant::now(), ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks if the entry has expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Converts a signed TTL into an absolute deadline.
///
/// Non-positive TTLs map to `None` (never expires). TTLs too large to
/// represent are also treated as never expiring.
pub fn deadline_from_ttl(now: Instant, ttl_seconds: i64) -> Option<Instant> {
    if ttl_seconds <= 0 {
        return None;
    }
    now.checked_add(Duration::from_secs(ttl_seconds as u64))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), 0);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_negative_ttl_never_expires() {
        let entry = CacheEntry::new("v".to_string(), -5);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), 60);

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), 1);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_deadline_is_ttl_from_write() {
        let now = Instant::now();
        assert_eq!(
            deadline_from_ttl(now, 10),
            Some(now + Duration::from_secs(10))
        );
        assert_eq!(deadline_from_ttl(now, 0), None);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: "test".to_string(),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");

        let later = CacheEntry {
            value: "test".to_string(),
            expires_at: Some(now + Duration::from_millis(1)),
        };
        assert!(!later.is_expired_at(now));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        // Either a far deadline or none; never a panic.
        let _ = deadline_from_ttl(now, i64::MAX);
        assert!(deadline_from_ttl(now, 1).is_some());
    }
}
