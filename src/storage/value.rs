//! Typed Value Model
//!
//! Every key in the keyspace maps to a [`Value`]: a tagged union of the
//! three supported shapes (string, list, set) plus an optional absolute
//! expiration timestamp.
//!
//! ## Design Decisions
//!
//! 1. **Tagged sum type**: The variant is carried by the enum discriminant,
//!    so every typed operation branches on it and a cast can never go wrong.
//! 2. **Deque for lists**: `VecDeque` gives O(1) push/pop at both ends.
//! 3. **Wall-clock expiry**: Expiration is an absolute unix timestamp in
//!    whole seconds. A monotonic clock would not survive a snapshot/restore
//!    cycle across process restarts.

use bytes::Bytes;
use std::collections::{HashSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

/// Which of the three shapes a [`Value`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    List,
    Set,
}

/// The variant-specific payload of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An opaque byte string.
    String(Bytes),
    /// An ordered sequence with O(1) push/pop at both ends.
    List(VecDeque<Bytes>),
    /// An unordered collection of distinct members.
    Set(HashSet<Bytes>),
}

/// A stored value: payload plus optional absolute expiration.
///
/// `expires_at` is a unix timestamp in seconds; `None` means the value
/// never expires. Moving a `Value` between maps does not alter it.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub payload: Payload,
    pub expires_at: Option<i64>,
}

impl Value {
    /// Creates a string value with no expiry.
    pub fn string(data: Bytes) -> Self {
        Self {
            payload: Payload::String(data),
            expires_at: None,
        }
    }

    /// Creates an empty list value with no expiry.
    pub fn empty_list() -> Self {
        Self {
            payload: Payload::List(VecDeque::new()),
            expires_at: None,
        }
    }

    /// Creates an empty set value with no expiry.
    pub fn empty_set() -> Self {
        Self {
            payload: Payload::Set(HashSet::new()),
            expires_at: None,
        }
    }

    /// Returns the variant tag without touching the payload.
    pub fn kind(&self) -> Kind {
        match self.payload {
            Payload::String(_) => Kind::String,
            Payload::List(_) => Kind::List,
            Payload::Set(_) => Kind::Set,
        }
    }

    /// Checks whether this value has expired as of `now` (unix seconds).
    ///
    /// A value whose expiration equals the current second is already
    /// expired, so `EXPIRE key 0` makes the key invisible immediately.
    #[inline]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }

    /// Remaining lifetime in seconds as of `now`, or `None` if the value
    /// has no expiry. Zero or negative means already expired.
    pub fn ttl(&self, now: i64) -> Option<i64> {
        self.expires_at.map(|at| at - now)
    }
}

/// Current wall-clock time as a unix timestamp in whole seconds.
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::string(Bytes::from("x")).kind(), Kind::String);
        assert_eq!(Value::empty_list().kind(), Kind::List);
        assert_eq!(Value::empty_set().kind(), Kind::Set);
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let value = Value::string(Bytes::from("x"));
        assert!(!value.is_expired(i64::MAX));
        assert_eq!(value.ttl(0), None);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut value = Value::string(Bytes::from("x"));
        value.expires_at = Some(100);

        assert!(!value.is_expired(99));
        // Expired at the exact second, not one past it.
        assert!(value.is_expired(100));
        assert!(value.is_expired(101));
    }

    #[test]
    fn test_ttl_counts_down() {
        let mut value = Value::string(Bytes::from("x"));
        value.expires_at = Some(100);

        assert_eq!(value.ttl(40), Some(60));
        assert_eq!(value.ttl(100), Some(0));
        assert_eq!(value.ttl(150), Some(-50));
    }

    #[test]
    fn test_now_secs_is_sane() {
        // 2020-01-01 as a floor; catches a unit mixup (ms vs s).
        assert!(now_secs() > 1_577_836_800);
    }
}
