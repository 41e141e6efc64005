//! Thread-Safe Typed Storage Engine
//!
//! This module implements the core keyspace for DistKV: a concurrent
//! mapping from byte-string keys to typed [`Value`]s with TTL support.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Instead of one big lock, we use multiple shards to
//!    reduce contention. Read-only commands on different keys never block
//!    each other, and writers only serialize within a shard.
//! 2. **Lazy Expiry**: Keys are checked for expiry on access, plus an
//!    optional background sweep (see [`crate::storage::expiry`]).
//! 3. **Typed operations**: Every operation checks the value's variant tag
//!    and fails with [`TypeMismatch`] rather than mutating a value of the
//!    wrong shape.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StorageEngine                          │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐            │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │            │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │            │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │            │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are distributed across shards using a hash function. A reader that
//! observes an expired entry releases its read guard, takes the shard's
//! write guard, and re-checks before removing — so the removal never
//! clobbers a concurrent writer that refreshed the key in between.

use crate::storage::value::{now_secs, Payload, Value};
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::RwLock;

/// Number of shards for the storage engine.
/// More shards = less lock contention, but more memory overhead.
const NUM_SHARDS: usize = 64;

/// Outcome of a typed operation applied to a key holding another variant.
///
/// The operation fails without mutating the existing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation against a key holding the wrong kind of value")]
pub struct TypeMismatch;

/// A single shard containing a portion of the keyspace.
#[derive(Debug, Default)]
struct Shard {
    entries: RwLock<HashMap<Bytes, Value>>,
}

/// The main storage engine for DistKV.
///
/// Designed to be wrapped in an `Arc` and shared across all connection
/// tasks. All operations are thread-safe; read-only operations proceed
/// concurrently, mutations take a shard's exclusive lock.
///
/// # Example
///
/// ```
/// use distkv::storage::StorageEngine;
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("distkv"));
/// assert_eq!(engine.get(&Bytes::from("name")), Some(Bytes::from("distkv")));
/// ```
pub struct StorageEngine {
    shards: Vec<Shard>,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a new, empty storage engine.
    pub fn new() -> Self {
        Self {
            shards: (0..NUM_SHARDS).map(|_| Shard::default()).collect(),
        }
    }

    #[inline]
    fn shard_index(key: &[u8]) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        &self.shards[Self::shard_index(key)]
    }

    /// Removes `key` if it is still expired. Called after a reader dropped
    /// its shared guard; the entry is re-checked under the write lock to
    /// tolerate a concurrent SET that refreshed it.
    fn purge_expired(&self, key: &Bytes) {
        let shard = self.shard(key);
        let mut entries = shard.entries.write().unwrap();
        if let Some(value) = entries.get(key) {
            if value.is_expired(now_secs()) {
                entries.remove(key);
            }
        }
    }

    // ========================================================================
    // String operations
    // ========================================================================

    /// Sets `key` to a string value, unconditionally replacing whatever was
    /// there before — including its variant and any expiry.
    pub fn set(&self, key: Bytes, data: Bytes) {
        let shard = self.shard(&key);
        let mut entries = shard.entries.write().unwrap();
        entries.insert(key, Value::string(data));
    }

    /// Gets the string payload for `key`.
    ///
    /// Returns `None` if the key is missing, expired, or holds another
    /// variant. Expired entries are removed on the way out (lazy expiry).
    pub fn get(&self, key: &Bytes) -> Option<Bytes> {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::String(data) => return Some(data.clone()),
                    _ => return None,
                },
            }
        }

        // Expired: upgrade to the write lock and remove.
        self.purge_expired(key);
        None
    }

    // ========================================================================
    // Generic operations
    // ========================================================================

    /// Deletes `key`.
    ///
    /// Returns `true` iff a live (non-expired) key was removed. An expired
    /// entry is removed too, but reported as absent.
    pub fn del(&self, key: &Bytes) -> bool {
        let shard = self.shard(key);
        let mut entries = shard.entries.write().unwrap();
        match entries.remove(key) {
            Some(value) => !value.is_expired(now_secs()),
            None => false,
        }
    }

    /// Checks whether a non-expired `key` is present.
    pub fn exists(&self, key: &Bytes) -> bool {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return false,
                Some(value) if value.is_expired(now) => {}
                Some(_) => return true,
            }
        }

        self.purge_expired(key);
        false
    }

    /// Sets the expiration of `key` to `now + seconds`, overwriting any
    /// prior expiration.
    ///
    /// Returns `true` iff the key existed (non-expired) at call time. Zero
    /// or negative `seconds` is permitted and expires the key immediately.
    pub fn expire(&self, key: &Bytes, seconds: i64) -> bool {
        let shard = self.shard(key);
        let now = now_secs();
        let mut entries = shard.entries.write().unwrap();
        match entries.get_mut(key) {
            None => false,
            Some(value) if value.is_expired(now) => {
                entries.remove(key);
                false
            }
            Some(value) => {
                value.expires_at = Some(now.saturating_add(seconds));
                true
            }
        }
    }

    /// Remaining time-to-live of `key` in seconds.
    ///
    /// Returns `-1` if the key exists without expiry and `-2` if the key is
    /// missing or expired.
    pub fn ttl(&self, key: &Bytes) -> i64 {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return -2,
                Some(value) if value.is_expired(now) => {}
                Some(value) => return value.ttl(now).unwrap_or(-1),
            }
        }

        self.purge_expired(key);
        -2
    }

    /// Returns all non-expired keys at call time.
    ///
    /// **Warning**: scans every shard; can be slow on large keyspaces.
    pub fn keys(&self) -> Vec<Bytes> {
        let now = now_secs();
        let mut result = Vec::new();
        for shard in &self.shards {
            let entries = shard.entries.read().unwrap();
            result.extend(
                entries
                    .iter()
                    .filter(|(_, value)| !value.is_expired(now))
                    .map(|(key, _)| key.clone()),
            );
        }
        result
    }

    /// Number of non-expired keys at call time.
    pub fn dbsize(&self) -> usize {
        let now = now_secs();
        self.shards
            .iter()
            .map(|shard| {
                let entries = shard.entries.read().unwrap();
                entries
                    .values()
                    .filter(|value| !value.is_expired(now))
                    .count()
            })
            .sum()
    }

    /// Removes every key from the keyspace.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.entries.write().unwrap().clear();
        }
    }

    // ========================================================================
    // List operations
    // ========================================================================

    /// Prepends `value` to the list at `key`, creating the list if the key
    /// is missing. Returns the new length.
    pub fn lpush(&self, key: Bytes, value: Bytes) -> Result<usize, TypeMismatch> {
        self.push(key, value, true)
    }

    /// Appends `value` to the list at `key`, creating the list if the key
    /// is missing. Returns the new length.
    pub fn rpush(&self, key: Bytes, value: Bytes) -> Result<usize, TypeMismatch> {
        self.push(key, value, false)
    }

    fn push(&self, key: Bytes, value: Bytes, front: bool) -> Result<usize, TypeMismatch> {
        let shard = self.shard(&key);
        let now = now_secs();
        let mut entries = shard.entries.write().unwrap();

        let entry = entries.entry(key).or_insert_with(Value::empty_list);
        if entry.is_expired(now) {
            *entry = Value::empty_list();
        }

        match &mut entry.payload {
            Payload::List(items) => {
                if front {
                    items.push_front(value);
                } else {
                    items.push_back(value);
                }
                Ok(items.len())
            }
            _ => Err(TypeMismatch),
        }
    }

    /// Removes and returns the head of the list at `key`.
    ///
    /// Returns `None` on a missing key, an empty list, or a key of another
    /// variant (the protocol does not distinguish the three for pops).
    pub fn lpop(&self, key: &Bytes) -> Option<Bytes> {
        self.pop(key, true)
    }

    /// Removes and returns the tail of the list at `key`. Same `None`
    /// semantics as [`StorageEngine::lpop`].
    pub fn rpop(&self, key: &Bytes) -> Option<Bytes> {
        self.pop(key, false)
    }

    fn pop(&self, key: &Bytes, front: bool) -> Option<Bytes> {
        let shard = self.shard(key);
        let now = now_secs();
        let mut entries = shard.entries.write().unwrap();
        match entries.get_mut(key) {
            None => None,
            Some(value) if value.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(value) => match &mut value.payload {
                Payload::List(items) => {
                    if front {
                        items.pop_front()
                    } else {
                        items.pop_back()
                    }
                }
                _ => None,
            },
        }
    }

    /// Returns the elements of the list at `key` between `start` and `stop`
    /// inclusive, with Redis-style index handling: negative indices count
    /// from the tail, both bounds are clamped into `[0, len-1]`, and a
    /// normalized `start > stop` yields an empty slice.
    ///
    /// Returns `None` on a missing key or a key of another variant.
    pub fn lrange(&self, key: &Bytes, start: i64, stop: i64) -> Option<Vec<Bytes>> {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::List(items) => {
                        let len = items.len() as i64;
                        if len == 0 {
                            return Some(Vec::new());
                        }

                        let mut start = if start < 0 { start + len } else { start };
                        let mut stop = if stop < 0 { stop + len } else { stop };
                        start = start.clamp(0, len - 1);
                        stop = stop.clamp(0, len - 1);

                        if start > stop {
                            return Some(Vec::new());
                        }

                        return Some(
                            items
                                .iter()
                                .skip(start as usize)
                                .take((stop - start + 1) as usize)
                                .cloned()
                                .collect(),
                        );
                    }
                    _ => return None,
                },
            }
        }

        self.purge_expired(key);
        None
    }

    /// Length of the list at `key`; 0 on a missing key or another variant.
    pub fn llen(&self, key: &Bytes) -> usize {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return 0,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::List(items) => return items.len(),
                    _ => return 0,
                },
            }
        }

        self.purge_expired(key);
        0
    }

    // ========================================================================
    // Set operations
    // ========================================================================

    /// Adds `member` to the set at `key`, creating the set if the key is
    /// missing. Returns `true` iff the member was newly inserted.
    pub fn sadd(&self, key: Bytes, member: Bytes) -> Result<bool, TypeMismatch> {
        let shard = self.shard(&key);
        let now = now_secs();
        let mut entries = shard.entries.write().unwrap();

        let entry = entries.entry(key).or_insert_with(Value::empty_set);
        if entry.is_expired(now) {
            *entry = Value::empty_set();
        }

        match &mut entry.payload {
            Payload::Set(members) => Ok(members.insert(member)),
            _ => Err(TypeMismatch),
        }
    }

    /// Removes `member` from the set at `key`. Returns `true` iff the
    /// member was present.
    pub fn srem(&self, key: &Bytes, member: &Bytes) -> Result<bool, TypeMismatch> {
        let shard = self.shard(key);
        let now = now_secs();
        let mut entries = shard.entries.write().unwrap();
        match entries.get_mut(key) {
            None => Ok(false),
            Some(value) if value.is_expired(now) => {
                entries.remove(key);
                Ok(false)
            }
            Some(value) => match &mut value.payload {
                Payload::Set(members) => Ok(members.remove(member)),
                _ => Err(TypeMismatch),
            },
        }
    }

    /// Checks whether `member` belongs to the set at `key`. A missing key
    /// or a key of another variant is simply not a member.
    pub fn sismember(&self, key: &Bytes, member: &Bytes) -> bool {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return false,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::Set(members) => return members.contains(member),
                    _ => return false,
                },
            }
        }

        self.purge_expired(key);
        false
    }

    /// Returns every member of the set at `key` in unspecified order, or
    /// `None` on a missing key or a key of another variant.
    pub fn smembers(&self, key: &Bytes) -> Option<Vec<Bytes>> {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return None,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::Set(members) => return Some(members.iter().cloned().collect()),
                    _ => return None,
                },
            }
        }

        self.purge_expired(key);
        None
    }

    /// Cardinality of the set at `key`; 0 on a missing key or another
    /// variant.
    pub fn scard(&self, key: &Bytes) -> usize {
        let shard = self.shard(key);
        let now = now_secs();

        {
            let entries = shard.entries.read().unwrap();
            match entries.get(key) {
                None => return 0,
                Some(value) if value.is_expired(now) => {}
                Some(value) => match &value.payload {
                    Payload::Set(members) => return members.len(),
                    _ => return 0,
                },
            }
        }

        self.purge_expired(key);
        0
    }

    // ========================================================================
    // Snapshot support
    // ========================================================================

    /// Takes a point-in-time copy of the whole keyspace.
    ///
    /// All shard read guards are acquired before any shard is copied, so
    /// the result is a consistent cut. Expired entries are included; the
    /// persistence layer filters them when writing.
    pub fn snapshot(&self) -> Vec<(Bytes, Value)> {
        let guards: Vec<_> = self
            .shards
            .iter()
            .map(|shard| shard.entries.read().unwrap())
            .collect();

        let mut result = Vec::with_capacity(guards.iter().map(|guard| guard.len()).sum());
        for guard in &guards {
            for (key, value) in guard.iter() {
                result.push((key.clone(), value.clone()));
            }
        }
        result
    }

    /// Atomically replaces the keyspace with `entries`.
    ///
    /// All shard write guards are held for the duration, so no reader
    /// observes a half-restored keyspace.
    pub fn restore(&self, entries: Vec<(Bytes, Value)>) {
        let mut guards: Vec<_> = self
            .shards
            .iter()
            .map(|shard| shard.entries.write().unwrap())
            .collect();

        for guard in guards.iter_mut() {
            guard.clear();
        }
        for (key, value) in entries {
            guards[Self::shard_index(&key)].insert(key, value);
        }
    }

    /// Removes every expired key from every shard.
    ///
    /// Called by the background expiry sweeper; lazy expiry alone would
    /// never reclaim keys that are no longer accessed.
    ///
    /// Returns the number of keys removed.
    pub fn sweep_expired(&self) -> usize {
        let now = now_secs();
        let mut removed = 0;
        for shard in &self.shards {
            let mut entries = shard.entries.write().unwrap();
            let before = entries.len();
            entries.retain(|_, value| !value.is_expired(now));
            removed += before - entries.len();
        }
        removed
    }
}
