//! Storage Engine Module
//!
//! The core keyspace for DistKV: a thread-safe, sharded mapping from
//! byte-string keys to typed values (string, list, set) with TTL support,
//! a background expiry sweeper, and snapshot persistence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      StorageEngine                          │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐            │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │            │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │            │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//!          ▲                                   ▲
//!          │                                   │
//! ┌────────┴──────────┐              ┌─────────┴─────────┐
//! │   ExpirySweeper   │              │     snapshot      │
//! │ (background task) │              │ (save/load file)  │
//! └───────────────────┘              └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use distkv::storage::StorageEngine;
//! use bytes::Bytes;
//!
//! let engine = StorageEngine::new();
//!
//! engine.set(Bytes::from("greeting"), Bytes::from("hello"));
//! assert_eq!(engine.get(&Bytes::from("greeting")), Some(Bytes::from("hello")));
//!
//! engine.rpush(Bytes::from("queue"), Bytes::from("job-1")).unwrap();
//! assert_eq!(engine.llen(&Bytes::from("queue")), 1);
//! ```

pub mod engine;
pub mod expiry;
pub mod snapshot;
pub mod value;

// Re-export commonly used types
pub use engine::{StorageEngine, TypeMismatch};
pub use expiry::{start_expiry_sweeper, ExpiryConfig, ExpirySweeper};
pub use snapshot::SnapshotError;
pub use value::{Kind, Payload, Value};
