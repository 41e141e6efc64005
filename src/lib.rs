//! # DistKV - An In-Memory Key-Value Store
//!
//! DistKV is a Redis-compatible, in-memory key-value store written in Rust.
//! It supports typed values (strings, lists, sets), per-key TTL, snapshot
//! persistence, and concurrent access by many clients over TCP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                               DistKV                                │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐              │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │              │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │              │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘              │
//! │                                               │                     │
//! │                                               ▼                     │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────┐    │
//! │  │ Line Parser │    │             StorageEngine                │    │
//! │  │ + RESP      │    │  ┌────────┐ ┌────────┐ ┌────────┐        │    │
//! │  │   replies   │    │  │Shard 0 │ │Shard 1 │ │...N    │        │    │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │shards  │        │    │
//! │                     │  └────────┘ └────────┘ └────────┘        │    │
//! │                     └───────┬─────────────────────▲────────────┘    │
//! │                             │                     │                 │
//! │                     ┌───────▼───────┐    ┌────────┴────────┐        │
//! │                     │   snapshot    │    │  ExpirySweeper  │        │
//! │                     │ (disk file)   │    │ (tokio task)    │        │
//! │                     └───────────────┘    └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Protocol
//!
//! Requests are single text lines, `CMD [ARG ...]`, split on whitespace
//! and terminated by `\n` (an optional `\r` before it is stripped).
//! Responses are RESP-framed, so `redis-cli`-style tooling can read them.
//!
//! ## Supported Commands
//!
//! ### Server
//! - `PING`, `QUIT`
//!
//! ### Strings & keys
//! - `SET key value`, `GET key`, `DEL key`, `EXISTS key`
//! - `EXPIRE key seconds`, `TTL key`
//! - `KEYS`, `DBSIZE`
//!
//! ### Lists
//! - `LPUSH key value`, `RPUSH key value`
//! - `LPOP key`, `RPOP key`
//! - `LRANGE key start stop`, `LLEN key`
//!
//! ### Sets
//! - `SADD key member`, `SREM key member`
//! - `SISMEMBER key member`, `SMEMBERS key`, `SCARD key`
//!
//! ## Module Overview
//!
//! - [`protocol`]: request line parsing and RESP response framing
//! - [`storage`]: sharded typed keyspace, TTL, sweeper, snapshot file
//! - [`commands`]: arity validation and command execution
//! - [`connection`]: per-client connection tasks
//!
//! ## Design Highlights
//!
//! ### Thread Safety
//!
//! The storage engine uses a sharded design with independent RwLocks, so
//! readers proceed concurrently and writers only serialize per shard.
//!
//! ### Lazy + Active Expiry
//!
//! Keys with TTL are expired two ways: on access (lazy), and by a
//! background sweeper task that reclaims keys nobody touches anymore.
//!
//! ### Snapshot Persistence
//!
//! The keyspace is written to a binary snapshot file on graceful shutdown
//! and restored from it on the next start.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{parse_request, Command, Request, Response};
pub use storage::{start_expiry_sweeper, StorageEngine};

/// The default port DistKV listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default snapshot file path
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/dump.rdb";

/// Version of DistKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
