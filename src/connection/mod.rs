//! Connection Handling Module
//!
//! Manages individual client connections. The accept loop (in `main.rs`)
//! spawns one async task per accepted socket; each task owns its stream,
//! its read accumulator, and a handle to the shared command handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                      (main.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │   read bytes → split lines → execute → write response       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! One slow client blocks only its own task; every other connection keeps
//! making progress.

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
