//! # aerospike-demo
//!
//! A walkthrough of the everyday Aerospike client operations:
//! - Single-record writes, existence checks and increments
//! - Multi-bin writes and selective reads
//! - TTL-based expiration
//! - Bin and record deletes
//! - Batch writes and batch reads
//! - Compound (multi-operation) transactions
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    aerospike-demo (CLI)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Demo (step sequence)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ RecordStore
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌──────────────┐          ┌─────────────┐
//!   │AerospikeStore│          │ MemoryStore │
//!   │   (client)   │          │  (RwLock)   │
//!   └──────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod store;
pub mod demo;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DemoError, Result};
pub use config::Config;
pub use demo::{Demo, Step, StepOutcome};
pub use store::{AerospikeStore, MemoryStore, RecordStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of aerospike-demo
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
