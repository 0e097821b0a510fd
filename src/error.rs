//! Error types for the Aerospike demo
//!
//! Provides a unified error type for every demo step and store backend.

use thiserror::Error;

/// Result type alias using DemoError
pub type Result<T> = std::result::Result<T, DemoError>;

/// Unified error type for demo operations
#[derive(Debug, Error)]
pub enum DemoError {
    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Aerospike error: {0}")]
    Aerospike(#[from] aerospike::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Bin type error: {0}")]
    BinType(String),

    #[error("Store error: {0}")]
    Store(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
