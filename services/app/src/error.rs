//! services/app/src/error.rs
//!
//! Defines the primary error type for the entire app service.

use crate::config::ConfigError;
use bridge_ed_core::domain::LedgerError;
use bridge_ed_core::ports::PortError;

/// The primary error type for the `app` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service
    /// ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A rejected enrollment-ledger mutation (e.g. a due date set on a
    /// course with no enrollment).
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// There is no signed-in session for an operation that needs one.
    #[error("No active session")]
    NoSession,

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
