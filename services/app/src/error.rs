//! services/app/src/error.rs
//!
//! Defines the primary error type for the `app` service.

use crate::config::ConfigError;
use crate::session::SessionError;
use task_keeper_core::ports::PortError;

/// The primary error type for the `app` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
}
