//! Runtime error types.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::decoder::DecodeError;
use courier_core::DispatchError;

/// Errors that can occur while feeding updates through the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The raw payload could not be decoded.
    #[error("Failed to decode update: {0}")]
    Decode(#[from] DecodeError),

    /// Dispatch failed: middleware abort, handler error or malformed update.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Processing did not finish within the configured timeout.
    #[error("Update {update_id} timed out after {after:?}")]
    Timeout { update_id: i64, after: Duration },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// The underlying dispatch error, if any.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            Self::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
