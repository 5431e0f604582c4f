//! Unified error types for the Courier core.
//!
//! Framework-level errors (like `ExtractError`) are defined in
//! `courier-framework`; configuration and decode errors in `courier-runtime`.

use std::fmt;

use thiserror::Error;

use crate::update::Category;

/// A boxed error type for handler and middleware failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// A handler callback that returned an error.
#[derive(Debug, Error)]
#[error("handler '{handler}' for {category} failed: {source}")]
pub struct HandlerFailure {
    /// Category the update was dispatched under.
    pub category: Category,
    /// Name of the registration entry whose callback failed.
    pub handler: String,
    /// The error returned by the callback.
    #[source]
    pub source: BoxError,
}

/// Errors surfaced by `Dispatcher::process`.
///
/// "No handler matched" is not an error; it is reported as an outcome.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The decoder produced zero or several populated payload variants.
    #[error("malformed update {update_id}: expected exactly one payload, found {populated}")]
    MalformedUpdate {
        /// ID of the offending update.
        update_id: i64,
        /// How many payload variants were populated.
        populated: usize,
    },

    /// A middleware returned an error; category dispatch was skipped.
    #[error("middleware #{index} aborted dispatch: {source}")]
    MiddlewareAborted {
        /// Position of the middleware in the chain.
        index: usize,
        /// The error the middleware returned.
        #[source]
        source: BoxError,
    },

    /// A matched handler returned an error.
    #[error(transparent)]
    Handler(HandlerFailure),

    /// Several handlers of a fan-out category returned errors.
    #[error("{} handlers failed: {}", .0.len(), JoinedFailures(.0))]
    Handlers(Vec<HandlerFailure>),
}

impl DispatchError {
    /// Joins handler failures into a single error, or `None` if there are none.
    pub fn from_failures(mut failures: Vec<HandlerFailure>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop().map(Self::Handler),
            _ => Some(Self::Handlers(failures)),
        }
    }

    /// Returns `true` for [`DispatchError::MalformedUpdate`].
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedUpdate { .. })
    }

    /// Iterates over the handler failures carried by this error.
    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            Self::Handler(f) => std::slice::from_ref(f),
            Self::Handlers(all) => all,
            _ => &[],
        }
    }
}

struct JoinedFailures<'a>(&'a [HandlerFailure]);

impl fmt::Display for JoinedFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

// =============================================================================
// API Errors
// =============================================================================

/// Error type for calls made through a [`Responder`](crate::bot::Responder).
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The bot is not connected.
    #[error("bot is not connected")]
    NotConnected,
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,
    /// The API returned an error.
    #[error("API error ({code}): {description}")]
    Api { code: i64, description: String },
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
