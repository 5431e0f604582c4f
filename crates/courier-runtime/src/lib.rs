//! Courier Runtime - the front door of the Courier dispatch framework.
//!
//! This crate provides:
//! - Raw payload decoding (`Decoder`, `JsonDecoder`)
//! - The `UpdateRuntime` that decodes, dispatches and applies timeouts
//! - figment-based configuration (`courier.toml`, `COURIER_*` variables)
//! - Logging configuration
//!
//! Transports are out of scope: whatever receives updates (long polling,
//! a webhook server) passes the raw bytes to [`UpdateRuntime::handle_raw`]
//! or a polled batch to [`UpdateRuntime::handle_batch`].

pub mod config;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, CourierConfig, DispatchConfig,
    LoggingConfig,
};
pub use decoder::{DecodeError, Decoder, JsonDecoder};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, UpdateRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, span, trace, warn};
}
