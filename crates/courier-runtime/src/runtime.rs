//! The front door between a transport and the dispatcher.
//!
//! A transport (long polling, webhook) hands raw payloads to an
//! [`UpdateRuntime`], which decodes them, runs the dispatcher under the
//! configured timeout, and turns malformed updates into skips.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courier_runtime::UpdateRuntime;
//!
//! let runtime = UpdateRuntime::builder()
//!     .config_file("config/courier.toml")
//!     .build(responder, |bot| {
//!         bot.command("start", on_start).register();
//!         bot.on().callback().prefix("page:", on_page);
//!     })?;
//!
//! for outcome in runtime.handle_batch(polled).await {
//!     ...
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use courier_core::{BoxedResponder, DispatchError, Update};
use courier_framework::{Dispatcher, DispatcherBuilder, Outcome};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, CourierConfig, validate_config};
use crate::decoder::{Decoder, JsonDecoder};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Decodes and dispatches updates for one bot.
///
/// Cheap to clone; clones share the dispatcher, decoder and responder.
#[derive(Clone)]
pub struct UpdateRuntime {
    decoder: Arc<dyn Decoder>,
    dispatcher: Dispatcher,
    responder: BoxedResponder,
    timeout: Option<Duration>,
    skip_malformed: bool,
}

impl UpdateRuntime {
    /// Creates a runtime with the JSON decoder, no timeout, and malformed
    /// updates skipped.
    pub fn new(dispatcher: Dispatcher, responder: BoxedResponder) -> Self {
        Self {
            decoder: Arc::new(JsonDecoder),
            dispatcher,
            responder,
            timeout: None,
            skip_malformed: true,
        }
    }

    /// Creates a runtime builder that loads configuration first.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from loaded configuration.
    ///
    /// Validates `config`, initializes logging from it, and builds a
    /// dispatcher with the configured identity and fan-out mode; `register`
    /// adds the handlers.
    pub fn from_config<F>(
        config: &CourierConfig,
        responder: BoxedResponder,
        register: F,
    ) -> RuntimeResult<Self>
    where
        F: FnOnce(&mut DispatcherBuilder),
    {
        validate_config(config)?;
        logging::init_from_config(&config.logging);

        let mut builder = Dispatcher::builder(config.bot.identity());
        builder.fanout(config.dispatch.fanout);
        register(&mut builder);

        info!(
            username = ?config.bot.username,
            fanout = ?config.dispatch.fanout,
            timeout_ms = config.dispatch.update_timeout_ms,
            skip_malformed = config.dispatch.skip_malformed,
            "Runtime initialized from configuration"
        );

        Ok(Self::new(builder.build(), responder)
            .with_timeout(config.dispatch.update_timeout())
            .skip_malformed(config.dispatch.skip_malformed))
    }

    /// Replaces the decoder.
    pub fn with_decoder(mut self, decoder: impl Decoder) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Sets the per-update timeout. `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether malformed updates are skipped (`true`) or returned as errors.
    pub fn skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Decodes and dispatches one raw payload.
    pub async fn handle_raw(&self, bytes: &[u8]) -> RuntimeResult<Outcome> {
        let update = self.decoder.decode(bytes).map_err(|err| {
            warn!(error = %err, len = bytes.len(), "Failed to decode update");
            RuntimeError::from(err)
        })?;
        self.handle_update(update).await
    }

    /// Dispatches one decoded update.
    ///
    /// On timeout the dispatch future is dropped, cancelling any handler
    /// still running.
    pub async fn handle_update(&self, update: Update) -> RuntimeResult<Outcome> {
        let update_id = update.update_id;
        let process = self.dispatcher.process(update, Arc::clone(&self.responder));

        let result = match self.timeout {
            Some(after) => match tokio::time::timeout(after, process).await {
                Ok(result) => result,
                Err(_) => {
                    error!(update_id, ?after, "Update timed out");
                    return Err(RuntimeError::Timeout { update_id, after });
                }
            },
            None => process.await,
        };

        match result {
            Ok(outcome) => {
                debug!(update_id, ?outcome, "Update processed");
                Ok(outcome)
            }
            Err(err @ DispatchError::MalformedUpdate { .. }) if self.skip_malformed => {
                warn!(update_id, error = %err, "Skipping malformed update");
                Ok(Outcome::Skipped)
            }
            Err(err) => {
                error!(update_id, error = %err, "Update dispatch failed");
                Err(err.into())
            }
        }
    }

    /// Processes a polling batch serially, in order.
    ///
    /// A failing update does not stop the batch; every payload gets its own
    /// result.
    pub async fn handle_batch<I, B>(&self, batch: I) -> Vec<RuntimeResult<Outcome>>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut results = Vec::new();
        for raw in batch {
            results.push(self.handle_raw(raw.as_ref()).await);
        }

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(total = results.len(), failed, "Batch processed");
        results
    }
}

impl std::fmt::Debug for UpdateRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("timeout", &self.timeout)
            .field("skip_malformed", &self.skip_malformed)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for creating an [`UpdateRuntime`] from configuration sources.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = UpdateRuntime::builder()
///     .config_file("config/courier.toml")
///     .profile("production")
///     .build(responder, register_handlers)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder that searches the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a complete configuration over every other source.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build<F>(self, responder: BoxedResponder, register: F) -> RuntimeResult<UpdateRuntime>
    where
        F: FnOnce(&mut DispatcherBuilder),
    {
        let config = self.config_loader.load()?;
        UpdateRuntime::from_config(&config, responder, register)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
