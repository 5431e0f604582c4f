//! # Courier Framework
//!
//! Registration and dispatch on top of `courier-core`.
//!
//! This layer provides:
//! - Axum-style [`Handler`]s with [`FromContext`] parameter injection
//! - Per-category [`HandlerRegistry`]s with a pinned [`DispatchPolicy`]
//! - The [`CommandRegistry`] with trigger sets, aliases and opt-in flags
//! - The [`MiddlewareChain`] that runs before every dispatch
//! - The [`Dispatcher`], also usable as a `tower::Service`

pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod middleware;
pub mod registries;
pub mod registry;

pub use command::{CommandArgs, CommandBuilder, CommandRegistry};
pub use context::Context;
pub use dispatcher::{DispatchRequest, Dispatcher, DispatcherBuilder, Outcome};
pub use error::{ExtractError, ExtractResult};
pub use extractor::{Api, FromContext, UpdateRef};
pub use handler::{BoxedHandler, Handler, IntoHandlerResult, into_handler};
pub use middleware::MiddlewareChain;
pub use registries::Registries;
pub use registry::{CheckFn, DispatchPolicy, FanOutMode, HandlerRegistry};
