//! # Courier
//!
//! Update classification and handler dispatch for Telegram-style bots.
//!
//! ## Overview
//!
//! Every incoming update carries exactly one payload. Courier classifies it
//! into a category, runs the middleware chain, and routes it to that
//! category's registry:
//!
//! ```text
//! ┌───────────┐     ┌────────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │ transport │────▶│  Decoder   │────▶│ Middleware │────▶│ commands → message       │
//! │  (bytes)  │     │ (Update)   │     │   chain    │────▶│ callback / inline / ...  │
//! └───────────┘     └────────────┘     └────────────┘────▶│ chat member (transition) │
//!                                                         └──────────────────────────┘
//! ```
//!
//! - **Core**: the update model, classification, predicates and member transitions
//! - **Framework**: handlers, extractors, registries and the `Dispatcher`
//! - **Runtime**: decoding, timeouts, configuration and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn ban(cmd: CommandArgs, msg: Message, api: BoxedResponder) -> Result<(), BoxError> {
//!     api.call_api("banChatMember", json!({ "chat_id": msg.chat.id, "user_id": cmd.args })).await?;
//!     Ok(())
//! }
//!
//! let runtime = UpdateRuntime::builder().build(responder, |bot| {
//!     bot.command("ban", ban).aliases(["b"]).register();
//!     bot.on().chat_member().joined(greet);
//! })?;
//!
//! runtime.handle_raw(&body).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: `courier.toml` configuration files
//! - `yaml-config`: `courier.yaml` configuration files
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{CourierConfig, RuntimeError, UpdateRuntime};

    // Dispatch
    pub use courier_framework::{
        Dispatcher, DispatcherBuilder, FanOutMode, Outcome, Registries,
    };

    // Extractors - for handler parameters
    pub use courier_framework::{Api, CommandArgs, Context, FromContext, UpdateRef};

    // Update model
    pub use courier_core::{
        BotIdentity, BoxError, BoxedResponder, CallbackQuery, Category, ChatMemberUpdated,
        ContentKind, DispatchError, InlineQuery, Message, Responder, Transition, Update,
    };
}
