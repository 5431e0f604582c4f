//! # Courier Core
//!
//! The data layer of the Courier update-dispatch framework.
//!
//! This crate holds everything that can be decided without running a handler:
//! the decoded [`Update`] model, its [`Category`], the chat-member
//! [`Transition`] classifier and the pure predicates registrations are built
//! from. The async machinery (registries, middleware, the dispatcher) lives in
//! `courier-framework`.
//!
//! ## Layout
//!
//! - **Model** ([`model`]): wire-shaped payloads produced by an external decoder
//! - **Updates** ([`update`]): the [`Update`] envelope, [`classify`] and [`Payload`]
//! - **Transitions** ([`transition`]): `(old, new)` status pair to [`Transition`]
//! - **Predicates** ([`predicate`]): content kinds, callback data and commands
//! - **Bot** ([`bot`]): [`BotIdentity`] and the [`Responder`] side channel
//!
//! ## Example
//!
//! ```rust
//! use courier_core::{Category, Message, Update, classify};
//!
//! let update = Update::from_message(1, Message::text(42, "/start"));
//! assert_eq!(classify(&update).unwrap(), Category::Message);
//! ```

pub mod bot;
pub mod error;
pub mod model;
pub mod predicate;
pub mod transition;
pub mod update;

pub use bot::{BotIdentity, BoxedResponder, NullResponder, Responder, downcast_responder};
pub use error::{
    ApiError, ApiResult, BoxError, DispatchError, DispatchResult, HandlerFailure,
};
pub use model::*;
pub use predicate::{CommandPattern, CommandText, ContentKind, DEFAULT_TRIGGER};
pub use transition::{MemberStatus, Transition};
pub use update::{Category, Payload, Update, classify};

/// Prelude for common imports.
pub mod prelude {
    pub use super::bot::{BotIdentity, BoxedResponder, Responder};
    pub use super::error::{BoxError, DispatchError, DispatchResult};
    pub use super::predicate::{CommandPattern, ContentKind};
    pub use super::transition::{MemberStatus, Transition};
    pub use super::update::{Category, Payload, Update, classify};
}
