//! Extractor system for the Courier framework.
//!
//! Handler functions declare what they need as parameters; every parameter
//! type implements [`FromContext`] and is pulled out of the per-dispatch
//! [`Context`](crate::Context) before the handler runs.
//!
//! ```rust,ignore
//! async fn on_ban(cmd: CommandArgs, msg: Message, api: BoxedResponder) -> Result<(), BoxError> {
//!     api.call_api("banChatMember", json!({ "chat_id": msg.chat.id, "user_id": cmd.args })).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! If an extractor fails, the handler is not called and the failure is
//! reported as that handler's error. Wrap a parameter in [`Option<T>`] to make
//! it optional.

pub mod bot;
pub mod core;
pub mod payload;

pub use bot::Api;
pub use core::FromContext;
pub use payload::UpdateRef;
