use std::sync::Arc;

use crate::context::Context;
use crate::error::{ExtractError, ExtractResult};
use courier_core::{Category, Transition};

/// A trait for types that can be extracted from a [`Context`].
///
/// Types implementing this trait can be used directly as handler function
/// parameters.
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    ///
    /// # Returns
    ///
    /// `Ok(Self)` if extraction succeeds, `Err(ExtractError)` otherwise.
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self>;
}

/// The whole context, for handlers that want to inspect or store state.
impl FromContext for Arc<Context> {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        Ok(Arc::clone(ctx))
    }
}

/// Implementation for `Option<T>` where `T: FromContext`.
///
/// This allows handlers to have optional parameters that may or may not
/// be extractable from the context.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

impl FromContext for Category {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        ctx.category().ok_or(ExtractError::PayloadMismatch {
            expected: "a well-formed update",
            got: "malformed",
        })
    }
}

/// The derived chat-member transition.
///
/// Only available while dispatching `chat_member` or `my_chat_member` updates.
impl FromContext for Transition {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        ctx.transition().ok_or(ExtractError::MissingTransition)
    }
}
