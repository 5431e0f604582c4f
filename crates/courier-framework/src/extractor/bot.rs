use std::sync::Arc;

use crate::context::Context;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromContext;
use courier_core::{BotIdentity, BoxedResponder, Responder, downcast_responder};

/// Context wrapper that provides a concrete responder type.
///
/// Use it when a handler needs the strongly-typed request builders of a
/// specific [`Responder`] implementation rather than raw `call_api`.
#[derive(Clone)]
pub struct Api<T: Responder>(pub Arc<T>);

impl<T: Responder> std::ops::Deref for Api<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Responder + std::fmt::Debug> std::fmt::Debug for Api<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Api").field(&self.0).finish()
    }
}

impl<T: Responder + 'static> FromContext for Api<T> {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        downcast_responder::<T>(ctx.responder_arc())
            .map(Api)
            .ok_or_else(|| {
                ExtractError::custom(format!(
                    "responder is not a {}",
                    std::any::type_name::<T>()
                ))
            })
    }
}

impl FromContext for BoxedResponder {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        Ok(ctx.responder_arc())
    }
}

impl FromContext for BotIdentity {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        Ok(ctx.identity().clone())
    }
}
