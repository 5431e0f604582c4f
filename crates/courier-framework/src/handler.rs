//! Handler system for the Courier framework.
//!
//! Handlers and middleware are plain async functions. The [`Handler`] trait is
//! implemented for every function taking 0-6 [`FromContext`] parameters and
//! returning a type that implements [`IntoHandlerResult`], similar to Axum's
//! handler system.
//!
//! # Example
//!
//! ```rust,ignore
//! // No parameters, no return value
//! async fn ping() {}
//!
//! // Extractors, fallible
//! async fn greet(msg: Message, api: BoxedResponder) -> Result<(), BoxError> {
//!     api.call_api("sendMessage", json!({ "chat_id": msg.chat.id, "text": "hi" })).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::Context;
use crate::extractor::FromContext;
use courier_core::BoxError;

// ============================================================================
// IntoHandlerResult - Handle handler return values
// ============================================================================

/// A trait for types that can be returned from handlers.
pub trait IntoHandlerResult: Send {
    /// Converts the return value into the dispatcher's result type.
    fn into_handler_result(self) -> Result<(), BoxError>;
}

/// `()` always succeeds.
impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// `Err` is reported to the caller of `process`; nothing is logged here.
impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<BoxError> + Send,
{
    fn into_handler_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for update handlers and middleware.
///
/// # Blanket Implementation
///
/// This trait is automatically implemented for async functions that:
/// - Take 0-6 parameters that implement [`FromContext`]
/// - Return `()` or `Result<(), E>` where `E: Into<BoxError>`
///
/// An extractor failure ends the call with that extraction error; the
/// function body does not run.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given context.
    async fn call(self, ctx: Arc<Context>) -> Result<(), BoxError>;
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in registries
// ============================================================================

/// A type-erased handler that can be stored in collections.
///
/// Internally a closure that captures the original handler and calls it
/// with a cloned copy on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<Context>) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

// ============================================================================
// Handler implementations for functions (Axum-style)
// ============================================================================

/// Macro to generate Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoHandlerResult + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<Context>) -> Result<(), BoxError> {
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                (self)($($ty,)*).await.into_handler_result()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{BotIdentity, CallbackQuery, Message, NullResponder, Update};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message_ctx() -> Arc<Context> {
        Arc::new(Context::new(
            Arc::new(Update::from_message(1, Message::text(5, "hello"))),
            BotIdentity::anonymous(),
            Arc::new(NullResponder),
        ))
    }

    #[tokio::test]
    async fn test_zero_arity_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handler = into_handler(move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        handler(message_ctx()).await.unwrap();
        handler(message_ctx()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_with_extractors() {
        let handler = into_handler(|msg: Message, update: crate::UpdateRef| async move {
            assert_eq!(msg.plain_text(), "hello");
            assert_eq!(update.update_id, 1);
        });
        handler(message_ctx()).await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_is_returned() {
        let handler = into_handler(|| async { Err::<(), _>("nope") });
        let err = handler(message_ctx()).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[tokio::test]
    async fn test_extract_failure_skips_body() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handler = into_handler(move |_q: CallbackQuery| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        let err = handler(message_ctx()).await.unwrap_err();
        assert!(err.to_string().contains("callback_query"));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
