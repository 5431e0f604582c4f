//! Middleware chain.
//!
//! Middleware are handlers without a predicate: every one of them runs, in
//! registration order, for every update before category dispatch. A
//! middleware that returns an error stops the chain and no category handler
//! runs for that update.
//!
//! Filtering is the middleware's own job. It inspects the update through its
//! extractors and returns `Ok(())` when it does not apply:
//!
//! ```rust,ignore
//! async fn admin_buttons(q: Option<CallbackQuery>) -> Result<(), BoxError> {
//!     match q.and_then(|q| q.data) {
//!         Some(data) if data.starts_with("admin:") => Err("forbidden".into()),
//!         _ => Ok(()),
//!     }
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, into_handler};
use courier_core::DispatchError;

/// Ordered list of middleware handlers.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    entries: Vec<BoxedHandler>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware.
    pub fn push<F, T>(&mut self, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.entries.push(into_handler(handler));
    }

    /// Appends a pre-built boxed handler.
    pub fn push_boxed(&mut self, handler: BoxedHandler) {
        self.entries.push(handler);
    }

    /// Returns the number of middleware.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no middleware is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every middleware in order, stopping at the first error.
    pub async fn run(&self, ctx: &Arc<Context>) -> Result<(), DispatchError> {
        for (index, middleware) in self.entries.iter().enumerate() {
            trace!(index, "Running middleware");
            if let Err(source) = middleware(Arc::clone(ctx)).await {
                debug!(index, error = %source, "Middleware aborted dispatch");
                return Err(DispatchError::MiddlewareAborted { index, source });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{BotIdentity, Message, NullResponder, Update};
    use parking_lot::Mutex;

    fn ctx() -> Arc<Context> {
        Arc::new(Context::new(
            Arc::new(Update::from_message(1, Message::text(1, "x"))),
            BotIdentity::anonymous(),
            Arc::new(NullResponder),
        ))
    }

    #[tokio::test]
    async fn test_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        for i in 0..3 {
            let log = Arc::clone(&log);
            chain.push(move || {
                let log = Arc::clone(&log);
                async move { log.lock().push(i) }
            });
        }

        chain.run(&ctx()).await.unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_error_stops_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();

        let first = Arc::clone(&log);
        chain.push(move || {
            let log = Arc::clone(&first);
            async move { log.lock().push("first") }
        });
        chain.push(|| async { Err::<(), _>("stop") });
        let third = Arc::clone(&log);
        chain.push(move || {
            let log = Arc::clone(&third);
            async move { log.lock().push("third") }
        });

        match chain.run(&ctx()).await {
            Err(DispatchError::MiddlewareAborted { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source.to_string(), "stop");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(*log.lock(), vec!["first"]);
    }
}
