//! Handler registries.
//!
//! A [`HandlerRegistry<P>`] is the ordered list of `(predicate, handler)`
//! entries for one category whose payload type is `P`. Entries are appended
//! in call order and never reordered or removed.
//!
//! Every registry pins its [`DispatchPolicy`] at construction:
//!
//! - [`FirstMatch`](DispatchPolicy::FirstMatch): predicates are evaluated in
//!   registration order and only the first matching entry runs. Its error is
//!   returned as is.
//! - [`FanOut`](DispatchPolicy::FanOut): every matching entry runs. Failures
//!   are collected and returned together once all of them have finished.
//!
//! Category-specific registration methods (`text`, `equal`, `joined`, ...)
//! live in the submodules as inherent impls on the concrete payload type.

mod callback;
mod member;
mod message;
mod misc;

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, into_handler};
use courier_core::{Category, DispatchError, HandlerFailure};

/// A type-erased check function over a payload.
pub type CheckFn<P> = Arc<dyn Fn(&P, &Context) -> bool + Send + Sync>;

/// How many of a registry's matching entries run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Only the first matching entry runs.
    FirstMatch,
    /// Every matching entry runs.
    FanOut,
}

/// How the entries of a fan-out registry are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOutMode {
    /// One after another, in registration order.
    #[default]
    Sequential,
    /// All at once on the calling task, joined before returning.
    Concurrent,
}

/// One registration: a name for logs and errors, a predicate, and a handler.
pub(crate) struct Entry<P> {
    name: String,
    check: CheckFn<P>,
    handler: BoxedHandler,
}

impl<P> Clone for Entry<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: Arc::clone(&self.check),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<P> Entry<P> {
    async fn run(&self, ctx: Arc<Context>, category: Category) -> Result<(), HandlerFailure> {
        trace!(handler = %self.name, "Executing handler");
        (self.handler)(ctx)
            .await
            .map_err(|source| HandlerFailure {
                category,
                handler: self.name.clone(),
                source,
            })
    }
}

/// Ordered entries for one category.
pub struct HandlerRegistry<P> {
    category: Category,
    policy: DispatchPolicy,
    entries: Vec<Entry<P>>,
}

impl<P> Clone for HandlerRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            category: self.category,
            policy: self.policy,
            entries: self.entries.clone(),
        }
    }
}

impl<P: Send + Sync + 'static> HandlerRegistry<P> {
    /// Creates an empty registry with a fixed policy.
    pub fn new(category: Category, policy: DispatchPolicy) -> Self {
        Self {
            category,
            policy,
            entries: Vec::new(),
        }
    }

    /// The category this registry serves.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The policy fixed at construction.
    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers a handler behind an arbitrary check.
    ///
    /// The check sees the payload and the dispatch context. `name` shows up in
    /// logs and in [`HandlerFailure::handler`].
    pub fn add<C, F, T>(&mut self, name: impl Into<String>, check: C, handler: F) -> &mut Self
    where
        C: Fn(&P, &Context) -> bool + Send + Sync + 'static,
        F: Handler<T>,
        T: 'static,
    {
        self.entries.push(Entry {
            name: name.into(),
            check: Arc::new(check),
            handler: into_handler(handler),
        });
        self
    }

    /// Registers a handler behind a predicate over the payload alone.
    pub fn when<C, F, T>(&mut self, predicate: C, handler: F) -> &mut Self
    where
        C: Fn(&P) -> bool + Send + Sync + 'static,
        F: Handler<T>,
        T: 'static,
    {
        self.add("when", move |p: &P, _: &Context| predicate(p), handler)
    }

    /// Registers a catch-all handler for this category.
    pub fn any<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add("any", |_: &P, _: &Context| true, handler)
    }

    /// Evaluates predicates in order and runs the matching entries per policy.
    ///
    /// Returns how many handlers ran.
    pub(crate) async fn dispatch(
        &self,
        payload: &P,
        ctx: &Arc<Context>,
        mode: FanOutMode,
    ) -> Result<usize, DispatchError> {
        match self.policy {
            DispatchPolicy::FirstMatch => {
                let Some(entry) = self.entries.iter().find(|e| (e.check)(payload, ctx)) else {
                    trace!(category = %self.category, "No entry matched");
                    return Ok(0);
                };

                debug!(category = %self.category, handler = %entry.name, "Entry matched");
                entry
                    .run(Arc::clone(ctx), self.category)
                    .await
                    .map_err(DispatchError::Handler)?;
                Ok(1)
            }
            DispatchPolicy::FanOut => {
                let matched: Vec<&Entry<P>> = self
                    .entries
                    .iter()
                    .filter(|e| (e.check)(payload, ctx))
                    .collect();

                debug!(
                    category = %self.category,
                    matched = matched.len(),
                    ?mode,
                    "Fanning out to matching entries"
                );

                let failures: Vec<HandlerFailure> = match mode {
                    FanOutMode::Sequential => {
                        let mut failures = Vec::new();
                        for entry in &matched {
                            if let Err(failure) = entry.run(Arc::clone(ctx), self.category).await {
                                failures.push(failure);
                            }
                        }
                        failures
                    }
                    FanOutMode::Concurrent => {
                        join_all(
                            matched
                                .iter()
                                .map(|entry| entry.run(Arc::clone(ctx), self.category)),
                        )
                        .await
                        .into_iter()
                        .filter_map(Result::err)
                        .collect()
                    }
                };

                match DispatchError::from_failures(failures) {
                    Some(err) => Err(err),
                    None => Ok(matched.len()),
                }
            }
        }
    }
}

impl<P> std::fmt::Debug for HandlerRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("category", &self.category)
            .field("policy", &self.policy)
            .field(
                "entries",
                &self.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{BotIdentity, NullResponder, Poll, Update};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn poll_ctx() -> (Arc<Context>, Poll) {
        let poll = Poll {
            question: "?".into(),
            ..Default::default()
        };
        let ctx = Arc::new(Context::new(
            Arc::new(Update {
                poll: Some(poll.clone()),
                ..Default::default()
            }),
            BotIdentity::anonymous(),
            Arc::new(NullResponder),
        ));
        (ctx, poll)
    }

    fn counting(counter: &Arc<AtomicUsize>, by: usize) -> impl Handler<()> {
        let counter = Arc::clone(counter);
        move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(by, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_first_match_runs_one() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::<Poll>::new(Category::Poll, DispatchPolicy::FirstMatch);
        registry
            .when(|p: &Poll| p.question == "?", counting(&counter, 1))
            .any(counting(&counter, 10));

        let (ctx, poll) = poll_ctx();
        let ran = registry.dispatch(&poll, &ctx, FanOutMode::Sequential).await.unwrap();
        assert_eq!(ran, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fan_out_runs_all() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::<Poll>::new(Category::Poll, DispatchPolicy::FanOut);
        registry
            .when(|p: &Poll| p.question == "?", counting(&counter, 1))
            .when(|p: &Poll| p.is_closed, counting(&counter, 100))
            .any(counting(&counter, 10));

        let (ctx, poll) = poll_ctx();
        for mode in [FanOutMode::Sequential, FanOutMode::Concurrent] {
            let ran = registry.dispatch(&poll, &ctx, mode).await.unwrap();
            assert_eq!(ran, 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 22);
    }

    #[tokio::test]
    async fn test_fan_out_joins_failures() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::<Poll>::new(Category::Poll, DispatchPolicy::FanOut);
        registry
            .add("first", |_: &Poll, _: &Context| true, || async { Err::<(), _>("one") })
            .any(counting(&counter, 1))
            .add("third", |_: &Poll, _: &Context| true, || async { Err::<(), _>("two") });

        let (ctx, poll) = poll_ctx();
        let err = registry
            .dispatch(&poll, &ctx, FanOutMode::Sequential)
            .await
            .unwrap_err();

        let names: Vec<&str> = err.failures().iter().map(|f| f.handler.as_str()).collect();
        assert_eq!(names, vec!["first", "third"]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_match_propagates_error() {
        let mut registry = HandlerRegistry::<Poll>::new(Category::Poll, DispatchPolicy::FirstMatch);
        registry.add("failing", |_: &Poll, _: &Context| true, || async {
            Err::<(), _>("bad")
        });

        let (ctx, poll) = poll_ctx();
        match registry.dispatch(&poll, &ctx, FanOutMode::Sequential).await {
            Err(DispatchError::Handler(failure)) => {
                assert_eq!(failure.category, Category::Poll);
                assert_eq!(failure.handler, "failing");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
