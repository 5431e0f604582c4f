//! Update dispatcher for the Courier framework.
//!
//! Registration happens on a [`DispatcherBuilder`]; [`DispatcherBuilder::build`]
//! freezes everything into an immutable [`Dispatcher`] that is cheap to clone
//! and safe to share across tasks.
//!
//! # Dispatch Steps
//!
//! For every update handed to [`Dispatcher::process`]:
//!
//! 1. A [`Context`] is created; category and member transition are derived
//! 2. The middleware chain runs; an error aborts dispatch
//! 3. A malformed update is reported as [`DispatchError::MalformedUpdate`]
//! 4. Message-like updates try the command registry, then the content entries
//! 5. Other categories go to their registry, per its pinned policy
//!
//! ```rust,ignore
//! let mut builder = Dispatcher::builder(BotIdentity::new("ThisBot"));
//! builder.use_middleware(block_spam);
//! builder.command("ban", on_ban).register();
//! builder.on().message().text(on_text);
//! builder.on().callback().prefix("page:", on_page);
//! builder.on().chat_member().joined(on_join);
//! let dispatcher = builder.build();
//!
//! dispatcher.process(update, responder).await?;
//! ```

use std::sync::Arc;
use std::task::Poll;

use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, Level, debug, span, warn};

use crate::command::{CommandBuilder, CommandRegistry};
use crate::context::Context;
use crate::handler::Handler;
use crate::middleware::MiddlewareChain;
use crate::registries::Registries;
use crate::registry::{FanOutMode, HandlerRegistry};
use courier_core::{
    BotIdentity, BoxedResponder, Category, ChatMemberUpdated, DispatchError, Message, Payload,
    Update,
};

/// What happened to an update that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// At least one handler ran.
    Handled {
        category: Category,
        /// How many handlers ran.
        handlers: usize,
    },
    /// No entry matched, or a member update had an unchanged status.
    Unhandled { category: Category },
    /// The update was malformed and the caller chose to skip it.
    Skipped,
}

impl Outcome {
    /// Returns `true` if at least one handler ran.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// The update's category, if it was well-formed.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Handled { category, .. } | Self::Unhandled { category } => Some(*category),
            Self::Skipped => None,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects middleware, commands and category handlers before dispatch starts.
#[derive(Debug)]
pub struct DispatcherBuilder {
    identity: BotIdentity,
    middleware: MiddlewareChain,
    commands: CommandRegistry,
    registries: Registries,
    fanout: FanOutMode,
}

impl DispatcherBuilder {
    /// Creates an empty builder for the bot with the given identity.
    pub fn new(identity: BotIdentity) -> Self {
        Self {
            identity,
            middleware: MiddlewareChain::new(),
            commands: CommandRegistry::new(),
            registries: Registries::default(),
            fanout: FanOutMode::default(),
        }
    }

    /// Appends a middleware. Middleware run in registration order.
    pub fn use_middleware<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.middleware.push(handler);
        self
    }

    /// Per-category registration surfaces.
    pub fn on(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// Starts registering a command.
    pub fn command<F, T>(&mut self, name: &str, handler: F) -> CommandBuilder<'_>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.commands.command(name, handler)
    }

    /// Sets how fan-out categories execute their matching entries.
    pub fn fanout(&mut self, mode: FanOutMode) -> &mut Self {
        self.fanout = mode;
        self
    }

    /// Freezes the registrations into a dispatcher.
    pub fn build(self) -> Dispatcher {
        debug!(
            middleware = self.middleware.len(),
            commands = self.commands.len(),
            handlers = self.registries.len(),
            fanout = ?self.fanout,
            "Dispatcher built"
        );

        Dispatcher {
            inner: Arc::new(DispatcherInner {
                identity: self.identity,
                middleware: self.middleware,
                commands: self.commands,
                registries: self.registries,
                fanout: self.fanout,
            }),
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

#[derive(Debug)]
struct DispatcherInner {
    identity: BotIdentity,
    middleware: MiddlewareChain,
    commands: CommandRegistry,
    registries: Registries,
    fanout: FanOutMode,
}

/// The central update dispatcher.
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync` and holds no per-update state, so
/// [`process`](Self::process) can be called concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Shorthand for [`DispatcherBuilder::new`].
    pub fn builder(identity: BotIdentity) -> DispatcherBuilder {
        DispatcherBuilder::new(identity)
    }

    /// The identity commands are matched against.
    pub fn identity(&self) -> &BotIdentity {
        &self.inner.identity
    }

    /// The fan-out mode chosen at build time.
    pub fn fanout(&self) -> FanOutMode {
        self.inner.fanout
    }

    /// Dispatches one update.
    ///
    /// Handlers run on the calling task. "Nothing matched" is
    /// `Ok(Outcome::Unhandled)`, not an error.
    pub async fn process(
        &self,
        update: impl Into<Arc<Update>>,
        responder: BoxedResponder,
    ) -> Result<Outcome, DispatchError> {
        let update = update.into();
        let ctx = Arc::new(Context::new(
            Arc::clone(&update),
            self.inner.identity.clone(),
            responder,
        ));

        let span = span!(
            Level::DEBUG,
            "dispatch",
            update_id = update.update_id,
            category = ctx.category().map_or("malformed", Category::as_str),
        );

        self.process_in(&update, &ctx).instrument(span).await
    }

    async fn process_in(&self, update: &Update, ctx: &Arc<Context>) -> Result<Outcome, DispatchError> {
        self.inner.middleware.run(ctx).await?;

        let payload = match update.payload() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(update_id = update.update_id, error = %err, "Malformed update");
                return Err(err);
            }
        };

        let category = payload.category();
        let handlers = self.route(payload, ctx).await?;
        debug!(handlers, "Dispatch finished");

        Ok(if handlers == 0 {
            Outcome::Unhandled { category }
        } else {
            Outcome::Handled { category, handlers }
        })
    }

    async fn route(&self, payload: Payload<'_>, ctx: &Arc<Context>) -> Result<usize, DispatchError> {
        let r = &self.inner.registries;
        let mode = self.inner.fanout;

        match payload {
            Payload::Message(m) => self.route_message(&r.message, m, ctx).await,
            Payload::EditedMessage(m) => self.route_message(&r.edited_message, m, ctx).await,
            Payload::ChannelPost(m) => self.route_message(&r.channel_post, m, ctx).await,
            Payload::EditedChannelPost(m) => {
                self.route_message(&r.edited_channel_post, m, ctx).await
            }
            Payload::BusinessMessage(m) => self.route_message(&r.business_message, m, ctx).await,
            Payload::EditedBusinessMessage(m) => {
                self.route_message(&r.edited_business_message, m, ctx).await
            }
            Payload::CallbackQuery(q) => r.callback.dispatch(q, ctx, mode).await,
            Payload::InlineQuery(q) => r.inline_query.dispatch(q, ctx, mode).await,
            Payload::ChosenInlineResult(q) => r.chosen_inline_result.dispatch(q, ctx, mode).await,
            Payload::ShippingQuery(q) => r.shipping_query.dispatch(q, ctx, mode).await,
            Payload::PreCheckoutQuery(q) => r.pre_checkout_query.dispatch(q, ctx, mode).await,
            Payload::PurchasedPaidMedia(p) => r.paid_media.dispatch(p, ctx, mode).await,
            Payload::Poll(p) => r.poll.dispatch(p, ctx, mode).await,
            Payload::PollAnswer(p) => r.poll_answer.dispatch(p, ctx, mode).await,
            Payload::MyChatMember(c) => self.route_member(&r.my_chat_member, c, ctx).await,
            Payload::ChatMember(c) => self.route_member(&r.chat_member, c, ctx).await,
            Payload::ChatJoinRequest(j) => r.join_request.dispatch(j, ctx, mode).await,
            Payload::MessageReaction(m) => r.reaction.dispatch(m, ctx, mode).await,
            Payload::MessageReactionCount(m) => r.reaction_count.dispatch(m, ctx, mode).await,
            Payload::BusinessConnection(b) => r.business_connection.dispatch(b, ctx, mode).await,
            Payload::DeletedBusinessMessages(d) => {
                r.deleted_business_messages.dispatch(d, ctx, mode).await
            }
        }
    }

    async fn route_message(
        &self,
        registry: &HandlerRegistry<Message>,
        message: &Message,
        ctx: &Arc<Context>,
    ) -> Result<usize, DispatchError> {
        if self
            .inner
            .commands
            .dispatch(registry.category(), message, ctx)
            .await?
        {
            return Ok(1);
        }
        registry.dispatch(message, ctx, self.inner.fanout).await
    }

    async fn route_member(
        &self,
        registry: &HandlerRegistry<ChatMemberUpdated>,
        change: &ChatMemberUpdated,
        ctx: &Arc<Context>,
    ) -> Result<usize, DispatchError> {
        if ctx.transition().is_some_and(|t| t.is_unchanged()) {
            debug!("Member status unchanged, no handler fires");
            return Ok(0);
        }
        registry.dispatch(change, ctx, self.inner.fanout).await
    }
}

// ============================================================================
// Tower Service Implementation for Dispatcher
// ============================================================================

/// A single update plus the responder its handlers should use.
#[derive(Clone)]
pub struct DispatchRequest {
    pub update: Arc<Update>,
    pub responder: BoxedResponder,
}

impl DispatchRequest {
    pub fn new(update: impl Into<Arc<Update>>, responder: BoxedResponder) -> Self {
        Self {
            update: update.into(),
            responder,
        }
    }
}

impl std::fmt::Debug for DispatchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRequest")
            .field("update_id", &self.update.update_id)
            .finish_non_exhaustive()
    }
}

/// Tower Service implementation for Dispatcher.
///
/// This allows a transport to stack tower layers (timeouts, concurrency
/// limits) in front of dispatch.
///
/// ```rust,ignore
/// use tower::{ServiceBuilder, ServiceExt};
///
/// let svc = ServiceBuilder::new()
///     .concurrency_limit(64)
///     .service(dispatcher);
/// svc.oneshot(DispatchRequest::new(update, responder)).await?;
/// ```
impl Service<DispatchRequest> for Dispatcher {
    type Response = Outcome;
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<Outcome, DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DispatchRequest) -> Self::Future {
        let dispatcher = self.clone();
        Box::pin(async move { dispatcher.process(req.update, req.responder).await })
    }
}

/// Statically asserts that a dispatcher can be shared across tasks.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Dispatcher>();
};
