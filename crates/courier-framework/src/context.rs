//! Per-dispatch context handed to middleware and handlers.
//!
//! One [`Context`] is created per [`Dispatcher::process`](crate::Dispatcher::process)
//! call and shared as `Arc<Context>` with every middleware and every matched
//! handler of that update. It carries:
//!
//! - the update itself, read-only;
//! - the derived facts computed once up front: the category and, for
//!   chat-member updates, the [`Transition`];
//! - the bot's identity and its [`Responder`](courier_core::Responder);
//! - a small typed state map for data one step hands to the next (the
//!   command registry stores [`CommandArgs`](crate::CommandArgs) here).

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use courier_core::{
    BotIdentity, BoxedResponder, Category, Payload, Transition, Update,
};

/// The context object passed to handlers during dispatch.
pub struct Context {
    update: Arc<Update>,
    category: Option<Category>,
    transition: Option<Transition>,
    identity: BotIdentity,
    responder: BoxedResponder,
    state: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl Context {
    /// Creates a context for one update.
    ///
    /// The category and member transition are derived here, before any
    /// middleware runs. A malformed update gets `None` for both.
    pub fn new(update: Arc<Update>, identity: BotIdentity, responder: BoxedResponder) -> Self {
        let payload = update.payload().ok();
        let category = payload.map(|p| p.category());
        let transition = match payload {
            Some(Payload::ChatMember(change) | Payload::MyChatMember(change)) => {
                let (old, new) = change.status_pair();
                Some(Transition::classify(old, new))
            }
            _ => None,
        };

        Self {
            update,
            category,
            transition,
            identity,
            responder,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the update being dispatched.
    pub fn update(&self) -> &Update {
        &self.update
    }

    /// Returns a clone of the update `Arc`.
    pub fn update_arc(&self) -> Arc<Update> {
        Arc::clone(&self.update)
    }

    /// The update's category, or `None` if it is malformed.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// The single populated payload, or `None` if the update is malformed.
    pub fn payload(&self) -> Option<Payload<'_>> {
        self.update.payload().ok()
    }

    /// The chat-member transition, for `chat_member` and `my_chat_member` updates.
    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// The identity of the bot receiving this update.
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Returns a reference to the responder.
    pub fn responder(&self) -> &BoxedResponder {
        &self.responder
    }

    /// Returns a clone of the responder `Arc`.
    pub fn responder_arc(&self) -> BoxedResponder {
        Arc::clone(&self.responder)
    }

    /// Stores a value in the per-dispatch state map.
    ///
    /// Only one value per type can be stored; subsequent calls overwrite.
    pub fn set_state<T: Send + Sync + 'static>(&self, value: T) {
        self.state.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value from the state map.
    pub fn get_state<T: Clone + 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns `true` if a value of type `T` exists in the state map.
    pub fn has_state<T: 'static>(&self) -> bool {
        self.state.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value from the state map.
    pub fn take_state<T: 'static>(&self) -> Option<T> {
        self.state
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("update_id", &self.update.update_id)
            .field("category", &self.category)
            .field("transition", &self.transition)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{ChatMember, ChatMemberKind, ChatMemberUpdated, Message, NullResponder, User};

    fn ctx_for(update: Update) -> Context {
        Context::new(Arc::new(update), BotIdentity::new("ThisBot"), Arc::new(NullResponder))
    }

    #[test]
    fn test_message_context() {
        let ctx = ctx_for(Update::from_message(1, Message::text(7, "hi")));
        assert_eq!(ctx.category(), Some(Category::Message));
        assert_eq!(ctx.transition(), None);
        assert!(ctx.payload().is_some());
    }

    #[test]
    fn test_malformed_context() {
        let ctx = ctx_for(Update::default());
        assert_eq!(ctx.category(), None);
        assert!(ctx.payload().is_none());
    }

    #[test]
    fn test_member_transition_is_derived() {
        let user = User::default();
        let change = ChatMemberUpdated {
            old_chat_member: ChatMember::new(user.clone(), ChatMemberKind::Member),
            new_chat_member: ChatMember::new(user, ChatMemberKind::Banned { until_date: 0 }),
            ..Default::default()
        };
        let ctx = ctx_for(Update {
            chat_member: Some(change),
            ..Default::default()
        });
        assert_eq!(ctx.category(), Some(Category::ChatMember));
        assert_eq!(ctx.transition(), Some(Transition::Banned));
    }

    #[test]
    fn test_state_map() {
        let ctx = ctx_for(Update::from_message(1, Message::default()));
        assert!(!ctx.has_state::<String>());
        ctx.set_state("first".to_string());
        ctx.set_state("second".to_string());
        assert_eq!(ctx.get_state::<String>().as_deref(), Some("second"));
        assert_eq!(ctx.take_state::<String>().as_deref(), Some("second"));
        assert!(!ctx.has_state::<String>());
    }
}
