//! Registration surface for `chat_member` and `my_chat_member`.
//!
//! The transition is derived once per update when the [`Context`] is built;
//! these entries only compare against it. An `Unchanged` transition never
//! reaches the registry, so not even `any` fires for it.

use courier_core::{ChatMemberUpdated, Transition};

use super::HandlerRegistry;
use crate::context::Context;
use crate::handler::Handler;

impl HandlerRegistry<ChatMemberUpdated> {
    /// Registers a handler for one derived transition.
    pub fn transition<F, T>(&mut self, transition: Transition, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add(
            transition.as_str(),
            move |_: &ChatMemberUpdated, ctx: &Context| ctx.transition() == Some(transition),
            handler,
        )
    }

    /// Outside the chat to inside it.
    pub fn joined<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Joined, handler)
    }

    /// Inside the chat to `Left`.
    pub fn left<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Left, handler)
    }

    pub fn banned<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Banned, handler)
    }

    pub fn unbanned<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Unbanned, handler)
    }

    /// To a higher rank inside the chat.
    pub fn promoted<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Promoted, handler)
    }

    /// To a lower rank inside the chat.
    pub fn demoted<F, T>(&mut self, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.transition(Transition::Demoted, handler)
    }
}
