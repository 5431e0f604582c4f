//! Registration surface for message-like categories.

use courier_core::{ContentKind, Message};

use super::HandlerRegistry;
use crate::context::Context;
use crate::handler::Handler;

macro_rules! content_shortcuts {
    ($($(#[$meta:meta])* $method:ident => $kind:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $method<F, T>(&mut self, handler: F) -> &mut Self
            where
                F: Handler<T>,
                T: 'static,
            {
                self.content(ContentKind::$kind, handler)
            }
        )*
    };
}

impl HandlerRegistry<Message> {
    /// Registers a handler for messages carrying `kind`.
    pub fn content<F, T>(&mut self, kind: ContentKind, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.add(
            kind.as_str(),
            move |msg: &Message, _: &Context| kind.matches(msg),
            handler,
        )
    }

    content_shortcuts! {
        /// Non-empty text.
        text => Text,
        photo => Photo,
        voice => Voice,
        video => Video,
        audio => Audio,
        sticker => Sticker,
        document => Document,
        location => Location,
        contact => Contact,
        poll => Poll,
        /// Any message that replies to another one, whatever it carries.
        reply => Reply,
        dice => Dice,
        web_app_data => WebAppData,
        successful_payment => SuccessfulPayment,
        refunded_payment => RefundedPayment,
        /// Messages received through a business connection.
        business => Business,
    }
}
