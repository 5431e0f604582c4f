//! The per-category registries a dispatcher owns.
//!
//! | category                                    | policy     |
//! |---------------------------------------------|------------|
//! | message, edited message, channel post, edited channel post, business message, edited business message | first match (commands checked first) |
//! | callback query                              | first match |
//! | inline query, chosen inline result          | first match |
//! | shipping query, pre-checkout query          | first match |
//! | purchased paid media                        | first match |
//! | chat join request                           | first match |
//! | business connection, deleted business messages | first match |
//! | chat member, my chat member                 | fan-out    |
//! | poll, poll answer                           | fan-out    |
//! | message reaction, message reaction count    | fan-out    |
//!
//! Queries and payments expect exactly one answer, so their registries pick
//! one handler. Membership changes, polls and reactions are observed by
//! independent listeners; an `any` entry runs alongside specific ones there.

use courier_core::{
    BusinessConnection, BusinessMessagesDeleted, CallbackQuery, Category, ChatJoinRequest,
    ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message, MessageReactionCountUpdated,
    MessageReactionUpdated, PaidMediaPurchased, Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
};

use crate::registry::{DispatchPolicy, HandlerRegistry};

macro_rules! registries {
    ($($(#[$meta:meta])* $field:ident: $payload:ty => $category:ident, $policy:ident;)*) => {
        /// Every category's handler registry, owned by one dispatcher.
        #[derive(Debug, Clone)]
        pub struct Registries {
            $(pub(crate) $field: HandlerRegistry<$payload>,)*
        }

        impl Default for Registries {
            fn default() -> Self {
                Self {
                    $($field: HandlerRegistry::new(Category::$category, DispatchPolicy::$policy),)*
                }
            }
        }

        impl Registries {
            $(
                $(#[$meta])*
                pub fn $field(&mut self) -> &mut HandlerRegistry<$payload> {
                    &mut self.$field
                }
            )*

            /// Total number of registered entries across categories.
            pub fn len(&self) -> usize {
                0 $(+ self.$field.len())*
            }

            /// Returns `true` if no category has any entry.
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }
    };
}

registries! {
    /// New messages.
    message: Message => Message, FirstMatch;
    edited_message: Message => EditedMessage, FirstMatch;
    channel_post: Message => ChannelPost, FirstMatch;
    edited_channel_post: Message => EditedChannelPost, FirstMatch;
    business_message: Message => BusinessMessage, FirstMatch;
    edited_business_message: Message => EditedBusinessMessage, FirstMatch;
    /// Inline keyboard presses.
    callback: CallbackQuery => CallbackQuery, FirstMatch;
    inline_query: InlineQuery => InlineQuery, FirstMatch;
    chosen_inline_result: ChosenInlineResult => ChosenInlineResult, FirstMatch;
    shipping_query: ShippingQuery => ShippingQuery, FirstMatch;
    pre_checkout_query: PreCheckoutQuery => PreCheckoutQuery, FirstMatch;
    paid_media: PaidMediaPurchased => PurchasedPaidMedia, FirstMatch;
    poll: Poll => Poll, FanOut;
    poll_answer: PollAnswer => PollAnswer, FanOut;
    /// Changes to the bot's own membership.
    my_chat_member: ChatMemberUpdated => MyChatMember, FanOut;
    /// Changes to other users' membership.
    chat_member: ChatMemberUpdated => ChatMember, FanOut;
    join_request: ChatJoinRequest => ChatJoinRequest, FirstMatch;
    reaction: MessageReactionUpdated => MessageReaction, FanOut;
    reaction_count: MessageReactionCountUpdated => MessageReactionCount, FanOut;
    business_connection: BusinessConnection => BusinessConnection, FirstMatch;
    deleted_business_messages: BusinessMessagesDeleted => DeletedBusinessMessages, FirstMatch;
}
