//! Updates and their classification.
//!
//! An [`Update`] is the decoded, wire-shaped event: one optional field per
//! payload variant. A well-formed update has exactly one of them populated.
//! [`classify`] checks that invariant and names the [`Category`];
//! [`Update::payload`] returns the same answer as a borrowed tagged union so
//! the dispatcher matches on it once instead of probing fields repeatedly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::model::{
    BusinessConnection, BusinessMessagesDeleted, CallbackQuery, ChatJoinRequest,
    ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message, MessageReactionCountUpdated,
    MessageReactionUpdated, PaidMediaPurchased, Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
};

/// The closed set of update categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    CallbackQuery,
    InlineQuery,
    ChosenInlineResult,
    ShippingQuery,
    PreCheckoutQuery,
    PurchasedPaidMedia,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    MessageReaction,
    MessageReactionCount,
    BusinessConnection,
    BusinessMessage,
    EditedBusinessMessage,
    DeletedBusinessMessages,
}

impl Category {
    /// Every category, in wire field order.
    pub const ALL: [Category; 21] = [
        Self::Message,
        Self::EditedMessage,
        Self::ChannelPost,
        Self::EditedChannelPost,
        Self::CallbackQuery,
        Self::InlineQuery,
        Self::ChosenInlineResult,
        Self::ShippingQuery,
        Self::PreCheckoutQuery,
        Self::PurchasedPaidMedia,
        Self::Poll,
        Self::PollAnswer,
        Self::MyChatMember,
        Self::ChatMember,
        Self::ChatJoinRequest,
        Self::MessageReaction,
        Self::MessageReactionCount,
        Self::BusinessConnection,
        Self::BusinessMessage,
        Self::EditedBusinessMessage,
        Self::DeletedBusinessMessages,
    ];

    /// Snake-case name, matching the wire field of the payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::EditedMessage => "edited_message",
            Self::ChannelPost => "channel_post",
            Self::EditedChannelPost => "edited_channel_post",
            Self::CallbackQuery => "callback_query",
            Self::InlineQuery => "inline_query",
            Self::ChosenInlineResult => "chosen_inline_result",
            Self::ShippingQuery => "shipping_query",
            Self::PreCheckoutQuery => "pre_checkout_query",
            Self::PurchasedPaidMedia => "purchased_paid_media",
            Self::Poll => "poll",
            Self::PollAnswer => "poll_answer",
            Self::MyChatMember => "my_chat_member",
            Self::ChatMember => "chat_member",
            Self::ChatJoinRequest => "chat_join_request",
            Self::MessageReaction => "message_reaction",
            Self::MessageReactionCount => "message_reaction_count",
            Self::BusinessConnection => "business_connection",
            Self::BusinessMessage => "business_message",
            Self::EditedBusinessMessage => "edited_business_message",
            Self::DeletedBusinessMessages => "deleted_business_messages",
        }
    }

    /// Returns `true` for the categories whose payload is a [`Message`].
    pub fn is_message_like(self) -> bool {
        matches!(
            self,
            Self::Message
                | Self::EditedMessage
                | Self::ChannelPost
                | Self::EditedChannelPost
                | Self::BusinessMessage
                | Self::EditedBusinessMessage
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded update as produced by the external decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
    #[serde(default)]
    pub channel_post: Option<Message>,
    #[serde(default)]
    pub edited_channel_post: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
    #[serde(default)]
    pub chosen_inline_result: Option<ChosenInlineResult>,
    #[serde(default)]
    pub shipping_query: Option<ShippingQuery>,
    #[serde(default)]
    pub pre_checkout_query: Option<PreCheckoutQuery>,
    #[serde(default)]
    pub purchased_paid_media: Option<PaidMediaPurchased>,
    #[serde(default)]
    pub poll: Option<Poll>,
    #[serde(default)]
    pub poll_answer: Option<PollAnswer>,
    #[serde(default)]
    pub my_chat_member: Option<ChatMemberUpdated>,
    #[serde(default)]
    pub chat_member: Option<ChatMemberUpdated>,
    #[serde(default)]
    pub chat_join_request: Option<ChatJoinRequest>,
    #[serde(default)]
    pub message_reaction: Option<MessageReactionUpdated>,
    #[serde(default)]
    pub message_reaction_count: Option<MessageReactionCountUpdated>,
    #[serde(default)]
    pub business_connection: Option<BusinessConnection>,
    #[serde(default)]
    pub business_message: Option<Message>,
    #[serde(default)]
    pub edited_business_message: Option<Message>,
    #[serde(default)]
    pub deleted_business_messages: Option<BusinessMessagesDeleted>,
}

/// Borrowed view of the single populated payload of an [`Update`].
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Message(&'a Message),
    EditedMessage(&'a Message),
    ChannelPost(&'a Message),
    EditedChannelPost(&'a Message),
    CallbackQuery(&'a CallbackQuery),
    InlineQuery(&'a InlineQuery),
    ChosenInlineResult(&'a ChosenInlineResult),
    ShippingQuery(&'a ShippingQuery),
    PreCheckoutQuery(&'a PreCheckoutQuery),
    PurchasedPaidMedia(&'a PaidMediaPurchased),
    Poll(&'a Poll),
    PollAnswer(&'a PollAnswer),
    MyChatMember(&'a ChatMemberUpdated),
    ChatMember(&'a ChatMemberUpdated),
    ChatJoinRequest(&'a ChatJoinRequest),
    MessageReaction(&'a MessageReactionUpdated),
    MessageReactionCount(&'a MessageReactionCountUpdated),
    BusinessConnection(&'a BusinessConnection),
    BusinessMessage(&'a Message),
    EditedBusinessMessage(&'a Message),
    DeletedBusinessMessages(&'a BusinessMessagesDeleted),
}

impl<'a> Payload<'a> {
    /// The category this payload belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Message(_) => Category::Message,
            Self::EditedMessage(_) => Category::EditedMessage,
            Self::ChannelPost(_) => Category::ChannelPost,
            Self::EditedChannelPost(_) => Category::EditedChannelPost,
            Self::CallbackQuery(_) => Category::CallbackQuery,
            Self::InlineQuery(_) => Category::InlineQuery,
            Self::ChosenInlineResult(_) => Category::ChosenInlineResult,
            Self::ShippingQuery(_) => Category::ShippingQuery,
            Self::PreCheckoutQuery(_) => Category::PreCheckoutQuery,
            Self::PurchasedPaidMedia(_) => Category::PurchasedPaidMedia,
            Self::Poll(_) => Category::Poll,
            Self::PollAnswer(_) => Category::PollAnswer,
            Self::MyChatMember(_) => Category::MyChatMember,
            Self::ChatMember(_) => Category::ChatMember,
            Self::ChatJoinRequest(_) => Category::ChatJoinRequest,
            Self::MessageReaction(_) => Category::MessageReaction,
            Self::MessageReactionCount(_) => Category::MessageReactionCount,
            Self::BusinessConnection(_) => Category::BusinessConnection,
            Self::BusinessMessage(_) => Category::BusinessMessage,
            Self::EditedBusinessMessage(_) => Category::EditedBusinessMessage,
            Self::DeletedBusinessMessages(_) => Category::DeletedBusinessMessages,
        }
    }

    /// The message carried by message-like payloads.
    pub fn message(&self) -> Option<&'a Message> {
        match *self {
            Self::Message(m)
            | Self::EditedMessage(m)
            | Self::ChannelPost(m)
            | Self::EditedChannelPost(m)
            | Self::BusinessMessage(m)
            | Self::EditedBusinessMessage(m) => Some(m),
            _ => None,
        }
    }
}

impl Update {
    /// Returns the first populated payload in field order, and how many
    /// variants are populated in total.
    fn first_populated(&self) -> (Option<Payload<'_>>, usize) {
        let mut first = None;
        let mut count = 0;
        macro_rules! scan {
            ($($field:ident => $variant:ident),* $(,)?) => {
                $(
                    if let Some(v) = &self.$field {
                        count += 1;
                        if first.is_none() {
                            first = Some(Payload::$variant(v));
                        }
                    }
                )*
            };
        }
        scan! {
            message => Message,
            edited_message => EditedMessage,
            channel_post => ChannelPost,
            edited_channel_post => EditedChannelPost,
            callback_query => CallbackQuery,
            inline_query => InlineQuery,
            chosen_inline_result => ChosenInlineResult,
            shipping_query => ShippingQuery,
            pre_checkout_query => PreCheckoutQuery,
            purchased_paid_media => PurchasedPaidMedia,
            poll => Poll,
            poll_answer => PollAnswer,
            my_chat_member => MyChatMember,
            chat_member => ChatMember,
            chat_join_request => ChatJoinRequest,
            message_reaction => MessageReaction,
            message_reaction_count => MessageReactionCount,
            business_connection => BusinessConnection,
            business_message => BusinessMessage,
            edited_business_message => EditedBusinessMessage,
            deleted_business_messages => DeletedBusinessMessages,
        }
        (first, count)
    }

    /// Returns the single populated payload.
    ///
    /// Fails with [`DispatchError::MalformedUpdate`] when zero or several
    /// variants are populated.
    pub fn payload(&self) -> Result<Payload<'_>, DispatchError> {
        match self.first_populated() {
            (Some(payload), 1) => Ok(payload),
            (_, n) => Err(DispatchError::MalformedUpdate {
                update_id: self.update_id,
                populated: n,
            }),
        }
    }

    /// The message of a message-like update, if any.
    pub fn message_like(&self) -> Option<&Message> {
        self.payload().ok().and_then(|p| p.message())
    }

    /// Creates an update carrying a new message.
    pub fn from_message(update_id: i64, message: Message) -> Self {
        Self {
            update_id,
            message: Some(message),
            ..Default::default()
        }
    }

    /// Creates an update carrying a callback query.
    pub fn from_callback(update_id: i64, query: CallbackQuery) -> Self {
        Self {
            update_id,
            callback_query: Some(query),
            ..Default::default()
        }
    }
}

/// Determines the category of an update.
pub fn classify(update: &Update) -> Result<Category, DispatchError> {
    update.payload().map(|p| p.category())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_classify_message() {
        let update = Update::from_message(1, Message::text(10, "hi"));
        assert_eq!(classify(&update).unwrap(), Category::Message);
    }

    #[test]
    fn test_classify_each_variant() {
        macro_rules! case {
            ($field:ident, $category:ident) => {
                (
                    Update {
                        $field: Some(Default::default()),
                        ..Default::default()
                    },
                    Category::$category,
                )
            };
        }

        let cases = [
            case!(message, Message),
            case!(edited_message, EditedMessage),
            case!(channel_post, ChannelPost),
            case!(edited_channel_post, EditedChannelPost),
            case!(callback_query, CallbackQuery),
            case!(inline_query, InlineQuery),
            case!(chosen_inline_result, ChosenInlineResult),
            case!(shipping_query, ShippingQuery),
            case!(pre_checkout_query, PreCheckoutQuery),
            case!(purchased_paid_media, PurchasedPaidMedia),
            case!(poll, Poll),
            case!(poll_answer, PollAnswer),
            case!(my_chat_member, MyChatMember),
            case!(chat_member, ChatMember),
            case!(chat_join_request, ChatJoinRequest),
            case!(message_reaction, MessageReaction),
            case!(message_reaction_count, MessageReactionCount),
            case!(business_connection, BusinessConnection),
            case!(business_message, BusinessMessage),
            case!(edited_business_message, EditedBusinessMessage),
            case!(deleted_business_messages, DeletedBusinessMessages),
        ];

        let mut covered = HashSet::new();
        for (update, expected) in &cases {
            assert_eq!(classify(update).unwrap(), *expected);
            assert_eq!(update.payload().unwrap().category(), *expected);
            assert_eq!(expected.as_str(), expected.to_string());
            covered.insert(*expected);
        }
        assert_eq!(covered, HashSet::from(Category::ALL));
    }

    #[test]
    fn test_classify_decoded_json() {
        let raw = r#"{"update_id":3,"chat_join_request":{"chat":{"id":-1},"from":{"id":5,"first_name":"Bo"},"user_chat_id":5,"date":0}}"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        assert_eq!(classify(&update).unwrap(), Category::ChatJoinRequest);
    }

    #[test]
    fn test_empty_update_is_malformed() {
        let update = Update {
            update_id: 7,
            ..Default::default()
        };
        match classify(&update) {
            Err(DispatchError::MalformedUpdate {
                update_id,
                populated,
            }) => {
                assert_eq!(update_id, 7);
                assert_eq!(populated, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_two_payloads_is_malformed() {
        let update = Update {
            message: Some(Message::default()),
            callback_query: Some(CallbackQuery::default()),
            ..Default::default()
        };
        assert!(matches!(
            classify(&update),
            Err(DispatchError::MalformedUpdate { populated: 2, .. })
        ));
    }

    #[test]
    fn test_payload_message_accessor() {
        let update = Update {
            edited_channel_post: Some(Message::text(5, "post")),
            ..Default::default()
        };
        let payload = update.payload().unwrap();
        assert_eq!(payload.category(), Category::EditedChannelPost);
        assert_eq!(payload.message().map(|m| m.plain_text()), Some("post"));
        assert!(payload.category().is_message_like());
    }
}
