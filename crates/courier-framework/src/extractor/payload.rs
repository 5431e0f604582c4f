use std::sync::Arc;

use crate::context::Context;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromContext;
use courier_core::{
    BusinessConnection, BusinessMessagesDeleted, CallbackQuery, ChatJoinRequest,
    ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message, MessageReactionCountUpdated,
    MessageReactionUpdated, PaidMediaPurchased, Payload, Poll, PollAnswer, PreCheckoutQuery,
    ShippingQuery, Update,
};

/// Shared, read-only access to the whole update.
#[derive(Debug, Clone)]
pub struct UpdateRef(pub Arc<Update>);

impl std::ops::Deref for UpdateRef {
    type Target = Update;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for UpdateRef {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        Ok(UpdateRef(ctx.update_arc()))
    }
}

fn mismatch(ctx: &Context, expected: &'static str) -> ExtractError {
    ExtractError::PayloadMismatch {
        expected,
        got: ctx.category().map_or("malformed", |c| c.as_str()),
    }
}

/// The message of any message-like update: new, edited, channel post or
/// business message.
impl FromContext for Message {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        ctx.payload()
            .and_then(|p| p.message())
            .cloned()
            .ok_or_else(|| mismatch(ctx, "message"))
    }
}

/// Chat-member changes come from either `chat_member` or `my_chat_member`.
impl FromContext for ChatMemberUpdated {
    fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
        match ctx.payload() {
            Some(Payload::ChatMember(change) | Payload::MyChatMember(change)) => Ok(change.clone()),
            _ => Err(mismatch(ctx, "chat_member")),
        }
    }
}

macro_rules! impl_payload_extractor {
    ($($ty:ident => $variant:ident as $name:literal),* $(,)?) => {
        $(
            impl FromContext for $ty {
                fn from_context(ctx: &Arc<Context>) -> ExtractResult<Self> {
                    match ctx.payload() {
                        Some(Payload::$variant(value)) => Ok(value.clone()),
                        _ => Err(mismatch(ctx, $name)),
                    }
                }
            }
        )*
    };
}

impl_payload_extractor! {
    CallbackQuery => CallbackQuery as "callback_query",
    InlineQuery => InlineQuery as "inline_query",
    ChosenInlineResult => ChosenInlineResult as "chosen_inline_result",
    ShippingQuery => ShippingQuery as "shipping_query",
    PreCheckoutQuery => PreCheckoutQuery as "pre_checkout_query",
    PaidMediaPurchased => PurchasedPaidMedia as "purchased_paid_media",
    Poll => Poll as "poll",
    PollAnswer => PollAnswer as "poll_answer",
    ChatJoinRequest => ChatJoinRequest as "chat_join_request",
    MessageReactionUpdated => MessageReaction as "message_reaction",
    MessageReactionCountUpdated => MessageReactionCount as "message_reaction_count",
    BusinessConnection => BusinessConnection as "business_connection",
    BusinessMessagesDeleted => DeletedBusinessMessages as "deleted_business_messages",
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{BotIdentity, NullResponder};

    fn ctx_for(update: Update) -> Arc<Context> {
        Arc::new(Context::new(
            Arc::new(update),
            BotIdentity::anonymous(),
            Arc::new(NullResponder),
        ))
    }

    #[test]
    fn test_message_from_edited_post() {
        let ctx = ctx_for(Update {
            edited_channel_post: Some(Message::text(3, "edited")),
            ..Default::default()
        });
        let msg = Message::from_context(&ctx).unwrap();
        assert_eq!(msg.plain_text(), "edited");
        assert!(CallbackQuery::from_context(&ctx).is_err());
    }

    #[test]
    fn test_callback_mismatch_names_category() {
        let ctx = ctx_for(Update::from_message(1, Message::text(1, "hi")));
        let err = CallbackQuery::from_context(&ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "payload mismatch: expected callback_query, got message"
        );
        assert!(Option::<CallbackQuery>::from_context(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_update_ref() {
        let ctx = ctx_for(Update::from_callback(9, CallbackQuery::with_data("q", "x")));
        let update = UpdateRef::from_context(&ctx).unwrap();
        assert_eq!(update.update_id, 9);
        assert_eq!(
            CallbackQuery::from_context(&ctx).unwrap().data.as_deref(),
            Some("x")
        );
    }
}
