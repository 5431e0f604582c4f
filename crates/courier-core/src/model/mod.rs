//! Decoded payload types carried by an [`Update`](crate::update::Update).
//!
//! These mirror the platform's wire shapes closely enough for an external
//! decoder to produce them with serde. Decoding itself lives outside this
//! workspace.

mod member;
mod message;
mod misc;
mod query;

pub use member::{ChatJoinRequest, ChatMember, ChatMemberKind, ChatMemberUpdated};
pub use message::{
    Audio, Chat, ChatType, Contact, Dice, Document, Location, Message, PhotoSize,
    RefundedPayment, Sticker, SuccessfulPayment, User, Video, Voice, WebAppData,
};
pub use misc::{
    BusinessConnection, BusinessMessagesDeleted, MessageReactionCountUpdated,
    MessageReactionUpdated, Poll, PollAnswer, PollOption, ReactionCount, ReactionType,
};
pub use query::{
    CallbackQuery, ChosenInlineResult, InlineQuery, PaidMediaPurchased, PreCheckoutQuery,
    ShippingQuery,
};
