//! Predicate library.
//!
//! Every predicate here is a pure function over decoded payload data: no side
//! effects and no allocation. The framework wraps them into per-entry check
//! functions; keeping them free-standing makes each rule testable on its own.

use crate::bot::BotIdentity;
use crate::model::{CallbackQuery, Message, PaidMediaPurchased};
use crate::update::Category;

/// The default command trigger.
pub const DEFAULT_TRIGGER: char = '/';

// ============================================================================
// Content kinds
// ============================================================================

/// Content a message can carry, one per message-registry shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Photo,
    Voice,
    Video,
    Audio,
    Sticker,
    Document,
    Location,
    Contact,
    Poll,
    /// The message replies to another message, whatever its content.
    Reply,
    Dice,
    WebAppData,
    SuccessfulPayment,
    RefundedPayment,
    /// The message was received through a business connection.
    Business,
}

impl ContentKind {
    /// Returns `true` if `message` carries this kind of content.
    pub fn matches(self, message: &Message) -> bool {
        match self {
            Self::Text => message.text.as_deref().is_some_and(|t| !t.is_empty()),
            Self::Photo => !message.photo.is_empty(),
            Self::Voice => message.voice.is_some(),
            Self::Video => message.video.is_some(),
            Self::Audio => message.audio.is_some(),
            Self::Sticker => message.sticker.is_some(),
            Self::Document => message.document.is_some(),
            Self::Location => message.location.is_some(),
            Self::Contact => message.contact.is_some(),
            Self::Poll => message.poll.is_some(),
            Self::Reply => message.reply_to_message.is_some(),
            Self::Dice => message.dice.is_some(),
            Self::WebAppData => message.web_app_data.is_some(),
            Self::SuccessfulPayment => message.successful_payment.is_some(),
            Self::RefundedPayment => message.refunded_payment.is_some(),
            Self::Business => message
                .business_connection_id
                .as_deref()
                .is_some_and(|id| !id.is_empty()),
        }
    }

    /// Lowercase name used for entry names and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Sticker => "sticker",
            Self::Document => "document",
            Self::Location => "location",
            Self::Contact => "contact",
            Self::Poll => "poll",
            Self::Reply => "reply",
            Self::Dice => "dice",
            Self::WebAppData => "web_app_data",
            Self::SuccessfulPayment => "successful_payment",
            Self::RefundedPayment => "refunded_payment",
            Self::Business => "business",
        }
    }
}

// ============================================================================
// Callback and paid-media predicates
// ============================================================================

/// Callback data equals `literal` byte-for-byte.
pub fn callback_equals(query: &CallbackQuery, literal: &str) -> bool {
    query.data.as_deref() == Some(literal)
}

/// Callback data starts with `prefix`. No separator is implied.
pub fn callback_has_prefix(query: &CallbackQuery, prefix: &str) -> bool {
    query.data.as_deref().is_some_and(|d| d.starts_with(prefix))
}

/// Paid-media purchase payload starts with `prefix`.
pub fn paid_media_has_prefix(purchase: &PaidMediaPurchased, prefix: &str) -> bool {
    purchase.paid_media_payload.starts_with(prefix)
}

// ============================================================================
// Commands
// ============================================================================

/// A command split out of message text, borrowing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandText<'a> {
    /// The trigger character the text started with.
    pub trigger: char,
    /// The command name as typed, without trigger or mention.
    pub name: &'a str,
    /// The `@username` suffix, without the `@`.
    pub mention: Option<&'a str>,
    /// Everything after the command token, trimmed.
    pub args: &'a str,
}

impl<'a> CommandText<'a> {
    /// Splits `text` if it starts with one of `triggers`.
    ///
    /// The command token runs up to the first whitespace; an `@` inside the
    /// token separates the mention.
    pub fn parse(text: &'a str, triggers: &[char]) -> Option<Self> {
        let mut chars = text.chars();
        let trigger = chars.next().filter(|c| triggers.contains(c))?;
        let rest = chars.as_str();

        let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, args) = rest.split_at(token_end);
        let (name, mention) = match token.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (token, None),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            trigger,
            name,
            mention,
            args: args.trim(),
        })
    }

    /// The mention, if present, must name this bot.
    pub fn addressed_to(&self, identity: &BotIdentity) -> bool {
        self.mention.is_none_or(|m| identity.is_addressed_as(m))
    }
}

/// Normalizes a command name or alias: trims, strips one leading `/`, lowercases.
pub fn normalize_command_name(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_prefix(DEFAULT_TRIGGER)
        .unwrap_or(trimmed)
        .to_ascii_lowercase()
}

/// Matching rules for one registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPattern {
    names: Vec<String>,
    triggers: Vec<char>,
    allow_edited: bool,
    allow_channel: bool,
}

impl CommandPattern {
    /// Creates a pattern with the default trigger and no opt-ins.
    pub fn new(name: &str) -> Self {
        Self {
            names: vec![normalize_command_name(name)],
            triggers: vec![DEFAULT_TRIGGER],
            allow_edited: false,
            allow_channel: false,
        }
    }

    /// Adds trigger characters to the accepted set (set union).
    pub fn add_triggers(&mut self, triggers: impl IntoIterator<Item = char>) {
        for t in triggers {
            if !self.triggers.contains(&t) {
                self.triggers.push(t);
            }
        }
    }

    /// Empties the trigger set, default included.
    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }

    /// Adds alternative names.
    pub fn add_aliases<I, S>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            let alias = normalize_command_name(alias.as_ref());
            if !alias.is_empty() && !self.names.contains(&alias) {
                self.names.push(alias);
            }
        }
    }

    pub fn set_allow_edited(&mut self, allow: bool) {
        self.allow_edited = allow;
    }

    pub fn set_allow_channel(&mut self, allow: bool) {
        self.allow_channel = allow;
    }

    /// The primary (first registered) name.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Primary name followed by aliases.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn triggers(&self) -> &[char] {
        &self.triggers
    }

    pub fn allows_edited(&self) -> bool {
        self.allow_edited
    }

    pub fn allows_channel(&self) -> bool {
        self.allow_channel
    }

    /// Whether updates of `category` may trigger this command at all.
    pub fn accepts_category(&self, category: Category) -> bool {
        match category {
            Category::Message | Category::BusinessMessage => true,
            Category::EditedMessage | Category::EditedBusinessMessage => self.allow_edited,
            Category::ChannelPost => self.allow_channel,
            Category::EditedChannelPost => self.allow_channel && self.allow_edited,
            _ => false,
        }
    }

    /// Parses `text` and returns the command if it matches this pattern.
    pub fn match_text<'a>(&self, text: &'a str, identity: &BotIdentity) -> Option<CommandText<'a>> {
        let cmd = CommandText::parse(text, &self.triggers)?;
        let known = self.names.iter().any(|n| n.eq_ignore_ascii_case(cmd.name));
        (known && cmd.addressed_to(identity)).then_some(cmd)
    }

    /// Full predicate: category opt-ins plus text matching.
    pub fn matches(&self, category: Category, message: &Message, identity: &BotIdentity) -> bool {
        self.accepts_category(category)
            && message
                .text
                .as_deref()
                .is_some_and(|t| self.match_text(t, identity).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn this_bot() -> BotIdentity {
        BotIdentity::new("ThisBot")
    }

    #[test]
    fn test_default_trigger() {
        let p = CommandPattern::new("start");
        assert!(p.match_text("/start", &this_bot()).is_some());
        assert!(p.match_text("/start now please", &this_bot()).is_some());
        assert!(p.match_text("!start", &this_bot()).is_none());
        assert!(p.match_text("/starter", &this_bot()).is_none());
        assert!(p.match_text("start", &this_bot()).is_none());
        assert!(p.match_text(" /start", &this_bot()).is_none());
    }

    #[test]
    fn test_added_trigger_keeps_default() {
        let mut p = CommandPattern::new("start");
        p.add_triggers(['!']);
        assert!(p.match_text("!start", &this_bot()).is_some());
        assert!(p.match_text("/start", &this_bot()).is_some());
        assert_eq!(p.triggers(), &['/', '!']);
    }

    #[test]
    fn test_cleared_triggers_replace_default() {
        let mut p = CommandPattern::new("start");
        p.clear_triggers();
        p.add_triggers(['!']);
        assert!(p.match_text("!start", &this_bot()).is_some());
        assert!(p.match_text("/start", &this_bot()).is_none());
    }

    #[test]
    fn test_mention_suffix() {
        let p = CommandPattern::new("start");
        assert!(p.match_text("/start@ThisBot", &this_bot()).is_some());
        assert!(p.match_text("/start@thisbot arg", &this_bot()).is_some());
        assert!(p.match_text("/start@OtherBot", &this_bot()).is_none());
        assert!(p.match_text("/start@", &this_bot()).is_none());
        assert!(
            p.match_text("/start@ThisBot", &BotIdentity::anonymous())
                .is_none()
        );
    }

    #[test]
    fn test_aliases_and_normalization() {
        let mut p = CommandPattern::new("/Ban");
        p.add_aliases(["b", "/BLOCK", ""]);
        assert_eq!(p.names(), &["ban", "b", "block"]);
        assert!(p.match_text("/BAN", &this_bot()).is_some());
        assert!(p.match_text("/block user", &this_bot()).is_some());
        assert!(p.match_text("/b", &this_bot()).is_some());
    }

    #[test]
    fn test_parsed_parts() {
        let cmd = CommandText::parse("/echo@ThisBot  hello world ", &['/']).unwrap();
        assert_eq!(cmd.trigger, '/');
        assert_eq!(cmd.name, "echo");
        assert_eq!(cmd.mention, Some("ThisBot"));
        assert_eq!(cmd.args, "hello world");
        assert!(CommandText::parse("/", &['/']).is_none());
        assert!(CommandText::parse("", &['/']).is_none());
    }

    #[test]
    fn test_category_opt_ins() {
        let mut p = CommandPattern::new("start");
        assert!(p.accepts_category(Category::Message));
        assert!(!p.accepts_category(Category::EditedMessage));
        assert!(!p.accepts_category(Category::ChannelPost));
        p.set_allow_edited(true);
        assert!(p.accepts_category(Category::EditedMessage));
        assert!(!p.accepts_category(Category::EditedChannelPost));
        p.set_allow_channel(true);
        assert!(p.accepts_category(Category::ChannelPost));
        assert!(p.accepts_category(Category::EditedChannelPost));
        assert!(!p.accepts_category(Category::CallbackQuery));
    }

    #[test]
    fn test_callback_predicates() {
        let q = CallbackQuery::with_data("1", "cb_1");
        assert!(callback_has_prefix(&q, "cb_"));
        assert!(callback_has_prefix(&CallbackQuery::with_data("2", "cb_anything"), "cb_"));
        assert!(!callback_has_prefix(&CallbackQuery::with_data("3", "xcb_1"), "cb_"));
        assert!(callback_equals(&q, "cb_1"));
        assert!(!callback_equals(&q, "cb_"));
        assert!(!callback_equals(&CallbackQuery::default(), ""));
    }

    #[test]
    fn test_content_kinds() {
        let mut msg = Message::text(1, "hello");
        assert!(ContentKind::Text.matches(&msg));
        assert!(!ContentKind::Reply.matches(&msg));
        assert!(!ContentKind::Photo.matches(&msg));

        msg.reply_to_message = Some(Box::new(Message::default()));
        assert!(ContentKind::Reply.matches(&msg));

        msg.business_connection_id = Some("conn".into());
        assert!(ContentKind::Business.matches(&msg));

        let empty = Message::text(1, "");
        assert!(!ContentKind::Text.matches(&empty));
    }

    #[test]
    fn test_paid_media_prefix() {
        let p = PaidMediaPurchased {
            paid_media_payload: "album:42".into(),
            ..Default::default()
        };
        assert!(paid_media_has_prefix(&p, "album:"));
        assert!(!paid_media_has_prefix(&p, "video:"));
    }
}
