//! Bot identity and the responder side channel.
//!
//! The dispatch engine only needs two things from the bot it serves: its own
//! username (for `/command@username` suffixes) and a way for handlers to make
//! follow-up API calls. The request builders behind [`Responder`] live
//! outside this workspace.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;

/// The identity of the bot an update was delivered to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotIdentity {
    username: Option<String>,
}

impl BotIdentity {
    /// Creates an identity with a known username, normalized by
    /// [`normalize_username`](Self::normalize_username).
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        let normalized = Self::normalize_username(&username);
        Self {
            username: (!normalized.is_empty()).then(|| normalized.to_string()),
        }
    }

    /// Trims surrounding whitespace and any leading `@`.
    pub fn normalize_username(raw: &str) -> &str {
        raw.trim().trim_start_matches('@')
    }

    /// Creates an identity whose username is not known.
    pub fn anonymous() -> Self {
        Self { username: None }
    }

    /// Returns the username without the leading `@`.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Compares `mention` against the bot's own username, ignoring ASCII case.
    ///
    /// Always `false` when the username is unknown.
    pub fn is_addressed_as(&self, mention: &str) -> bool {
        self.username
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(mention))
    }
}

/// Follow-up API access handed to handlers.
///
/// Concrete implementations provide strongly-typed request builders on top
/// of [`call_api`](Responder::call_api).
#[async_trait]
pub trait Responder: Send + Sync {
    /// Calls a raw API method with JSON parameters.
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value>;

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared Responder trait object.
pub type BoxedResponder = Arc<dyn Responder>;

/// Attempts to downcast a [`BoxedResponder`] to a concrete type.
pub fn downcast_responder<T: Responder + 'static>(responder: BoxedResponder) -> Option<Arc<T>> {
    responder.as_any().downcast::<T>().ok()
}

/// A responder that refuses every call.
///
/// Useful when dispatching updates whose handlers never reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResponder;

#[async_trait]
impl Responder for NullResponder {
    async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
        Err(crate::error::ApiError::NotConnected)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_normalizes_username() {
        let id = BotIdentity::new("@ThisBot");
        assert_eq!(id.username(), Some("ThisBot"));
        assert!(id.is_addressed_as("thisbot"));
        assert!(!id.is_addressed_as("OtherBot"));

        assert_eq!(BotIdentity::new(" @ThisBot ").username(), Some("ThisBot"));
        assert_eq!(BotIdentity::normalize_username("@@this_bot"), "this_bot");
    }

    #[test]
    fn test_anonymous_identity_is_never_addressed() {
        assert!(!BotIdentity::anonymous().is_addressed_as("anything"));
        assert_eq!(BotIdentity::new("  ").username(), None);
    }

    #[tokio::test]
    async fn test_null_responder_refuses() {
        let responder: BoxedResponder = Arc::new(NullResponder);
        let result = responder.call_api("sendMessage", Value::Null).await;
        assert!(result.is_err());
        assert!(downcast_responder::<NullResponder>(responder).is_some());
    }
}
