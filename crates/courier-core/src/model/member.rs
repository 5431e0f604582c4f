//! Chat membership payloads.

use serde::{Deserialize, Serialize};

use super::{Chat, User};
use crate::transition::MemberStatus;

/// Status-specific part of a chat member snapshot, tagged by `status` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChatMemberKind {
    #[serde(rename = "creator")]
    Owner {
        #[serde(default)]
        is_anonymous: bool,
    },
    Administrator {
        #[serde(default)]
        custom_title: Option<String>,
    },
    Member,
    /// `is_member` is `false` when the restriction outlives membership.
    Restricted {
        #[serde(default)]
        is_member: bool,
        #[serde(default)]
        can_send_messages: bool,
        #[serde(default)]
        until_date: i64,
    },
    #[default]
    Left,
    #[serde(rename = "kicked")]
    Banned {
        #[serde(default)]
        until_date: i64,
    },
}

/// One side of a membership change: who, and in which state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user: User,
    #[serde(flatten)]
    pub kind: ChatMemberKind,
}

impl ChatMember {
    /// Creates a snapshot for `user` in the given state.
    pub fn new(user: User, kind: ChatMemberKind) -> Self {
        Self { user, kind }
    }

    /// Collapses the snapshot into the status the transition classifier ranks.
    pub fn status(&self) -> MemberStatus {
        match &self.kind {
            ChatMemberKind::Owner { .. } => MemberStatus::Owner,
            ChatMemberKind::Administrator { .. } => MemberStatus::Administrator,
            ChatMemberKind::Member => MemberStatus::Member,
            ChatMemberKind::Restricted {
                is_member: false, ..
            } => MemberStatus::Left,
            ChatMemberKind::Restricted {
                can_send_messages, ..
            } => MemberStatus::Restricted {
                can_send_messages: *can_send_messages,
            },
            ChatMemberKind::Left => MemberStatus::Left,
            ChatMemberKind::Banned { .. } => MemberStatus::Banned,
        }
    }
}

/// A member's status changed in a chat (`chat_member` / `my_chat_member`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    pub date: i64,
    pub old_chat_member: ChatMember,
    pub new_chat_member: ChatMember,
    #[serde(default)]
    pub via_join_request: bool,
}

impl ChatMemberUpdated {
    /// Returns the `(old, new)` status pair.
    pub fn status_pair(&self) -> (MemberStatus, MemberStatus) {
        (self.old_chat_member.status(), self.new_chat_member.status())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    pub from: User,
    pub user_chat_id: i64,
    pub date: i64,
    #[serde(default)]
    pub bio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ChatMember {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_restricted_status_follows_membership() {
        let inside = decode(
            r#"{"user":{"id":1,"first_name":"Ann"},"status":"restricted","is_member":true,"can_send_messages":true}"#,
        );
        assert_eq!(
            inside.status(),
            MemberStatus::Restricted {
                can_send_messages: true
            }
        );

        let outside = decode(
            r#"{"user":{"id":1,"first_name":"Ann"},"status":"restricted","is_member":false,"can_send_messages":true}"#,
        );
        assert_eq!(outside.status(), MemberStatus::Left);
    }

    #[test]
    fn test_status_tags() {
        assert_eq!(
            decode(r#"{"user":{"id":1,"first_name":"Ann"},"status":"creator"}"#).status(),
            MemberStatus::Owner
        );
        assert_eq!(
            decode(r#"{"user":{"id":1,"first_name":"Ann"},"status":"kicked","until_date":0}"#).status(),
            MemberStatus::Banned
        );
        assert_eq!(
            decode(r#"{"user":{"id":1,"first_name":"Ann"},"status":"left"}"#).status(),
            MemberStatus::Left
        );
    }
}
