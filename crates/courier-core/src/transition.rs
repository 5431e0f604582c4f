//! Chat-member transition classifier.
//!
//! Platforms report membership changes as a raw `(old, new)` snapshot pair.
//! [`Transition::classify`] turns that pair into the semantic event handlers
//! subscribe to (`joined`, `left`, `banned`, ...).
//!
//! # Ranking
//!
//! `Left` and `Banned` are *outside* the chat. Every other status is *inside*
//! and carries a rank used for promotion/demotion:
//!
//! | status                                   | rank |
//! |------------------------------------------|------|
//! | `Restricted { can_send_messages: false }`| 1    |
//! | `Member`                                 | 2    |
//! | `Restricted { can_send_messages: true }` | 3    |
//! | `Administrator`                          | 4    |
//! | `Owner`                                  | 5    |
//!
//! # Table
//!
//! | old \ new | outside                  | inside                          |
//! |-----------|--------------------------|---------------------------------|
//! | `Left`    | `Left`→`Unchanged`, `Banned`→`Banned` | `Joined`           |
//! | `Banned`  | `Left`→`Unbanned`, `Banned`→`Unchanged` | `Unbanned`       |
//! | inside    | `Left`→`Left`, `Banned`→`Banned` | by rank: `Promoted`, `Demoted` or `Unchanged` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six membership states a snapshot can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    Left,
    Member,
    Restricted { can_send_messages: bool },
    Administrator,
    Owner,
    Banned,
}

impl MemberStatus {
    /// Every status, with both flavours of `Restricted`.
    pub const ALL: [MemberStatus; 7] = [
        MemberStatus::Left,
        MemberStatus::Member,
        MemberStatus::Restricted {
            can_send_messages: false,
        },
        MemberStatus::Restricted {
            can_send_messages: true,
        },
        MemberStatus::Administrator,
        MemberStatus::Owner,
        MemberStatus::Banned,
    ];

    /// Rank inside the chat, or `None` when the status is outside it.
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Left | Self::Banned => None,
            Self::Restricted {
                can_send_messages: false,
            } => Some(1),
            Self::Member => Some(2),
            Self::Restricted {
                can_send_messages: true,
            } => Some(3),
            Self::Administrator => Some(4),
            Self::Owner => Some(5),
        }
    }

    /// Returns `true` for statuses that count as being in the chat.
    pub fn is_inside(self) -> bool {
        self.rank().is_some()
    }
}

/// Semantic chat-member event derived from a status pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Joined,
    Left,
    Banned,
    Unbanned,
    Promoted,
    Demoted,
    Unchanged,
}

impl Transition {
    /// Classifies an `(old, new)` status pair.
    ///
    /// Total over every pair; equal statuses always yield [`Transition::Unchanged`].
    pub fn classify(old: MemberStatus, new: MemberStatus) -> Self {
        use MemberStatus as S;

        match (old.rank(), new.rank()) {
            (Some(from), Some(to)) => match from.cmp(&to) {
                std::cmp::Ordering::Less => Self::Promoted,
                std::cmp::Ordering::Greater => Self::Demoted,
                std::cmp::Ordering::Equal => Self::Unchanged,
            },
            (None, Some(_)) => match old {
                S::Banned => Self::Unbanned,
                _ => Self::Joined,
            },
            (Some(_), None) | (None, None) => match (old, new) {
                (S::Banned, S::Banned) | (S::Left, S::Left) => Self::Unchanged,
                (S::Banned, _) => Self::Unbanned,
                (_, S::Banned) => Self::Banned,
                _ => Self::Left,
            },
        }
    }

    /// Returns `true` when no transition handler should fire.
    pub fn is_unchanged(self) -> bool {
        self == Self::Unchanged
    }

    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Left => "left",
            Self::Banned => "banned",
            Self::Unbanned => "unbanned",
            Self::Promoted => "promoted",
            Self::Demoted => "demoted",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTRICTED_MUTED: MemberStatus = MemberStatus::Restricted {
        can_send_messages: false,
    };
    const RESTRICTED_VOICED: MemberStatus = MemberStatus::Restricted {
        can_send_messages: true,
    };

    #[test]
    fn test_same_status_is_unchanged() {
        for s in MemberStatus::ALL {
            assert_eq!(Transition::classify(s, s), Transition::Unchanged, "{s:?}");
        }
    }

    #[test]
    fn test_every_pair_is_classified() {
        for old in MemberStatus::ALL {
            for new in MemberStatus::ALL {
                let t = Transition::classify(old, new);
                if old == new {
                    assert_eq!(t, Transition::Unchanged);
                } else {
                    assert_ne!(t, Transition::Unchanged, "{old:?} -> {new:?}");
                }
            }
        }
    }

    #[test]
    fn test_outside_to_inside() {
        use MemberStatus::*;
        assert_eq!(Transition::classify(Left, Member), Transition::Joined);
        assert_eq!(Transition::classify(Left, Administrator), Transition::Joined);
        assert_eq!(Transition::classify(Left, RESTRICTED_MUTED), Transition::Joined);
        assert_eq!(Transition::classify(Banned, Member), Transition::Unbanned);
        assert_eq!(Transition::classify(Banned, Owner), Transition::Unbanned);
    }

    #[test]
    fn test_inside_to_outside() {
        use MemberStatus::*;
        assert_eq!(Transition::classify(Member, Left), Transition::Left);
        assert_eq!(Transition::classify(Owner, Left), Transition::Left);
        assert_eq!(Transition::classify(Member, Banned), Transition::Banned);
        assert_eq!(Transition::classify(Administrator, Banned), Transition::Banned);
    }

    #[test]
    fn test_outside_to_outside() {
        use MemberStatus::*;
        assert_eq!(Transition::classify(Left, Banned), Transition::Banned);
        assert_eq!(Transition::classify(Banned, Left), Transition::Unbanned);
    }

    #[test]
    fn test_rank_changes() {
        use MemberStatus::*;
        assert_eq!(Transition::classify(Member, Administrator), Transition::Promoted);
        assert_eq!(Transition::classify(Administrator, Owner), Transition::Promoted);
        assert_eq!(Transition::classify(Owner, Member), Transition::Demoted);
        assert_eq!(Transition::classify(Member, RESTRICTED_MUTED), Transition::Demoted);
        assert_eq!(Transition::classify(Member, RESTRICTED_VOICED), Transition::Promoted);
        assert_eq!(
            Transition::classify(RESTRICTED_VOICED, RESTRICTED_MUTED),
            Transition::Demoted
        );
    }
}
