//! Attribution of quoted or forwarded content to its original sender

use super::ids::{ChatId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who originally sent a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageOrigin {
    /// Sent by a known user
    User { sender_user_id: UserId },
    /// Sent by a user who hides their account
    HiddenUser { sender_name: String },
    /// Sent on behalf of a chat
    Chat {
        sender_chat_id: ChatId,
        #[serde(default)]
        author_signature: String,
    },
    /// Posted in a channel
    Channel {
        chat_id: ChatId,
        message_id: MessageId,
        #[serde(default)]
        author_signature: String,
    },
}

impl MessageOrigin {
    /// Whether the origin names an individual author inside a chat
    pub fn has_sender_signature(&self) -> bool {
        match self {
            MessageOrigin::Chat {
                author_signature, ..
            }
            | MessageOrigin::Channel {
                author_signature, ..
            } => !author_signature.is_empty(),
            MessageOrigin::User { .. } | MessageOrigin::HiddenUser { .. } => false,
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, MessageOrigin::Channel { .. })
    }

    pub(crate) fn sender_user_id(&self) -> Option<UserId> {
        match self {
            MessageOrigin::User { sender_user_id } => Some(*sender_user_id),
            _ => None,
        }
    }

    pub(crate) fn sender_chat_id(&self) -> Option<ChatId> {
        match self {
            MessageOrigin::Chat { sender_chat_id, .. } => Some(*sender_chat_id),
            MessageOrigin::Channel { chat_id, .. } => Some(*chat_id),
            _ => None,
        }
    }
}

impl fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageOrigin::User { sender_user_id } => write!(f, "{}", sender_user_id),
            MessageOrigin::HiddenUser { sender_name } => write!(f, "hidden user \"{}\"", sender_name),
            MessageOrigin::Chat {
                sender_chat_id,
                author_signature,
            } => {
                write!(f, "{}", sender_chat_id)?;
                if !author_signature.is_empty() {
                    write!(f, " signed as \"{}\"", author_signature)?;
                }
                Ok(())
            }
            MessageOrigin::Channel {
                chat_id,
                message_id,
                author_signature,
            } => {
                write!(f, "{} of {}", message_id, chat_id)?;
                if !author_signature.is_empty() {
                    write!(f, " signed as \"{}\"", author_signature)?;
                }
                Ok(())
            }
        }
    }
}
