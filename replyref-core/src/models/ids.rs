//! Chat, user and message identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest valid user identifier
pub const MAX_USER_ID: i64 = (1 << 40) - 1;
/// Largest valid basic group identifier
pub const MAX_GROUP_ID: i64 = 999_999_999_999;
/// Largest valid channel identifier
pub const MAX_CHANNEL_ID: i64 = 1_000_000_000_000 - (1 << 31);

const ZERO_CHANNEL_ID: i64 = -1_000_000_000_000;
const ZERO_SECRET_CHAT_ID: i64 = -2_000_000_000_000;

/// Largest server-assigned message identifier
pub const MAX_SERVER_MESSAGE_ID: i32 = i32::MAX >> 1;
/// Largest server identifier of a scheduled message
pub const MAX_SCHEDULED_MESSAGE_ID: i32 = (1 << 18) - 1;

const SERVER_ID_SHIFT: u32 = 20;
const LOCAL_SEQUENCE_MASK: i32 = (1 << SERVER_ID_SHIFT) - 1;
const SCHEDULED_MASK: i64 = 4;
const SCHEDULED_LOCAL_MASK: i64 = 2;

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn is_valid(&self) -> bool {
        self.0 > 0 && self.0 <= MAX_USER_ID
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

/// Kind of a chat, as far as message numbering is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    User,
    Group,
    Channel,
    SecretChat,
}

/// Chat identifier, tagged with the kind of the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatId {
    User(UserId),
    Group(i64),
    Channel(i64),
    SecretChat(i32),
}

impl ChatId {
    pub fn kind(&self) -> ChatKind {
        match self {
            ChatId::User(_) => ChatKind::User,
            ChatId::Group(_) => ChatKind::Group,
            ChatId::Channel(_) => ChatKind::Channel,
            ChatId::SecretChat(_) => ChatKind::SecretChat,
        }
    }

    /// Whether the identifier lies inside the numbering range of its kind
    pub fn is_valid(&self) -> bool {
        match *self {
            ChatId::User(user_id) => user_id.is_valid(),
            ChatId::Group(id) => id > 0 && id <= MAX_GROUP_ID,
            ChatId::Channel(id) => id > 0 && id <= MAX_CHANNEL_ID,
            ChatId::SecretChat(id) => id > 0,
        }
    }

    /// Single signed number identifying the chat for API clients
    pub fn to_external(&self) -> i64 {
        match *self {
            ChatId::User(user_id) => user_id.0,
            ChatId::Group(id) => -id,
            ChatId::Channel(id) => ZERO_CHANNEL_ID - id,
            ChatId::SecretChat(id) => ZERO_SECRET_CHAT_ID + i64::from(id),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::User(user_id) => write!(f, "chat with {}", user_id),
            ChatId::Group(id) => write!(f, "basic group {}", id),
            ChatId::Channel(id) => write!(f, "channel {}", id),
            ChatId::SecretChat(id) => write!(f, "secret chat {}", id),
        }
    }
}

/// Identifier of a scheduled message inside its send date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledId {
    /// Assigned by the server
    Server(i32),
    /// Assigned locally before the server acknowledged the message
    Local(i32),
}

impl ScheduledId {
    fn raw(&self) -> i32 {
        match *self {
            ScheduledId::Server(id) | ScheduledId::Local(id) => id,
        }
    }

    pub fn is_valid(&self) -> bool {
        let id = self.raw();
        id > 0 && id <= MAX_SCHEDULED_MESSAGE_ID
    }
}

/// Message identifier in one of the numbering schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageId {
    /// Regular message confirmed by the server
    Server(i32),
    /// Regular message not yet acknowledged by the server; ordered right after
    /// the server message it was sent after
    Local { previous_server: i32, sequence: i32 },
    /// Message queued for delivery at `send_date`
    Scheduled { send_date: i32, id: ScheduledId },
}

impl MessageId {
    /// Scheduled message as numbered by the server
    pub fn scheduled_server(server_id: i32, send_date: i32) -> Self {
        MessageId::Scheduled {
            send_date,
            id: ScheduledId::Server(server_id),
        }
    }

    /// Valid regular (server or yet unsent) message identifier
    pub fn is_valid(&self) -> bool {
        match *self {
            MessageId::Server(id) => id > 0 && id <= MAX_SERVER_MESSAGE_ID,
            MessageId::Local {
                previous_server,
                sequence,
            } => {
                (0..=MAX_SERVER_MESSAGE_ID).contains(&previous_server)
                    && sequence > 0
                    && sequence <= LOCAL_SEQUENCE_MASK
            }
            MessageId::Scheduled { .. } => false,
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, MessageId::Server(_))
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, MessageId::Scheduled { .. })
    }

    pub fn is_valid_scheduled(&self) -> bool {
        match self {
            MessageId::Scheduled { send_date, id } => *send_date > 0 && id.is_valid(),
            _ => false,
        }
    }

    pub fn is_scheduled_server(&self) -> bool {
        matches!(
            self,
            MessageId::Scheduled {
                id: ScheduledId::Server(_),
                ..
            }
        )
    }

    /// Server-assigned number of a scheduled message
    pub fn scheduled_server_message_id(&self) -> Option<i32> {
        match *self {
            MessageId::Scheduled {
                id: ScheduledId::Server(id),
                ..
            } => Some(id),
            _ => None,
        }
    }

    /// Whether this regular message was received after `other` in the chat's
    /// numbering. Scheduled identifiers are never ordered against anything.
    pub fn is_newer_than(&self, other: &MessageId) -> bool {
        if self.is_scheduled() || other.is_scheduled() {
            return false;
        }
        self.to_external() > other.to_external()
    }

    /// Single signed number identifying the message for API clients
    pub fn to_external(&self) -> i64 {
        match *self {
            MessageId::Server(id) => i64::from(id) << SERVER_ID_SHIFT,
            MessageId::Local {
                previous_server,
                sequence,
            } => (i64::from(previous_server) << SERVER_ID_SHIFT) | i64::from(sequence & LOCAL_SEQUENCE_MASK),
            MessageId::Scheduled { send_date, id } => {
                let local = match id {
                    ScheduledId::Server(_) => 0,
                    ScheduledId::Local(_) => SCHEDULED_LOCAL_MASK,
                };
                ((i64::from(send_date) - (1 << 30)) << 21)
                    | (i64::from(id.raw()) << 3)
                    | SCHEDULED_MASK
                    | local
            }
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Server(id) => write!(f, "message {}", id),
            MessageId::Local {
                previous_server,
                sequence,
            } => write!(f, "yet unsent message {}.{}", previous_server, sequence),
            MessageId::Scheduled { send_date, id } => match id {
                ScheduledId::Server(id) => write!(f, "scheduled message {} at {}", id, send_date),
                ScheduledId::Local(id) => {
                    write!(f, "local scheduled message {} at {}", id, send_date)
                }
            },
        }
    }
}

/// Message identifier together with the chat it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MessageFullId {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl fmt::Display for MessageFullId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.message_id, self.chat_id)
    }
}
