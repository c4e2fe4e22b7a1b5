//! Formatted text: a string with ordered style and entity spans

use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// Kind of a text span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    EmailAddress,
    PhoneNumber,
    BankCardNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    PreCode { language: String },
    TextUrl { url: String },
    MentionName { user_id: UserId },
    CustomEmoji { custom_emoji_id: i64 },
    BlockQuote,
}

/// A span over the text; offsets and lengths are in UTF-16 code units
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(flatten)]
    pub kind: EntityKind,
    pub offset: i32,
    pub length: i32,
}

impl MessageEntity {
    pub fn new(kind: EntityKind, offset: i32, length: i32) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }
}

/// Text with formatting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
}

impl FormattedText {
    pub fn new(text: impl Into<String>, entities: Vec<MessageEntity>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }

    /// Text without any spans
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Users mentioned by name in the text
    pub fn mentioned_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.entities.iter().filter_map(|entity| match entity.kind {
            EntityKind::MentionName { user_id } => Some(user_id),
            _ => None,
        })
    }

    /// Custom emoji shown inside the text
    pub fn custom_emoji_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entities.iter().filter_map(|entity| match entity.kind {
            EntityKind::CustomEmoji { custom_emoji_id } => Some(custom_emoji_id),
            _ => None,
        })
    }
}

/// Length of `text` in UTF-16 code units, the unit of entity offsets
pub fn utf16_len(text: &str) -> i32 {
    text.encode_utf16().count() as i32
}
