//! Reply header as received from the server
//!
//! Nothing in here is trusted: identifiers may be out of range, flags may
//! contradict each other and text may not be valid UTF-8. Use
//! [`ReplyReference::from_wire`](crate::reply::ReplyReference::from_wire) to
//! turn a header into a consistent value.

use crate::models::{ChatId, EntityKind, Location, MessageEntity, RemoteFile, UserId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Peer reference as sent by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum WirePeer {
    User { user_id: i64 },
    Chat { chat_id: i64 },
    Channel { channel_id: i64 },
}

impl From<WirePeer> for ChatId {
    fn from(peer: WirePeer) -> Self {
        match peer {
            WirePeer::User { user_id } => ChatId::User(UserId(user_id)),
            WirePeer::Chat { chat_id } => ChatId::Group(chat_id),
            WirePeer::Channel { channel_id } => ChatId::Channel(channel_id),
        }
    }
}

/// Raw text bytes. Serialized as a string when valid UTF-8 and as a byte array
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireText(pub Vec<u8>);

impl WireText {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for WireText {
    fn from(text: &str) -> Self {
        WireText(text.as_bytes().to_vec())
    }
}

impl From<String> for WireText {
    fn from(text: String) -> Self {
        WireText(text.into_bytes())
    }
}

impl Serialize for WireText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(&self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => self.0.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for WireText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Bytes(Vec<u8>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => WireText::from(text),
            Repr::Bytes(bytes) => WireText(bytes),
        })
    }
}

/// Span kind as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum WireEntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    Phone,
    BankCard,
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Code,
    Pre {
        #[serde(default)]
        language: String,
    },
    TextUrl {
        url: String,
    },
    MentionName {
        user_id: i64,
    },
    CustomEmoji {
        document_id: i64,
    },
    Blockquote,
    #[serde(other)]
    Unknown,
}

/// Span as sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEntity {
    #[serde(flatten)]
    pub kind: WireEntityKind,
    pub offset: i32,
    pub length: i32,
}

impl From<&MessageEntity> for WireEntity {
    fn from(entity: &MessageEntity) -> Self {
        let kind = match &entity.kind {
            EntityKind::Mention => WireEntityKind::Mention,
            EntityKind::Hashtag => WireEntityKind::Hashtag,
            EntityKind::Cashtag => WireEntityKind::Cashtag,
            EntityKind::BotCommand => WireEntityKind::BotCommand,
            EntityKind::Url => WireEntityKind::Url,
            EntityKind::EmailAddress => WireEntityKind::Email,
            EntityKind::PhoneNumber => WireEntityKind::Phone,
            EntityKind::BankCardNumber => WireEntityKind::BankCard,
            EntityKind::Bold => WireEntityKind::Bold,
            EntityKind::Italic => WireEntityKind::Italic,
            EntityKind::Underline => WireEntityKind::Underline,
            EntityKind::Strikethrough => WireEntityKind::Strike,
            EntityKind::Spoiler => WireEntityKind::Spoiler,
            EntityKind::Code => WireEntityKind::Code,
            EntityKind::Pre => WireEntityKind::Pre {
                language: String::new(),
            },
            EntityKind::PreCode { language } => WireEntityKind::Pre {
                language: language.clone(),
            },
            EntityKind::TextUrl { url } => WireEntityKind::TextUrl { url: url.clone() },
            EntityKind::MentionName { user_id } => WireEntityKind::MentionName { user_id: user_id.0 },
            EntityKind::CustomEmoji { custom_emoji_id } => WireEntityKind::CustomEmoji {
                document_id: *custom_emoji_id,
            },
            EntityKind::BlockQuote => WireEntityKind::Blockquote,
        };
        WireEntity {
            kind,
            offset: entity.offset,
            length: entity.length,
        }
    }
}

/// Forward header describing who sent the replied-to message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireForwardHeader {
    pub from_id: Option<WirePeer>,
    pub from_name: Option<String>,
    pub date: i32,
    /// Non-zero when the header describes a channel post
    pub channel_post: i32,
    pub post_author: Option<String>,
}

/// Kind of a document attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireDocumentKind {
    File,
    Animation,
    Audio,
    Sticker,
    Video,
    VideoNote,
    Voice,
}

/// Media attached to the replied-to message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_", rename_all = "snake_case")]
pub enum WireMedia {
    /// Explicit "no media" marker
    Empty,
    Photo {
        photo: Option<RemoteFile>,
        #[serde(default)]
        ttl_seconds: i32,
    },
    Document {
        document: Option<RemoteFile>,
        kind: WireDocumentKind,
        #[serde(default)]
        attribute: String,
        #[serde(default)]
        ttl_seconds: i32,
    },
    Contact {
        phone_number: String,
        first_name: String,
        #[serde(default)]
        last_name: String,
        #[serde(default)]
        user_id: i64,
    },
    Dice {
        emoticon: String,
        value: i32,
    },
    Game {
        id: i64,
        bot_user_id: i64,
        short_name: String,
        #[serde(default)]
        title: String,
    },
    Giveaway {
        channels: Vec<i64>,
        quantity: i32,
        until_date: i32,
    },
    Invoice {
        title: String,
        currency: String,
        total_amount: i64,
    },
    Geo {
        geo: Location,
    },
    GeoLive {
        geo: Location,
        period: i32,
    },
    Venue {
        geo: Location,
        title: String,
        #[serde(default)]
        address: String,
    },
    Poll {
        poll_id: i64,
    },
    Story {
        peer: WirePeer,
        id: i32,
    },
    WebPage {
        url: String,
    },
    Unsupported,
}

impl WireMedia {
    pub fn is_empty(&self) -> bool {
        matches!(self, WireMedia::Empty)
    }
}

/// Reply header attached to an incoming message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireReplyHeader {
    /// The target is a scheduled message
    pub reply_to_scheduled: bool,
    /// Target message number; 0 when the reply has no target
    pub reply_to_msg_id: i32,
    /// Chat of the target when it differs from the chat of the reply
    pub reply_to_peer_id: Option<WirePeer>,
    /// Sender of the target when it is not available locally
    pub reply_from: Option<WireForwardHeader>,
    /// Media of the target when it is not available locally
    pub reply_media: Option<WireMedia>,
    pub quote_text: WireText,
    pub quote_entities: Vec<WireEntity>,
    /// The quote was selected by the user
    pub quote: bool,
}

impl WireReplyHeader {
    /// Header of a reply to a regular message in the same chat
    pub fn to_message(reply_to_msg_id: i32) -> Self {
        Self {
            reply_to_msg_id,
            ..Self::default()
        }
    }

    /// Header of a reply to a scheduled message
    pub fn to_scheduled(reply_to_msg_id: i32) -> Self {
        Self {
            reply_to_scheduled: true,
            reply_to_msg_id,
            ..Self::default()
        }
    }
}
