//! Message contents that can be embedded into a reply as a preview

use super::ids::{ChatId, UserId};
use super::text::FormattedText;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the content model; "unsupported" contents stored by an older
/// version may become decodable after a re-fetch
pub const CURRENT_CONTENT_VERSION: i32 = 3;

/// Remote file handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: i64,
    pub access_hash: i64,
    /// Short-lived access token; refreshed by the server without the file changing
    #[serde(default, skip_serializing)]
    pub file_reference: Vec<u8>,
}

impl RemoteFile {
    pub fn new(id: i64, access_hash: i64) -> Self {
        Self {
            id,
            access_hash,
            file_reference: Vec::new(),
        }
    }

    /// Whether both handles point at the same file, ignoring access tokens
    pub fn is_same_file(&self, other: &RemoteFile) -> bool {
        self.id == other.id && self.access_hash == other.access_hash
    }
}

/// Geographic point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

// Bitwise, so that a location with a NaN coordinate still equals itself
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits() && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for Location {}

/// Kind of a message content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Animation,
    Audio,
    Contact,
    Dice,
    Document,
    ExpiredPhoto,
    ExpiredVideo,
    Game,
    Giveaway,
    Invoice,
    LiveLocation,
    Location,
    Photo,
    Poll,
    Sticker,
    Story,
    Text,
    Unsupported,
    Venue,
    Video,
    VideoNote,
    VoiceNote,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decoded message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Animation {
        file: RemoteFile,
    },
    Audio {
        file: RemoteFile,
        #[serde(default)]
        title: String,
    },
    Contact {
        phone_number: String,
        first_name: String,
        #[serde(default)]
        last_name: String,
        #[serde(default)]
        user_id: Option<UserId>,
    },
    Dice {
        emoji: String,
        value: i32,
    },
    Document {
        file: RemoteFile,
        #[serde(default)]
        file_name: String,
    },
    ExpiredPhoto,
    ExpiredVideo,
    Game {
        game_id: i64,
        bot_user_id: UserId,
        short_name: String,
        #[serde(default)]
        title: String,
    },
    Giveaway {
        channel_ids: Vec<ChatId>,
        winner_count: i32,
        until_date: i32,
    },
    Invoice {
        title: String,
        currency: String,
        total_amount: i64,
    },
    LiveLocation {
        location: Location,
        period: i32,
    },
    Location {
        location: Location,
    },
    Photo {
        file: RemoteFile,
    },
    Poll {
        poll_id: i64,
    },
    Sticker {
        file: RemoteFile,
        #[serde(default)]
        emoji: String,
    },
    Story {
        sender_chat_id: ChatId,
        story_id: i32,
    },
    Text {
        text: FormattedText,
    },
    Unsupported {
        version: i32,
    },
    Venue {
        location: Location,
        title: String,
        #[serde(default)]
        address: String,
    },
    Video {
        file: RemoteFile,
    },
    VideoNote {
        file: RemoteFile,
    },
    VoiceNote {
        file: RemoteFile,
    },
}

impl MessageContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            MessageContent::Animation { .. } => ContentKind::Animation,
            MessageContent::Audio { .. } => ContentKind::Audio,
            MessageContent::Contact { .. } => ContentKind::Contact,
            MessageContent::Dice { .. } => ContentKind::Dice,
            MessageContent::Document { .. } => ContentKind::Document,
            MessageContent::ExpiredPhoto => ContentKind::ExpiredPhoto,
            MessageContent::ExpiredVideo => ContentKind::ExpiredVideo,
            MessageContent::Game { .. } => ContentKind::Game,
            MessageContent::Giveaway { .. } => ContentKind::Giveaway,
            MessageContent::Invoice { .. } => ContentKind::Invoice,
            MessageContent::LiveLocation { .. } => ContentKind::LiveLocation,
            MessageContent::Location { .. } => ContentKind::Location,
            MessageContent::Photo { .. } => ContentKind::Photo,
            MessageContent::Poll { .. } => ContentKind::Poll,
            MessageContent::Sticker { .. } => ContentKind::Sticker,
            MessageContent::Story { .. } => ContentKind::Story,
            MessageContent::Text { .. } => ContentKind::Text,
            MessageContent::Unsupported { .. } => ContentKind::Unsupported,
            MessageContent::Venue { .. } => ContentKind::Venue,
            MessageContent::Video { .. } => ContentKind::Video,
            MessageContent::VideoNote { .. } => ContentKind::VideoNote,
            MessageContent::VoiceNote { .. } => ContentKind::VoiceNote,
        }
    }

    /// Whether the content was stored by an older content version and the
    /// message should be fetched again
    pub fn needs_reget(&self) -> bool {
        matches!(self, MessageContent::Unsupported { version } if *version < CURRENT_CONTENT_VERSION)
    }

    fn remote_file(&self) -> Option<&RemoteFile> {
        match self {
            MessageContent::Animation { file }
            | MessageContent::Audio { file, .. }
            | MessageContent::Document { file, .. }
            | MessageContent::Photo { file }
            | MessageContent::Sticker { file, .. }
            | MessageContent::Video { file }
            | MessageContent::VideoNote { file }
            | MessageContent::VoiceNote { file } => Some(file),
            _ => None,
        }
    }

    /// Copy with file access tokens dropped, so that only meaningful fields remain
    fn without_file_references(&self) -> MessageContent {
        let mut content = self.clone();
        match &mut content {
            MessageContent::Animation { file }
            | MessageContent::Audio { file, .. }
            | MessageContent::Document { file, .. }
            | MessageContent::Photo { file }
            | MessageContent::Sticker { file, .. }
            | MessageContent::Video { file }
            | MessageContent::VideoNote { file }
            | MessageContent::VoiceNote { file } => file.file_reference.clear(),
            _ => {}
        }
        content
    }
}

/// Outcome of comparing two versions of a content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentComparison {
    /// The user would see a different content
    pub is_changed: bool,
    /// The content is the same, but the stored copy must be refreshed
    pub need_update: bool,
}

impl ContentComparison {
    pub fn is_equivalent(&self) -> bool {
        !self.is_changed && !self.need_update
    }
}

/// Compares two optional contents, ignoring differences that only affect how
/// the content is accessed, not what it is
pub fn compare_contents(
    old: Option<&MessageContent>,
    new: Option<&MessageContent>,
) -> ContentComparison {
    let (old, new) = match (old, new) {
        (None, None) => return ContentComparison::default(),
        (Some(old), Some(new)) => (old, new),
        _ => {
            return ContentComparison {
                is_changed: true,
                need_update: false,
            }
        }
    };

    if old.kind() != new.kind() {
        return ContentComparison {
            is_changed: true,
            need_update: false,
        };
    }

    match (old, new) {
        (
            MessageContent::Unsupported {
                version: old_version,
            },
            MessageContent::Unsupported {
                version: new_version,
            },
        ) => ContentComparison {
            is_changed: false,
            need_update: old_version != new_version,
        },
        _ => {
            if let (Some(old_file), Some(new_file)) = (old.remote_file(), new.remote_file()) {
                if !old_file.is_same_file(new_file) {
                    return ContentComparison {
                        is_changed: true,
                        need_update: false,
                    };
                }
            }
            ContentComparison {
                is_changed: old.without_file_references() != new.without_file_references(),
                need_update: false,
            }
        }
    }
}
