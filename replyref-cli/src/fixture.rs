//! Reply headers captured to JSON, together with the local state needed to
//! interpret them

use anyhow::{Context, Result};
use replyref_core::environment::{
    ContentDecoder, FixOptions, IdentityResolver, OriginResolver, SessionCapability, SessionCountCapability,
    TextFormatter,
};
use replyref_core::models::{
    utf16_len, ChatId, ChatKind, EntityKind, FormattedText, MessageContent, MessageEntity, MessageId, MessageOrigin, UserId,
    CURRENT_CONTENT_VERSION,
};
use replyref_core::wire::{WireDocumentKind, WireForwardHeader, WireMedia, WirePeer, WireReplyHeader};
use replyref_core::{FormatError, OriginError, ReplyOwner, ReplyReference, Sanitized};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Longest quote accepted, in UTF-16 code units
pub const MAX_QUOTE_LENGTH: i32 = 1024;

/// How the owning message is numbered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerState {
    #[default]
    Sent,
    /// Not yet acknowledged by the server
    Unsent,
    Scheduled,
}

/// The message carrying the reply header
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureOwner {
    pub chat: WirePeer,
    pub message_id: i32,
    pub date: i32,
    #[serde(default)]
    pub state: OwnerState,
}

impl FixtureOwner {
    pub fn to_owner(&self) -> ReplyOwner {
        let message_id = match self.state {
            OwnerState::Sent => MessageId::Server(self.message_id),
            OwnerState::Unsent => MessageId::Local {
                previous_server: self.message_id,
                sequence: 1,
            },
            OwnerState::Scheduled => MessageId::scheduled_server(self.message_id, self.date),
        };
        ReplyOwner::new(ChatId::from(self.chat), message_id, self.date)
    }
}

/// One captured reply header
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    pub owner: FixtureOwner,
    pub header: WireReplyHeader,
    /// Users known locally; when absent every valid user id is considered known
    #[serde(default)]
    pub known_users: Option<HashSet<i64>>,
    /// Overrides the configured session count
    #[serde(default)]
    pub session_count: Option<u32>,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    pub fn environment(&self, default_session_count: u32) -> FixtureEnvironment {
        FixtureEnvironment {
            sessions: SessionCountCapability::new(self.session_count.unwrap_or(default_session_count)),
            known_users: self.known_users.clone(),
        }
    }

    /// Builds the reply reference the header describes
    pub fn build(&self, default_session_count: u32) -> Sanitized<ReplyReference> {
        let env = self.environment(default_session_count);
        ReplyReference::from_wire(&env, self.header.clone(), &self.owner.to_owner())
    }
}

/// Local state backing reply construction for a fixture
#[derive(Debug, Clone)]
pub struct FixtureEnvironment {
    sessions: SessionCountCapability,
    known_users: Option<HashSet<i64>>,
}

impl SessionCapability for FixtureEnvironment {
    fn multi_session_confirmation_enabled(&self, kind: ChatKind) -> bool {
        self.sessions.multi_session_confirmation_enabled(kind)
    }
}

impl IdentityResolver for FixtureEnvironment {
    fn resolve_user(&self, user_id: i64) -> Option<UserId> {
        let user_id = UserId(user_id);
        if !user_id.is_valid() {
            return None;
        }
        match &self.known_users {
            Some(known) if !known.contains(&user_id.0) => None,
            _ => Some(user_id),
        }
    }
}

impl OriginResolver for FixtureEnvironment {
    fn resolve_origin(&self, header: WireForwardHeader) -> Result<MessageOrigin, OriginError> {
        match header.from_id {
            Some(WirePeer::User { user_id }) => self
                .resolve_user(user_id)
                .map(|sender_user_id| MessageOrigin::User { sender_user_id })
                .ok_or(OriginError::UnknownUser(user_id)),
            Some(peer) => {
                let sender_chat_id = ChatId::from(peer);
                if !sender_chat_id.is_valid() {
                    return Err(OriginError::InvalidSender(sender_chat_id));
                }
                Ok(MessageOrigin::Chat {
                    sender_chat_id,
                    author_signature: header.post_author.unwrap_or_default(),
                })
            }
            None => match header.from_name {
                Some(sender_name) if !sender_name.is_empty() => Ok(MessageOrigin::HiddenUser { sender_name }),
                _ => Err(OriginError::MissingSender),
            },
        }
    }
}

impl TextFormatter for FixtureEnvironment {
    fn fix_formatted_text(
        &self,
        text: &str,
        entities: Vec<MessageEntity>,
        options: FixOptions,
    ) -> Result<FormattedText, FormatError> {
        if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
            return Err(FormatError::Rejected("control characters in text".to_string()));
        }

        let (mut text, entities) = if options.collapse_whitespace {
            collapse_blank_lines(text, entities)
        } else {
            (text.to_string(), entities)
        };
        if options.trim_trailing_whitespace {
            text.truncate(text.trim_end().len());
        }

        let length = utf16_len(&text);
        if length > MAX_QUOTE_LENGTH {
            return Err(FormatError::TooLong {
                length: length as usize,
                max: MAX_QUOTE_LENGTH as usize,
            });
        }
        if text.is_empty() && !options.allow_empty {
            return Err(FormatError::Empty);
        }

        let mut fixed = Vec::with_capacity(entities.len());
        for mut entity in entities {
            if options.strip_disallowed_entities && !is_quote_entity(&entity.kind) {
                continue;
            }
            if entity.offset < 0 || entity.length <= 0 || entity.offset >= length {
                if options.clamp_entity_bounds {
                    continue;
                }
                return Err(FormatError::Rejected(format!(
                    "entity at {} of length {} is out of bounds",
                    entity.offset, entity.length
                )));
            }
            entity.length = entity.length.min(length - entity.offset);
            fixed.push(entity);
        }
        fixed.sort_by_key(|entity| (entity.offset, -entity.length));

        Ok(FormattedText::new(text, fixed))
    }
}

/// Span kinds that survive in a quoted excerpt
fn is_quote_entity(kind: &EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Bold
            | EntityKind::Italic
            | EntityKind::Underline
            | EntityKind::Strikethrough
            | EntityKind::Spoiler
            | EntityKind::CustomEmoji { .. }
    )
}

/// Collapses runs of blank lines into one, moving entities with the text
fn collapse_blank_lines(text: &str, entities: Vec<MessageEntity>) -> (String, Vec<MessageEntity>) {
    let mut result = String::with_capacity(text.len());
    // (start, length) of removed ranges, in UTF-16 units of the original text
    let mut removed = Vec::new();
    let mut position = 0;
    let mut previous_blank = false;
    for (index, line) in text.split('\n').enumerate() {
        let line_length = utf16_len(line);
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            removed.push((position - 1, line_length + 1));
        } else {
            if index > 0 {
                result.push('\n');
            }
            result.push_str(line);
        }
        previous_blank = blank;
        position += line_length + 1;
    }

    let shift = |offset: i32| {
        offset.saturating_sub(
            removed
                .iter()
                .map(|&(start, length)| offset.saturating_sub(start).clamp(0, length))
                .sum::<i32>(),
        )
    };
    // offsets come from the wire and may be anywhere in the i32 range
    let entities = entities
        .into_iter()
        .map(|mut entity| {
            let end = shift(entity.offset.saturating_add(entity.length));
            entity.offset = shift(entity.offset);
            entity.length = end.saturating_sub(entity.offset);
            entity
        })
        .collect();
    (result, entities)
}

impl ContentDecoder for FixtureEnvironment {
    fn decode_content(&self, media: WireMedia, _owner_chat: ChatId) -> Option<MessageContent> {
        let content = match media {
            WireMedia::Empty => return None,
            WireMedia::Photo { photo: Some(file), ttl_seconds } if ttl_seconds == 0 => MessageContent::Photo { file },
            WireMedia::Photo { .. } => MessageContent::ExpiredPhoto,
            WireMedia::Document {
                document: None,
                kind: WireDocumentKind::Video,
                ..
            } => MessageContent::ExpiredVideo,
            WireMedia::Document { document: None, .. } => return None,
            WireMedia::Document {
                document: Some(file),
                kind,
                attribute,
                ttl_seconds,
            } => match kind {
                WireDocumentKind::Video if ttl_seconds > 0 => MessageContent::ExpiredVideo,
                WireDocumentKind::File => MessageContent::Document {
                    file,
                    file_name: attribute,
                },
                WireDocumentKind::Animation => MessageContent::Animation { file },
                WireDocumentKind::Audio => MessageContent::Audio { file, title: attribute },
                WireDocumentKind::Sticker => MessageContent::Sticker { file, emoji: attribute },
                WireDocumentKind::Video => MessageContent::Video { file },
                WireDocumentKind::VideoNote => MessageContent::VideoNote { file },
                WireDocumentKind::Voice => MessageContent::VoiceNote { file },
            },
            WireMedia::Contact {
                phone_number,
                first_name,
                last_name,
                user_id,
            } => MessageContent::Contact {
                phone_number,
                first_name,
                last_name,
                user_id: Some(UserId(user_id)).filter(UserId::is_valid),
            },
            WireMedia::Dice { emoticon, value } => MessageContent::Dice { emoji: emoticon, value },
            WireMedia::Game {
                id,
                bot_user_id,
                short_name,
                title,
            } => MessageContent::Game {
                game_id: id,
                bot_user_id: UserId(bot_user_id),
                short_name,
                title,
            },
            WireMedia::Giveaway {
                channels,
                quantity,
                until_date,
            } => MessageContent::Giveaway {
                channel_ids: channels.into_iter().map(ChatId::Channel).collect(),
                winner_count: quantity,
                until_date,
            },
            WireMedia::Invoice {
                title,
                currency,
                total_amount,
            } => MessageContent::Invoice {
                title,
                currency,
                total_amount,
            },
            WireMedia::Geo { geo } => MessageContent::Location { location: geo },
            WireMedia::GeoLive { geo, period } => MessageContent::LiveLocation { location: geo, period },
            WireMedia::Venue { geo, title, address } => MessageContent::Venue {
                location: geo,
                title,
                address,
            },
            WireMedia::Poll { poll_id } => MessageContent::Poll { poll_id },
            WireMedia::Story { peer, id } => MessageContent::Story {
                sender_chat_id: ChatId::from(peer),
                story_id: id,
            },
            WireMedia::WebPage { url } => MessageContent::Text {
                text: FormattedText::plain(url),
            },
            WireMedia::Unsupported => MessageContent::Unsupported {
                version: CURRENT_CONTENT_VERSION,
            },
        };
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replyref_core::models::RemoteFile;

    fn environment(known_users: Option<&[i64]>) -> FixtureEnvironment {
        FixtureEnvironment {
            sessions: SessionCountCapability::new(1),
            known_users: known_users.map(|users| users.iter().copied().collect()),
        }
    }

    #[test]
    fn test_owner_numbering() {
        let owner = FixtureOwner {
            chat: WirePeer::Chat { chat_id: 4 },
            message_id: 20,
            date: 1_700_000_000,
            state: OwnerState::Scheduled,
        };
        let owner = owner.to_owner();
        assert_eq!(owner.chat_id, ChatId::Group(4));
        assert_eq!(owner.message_id, MessageId::scheduled_server(20, 1_700_000_000));
    }

    #[test]
    fn test_known_users() {
        assert_eq!(environment(None).resolve_user(5), Some(UserId(5)));
        assert_eq!(environment(None).resolve_user(0), None);
        assert_eq!(environment(Some(&[6])).resolve_user(5), None);
        assert_eq!(environment(Some(&[6])).resolve_user(6), Some(UserId(6)));
    }

    #[test]
    fn test_fix_trims_and_clamps() {
        let fixed = environment(None)
            .fix_formatted_text(
                "first\n\n\n\nsecond  ",
                vec![
                    MessageEntity::new(EntityKind::Bold, 0, 5),
                    MessageEntity::new(EntityKind::Italic, 0, 500),
                    MessageEntity::new(EntityKind::Code, 400, 2),
                ],
                FixOptions::QUOTE,
            )
            .unwrap();
        assert_eq!(fixed.text, "first\n\nsecond");
        assert_eq!(
            fixed.entities,
            vec![
                MessageEntity::new(EntityKind::Italic, 0, 13),
                MessageEntity::new(EntityKind::Bold, 0, 5),
            ]
        );
    }

    #[test]
    fn test_fix_strips_disallowed_spans() {
        let entities = vec![
            MessageEntity::new(EntityKind::Url, 0, 4),
            MessageEntity::new(EntityKind::Spoiler, 5, 3),
        ];
        let env = environment(None);

        let fixed = env
            .fix_formatted_text("link and", entities.clone(), FixOptions::QUOTE)
            .unwrap();
        assert_eq!(fixed.entities, vec![MessageEntity::new(EntityKind::Spoiler, 5, 3)]);

        let options = FixOptions {
            strip_disallowed_entities: false,
            ..FixOptions::QUOTE
        };
        let fixed = env.fix_formatted_text("link and", entities, options).unwrap();
        assert_eq!(fixed.entities.len(), 2);
    }

    #[test]
    fn test_fix_drops_spans_at_extreme_offsets() {
        let fixed = environment(None)
            .fix_formatted_text(
                "hi\n\n\nthere",
                vec![
                    MessageEntity::new(EntityKind::Bold, i32::MAX, 5),
                    MessageEntity::new(EntityKind::Bold, i32::MIN, i32::MAX),
                    MessageEntity::new(EntityKind::Italic, 0, i32::MAX),
                ],
                FixOptions::QUOTE,
            )
            .unwrap();
        assert_eq!(fixed.text, "hi\n\nthere");
        assert_eq!(fixed.entities, vec![MessageEntity::new(EntityKind::Italic, 0, 9)]);
    }

    #[test]
    fn test_fix_is_stable() {
        let env = environment(None);
        let once = env
            .fix_formatted_text("a\n\n\nb \n", Vec::new(), FixOptions::QUOTE)
            .unwrap();
        let twice = env
            .fix_formatted_text(&once.text, once.entities.clone(), FixOptions::QUOTE)
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fix_rejects_long_and_control_text() {
        let env = environment(None);
        let long = "x".repeat(MAX_QUOTE_LENGTH as usize + 1);
        assert!(matches!(
            env.fix_formatted_text(&long, Vec::new(), FixOptions::QUOTE),
            Err(FormatError::TooLong { .. })
        ));
        assert!(matches!(
            env.fix_formatted_text("bell\u{7}", Vec::new(), FixOptions::QUOTE),
            Err(FormatError::Rejected(_))
        ));
    }

    #[test]
    fn test_decode_documents() {
        let env = environment(None);
        let voice = WireMedia::Document {
            document: Some(RemoteFile::new(1, 1)),
            kind: WireDocumentKind::Voice,
            attribute: String::new(),
            ttl_seconds: 0,
        };
        assert!(matches!(
            env.decode_content(voice, ChatId::Group(1)),
            Some(MessageContent::VoiceNote { .. })
        ));

        let expired = WireMedia::Document {
            document: None,
            kind: WireDocumentKind::Video,
            attribute: String::new(),
            ttl_seconds: 10,
        };
        assert_eq!(
            env.decode_content(expired, ChatId::Group(1)),
            Some(MessageContent::ExpiredVideo)
        );
    }

    #[test]
    fn test_origin_resolution() {
        let env = environment(Some(&[3]));
        let header = WireForwardHeader {
            from_id: Some(WirePeer::User { user_id: 4 }),
            date: 1,
            ..WireForwardHeader::default()
        };
        assert_eq!(env.resolve_origin(header), Err(OriginError::UnknownUser(4)));

        let header = WireForwardHeader {
            from_name: Some(String::new()),
            date: 1,
            ..WireForwardHeader::default()
        };
        assert_eq!(env.resolve_origin(header), Err(OriginError::MissingSender));
    }
}
