//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use replyref_core::environment::{
    ContentDecoder, FixOptions, IdentityResolver, OriginResolver, SessionCapability, SessionCountCapability,
    TextFormatter,
};
use replyref_core::models::{
    utf16_len, ChatId, ChatKind, FormattedText, MessageContent, MessageEntity, MessageId, MessageOrigin, UserId,
};
use replyref_core::wire::{WireForwardHeader, WireMedia, WirePeer, WireReplyHeader};
use replyref_core::{FormatError, OriginError, ReplyOwner, ReplyReference, Sanitized};
use std::collections::HashSet;

pub const OWNER_DATE: i32 = 1_700_000_000;

pub struct TestEnvironment {
    pub sessions: SessionCountCapability,
    pub known_users: HashSet<i64>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            sessions: SessionCountCapability::new(1),
            known_users: [1, 2, 3, 42].into_iter().collect(),
        }
    }

    pub fn with_sessions(session_count: u32) -> Self {
        Self {
            sessions: SessionCountCapability::new(session_count),
            ..Self::new()
        }
    }
}

impl SessionCapability for TestEnvironment {
    fn multi_session_confirmation_enabled(&self, kind: ChatKind) -> bool {
        self.sessions.multi_session_confirmation_enabled(kind)
    }
}

impl IdentityResolver for TestEnvironment {
    fn resolve_user(&self, user_id: i64) -> Option<UserId> {
        self.known_users.contains(&user_id).then_some(UserId(user_id))
    }
}

impl OriginResolver for TestEnvironment {
    fn resolve_origin(&self, header: WireForwardHeader) -> Result<MessageOrigin, OriginError> {
        match header.from_id {
            Some(WirePeer::User { user_id }) => self
                .resolve_user(user_id)
                .map(|sender_user_id| MessageOrigin::User { sender_user_id })
                .ok_or(OriginError::UnknownUser(user_id)),
            Some(peer) => Ok(MessageOrigin::Chat {
                sender_chat_id: ChatId::from(peer),
                author_signature: header.post_author.unwrap_or_default(),
            }),
            None => header
                .from_name
                .map(|sender_name| MessageOrigin::HiddenUser { sender_name })
                .ok_or(OriginError::MissingSender),
        }
    }
}

impl TextFormatter for TestEnvironment {
    /// Trims trailing whitespace, clamps spans and rejects NUL characters
    fn fix_formatted_text(
        &self,
        text: &str,
        entities: Vec<MessageEntity>,
        options: FixOptions,
    ) -> Result<FormattedText, FormatError> {
        if text.contains('\0') {
            return Err(FormatError::Rejected("text contains NUL".to_string()));
        }
        let text = if options.trim_trailing_whitespace {
            text.trim_end()
        } else {
            text
        };
        if text.is_empty() && !options.allow_empty {
            return Err(FormatError::Empty);
        }
        let text_length = utf16_len(text);
        let entities = entities
            .into_iter()
            .filter_map(|mut entity| {
                if entity.offset < 0 || entity.length <= 0 || entity.offset >= text_length {
                    return None;
                }
                entity.length = entity.length.min(text_length - entity.offset);
                Some(entity)
            })
            .collect();
        Ok(FormattedText::new(text, entities))
    }
}

impl ContentDecoder for TestEnvironment {
    fn decode_content(&self, media: WireMedia, _owner_chat: ChatId) -> Option<MessageContent> {
        match media {
            WireMedia::Photo { photo: Some(file), .. } => Some(MessageContent::Photo { file }),
            WireMedia::Photo { photo: None, .. } => Some(MessageContent::ExpiredPhoto),
            WireMedia::Poll { poll_id } => Some(MessageContent::Poll { poll_id }),
            WireMedia::GeoLive { geo, period } => Some(MessageContent::LiveLocation {
                location: geo,
                period,
            }),
            WireMedia::Contact {
                phone_number,
                first_name,
                last_name,
                user_id,
            } => Some(MessageContent::Contact {
                phone_number,
                first_name,
                last_name,
                user_id: (user_id != 0).then_some(UserId(user_id)),
            }),
            WireMedia::Unsupported => Some(MessageContent::Unsupported { version: 0 }),
            _ => None,
        }
    }
}

pub fn user_chat() -> ChatId {
    ChatId::User(UserId(1))
}

pub fn owner(message_id: i32) -> ReplyOwner {
    ReplyOwner::new(user_chat(), MessageId::Server(message_id), OWNER_DATE)
}

pub fn unsent_owner() -> ReplyOwner {
    ReplyOwner::new(
        user_chat(),
        MessageId::Local {
            previous_server: 600,
            sequence: 1,
        },
        OWNER_DATE,
    )
}

pub fn scheduled_owner(server_id: i32, date: i32) -> ReplyOwner {
    ReplyOwner::new(user_chat(), MessageId::scheduled_server(server_id, date), date)
}

pub fn build(header: WireReplyHeader, owner: &ReplyOwner) -> Sanitized<ReplyReference> {
    ReplyReference::from_wire(&TestEnvironment::new(), header, owner)
}

pub fn reply_to(target: i32, owner: &ReplyOwner) -> ReplyReference {
    build(WireReplyHeader::to_message(target), owner).into_value()
}

pub fn forward_from_user(user_id: i64, date: i32) -> WireForwardHeader {
    WireForwardHeader {
        from_id: Some(WirePeer::User { user_id }),
        date,
        ..WireForwardHeader::default()
    }
}
