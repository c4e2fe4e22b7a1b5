//! Collaborators consulted while building a reply reference
//!
//! All lookups are synchronous reads of state the caller already has cached.
//! If that state is loaded asynchronously, finish loading before calling
//! [`ReplyReference::from_wire`](crate::reply::ReplyReference::from_wire).

use crate::error::{FormatError, OriginError};
use crate::models::{ChatId, ChatKind, FormattedText, MessageContent, MessageEntity, MessageOrigin, UserId};
use crate::wire::{WireForwardHeader, WireMedia};

/// Whether a chat can observe its message ids out of receipt order
pub trait SessionCapability {
    /// True when several sessions of the account confirm messages in chats of
    /// this kind, so a newer id may arrive before an older one
    fn multi_session_confirmation_enabled(&self, kind: ChatKind) -> bool;
}

/// Capability derived from the number of active sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCountCapability {
    pub session_count: u32,
}

impl SessionCountCapability {
    pub fn new(session_count: u32) -> Self {
        Self { session_count }
    }
}

impl SessionCapability for SessionCountCapability {
    fn multi_session_confirmation_enabled(&self, kind: ChatKind) -> bool {
        match kind {
            ChatKind::User | ChatKind::Group => self.session_count > 1,
            ChatKind::Channel | ChatKind::SecretChat => false,
        }
    }
}

/// Turns a forward header into an attributed origin
pub trait OriginResolver {
    fn resolve_origin(&self, header: WireForwardHeader) -> Result<MessageOrigin, OriginError>;
}

/// Looks up users referenced from text spans
pub trait IdentityResolver {
    /// Returns the user if it is known locally
    fn resolve_user(&self, user_id: i64) -> Option<UserId>;
}

/// Rules applied to formatted text before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    /// Drop span kinds not allowed in the target context
    pub strip_disallowed_entities: bool,
    /// Clamp spans into the text bounds instead of failing
    pub clamp_entity_bounds: bool,
    /// Accept text that becomes empty after fixing
    pub allow_empty: bool,
    pub trim_trailing_whitespace: bool,
    pub collapse_whitespace: bool,
}

impl FixOptions {
    /// Options used for quoted excerpts
    pub const QUOTE: FixOptions = FixOptions {
        strip_disallowed_entities: true,
        clamp_entity_bounds: true,
        allow_empty: true,
        trim_trailing_whitespace: true,
        collapse_whitespace: true,
    };
}

/// Shared formatted-text normalization
pub trait TextFormatter {
    fn fix_formatted_text(
        &self,
        text: &str,
        entities: Vec<MessageEntity>,
        options: FixOptions,
    ) -> Result<FormattedText, FormatError>;
}

/// Decodes media into a message content
pub trait ContentDecoder {
    /// Returns `None` if the media cannot be represented as a content
    fn decode_content(&self, media: WireMedia, owner_chat: ChatId) -> Option<MessageContent>;
}

/// Everything needed to build a reply reference from a wire header
pub trait ReplyEnvironment:
    SessionCapability + OriginResolver + IdentityResolver + TextFormatter + ContentDecoder
{
}

impl<T> ReplyEnvironment for T where
    T: SessionCapability + OriginResolver + IdentityResolver + TextFormatter + ContentDecoder
{
}
