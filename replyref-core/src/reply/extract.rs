//! Embedded content of the replied-to message

use super::Sanitized;
use crate::environment::ContentDecoder;
use crate::error::ReplyAnomaly;
use crate::models::{ChatId, ContentKind, MessageContent};
use crate::wire::WireMedia;

/// Whether content of this kind may be shown as a reply preview
pub fn is_allowed_reply_content(kind: ContentKind) -> bool {
    match kind {
        ContentKind::Animation
        | ContentKind::Audio
        | ContentKind::Contact
        | ContentKind::Dice
        | ContentKind::Document
        | ContentKind::Game
        | ContentKind::Giveaway
        | ContentKind::Invoice
        | ContentKind::Location
        | ContentKind::Photo
        | ContentKind::Poll
        | ContentKind::Sticker
        | ContentKind::Story
        | ContentKind::Unsupported
        | ContentKind::Venue
        | ContentKind::Video
        | ContentKind::VideoNote
        | ContentKind::VoiceNote => true,
        ContentKind::ExpiredPhoto
        | ContentKind::ExpiredVideo
        | ContentKind::LiveLocation
        | ContentKind::Text => false,
    }
}

/// Decodes reply media and keeps it only if its kind may be previewed
pub fn extract_content<D>(decoder: &D, media: WireMedia, owner_chat: ChatId) -> Sanitized<Option<MessageContent>>
where
    D: ContentDecoder + ?Sized,
{
    let Some(content) = decoder.decode_content(media, owner_chat) else {
        return Sanitized::with_anomaly(None, ReplyAnomaly::UndecodableContent);
    };
    let kind = content.kind();
    if is_allowed_reply_content(kind) {
        Sanitized::clean(Some(content))
    } else {
        Sanitized::with_anomaly(None, ReplyAnomaly::RejectedContent { kind })
    }
}
