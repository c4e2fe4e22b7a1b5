//! External description of a reply, as shown to API clients

use super::ReplyReference;
use crate::error::{ReplyError, Result};
use crate::models::{ChatId, ContentKind, FormattedText, MessageContent, MessageOrigin};
use crate::services::logging::log_error;
use serde::Serialize;

/// Origin of the replied-to message as shown to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OriginView {
    User { sender_user_id: i64 },
    HiddenUser { sender_name: String },
    Chat { sender_chat_id: i64, author_signature: String },
}

/// Reply to a message, as shown to API clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyView {
    pub chat_id: i64,
    /// 0 when the target is unknown
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<FormattedText>,
    pub is_quote_manual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<OriginView>,
    /// 0 when the send date is unknown
    pub origin_send_date: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
}

fn origin_view(origin: &MessageOrigin) -> Result<OriginView> {
    match origin {
        MessageOrigin::User { sender_user_id } => Ok(OriginView::User {
            sender_user_id: sender_user_id.0,
        }),
        MessageOrigin::HiddenUser { sender_name } => Ok(OriginView::HiddenUser {
            sender_name: sender_name.clone(),
        }),
        MessageOrigin::Chat {
            sender_chat_id,
            author_signature,
        } => Ok(OriginView::Chat {
            sender_chat_id: sender_chat_id.to_external(),
            author_signature: author_signature.clone(),
        }),
        MessageOrigin::Channel { .. } => Err(ReplyError::ChannelOrigin),
    }
}

impl ReplyReference {
    /// Projects the reference for API clients. `owner_chat` is the chat of the
    /// owning message and must be valid unless the reference names its own chat.
    pub fn to_view(&self, owner_chat: ChatId) -> Result<ReplyView> {
        let chat_id = match self.target_chat_id {
            Some(chat_id) => chat_id,
            None if owner_chat.is_valid() => owner_chat,
            None => {
                let err = ReplyError::UnresolvableChat { owner_chat };
                log_error(&err.to_string(), Some("reply view"));
                return Err(err);
            }
        };

        let origin = match &self.origin {
            Some(origin) => Some(origin_view(origin).map_err(|err| {
                log_error(&err.to_string(), Some("reply view"));
                err
            })?),
            None => None,
        };

        let quote = (!self.quote.is_empty()).then(|| self.quote.clone());
        let content = self
            .content
            .as_ref()
            .filter(|content| content.kind() != ContentKind::Unsupported)
            .cloned();

        Ok(ReplyView {
            chat_id: chat_id.to_external(),
            message_id: self.target_message_id.map_or(0, |id| id.to_external()),
            quote,
            is_quote_manual: self.is_quote_manual,
            origin,
            origin_send_date: self.origin_date.unwrap_or(0),
            content,
        })
    }
}
