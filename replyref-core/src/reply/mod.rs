//! Reply references: what message a message replies to
//!
//! A [`ReplyReference`] is built once from an untrusted wire header
//! ([`ReplyReference::from_wire`]) or from a locally composed reply
//! ([`ReplyReference::for_outgoing`]) and is immutable afterwards. Successive
//! versions are compared with [`needs_change_notification`].

mod construct;
mod dependencies;
mod extract;
mod notify;
mod quote;
mod view;

pub use dependencies::{dependencies_of, Dependencies, Dependency};
pub use extract::{extract_content, is_allowed_reply_content};
pub use notify::{classify_change, needs_change_notification, ChangeVerdict};
pub use quote::{clean_input_string, sanitize_quote};
pub use view::{OriginView, ReplyView};

use crate::error::ReplyAnomaly;
use crate::models::{compare_contents, ChatId, FormattedText, MessageContent, MessageFullId, MessageId, MessageOrigin};
use serde::Serialize;
use std::fmt;

/// The message a reply reference belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplyOwner {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Send date of the owning message
    pub date: i32,
}

impl ReplyOwner {
    pub fn new(chat_id: ChatId, message_id: MessageId, date: i32) -> Self {
        Self {
            chat_id,
            message_id,
            date,
        }
    }

    pub fn full_id(&self) -> MessageFullId {
        MessageFullId {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }
}

/// A value produced from untrusted input, with everything that had to be
/// dropped along the way
#[derive(Debug, Clone)]
pub struct Sanitized<T> {
    pub value: T,
    pub anomalies: Vec<ReplyAnomaly>,
}

impl<T> Sanitized<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            anomalies: Vec::new(),
        }
    }

    pub fn with_anomaly(value: T, anomaly: ReplyAnomaly) -> Self {
        Self {
            value,
            anomalies: vec![anomaly],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Sanitized description of the message a message replies to
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplyReference {
    target_message_id: Option<MessageId>,
    target_chat_id: Option<ChatId>,
    origin: Option<MessageOrigin>,
    origin_date: Option<i32>,
    quote: FormattedText,
    is_quote_manual: bool,
    content: Option<MessageContent>,
}

impl ReplyReference {
    /// Reply of a locally composed message. Only the target is known; an
    /// invalid target gives an empty reference.
    pub fn for_outgoing(target: MessageId) -> Self {
        if !target.is_valid() {
            return Self::default();
        }
        Self {
            target_message_id: Some(target),
            ..Self::default()
        }
    }

    pub fn target_message_id(&self) -> Option<MessageId> {
        self.target_message_id
    }

    /// Chat of the target; `None` means the chat of the owning message
    pub fn target_chat_id(&self) -> Option<ChatId> {
        self.target_chat_id
    }

    pub fn origin(&self) -> Option<&MessageOrigin> {
        self.origin.as_ref()
    }

    pub fn origin_date(&self) -> Option<i32> {
        self.origin_date
    }

    pub fn quote(&self) -> &FormattedText {
        &self.quote
    }

    pub fn is_quote_manual(&self) -> bool {
        self.is_quote_manual
    }

    pub fn content(&self) -> Option<&MessageContent> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.target_message_id.is_none()
            && self.target_chat_id.is_none()
            && self.origin.is_none()
            && self.origin_date.is_none()
            && self.quote.is_empty()
            && self.content.is_none()
    }

    /// The replied-to message is described by the header rather than known locally
    pub fn is_external(&self) -> bool {
        self.origin_date.is_some()
    }

    pub fn is_same_chat_reply(&self) -> bool {
        self.target_chat_id.is_none() && !self.is_external()
    }

    /// Target, if it lives in the chat of the owning message
    pub fn same_chat_reply_to_message_id(&self) -> Option<MessageId> {
        if self.is_same_chat_reply() {
            self.target_message_id
        } else {
            None
        }
    }

    /// Full identifier of the target, with the owner's chat substituted when
    /// no explicit chat is stored
    pub fn reply_message_full_id(&self, owner_chat: ChatId) -> Option<MessageFullId> {
        let message_id = self.target_message_id?;
        if !message_id.is_valid() && !message_id.is_valid_scheduled() {
            return None;
        }
        Some(MessageFullId {
            chat_id: self.target_chat_id.unwrap_or(owner_chat),
            message_id,
        })
    }

    /// The embedded content is outdated and the owning message should be fetched again
    pub fn needs_reget(&self) -> bool {
        self.content.as_ref().is_some_and(MessageContent::needs_reget)
    }
}

impl PartialEq for ReplyReference {
    fn eq(&self, other: &Self) -> bool {
        self.target_message_id == other.target_message_id
            && self.target_chat_id == other.target_chat_id
            && self.origin_date == other.origin_date
            && self.origin == other.origin
            && self.quote == other.quote
            && self.is_quote_manual == other.is_quote_manual
            && compare_contents(self.content.as_ref(), other.content.as_ref()).is_equivalent()
    }
}

impl fmt::Display for ReplyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target_message_id {
            Some(target) => write!(f, "reply to {}", target)?,
            None => write!(f, "reply to no message")?,
        }
        if let Some(chat) = &self.target_chat_id {
            write!(f, " in {}", chat)?;
        }
        if let Some(date) = self.origin_date {
            write!(f, " sent at {}", date)?;
            if let Some(origin) = &self.origin {
                write!(f, " by {}", origin)?;
            }
        }
        if !self.quote.is_empty() {
            write!(
                f,
                " with {}{} quoted bytes",
                self.quote.text.len(),
                if self.is_quote_manual { " manually" } else { "" }
            )?;
        }
        if let Some(content) = &self.content {
            write!(f, " and content of type {}", content.kind())?;
        }
        Ok(())
    }
}
