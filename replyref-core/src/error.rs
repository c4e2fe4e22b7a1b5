//! Error and anomaly types

use crate::models::{ChatId, ContentKind, MessageId};
use thiserror::Error;

/// Something wrong with an incoming reply header. Anomalies never fail
/// construction; the offending field is cleared instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplyAnomaly {
    #[error("reply to {target} in a message that is not scheduled")]
    ScheduledReplyInRegularMessage { target: MessageId },

    #[error("reply to invalid scheduled message {raw_id}")]
    InvalidScheduledTarget { raw_id: i32 },

    #[error("reply to {target} in {chat} from a scheduled message")]
    ScheduledReplyToOtherChat { target: MessageId, chat: ChatId },

    #[error("reply from a scheduled message carries data of another chat")]
    ScheduledReplyWithForeignData,

    #[error("reply to the message itself")]
    SelfReply { target: MessageId },

    #[error("reply to {target}, which is newer than the message")]
    ReplyFromFuture { target: MessageId },

    #[error("reply to {chat} without a target message")]
    ChatWithoutTarget { chat: ChatId },

    #[error("reply to invalid {chat}")]
    InvalidTargetChat { chat: ChatId },

    #[error("reply to invalid message {raw_id}")]
    InvalidTarget { raw_id: i32 },

    #[error("reply header describes a channel post")]
    ChannelPostOrigin,

    #[error("reply origin has invalid date {date}")]
    InvalidOriginDate { date: i32 },

    #[error("failed to resolve reply origin: {0}")]
    UnresolvedOrigin(OriginError),

    #[error("reply media could not be decoded")]
    UndecodableContent,

    #[error("reply with media of the type {kind}")]
    RejectedContent { kind: ContentKind },

    #[error("quote mentions unknown user {user_id}")]
    UnknownMentionedUser { user_id: i64 },

    #[error("quote span of unknown kind dropped")]
    UnknownQuoteEntity,

    #[error("failed to fix quote text: {0}")]
    MalformedQuote(FormatError),
}

/// Origin resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OriginError {
    #[error("origin has no sender")]
    MissingSender,

    #[error("unknown sender user {0}")]
    UnknownUser(i64),

    #[error("invalid sender {0}")]
    InvalidSender(ChatId),
}

/// Formatted text fix-up failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("text is not valid UTF-8")]
    InvalidEncoding,

    #[error("text is too long: {length} characters, at most {max} allowed")]
    TooLong { length: usize, max: usize },

    #[error("text must be non-empty")]
    Empty,

    #[error("{0}")]
    Rejected(String),
}

/// Conditions that cannot occur when callers keep their contracts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("cannot resolve chat of reply: no target chat and invalid owner {owner_chat}")]
    UnresolvableChat { owner_chat: ChatId },

    #[error("reply origin must not be a channel post")]
    ChannelOrigin,
}

pub type Result<T> = std::result::Result<T, ReplyError>;
