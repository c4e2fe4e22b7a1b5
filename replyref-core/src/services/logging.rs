//! Logging service

use crate::error::ReplyAnomaly;
use crate::models::{LogLevel, MessageFullId};
use crate::reply::{ChangeVerdict, ReplyReference};

/// Initialize logging with the specified level
pub fn init_logging(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match level {
        LogLevel::Error => "replyref=error",
        LogLevel::Warn => "replyref=warn",
        LogLevel::Info => "replyref=info",
        LogLevel::Debug => "replyref=debug",
        LogLevel::Trace => "replyref=trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()?;

    Ok(())
}

/// Log a malformed part of a reply header received with `owner`
pub fn log_anomaly(owner: &MessageFullId, anomaly: &ReplyAnomaly) {
    match anomaly {
        ReplyAnomaly::UnresolvedOrigin(_) | ReplyAnomaly::UnknownMentionedUser { .. } => {
            tracing::warn!(
                owner_chat = %owner.chat_id,
                owner_message = %owner.message_id,
                anomaly = %anomaly,
                "Reply partially resolved"
            );
        }
        _ => {
            tracing::error!(
                owner_chat = %owner.chat_id,
                owner_message = %owner.message_id,
                anomaly = %anomaly,
                "Malformed reply header"
            );
        }
    }
}

/// Log the outcome of comparing two versions of a reply
pub fn log_change_decision(old: &ReplyReference, new: &ReplyReference, verdict: ChangeVerdict) {
    tracing::debug!(
        old = %old,
        new = %new,
        verdict = ?verdict,
        notify = verdict.needs_notification(),
        "Reply change classified"
    );
}

/// Log a system error
pub fn log_error(error: &str, context: Option<&str>) {
    tracing::error!(
        error = error,
        context = context.unwrap_or(""),
        "System error occurred"
    );
}
