//! Deciding whether a changed reply reference is worth telling the user about

use super::ReplyReference;
use crate::models::{MessageId, MessageOrigin};
use crate::services::logging::log_change_decision;

/// Why a reply reference transition is or isn't significant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeVerdict {
    /// The known send date of the replied-to message changed
    OriginDateChanged,
    /// The sender of the replied-to message changed beyond its signature
    OriginChanged,
    /// An existing reply moved to another chat
    TargetChatChanged,
    /// Same target, nothing the user would notice
    Unchanged,
    /// A yet unsent reply lost its target after the target was deleted locally
    TargetDeleted,
    /// A yet unsent reply gained a target the server knows but which was deleted locally
    TargetDeletedLocally,
    /// Only the send date of the scheduled target changed
    ScheduleDateChanged,
    /// A yet unsent reply was moved onto its thread root after the target was deleted
    MovedToThreadRoot,
    /// The reply now points at another message
    TargetChanged,
}

impl ChangeVerdict {
    pub fn needs_notification(&self) -> bool {
        match self {
            ChangeVerdict::OriginDateChanged
            | ChangeVerdict::OriginChanged
            | ChangeVerdict::TargetChatChanged
            | ChangeVerdict::TargetChanged => true,
            ChangeVerdict::Unchanged
            | ChangeVerdict::TargetDeleted
            | ChangeVerdict::TargetDeletedLocally
            | ChangeVerdict::ScheduleDateChanged
            | ChangeVerdict::MovedToThreadRoot => false,
        }
    }
}

/// A change of origin that can't be explained by a signature update
fn is_unsigned_origin_change(old: Option<&MessageOrigin>, new: Option<&MessageOrigin>) -> bool {
    old != new
        && !old.is_some_and(MessageOrigin::has_sender_signature)
        && !new.is_some_and(MessageOrigin::has_sender_signature)
}

fn scheduled_server_id(message_id: Option<MessageId>) -> Option<i32> {
    message_id
        .filter(|id| id.is_valid_scheduled() && id.is_scheduled_server())
        .and_then(|id| id.scheduled_server_message_id())
}

/// Classifies the transition from `old` to `new`.
///
/// `old_top_thread_message_id` is the thread root of the owning message before
/// the update, `is_yet_unsent` tells whether the owning message is still being
/// sent, and `is_reply_to_deleted_message` tells whether a reference points at
/// a message that was known locally and has since been deleted.
pub fn classify_change<F>(
    old: &ReplyReference,
    new: &ReplyReference,
    old_top_thread_message_id: Option<MessageId>,
    is_yet_unsent: bool,
    is_reply_to_deleted_message: F,
) -> ChangeVerdict
where
    F: Fn(&ReplyReference) -> bool,
{
    if let (Some(old_date), Some(new_date)) = (old.origin_date, new.origin_date) {
        if old_date != new_date {
            return ChangeVerdict::OriginDateChanged;
        }
    }
    if old.origin.is_some()
        && new.origin.is_some()
        && is_unsigned_origin_change(old.origin.as_ref(), new.origin.as_ref())
    {
        return ChangeVerdict::OriginChanged;
    }
    if old.target_chat_id.is_some() && new.target_chat_id.is_some() && old.target_chat_id != new.target_chat_id {
        return ChangeVerdict::TargetChatChanged;
    }

    if old.target_message_id == new.target_message_id && old.target_chat_id == new.target_chat_id {
        if old.target_message_id.is_some() {
            if old.origin_date != new.origin_date {
                return ChangeVerdict::OriginDateChanged;
            }
            if is_unsigned_origin_change(old.origin.as_ref(), new.origin.as_ref()) {
                return ChangeVerdict::OriginChanged;
            }
        }
        return ChangeVerdict::Unchanged;
    }

    if is_yet_unsent && new.target_message_id.is_none() && is_reply_to_deleted_message(old) {
        return ChangeVerdict::TargetDeleted;
    }
    if is_yet_unsent && old.target_message_id.is_none() && is_reply_to_deleted_message(new) {
        return ChangeVerdict::TargetDeletedLocally;
    }
    if let (Some(old_server_id), Some(new_server_id)) = (
        scheduled_server_id(old.target_message_id),
        scheduled_server_id(new.target_message_id),
    ) {
        if old_server_id == new_server_id {
            return ChangeVerdict::ScheduleDateChanged;
        }
    }
    if is_yet_unsent && old_top_thread_message_id == new.target_message_id && new.target_chat_id.is_none() {
        return ChangeVerdict::MovedToThreadRoot;
    }
    ChangeVerdict::TargetChanged
}

/// Whether the user should be told that the reply of a message changed
pub fn needs_change_notification<F>(
    old: &ReplyReference,
    new: &ReplyReference,
    old_top_thread_message_id: Option<MessageId>,
    is_yet_unsent: bool,
    is_reply_to_deleted_message: F,
) -> bool
where
    F: Fn(&ReplyReference) -> bool,
{
    let verdict = classify_change(
        old,
        new,
        old_top_thread_message_id,
        is_yet_unsent,
        is_reply_to_deleted_message,
    );
    log_change_decision(old, new, verdict);
    verdict.needs_notification()
}
