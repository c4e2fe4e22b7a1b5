//! Building a reply reference from a wire header

use super::extract::extract_content;
use super::quote::sanitize_quote;
use super::{ReplyOwner, ReplyReference, Sanitized};
use crate::environment::{ReplyEnvironment, SessionCapability};
use crate::error::ReplyAnomaly;
use crate::models::{ChatId, MessageId};
use crate::services::logging::log_anomaly;
use crate::wire::{WireForwardHeader, WirePeer, WireReplyHeader};

/// Anomalies recorded for one owning message
struct AnomalyLog<'a> {
    owner: &'a ReplyOwner,
    anomalies: Vec<ReplyAnomaly>,
}

impl<'a> AnomalyLog<'a> {
    fn new(owner: &'a ReplyOwner) -> Self {
        Self {
            owner,
            anomalies: Vec::new(),
        }
    }

    fn record(&mut self, anomaly: ReplyAnomaly) {
        log_anomaly(&self.owner.full_id(), &anomaly);
        self.anomalies.push(anomaly);
    }

    fn absorb<T>(&mut self, sanitized: Sanitized<T>) -> T {
        for anomaly in sanitized.anomalies {
            self.record(anomaly);
        }
        sanitized.value
    }

    fn finish<T>(self, value: T) -> Sanitized<T> {
        Sanitized {
            value,
            anomalies: self.anomalies,
        }
    }
}

impl ReplyReference {
    /// Builds a reply reference from an untrusted header received with the
    /// message `owner`. Never fails: inconsistent parts of the header are
    /// dropped and reported in the returned anomalies.
    pub fn from_wire<E>(env: &E, header: WireReplyHeader, owner: &ReplyOwner) -> Sanitized<ReplyReference>
    where
        E: ReplyEnvironment + ?Sized,
    {
        let WireReplyHeader {
            reply_to_scheduled,
            reply_to_msg_id,
            reply_to_peer_id,
            reply_from,
            reply_media,
            quote_text,
            quote_entities,
            quote,
        } = header;

        let mut log = AnomalyLog::new(owner);
        let mut reply = ReplyReference::default();

        if reply_to_scheduled {
            reply.target_message_id = scheduled_target(reply_to_msg_id, reply_to_peer_id, owner, &mut log);
            if reply_from.is_some() || reply_media.is_some() {
                log.record(ReplyAnomaly::ScheduledReplyWithForeignData);
            }
        } else {
            let (target, chat) = regular_target(env, reply_to_msg_id, reply_to_peer_id, owner, &mut log);
            reply.target_message_id = target;
            reply.target_chat_id = chat;

            if let Some(forward) = reply_from {
                reply_origin(env, forward, &mut reply, &mut log);
            }

            if let Some(media) = reply_media.filter(|media| !media.is_empty()) {
                reply.content = log.absorb(extract_content(env, media, owner.chat_id));
            }
        }

        if !quote_text.is_empty() {
            let quote_text = log.absorb(sanitize_quote(env, quote_text, quote_entities));
            reply.is_quote_manual = quote;
            reply.quote = quote_text;
        }

        log.finish(reply)
    }
}

fn scheduled_target(
    raw_id: i32,
    peer: Option<WirePeer>,
    owner: &ReplyOwner,
    log: &mut AnomalyLog<'_>,
) -> Option<MessageId> {
    let target = MessageId::scheduled_server(raw_id, owner.date);
    if !owner.message_id.is_valid_scheduled() {
        log.record(ReplyAnomaly::ScheduledReplyInRegularMessage { target });
        return None;
    }
    if !target.is_valid_scheduled() {
        log.record(ReplyAnomaly::InvalidScheduledTarget { raw_id });
        return None;
    }
    if let Some(peer) = peer {
        log.record(ReplyAnomaly::ScheduledReplyToOtherChat {
            target,
            chat: ChatId::from(peer),
        });
        return None;
    }
    if target == owner.message_id {
        log.record(ReplyAnomaly::SelfReply { target });
        return None;
    }
    Some(target)
}

fn regular_target<S>(
    capability: &S,
    raw_id: i32,
    peer: Option<WirePeer>,
    owner: &ReplyOwner,
    log: &mut AnomalyLog<'_>,
) -> (Option<MessageId>, Option<ChatId>)
where
    S: SessionCapability + ?Sized,
{
    if raw_id == 0 {
        if let Some(peer) = peer {
            log.record(ReplyAnomaly::ChatWithoutTarget {
                chat: ChatId::from(peer),
            });
        }
        return (None, None);
    }

    let target = MessageId::Server(raw_id);
    let mut chat = None;
    if let Some(peer) = peer {
        let decoded = ChatId::from(peer);
        if !decoded.is_valid() {
            log.record(ReplyAnomaly::InvalidTargetChat { chat: decoded });
            return (None, None);
        }
        // same-chat replies never store the chat explicitly
        if decoded != owner.chat_id {
            chat = Some(decoded);
        }
    }

    if !target.is_valid() {
        log.record(ReplyAnomaly::InvalidTarget { raw_id });
        return (None, None);
    }

    if !owner.message_id.is_scheduled() && chat.is_none() {
        if target == owner.message_id {
            log.record(ReplyAnomaly::SelfReply { target });
            return (None, None);
        }
        if target.is_newer_than(&owner.message_id)
            && !capability.multi_session_confirmation_enabled(owner.chat_id.kind())
        {
            log.record(ReplyAnomaly::ReplyFromFuture { target });
            return (None, None);
        }
    }

    (Some(target), chat)
}

fn reply_origin<E>(env: &E, forward: WireForwardHeader, reply: &mut ReplyReference, log: &mut AnomalyLog<'_>)
where
    E: ReplyEnvironment + ?Sized,
{
    if forward.channel_post != 0 {
        log.record(ReplyAnomaly::ChannelPostOrigin);
        return;
    }
    let date = forward.date;
    if date <= 0 {
        log.record(ReplyAnomaly::InvalidOriginDate { date });
        return;
    }

    // the date stays even when the sender can't be attributed
    reply.origin_date = Some(date);
    match env.resolve_origin(forward) {
        Ok(origin) => reply.origin = Some(origin),
        Err(err) => log.record(ReplyAnomaly::UnresolvedOrigin(err)),
    }
}
