mod common;

use common::*;
use replyref_core::models::{ChatId, Location, MessageContent, MessageId, MessageOrigin, RemoteFile, UserId};
use replyref_core::wire::{WireEntity, WireEntityKind, WireForwardHeader, WireMedia, WirePeer, WireReplyHeader, WireText};
use replyref_core::{OriginError, ReplyAnomaly, ReplyOwner, ReplyReference};

#[test]
fn test_plain_reply_in_same_chat() {
    let result = build(WireReplyHeader::to_message(500), &owner(600));

    assert!(result.is_clean());
    let reply = result.value;
    assert_eq!(reply.target_message_id(), Some(MessageId::Server(500)));
    assert_eq!(reply.target_chat_id(), None);
    assert!(reply.origin().is_none());
    assert_eq!(reply.origin_date(), None);
    assert!(reply.quote().is_empty());
    assert!(!reply.is_quote_manual());
    assert!(reply.content().is_none());
}

#[test]
fn test_peer_matching_owner_chat_is_not_stored() {
    let header = WireReplyHeader {
        reply_to_peer_id: Some(WirePeer::User { user_id: 1 }),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    assert_eq!(result.value.target_chat_id(), None);
    assert_eq!(result.value.target_message_id(), Some(MessageId::Server(500)));
}

#[test]
fn test_reply_from_the_future_is_dropped() {
    let result = build(WireReplyHeader::to_message(700), &owner(600));

    assert!(result.value.is_empty());
    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::ReplyFromFuture {
            target: MessageId::Server(700)
        }]
    );
}

#[test]
fn test_reply_from_the_future_is_kept_with_several_sessions() {
    let env = TestEnvironment::with_sessions(2);
    let result = ReplyReference::from_wire(&env, WireReplyHeader::to_message(700), &owner(600));

    assert!(result.is_clean());
    assert_eq!(result.value.target_message_id(), Some(MessageId::Server(700)));
}

#[test]
fn test_channels_ignore_session_count() {
    let env = TestEnvironment::with_sessions(2);
    let owner = ReplyOwner::new(ChatId::Channel(5), MessageId::Server(600), OWNER_DATE);
    let result = ReplyReference::from_wire(&env, WireReplyHeader::to_message(700), &owner);

    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::ReplyFromFuture { .. }]
    ));
    assert!(result.value.is_empty());
}

#[test]
fn test_self_reply_is_dropped() {
    let result = build(WireReplyHeader::to_message(600), &owner(600));

    assert!(result.value.is_empty());
    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::SelfReply {
            target: MessageId::Server(600)
        }]
    );
}

#[test]
fn test_cross_chat_reply_keeps_chat() {
    let header = WireReplyHeader {
        reply_to_peer_id: Some(WirePeer::Channel { channel_id: 77 }),
        ..WireReplyHeader::to_message(900)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    assert_eq!(result.value.target_chat_id(), Some(ChatId::Channel(77)));
    // ordering is only meaningful inside one chat
    assert_eq!(result.value.target_message_id(), Some(MessageId::Server(900)));
    assert!(!result.value.is_same_chat_reply());
}

#[test]
fn test_invalid_target_chat_drops_target() {
    let header = WireReplyHeader {
        reply_to_peer_id: Some(WirePeer::Channel { channel_id: 0 }),
        ..WireReplyHeader::to_message(300)
    };
    let result = build(header, &owner(600));

    assert!(result.value.is_empty());
    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::InvalidTargetChat {
            chat: ChatId::Channel(0)
        }]
    );
}

#[test]
fn test_chat_without_target_is_reported() {
    let header = WireReplyHeader {
        reply_to_peer_id: Some(WirePeer::Chat { chat_id: 12 }),
        ..WireReplyHeader::to_message(0)
    };
    let result = build(header, &owner(600));

    assert!(result.value.is_empty());
    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::ChatWithoutTarget {
            chat: ChatId::Group(12)
        }]
    );
}

#[test]
fn test_invalid_target_is_dropped() {
    let result = build(WireReplyHeader::to_message(-4), &owner(600));

    assert!(result.value.is_empty());
    assert_eq!(result.anomalies, vec![ReplyAnomaly::InvalidTarget { raw_id: -4 }]);
}

#[test]
fn test_scheduled_reply_in_regular_message() {
    let result = build(WireReplyHeader::to_scheduled(5), &owner(600));

    assert!(result.value.is_empty());
    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::ScheduledReplyInRegularMessage { .. }]
    ));
}

#[test]
fn test_scheduled_reply_uses_owner_date() {
    let owner = scheduled_owner(9, OWNER_DATE);
    let result = build(WireReplyHeader::to_scheduled(5), &owner);

    assert!(result.is_clean());
    assert_eq!(
        result.value.target_message_id(),
        Some(MessageId::scheduled_server(5, OWNER_DATE))
    );
    assert_eq!(result.value.target_chat_id(), None);
}

#[test]
fn test_scheduled_self_reply_is_dropped() {
    let owner = scheduled_owner(9, OWNER_DATE);
    let result = build(WireReplyHeader::to_scheduled(9), &owner);

    assert!(result.value.target_message_id().is_none());
    assert!(matches!(result.anomalies.as_slice(), [ReplyAnomaly::SelfReply { .. }]));
}

#[test]
fn test_scheduled_reply_to_other_chat() {
    let header = WireReplyHeader {
        reply_to_peer_id: Some(WirePeer::Chat { chat_id: 3 }),
        ..WireReplyHeader::to_scheduled(5)
    };
    let result = build(header, &scheduled_owner(9, OWNER_DATE));

    assert!(result.value.is_empty());
    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::ScheduledReplyToOtherChat {
            chat: ChatId::Group(3),
            ..
        }]
    ));
}

#[test]
fn test_scheduled_reply_with_zero_target() {
    let result = build(WireReplyHeader::to_scheduled(0), &scheduled_owner(9, OWNER_DATE));

    assert!(result.value.is_empty());
    assert_eq!(result.anomalies, vec![ReplyAnomaly::InvalidScheduledTarget { raw_id: 0 }]);
}

#[test]
fn test_scheduled_reply_ignores_origin_and_media() {
    let header = WireReplyHeader {
        reply_from: Some(forward_from_user(2, 1_600_000_000)),
        reply_media: Some(WireMedia::Poll { poll_id: 3 }),
        ..WireReplyHeader::to_scheduled(5)
    };
    let result = build(header, &scheduled_owner(9, OWNER_DATE));

    assert_eq!(result.anomalies, vec![ReplyAnomaly::ScheduledReplyWithForeignData]);
    let reply = result.value;
    assert!(reply.target_message_id().is_some());
    assert!(reply.origin().is_none());
    assert_eq!(reply.origin_date(), None);
    assert!(reply.content().is_none());
}

#[test]
fn test_external_reply_with_origin_and_media() {
    let header = WireReplyHeader {
        reply_from: Some(forward_from_user(2, 1_600_000_000)),
        reply_media: Some(WireMedia::Photo {
            photo: Some(RemoteFile::new(11, 12)),
            ttl_seconds: 0,
        }),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    let reply = result.value;
    assert_eq!(
        reply.origin(),
        Some(&MessageOrigin::User {
            sender_user_id: UserId(2)
        })
    );
    assert_eq!(reply.origin_date(), Some(1_600_000_000));
    assert!(reply.is_external());
    assert_eq!(
        reply.content(),
        Some(&MessageContent::Photo {
            file: RemoteFile::new(11, 12)
        })
    );
}

#[test]
fn test_unresolved_origin_keeps_date() {
    let header = WireReplyHeader {
        reply_from: Some(forward_from_user(999, 1_600_000_000)),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::UnresolvedOrigin(OriginError::UnknownUser(999))]
    );
    assert!(result.value.origin().is_none());
    assert_eq!(result.value.origin_date(), Some(1_600_000_000));
}

#[test]
fn test_channel_post_origin_is_ignored() {
    let header = WireReplyHeader {
        reply_from: Some(WireForwardHeader {
            from_id: Some(WirePeer::Channel { channel_id: 4 }),
            date: 1_600_000_000,
            channel_post: 31,
            ..WireForwardHeader::default()
        }),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert_eq!(result.anomalies, vec![ReplyAnomaly::ChannelPostOrigin]);
    assert!(result.value.origin().is_none());
    assert_eq!(result.value.origin_date(), None);
    assert_eq!(result.value.target_message_id(), Some(MessageId::Server(500)));
}

#[test]
fn test_origin_without_date_is_ignored() {
    let header = WireReplyHeader {
        reply_from: Some(forward_from_user(2, 0)),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert_eq!(result.anomalies, vec![ReplyAnomaly::InvalidOriginDate { date: 0 }]);
    assert!(result.value.origin().is_none());
    assert!(!result.value.is_external());
}

#[test]
fn test_hidden_user_origin() {
    let header = WireReplyHeader {
        reply_from: Some(WireForwardHeader {
            from_name: Some("Anonymous".to_string()),
            date: 1_600_000_000,
            ..WireForwardHeader::default()
        }),
        ..WireReplyHeader::to_message(0)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    assert!(result.value.target_message_id().is_none());
    assert!(matches!(
        result.value.origin(),
        Some(MessageOrigin::HiddenUser { sender_name }) if sender_name == "Anonymous"
    ));
}

#[test]
fn test_live_location_is_rejected() {
    let header = WireReplyHeader {
        reply_media: Some(WireMedia::GeoLive {
            geo: Location {
                latitude: 1.0,
                longitude: 2.0,
            },
            period: 60,
        }),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.value.content().is_none());
    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::RejectedContent { .. }]
    ));
}

#[test]
fn test_undecodable_media_is_dropped() {
    let header = WireReplyHeader {
        reply_media: Some(WireMedia::WebPage {
            url: "https://example.com".to_string(),
        }),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.value.content().is_none());
    assert_eq!(result.anomalies, vec![ReplyAnomaly::UndecodableContent]);
}

#[test]
fn test_empty_media_marker_is_ignored() {
    let header = WireReplyHeader {
        reply_media: Some(WireMedia::Empty),
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    assert!(result.value.content().is_none());
}

#[test]
fn test_manual_quote_is_kept() {
    let header = WireReplyHeader {
        quote_text: WireText::from("quoted words  "),
        quote_entities: vec![WireEntity {
            kind: WireEntityKind::Bold,
            offset: 0,
            length: 6,
        }],
        quote: true,
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    let reply = result.value;
    assert_eq!(reply.quote().text, "quoted words");
    assert_eq!(reply.quote().entities.len(), 1);
    assert!(reply.is_quote_manual());
}

#[test]
fn test_blank_quote_keeps_manual_flag() {
    let header = WireReplyHeader {
        quote_text: WireText::from("   "),
        quote: true,
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(result.value.quote().is_empty());
    assert!(result.value.is_quote_manual());
    assert!(result.value.to_view(user_chat()).unwrap().is_quote_manual);
}

#[test]
fn test_unknown_mention_is_dropped_from_quote() {
    let header = WireReplyHeader {
        quote_text: WireText::from("hello there"),
        quote_entities: vec![
            WireEntity {
                kind: WireEntityKind::MentionName { user_id: 555 },
                offset: 0,
                length: 5,
            },
            WireEntity {
                kind: WireEntityKind::MentionName { user_id: 42 },
                offset: 6,
                length: 5,
            },
        ],
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert_eq!(
        result.anomalies,
        vec![ReplyAnomaly::UnknownMentionedUser { user_id: 555 }]
    );
    assert_eq!(
        result.value.quote().mentioned_users().collect::<Vec<_>>(),
        vec![UserId(42)]
    );
}

#[test]
fn test_quote_that_fails_fixing_keeps_clean_text() {
    let header = WireReplyHeader {
        quote_text: WireText::from("bad\0quote"),
        quote_entities: vec![WireEntity {
            kind: WireEntityKind::Italic,
            offset: 0,
            length: 3,
        }],
        quote: true,
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::MalformedQuote(_)]
    ));
    assert_eq!(result.value.quote().text, "bad quote");
    assert!(result.value.quote().entities.is_empty());
    assert!(result.value.is_quote_manual());
}

#[test]
fn test_quote_with_invalid_encoding_is_cleared() {
    let header = WireReplyHeader {
        quote_text: WireText(vec![0x61, 0xff, 0x62]),
        quote: true,
        ..WireReplyHeader::to_message(500)
    };
    let result = build(header, &owner(600));

    assert!(matches!(
        result.anomalies.as_slice(),
        [ReplyAnomaly::MalformedQuote(_)]
    ));
    assert!(result.value.quote().is_empty());
    assert!(result.value.is_quote_manual());
}

#[test]
fn test_unsent_owner_accepts_older_target() {
    let result = build(WireReplyHeader::to_message(10), &unsent_owner());

    assert!(result.is_clean());
    assert_eq!(result.value.target_message_id(), Some(MessageId::Server(10)));
}

#[test]
fn test_header_from_json_fixture() {
    let header: WireReplyHeader = serde_json::from_str(
        r#"{
            "reply_to_msg_id": 500,
            "reply_to_peer_id": {"_": "channel", "channel_id": 77},
            "reply_from": {"from_id": {"_": "user", "user_id": 3}, "date": 1600000000},
            "reply_media": {"_": "poll", "poll_id": 8},
            "quote_text": "quoted",
            "quote": true
        }"#,
    )
    .unwrap();
    let result = build(header, &owner(600));

    assert!(result.is_clean());
    let reply = result.value;
    assert_eq!(reply.target_chat_id(), Some(ChatId::Channel(77)));
    assert_eq!(reply.origin_date(), Some(1_600_000_000));
    assert_eq!(reply.content(), Some(&MessageContent::Poll { poll_id: 8 }));
    assert!(reply.is_quote_manual());
}
