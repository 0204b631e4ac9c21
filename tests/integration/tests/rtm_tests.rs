//! End-to-end ingestion tests
//!
//! Frames go in through a channel source; events come out of the session's
//! event stream.
//!
//! Run with: cargo test -p integration-tests --test rtm_tests

use integration_tests::{collect_events, fixtures::*, next_event, TestSession};
use rtm_common::{BackpressurePolicy, MalformedFramePolicy, RtmConfig};
use rtm_core::{EventKind, EventVariant, FrameError, Presence, StreamError, UnknownReason};
use rtm_gateway::{
    Dispatcher, EndReason, Envelope, EventRegistry, EventStream, RawFrame, RtmSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Decoding
// ============================================================================

#[tokio::test]
async fn test_presence_change_frame() {
    let session = TestSession::start();
    session.send(PRESENCE_ACTIVE).await.unwrap();

    let event = next_event(&session.events()).await.unwrap();
    let EventVariant::PresenceChange(presence) = event else {
        panic!("expected presence_change");
    };
    assert_eq!(presence.user, "U1");
    assert_eq!(presence.presence, Presence::Active);
}

#[tokio::test]
async fn test_message_frame() {
    let session = TestSession::start();
    session.send(MESSAGE_HI).await.unwrap();

    let event = next_event(&session.events()).await.unwrap();
    let message = event.as_message().expect("message event");
    assert_eq!(message.channel, "C1");
    assert_eq!(message.text, "hi");
    assert_eq!(message.user.as_deref(), Some("U2"));
}

#[tokio::test]
async fn test_unknown_frame_keeps_payload() {
    let session = TestSession::start();
    session.send(FUTURE_FEATURE).await.unwrap();

    let event = next_event(&session.events()).await.unwrap();
    assert_eq!(event.kind(), EventKind::Unknown);

    let unknown = event.as_unknown().unwrap();
    assert_eq!(unknown.discriminant, "future_feature_xyz");
    assert_eq!(unknown.reason, UnknownReason::Unregistered);
    assert_eq!(unknown.raw_json(), FUTURE_FEATURE);
}

#[tokio::test]
async fn test_frame_without_type_is_malformed() {
    let err = Envelope::decode(&RawFrame::from(NO_DISCRIMINANT)).unwrap_err();
    assert!(matches!(err, FrameError::MissingDiscriminant));

    let err = Envelope::decode(&RawFrame::from(REPLY_ACK)).unwrap_err();
    assert!(matches!(err, FrameError::MissingDiscriminant));

    // The dispatcher never sees the frame
    let dispatcher = Dispatcher::with_defaults();
    assert!(dispatcher.decode_frame(&RawFrame::from(NO_DISCRIMINANT)).is_err());
    assert_eq!(dispatcher.stats().dispatched, 0);
}

#[tokio::test]
async fn test_malformed_frames_skipped() {
    let session = TestSession::start();
    session.send(NO_DISCRIMINANT).await.unwrap();
    session.send("{not json").await.unwrap();
    session.send(HELLO).await.unwrap();

    let stream = session.events();
    let summary = session.finish().await.unwrap();
    assert_eq!(summary.end_reason, EndReason::SourceEnded);
    assert_eq!(summary.malformed_frames, 2);

    let events = collect_events(&stream).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::ConnectionEstablished);
}

#[tokio::test]
async fn test_malformed_frame_terminates_session() {
    let config = RtmConfig::default().with_malformed_frame_policy(MalformedFramePolicy::Terminate);
    let session = TestSession::start_with_config(config);
    session.send(HELLO).await.unwrap();
    session.send(NO_DISCRIMINANT).await.unwrap();

    let stream = session.events();
    let summary = session.finish().await.unwrap();
    assert_eq!(summary.end_reason, EndReason::MalformedFrame);

    let events = collect_events(&stream).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_schema_mismatch_becomes_unknown() {
    let session = TestSession::start();
    session.send(MESSAGE_WITHOUT_CHANNEL).await.unwrap();
    session.send(MESSAGE_HI).await.unwrap();

    let stream = session.events();
    let unknown = next_event(&stream).await.unwrap();
    let unknown = unknown.as_unknown().expect("unknown event");
    assert_eq!(unknown.discriminant, "message");
    assert!(matches!(unknown.reason, UnknownReason::DecodeFailed(_)));

    assert_eq!(next_event(&stream).await.unwrap().kind(), EventKind::Message);
}

#[tokio::test]
async fn test_nested_payloads() {
    let session = TestSession::start();
    session.send(REACTION_ADDED).await.unwrap();
    session.send(CHANNEL_JOINED).await.unwrap();

    let stream = session.events();
    let EventVariant::ReactionAdded(reaction) = next_event(&stream).await.unwrap() else {
        panic!("expected reaction_added");
    };
    assert_eq!(reaction.reaction, "thumbsup");
    assert_eq!(reaction.item.item_type, "message");
    assert_eq!(reaction.item.channel.as_deref(), Some("C1"));

    let EventVariant::ChannelJoined(joined) = next_event(&stream).await.unwrap() else {
        panic!("expected channel_joined");
    };
    assert_eq!(joined.channel.id, "C024BE91L");
    assert!(joined.channel.is_member);
}

#[tokio::test]
async fn test_custom_registry() {
    let registry = EventRegistry::new()
        .with("goodbye", |_| Ok(EventVariant::ConnectionEstablished(Default::default())));
    let session = TestSession::start_with_session(RtmSession::with_registry(
        RtmConfig::default(),
        registry,
    ));

    session.send(r#"{"type":"goodbye"}"#).await.unwrap();
    session.send(MESSAGE_HI).await.unwrap();

    let stream = session.events();
    assert_eq!(next_event(&stream).await.unwrap().kind(), EventKind::ConnectionEstablished);

    // Built-in kinds are absent from an empty registry
    let event = next_event(&stream).await.unwrap();
    assert_eq!(event.discriminant(), "message");
    assert!(event.is_unknown());
}

// ============================================================================
// Ordering and delivery
// ============================================================================

#[tokio::test]
async fn test_events_arrive_in_frame_order() {
    let session = TestSession::start();
    let stream = session.events();

    let consumer = tokio::spawn(async move { collect_events(&stream).await });

    let sent: Vec<_> = (0..100).map(|_| MessageFrame::unique()).collect();
    for message in &sent {
        session.send(message.to_frame()).await.unwrap();
    }
    let summary = session.finish().await.unwrap();
    assert_eq!(summary.events_delivered, 100);

    let received = consumer.await.unwrap().unwrap();
    let texts: Vec<&str> = received
        .iter()
        .map(|e| e.as_message().unwrap().text.as_str())
        .collect();
    let expected: Vec<&str> = sent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn test_close_drains_buffered_events() {
    let stream = EventStream::bounded(4);
    let dispatcher = Dispatcher::with_defaults();
    for frame in [PRESENCE_ACTIVE, MESSAGE_HI] {
        let event = dispatcher.decode_frame(&RawFrame::from(frame)).unwrap();
        stream.append(event).await.unwrap();
    }

    stream.close();

    assert_eq!(stream.next().await.unwrap().kind(), EventKind::PresenceChange);
    assert_eq!(stream.next().await.unwrap().kind(), EventKind::Message);
    assert_eq!(stream.next().await.unwrap_err(), StreamError::Closed);
    assert_eq!(stream.next().await.unwrap_err(), StreamError::Closed);
}

#[tokio::test]
async fn test_backpressure_blocks_session() {
    let config = RtmConfig::default().with_buffer_capacity(2);
    let session = TestSession::start_with_config(config);
    for frame in typing_frames(5) {
        session.send(frame).await.unwrap();
    }

    let stream = session.events();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(stream.len(), 2);
    assert_eq!(stream.dropped_count(), 0);

    let summary_task = tokio::spawn(session.finish());
    let events = collect_events(&stream).await.unwrap();
    let channels: Vec<String> = events
        .into_iter()
        .map(|e| match e {
            EventVariant::UserTyping(typing) => typing.channel,
            other => panic!("unexpected event {other}"),
        })
        .collect();
    assert_eq!(channels, vec!["C0", "C1", "C2", "C3", "C4"]);

    let summary = summary_task.await.unwrap().unwrap();
    assert_eq!(summary.events_delivered, 5);
}

#[tokio::test]
async fn test_drop_oldest_keeps_newest() {
    let config = RtmConfig::default()
        .with_buffer_capacity(2)
        .with_backpressure_policy(BackpressurePolicy::DropOldest);
    let session = TestSession::start_with_config(config);
    for frame in typing_frames(5) {
        session.send(frame).await.unwrap();
    }

    let stream = session.events();
    session.finish().await.unwrap();
    assert_eq!(stream.dropped_count(), 3);

    let events = collect_events(&stream).await.unwrap();
    assert_eq!(events.len(), 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_session() {
    let session = TestSession::start();
    session.send(HELLO).await.unwrap();
    session.send(MESSAGE_HI).await.unwrap();

    let stream = session.events();
    while stream.len() < 2 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let summary = session.cancel().await.unwrap();
    assert_eq!(summary.end_reason, EndReason::Cancelled);
    assert_eq!(summary.events_delivered, 2);

    let events = collect_events(&stream).await.unwrap();
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_cancel_pending_consumer() {
    let session = TestSession::start();
    let stream = session.events();
    let token = CancellationToken::new();

    let consumer = {
        let token = token.clone();
        tokio::spawn(async move { stream.next_with_cancel(&token).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let result = consumer.await.unwrap();
    assert_eq!(result.unwrap_err(), StreamError::Cancelled);

    // The session keeps running for other consumers
    session.send(HELLO).await.unwrap();
    assert_eq!(
        next_event(&session.events()).await.unwrap().kind(),
        EventKind::ConnectionEstablished
    );
}

#[tokio::test]
async fn test_shared_session_many_consumers() {
    let session = TestSession::start_with_config(RtmConfig::default().with_buffer_capacity(4));

    let mut consumers = Vec::new();
    for _ in 0..4 {
        let stream = session.events();
        consumers.push(tokio::spawn(async move { collect_events(&stream).await }));
    }

    for frame in typing_frames(40) {
        session.send(frame).await.unwrap();
    }
    let session_ref = Arc::clone(&session.session);
    let summary = session.finish().await.unwrap();
    assert_eq!(summary.session_id, session_ref.session_id());

    let mut total = 0;
    for consumer in consumers {
        total += consumer.await.unwrap().unwrap().len();
    }
    assert_eq!(total, 40);
}
