//! Completion trigger tests
//!
//! Tests for the asynchronous arm step: valid fires, stale and late fires,
//! start failures and the event stream observers see along the way.

use std::sync::Arc;

use siprec_core::adapters::mock::MockAdapters;
use siprec_core::{
    CallId, DestinationSetConfig, EngageRequest, EngagementOrchestrator, MediaLeg, RecordingEvent,
    RecordingState, SiprecConfig,
};

const OFFER: &str = "v=0\r\n\
    o=caller 2890844526 2890844526 IN IP4 10.0.0.1\r\n\
    s=-\r\n\
    c=IN IP4 10.0.0.1\r\n\
    t=0 0\r\n\
    m=audio 49170 RTP/AVP 0\r\n";

const RENEGOTIATED_OFFER: &str = "v=0\r\n\
    o=caller 2890844526 2890844527 IN IP4 10.0.0.1\r\n\
    s=-\r\n\
    c=IN IP4 10.0.0.1\r\n\
    t=0 0\r\n\
    m=audio 49172 RTP/AVP 0 8\r\n";

fn build_orchestrator(mocks: &MockAdapters) -> Arc<EngagementOrchestrator> {
    let config = SiprecConfig::default().with_set(DestinationSetConfig::new(
        "main-srs",
        vec!["sip:rec.example.com:5060".to_string()],
    ));
    EngagementOrchestrator::new(
        config,
        mocks.dialogs.clone(),
        mocks.notifier.clone(),
        mocks.media.clone(),
    )
    .expect("valid test configuration")
}

fn request_for(call_id: &CallId) -> EngageRequest {
    EngageRequest::new(call_id.clone(), MediaLeg::Caller, OFFER)
}

/// Test that a trigger left over from a destroyed session is stale
#[tokio::test]
async fn stale_trigger_skips_the_replacement_session() {
    let mocks = MockAdapters::new();
    let orchestrator = build_orchestrator(&mocks);
    let call_id = CallId::from_value("replaced-call");

    let first = orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    let stale = mocks.notifier.take_armed().await;

    // Teardown, then a fresh engagement for the same call identifier.
    orchestrator.release(&call_id).await;
    let second = orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10002")
        .await
        .unwrap();
    assert_ne!(first.session_id, second.session_id);

    // The old transaction completes late; the new session must not react.
    for armed in stale {
        armed.trigger.fire().await;
    }
    assert_eq!(mocks.media.start_count(), 0);
    assert_eq!(
        orchestrator.session_info(&call_id).await.unwrap().state,
        RecordingState::ArmPending
    );

    // The replacement's own trigger still works.
    for armed in mocks.notifier.take_armed().await {
        armed.trigger.fire().await;
    }
    let info = orchestrator.session_info(&call_id).await.unwrap();
    assert_eq!(info.state, RecordingState::Active);
    assert_eq!(info.media_address, "198.51.100.7:10002");
}

/// Test that a refused recording start fails the session and sticks
#[tokio::test]
async fn start_failure_is_reported_and_sticky() {
    let mocks = MockAdapters::new();
    let orchestrator = build_orchestrator(&mocks);
    let call_id = CallId::from_value("refused-start-call");
    let mut subscriber = orchestrator.events().subscribe();
    mocks.media.set_fail_start(true);

    orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    for armed in mocks.notifier.take_armed().await {
        armed.trigger.fire().await;
    }

    let info = orchestrator.session_info(&call_id).await.unwrap();
    assert_eq!(info.state, RecordingState::Failed);
    assert_eq!(orchestrator.store().stats().await.start_failures, 1);

    let mut saw_failure = false;
    while let Some(event) = subscriber.try_receive() {
        if let RecordingEvent::RecordingStartFailed { call_id: id, error, .. } = event {
            assert_eq!(id, call_id);
            assert!(!error.is_empty());
            saw_failure = true;
        }
    }
    assert!(saw_failure);

    // A later engagement on the same call hands back the failed session
    // untouched and arms nothing new.
    let watch_calls = mocks.notifier.watch_calls();
    let handle = orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    assert!(!handle.created);
    assert_eq!(handle.state, RecordingState::Failed);
    assert_eq!(mocks.notifier.watch_calls(), watch_calls);
}

/// Test the event stream across a full engagement and activation
#[tokio::test]
async fn observers_see_the_lifecycle_in_order() {
    let mocks = MockAdapters::new();
    let orchestrator = build_orchestrator(&mocks);
    let call_id = CallId::from_value("observed-call");
    let mut subscriber = orchestrator.events().subscribe();

    orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    for armed in mocks.notifier.take_armed().await {
        armed.trigger.fire().await;
    }
    orchestrator.release(&call_id).await;

    let mut kinds = Vec::new();
    while let Some(event) = subscriber.try_receive() {
        kinds.push(match event {
            RecordingEvent::SessionCreated { .. } => "created",
            RecordingEvent::MediaCaptured { .. } => "captured",
            RecordingEvent::ArmScheduled { .. } => "armed",
            RecordingEvent::RecordingStarted { .. } => "started",
            RecordingEvent::RecordingStartFailed { .. } => "start-failed",
            RecordingEvent::SessionReleased { .. } => "released",
        });
    }
    assert_eq!(
        kinds,
        vec!["created", "captured", "armed", "started", "released"]
    );
}

/// Test that renegotiating an active session refreshes media without re-arming
#[tokio::test]
async fn active_session_renegotiation_does_not_rearm() {
    let mocks = MockAdapters::new();
    let orchestrator = build_orchestrator(&mocks);
    let call_id = CallId::from_value("renegotiated-call");

    orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    for armed in mocks.notifier.take_armed().await {
        armed.trigger.fire().await;
    }

    let request = EngageRequest::new(call_id.clone(), MediaLeg::Callee, RENEGOTIATED_OFFER);
    let handle = orchestrator
        .engage(request, "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();

    assert_eq!(handle.state, RecordingState::Active);
    assert_eq!(mocks.notifier.armed_count().await, 0);
    assert_eq!(mocks.media.start_count(), 1);

    let info = orchestrator.session_info(&call_id).await.unwrap();
    assert_eq!(info.sdp_revision, 2);
    assert_eq!(info.sdp.as_deref(), Some(RENEGOTIATED_OFFER));
}

/// Test that firing against an empty store is harmless
#[tokio::test]
async fn trigger_after_full_teardown_is_silent() {
    let mocks = MockAdapters::new();
    let orchestrator = build_orchestrator(&mocks);
    let call_id = CallId::from_value("gone-call");

    orchestrator
        .engage(request_for(&call_id), "main-srs", "198.51.100.7:10000")
        .await
        .unwrap();
    let armed = mocks.notifier.take_armed().await;
    orchestrator.release(&call_id).await;
    assert!(orchestrator.store().is_empty());

    for entry in armed {
        entry.trigger.fire().await;
    }
    assert_eq!(mocks.media.start_count(), 0);
    assert!(orchestrator.session_info(&call_id).await.is_none());
}
