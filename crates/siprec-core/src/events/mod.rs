//! Recording Event System
//!
//! Simple event system using tokio::sync::broadcast for recording lifecycle
//! events. Publishing is lossy: no subscribers is acceptable, the engagement
//! path never blocks on observers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{CallId, SessionId, TransactionEventKind};

/// Default broadcast buffer size.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Recording lifecycle events published through the hub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordingEvent {
    /// A recording session was created for a call
    SessionCreated {
        session_id: SessionId,
        call_id: CallId,
        destination: String,
    },

    /// An SDP offer was captured into the session
    MediaCaptured {
        session_id: SessionId,
        call_id: CallId,
        revision: u64,
        initial_offer: bool,
    },

    /// A completion trigger was registered; recording will start out of band
    ArmScheduled {
        session_id: SessionId,
        call_id: CallId,
        event: TransactionEventKind,
    },

    /// Media replication toward the recording server began
    RecordingStarted {
        session_id: SessionId,
        call_id: CallId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The arm step fired but the media relay refused to start
    RecordingStartFailed {
        session_id: SessionId,
        call_id: CallId,
        error: String,
    },

    /// The session was destroyed (teardown or rollback)
    SessionReleased {
        session_id: SessionId,
        call_id: CallId,
        reason: String,
    },
}

/// Simple subscriber wrapper for recording events
pub struct RecordingEventSubscriber {
    receiver: broadcast::Receiver<RecordingEvent>,
}

impl RecordingEventSubscriber {
    pub fn new(receiver: broadcast::Receiver<RecordingEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event. Returns `None` once the hub is gone.
    pub async fn receive(&mut self) -> Option<RecordingEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_receive(&mut self) -> Option<RecordingEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(_) => return None,
            }
        }
    }
}

/// Broadcast hub for recording events
#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<RecordingEvent>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> RecordingEventSubscriber {
        RecordingEventSubscriber::new(self.sender.subscribe())
    }

    /// Publish a recording event
    pub fn publish(&self, event: RecordingEvent) {
        match &event {
            RecordingEvent::RecordingStarted { session_id, call_id, .. } => {
                tracing::info!("Recording started for session {} (call {})", session_id, call_id);
            }
            RecordingEvent::RecordingStartFailed { session_id, call_id, error } => {
                tracing::error!(
                    "Recording start failed for session {} (call {}): {}",
                    session_id,
                    call_id,
                    error
                );
            }
            RecordingEvent::SessionReleased { session_id, reason, .. } => {
                tracing::debug!("Session {} released: {}", session_id, reason);
            }
            _ => {}
        }

        match self.sender.send(event) {
            Ok(_) => {}
            Err(broadcast::error::SendError(_)) => {
                // No receivers are currently listening, which is fine
                tracing::trace!("No subscribers listening for recording event");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_without_subscribers_is_lossy() {
        let hub = EventHub::new();
        hub.publish(RecordingEvent::SessionReleased {
            session_id: SessionId::new(),
            call_id: CallId::new(),
            reason: "teardown".to_string(),
        });
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe();

        let session_id = SessionId::new();
        let call_id = CallId::new();
        hub.publish(RecordingEvent::SessionCreated {
            session_id: session_id.clone(),
            call_id: call_id.clone(),
            destination: "main-srs".to_string(),
        });

        match sub.receive().await {
            Some(RecordingEvent::SessionCreated { session_id: sid, destination, .. }) => {
                assert_eq!(sid, session_id);
                assert_eq!(destination, "main-srs");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn try_receive_returns_none_when_empty() {
        let hub = EventHub::new();
        let mut sub = hub.subscribe();
        assert!(sub.try_receive().is_none());
    }
}
