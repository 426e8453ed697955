//! Completion Trigger
//!
//! The one-shot arm step scheduled during engagement. The transaction
//! notifier owns the trigger once registered and fires it on an independent
//! task when the watched transaction event occurs, which may be long after
//! `engage` returned.
//!
//! The trigger carries owned handles and validates the session at fire time:
//! a session that was destroyed, replaced, or never reached `ArmPending`
//! makes the fire a no-op. Destruction always wins over a late fire.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::MediaRelay;
use crate::events::{EventHub, RecordingEvent};
use crate::session::{RecordingState, SessionStore};
use crate::types::{CallId, SessionId, TransactionEventKind};

/// One-shot recording arm trigger
pub struct CompletionTrigger {
    store: Arc<SessionStore>,
    media: Arc<dyn MediaRelay>,
    events: EventHub,
    call_id: CallId,
    session_id: SessionId,
    event: TransactionEventKind,
}

impl std::fmt::Debug for CompletionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionTrigger")
            .field("call_id", &self.call_id)
            .field("session_id", &self.session_id)
            .field("event", &self.event)
            .finish()
    }
}

impl CompletionTrigger {
    pub(crate) fn new(
        store: Arc<SessionStore>,
        media: Arc<dyn MediaRelay>,
        events: EventHub,
        call_id: CallId,
        session_id: SessionId,
        event: TransactionEventKind,
    ) -> Self {
        Self {
            store,
            media,
            events,
            call_id,
            session_id,
            event,
        }
    }

    pub fn call_id(&self) -> &CallId {
        &self.call_id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn event(&self) -> TransactionEventKind {
        self.event
    }

    /// Fire the trigger, consuming it. A trigger cannot fire twice.
    ///
    /// Looks up the bound session and, when it is still the same session and
    /// still `ArmPending`, starts recording: `Active` on success, `Failed`
    /// with a reported error on refusal. Every other situation is a silent
    /// no-op; a start failure never reaches the call itself.
    pub async fn fire(self) {
        let Some(handle) = self.store.get(&self.call_id) else {
            debug!(
                "No recording session for call {}, completion trigger is a no-op",
                self.call_id
            );
            return;
        };

        // The lock is held across the whole arm step; destroy and attach for
        // this call wait their turn, other calls are unaffected.
        let mut session = handle.lock().await;

        if session.released {
            debug!(
                "Session {} already released, completion trigger is a no-op",
                session.session_id
            );
            return;
        }
        if session.session_id != self.session_id {
            debug!(
                "Completion trigger bound to stale session {} (call {} now has {}), no-op",
                self.session_id, self.call_id, session.session_id
            );
            return;
        }
        if session.state != RecordingState::ArmPending {
            debug!(
                "Session {} in state {}, completion trigger is a no-op",
                session.session_id, session.state
            );
            return;
        }

        let info = session.info();
        match self.media.start_recording(&info).await {
            Ok(()) => {
                if let Err(err) = session.transition_to(RecordingState::Active) {
                    warn!("Session {} could not activate: {}", session.session_id, err);
                    return;
                }
                self.events.publish(RecordingEvent::RecordingStarted {
                    session_id: session.session_id.clone(),
                    call_id: self.call_id.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(err) => {
                if let Err(transition_err) = session.mark_failed(&err.to_string()) {
                    warn!(
                        "Session {} could not record failure: {}",
                        session.session_id, transition_err
                    );
                }
                self.store.note_start_failure();
                self.events.publish(RecordingEvent::RecordingStartFailed {
                    session_id: session.session_id.clone(),
                    call_id: self.call_id.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
}
