//! Engagement Orchestrator
//!
//! Per-call entry point for recording engagement. Coordinates the
//! destination registry, the session store, the SDP relay and the external
//! collaborators, and schedules the asynchronous arm step.

use std::sync::Arc;

use tracing::{debug, info};

use crate::adapters::{DialogEngine, MediaRelay, TransactionNotifier};
use crate::config::SiprecConfig;
use crate::destinations::DestinationRegistry;
use crate::errors::{EngageError, Result};
use crate::events::{EventHub, RecordingEvent};
use crate::sdp::SdpRelay;
use crate::session::{RecordingSessionInfo, RecordingState, SessionStore};
use crate::trigger::CompletionTrigger;
use crate::types::{CallId, DialogRef, MediaLeg, SessionId, TransactionEventKind};

use super::guard::EngagementGuard;

/// The call event an engagement runs on
#[derive(Debug, Clone)]
pub struct EngageRequest {
    /// The call to record
    pub call_id: CallId,
    /// Which leg the triggering message belongs to
    pub leg: MediaLeg,
    /// SDP carried by the triggering message
    pub sdp: String,
}

impl EngageRequest {
    pub fn new(call_id: CallId, leg: MediaLeg, sdp: impl Into<String>) -> Self {
        Self {
            call_id,
            leg,
            sdp: sdp.into(),
        }
    }
}

/// What a successful engagement produced
#[derive(Debug, Clone)]
pub struct EngagementHandle {
    pub session_id: SessionId,
    pub call_id: CallId,
    pub dialog: DialogRef,
    /// Whether this engagement created the session
    pub created: bool,
    /// Session state when `engage` returned
    pub state: RecordingState,
}

/// Coordinates one recording engagement per call event
pub struct EngagementOrchestrator {
    registry: Arc<DestinationRegistry>,
    store: Arc<SessionStore>,
    relay: SdpRelay,
    dialogs: Arc<dyn DialogEngine>,
    notifier: Arc<dyn TransactionNotifier>,
    media: Arc<dyn MediaRelay>,
    events: EventHub,
    completion_event: TransactionEventKind,
}

impl std::fmt::Debug for EngagementOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementOrchestrator")
            .field("destinations", &self.registry.len())
            .field("sessions", &self.store.len())
            .field("completion_event", &self.completion_event)
            .finish()
    }
}

impl EngagementOrchestrator {
    /// Build the orchestrator from configuration and the three collaborator
    /// handles the surrounding call stack provides.
    pub fn new(
        config: SiprecConfig,
        dialogs: Arc<dyn DialogEngine>,
        notifier: Arc<dyn TransactionNotifier>,
        media: Arc<dyn MediaRelay>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let registry = Arc::new(config.build_registry()?);
        let store = Arc::new(SessionStore::with_capacity(config.max_sessions));
        let relay = SdpRelay::with_max_payload(config.max_sdp_bytes);
        let events = EventHub::new();

        info!(
            "Engagement orchestrator ready: {} destination sets, session limit {}",
            registry.len(),
            config.max_sessions
        );

        Ok(Arc::new(Self {
            registry,
            store,
            relay,
            dialogs,
            notifier,
            media,
            events,
            completion_event: config.completion_event,
        }))
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<DestinationRegistry> {
        &self.registry
    }

    /// Engage recording for a call.
    ///
    /// Resolves the destination, finds or creates the call's session,
    /// attaches the current offer and registers the completion trigger that
    /// later starts recording. A failure after session creation destroys the
    /// newly created session; a session that existed before this call is
    /// never rolled back.
    pub async fn engage(
        &self,
        request: EngageRequest,
        destination_name: &str,
        media_address: &str,
    ) -> Result<EngagementHandle> {
        if destination_name.trim().is_empty() {
            return Err(EngageError::MissingParameter("destination_set"));
        }
        if media_address.trim().is_empty() {
            return Err(EngageError::MissingParameter("media_address"));
        }
        if request.call_id.as_str().is_empty() {
            return Err(EngageError::MissingParameter("call_id"));
        }

        // Resolved before anything is created or mutated; an unknown set has
        // no side effects.
        let destination = self.registry.resolve(destination_name)?;

        let call_id = request.call_id.clone();
        let dialog = match self.dialogs.current_dialog(&call_id).await {
            Some(dialog) => dialog,
            None => self
                .dialogs
                .create_dialog(&call_id)
                .await
                .map_err(|e| EngageError::DialogCreationFailed(e.to_string()))?,
        };

        let (handle, created) =
            self.store.get_or_create(&call_id, destination.clone(), media_address)?;
        let (session_id, entry_state) = {
            let session = handle.lock().await;
            (session.session_id.clone(), session.state)
        };

        if created {
            self.events.publish(RecordingEvent::SessionCreated {
                session_id: session_id.clone(),
                call_id: call_id.clone(),
                destination: destination.name.clone(),
            });
        }

        // Terminal state is sticky: hand the session back untouched.
        if entry_state == RecordingState::Failed {
            debug!(
                "Call {} has a failed recording session {}, leaving it alone",
                call_id, session_id
            );
            return Ok(EngagementHandle {
                session_id,
                call_id,
                dialog,
                created,
                state: RecordingState::Failed,
            });
        }

        let guard = EngagementGuard::new(
            self.store.clone(),
            self.events.clone(),
            call_id.clone(),
            session_id.clone(),
            created,
        );

        let receipt = self.relay.attach(&handle, request.leg, &request.sdp).await?;
        self.events.publish(RecordingEvent::MediaCaptured {
            session_id: session_id.clone(),
            call_id: call_id.clone(),
            revision: receipt.revision,
            initial_offer: receipt.initial_offer,
        });

        let state = if entry_state == RecordingState::Active {
            // Mid-call renegotiation: the refreshed offer is captured above,
            // recording already runs, nothing to re-arm.
            RecordingState::Active
        } else {
            let trigger = CompletionTrigger::new(
                self.store.clone(),
                self.media.clone(),
                self.events.clone(),
                call_id.clone(),
                session_id.clone(),
                self.completion_event,
            );

            let state = {
                let mut session = handle.lock().await;
                // Registered under the session lock: a trigger that fires
                // immediately blocks until the armed state is visible.
                self.notifier
                    .watch_transaction(&dialog, self.completion_event, trigger)
                    .await
                    .map_err(|e| EngageError::CallbackRegistrationFailed(e.to_string()))?;
                if session.state == RecordingState::SdpAttached {
                    session.transition_to(RecordingState::ArmPending)?;
                }
                session.state
            };

            self.events.publish(RecordingEvent::ArmScheduled {
                session_id: session_id.clone(),
                call_id: call_id.clone(),
                event: self.completion_event,
            });
            state
        };

        guard.commit();

        info!(
            "Engaged recording for call {} (session {}, destination '{}')",
            call_id, session_id, destination.name
        );

        Ok(EngagementHandle {
            session_id,
            call_id,
            dialog,
            created,
            state,
        })
    }

    /// Release the call's recording session on teardown.
    ///
    /// Absent session is a no-op. Returns whether a session existed.
    pub async fn release(&self, call_id: &CallId) -> bool {
        match self.store.destroy(call_id).await {
            Some(info) => {
                self.events.publish(RecordingEvent::SessionReleased {
                    session_id: info.session_id,
                    call_id: call_id.clone(),
                    reason: "call teardown".to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Snapshot of the call's session, if any
    pub async fn session_info(&self, call_id: &CallId) -> Option<RecordingSessionInfo> {
        let handle = self.store.get(call_id)?;
        let session = handle.lock().await;
        Some(session.info())
    }
}
