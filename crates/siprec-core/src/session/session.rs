//! Recording Session Implementation
//!
//! Per-call recording session state machine. A session is the single source
//! of truth for one call's recording: the resolved destination set, the
//! captured media offer, and the lifecycle state. Sessions are owned
//! exclusively by the `SessionStore`; callers hold only the `CallId` key.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::destinations::DestinationSet;
use crate::errors::{EngageError, Result};
use crate::types::{CallId, MediaLeg, SessionId};

/// Lifecycle state of a recording session
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum RecordingState {
    /// Session exists, no media captured yet
    Created,
    /// At least one SDP offer has been captured
    SdpAttached,
    /// Completion trigger registered, waiting for the transaction to complete
    ArmPending,
    /// Media replication toward the recording server is running
    Active,
    /// Terminal failure
    Failed,
}

impl RecordingState {
    /// Forward transitions only. `Failed` is reachable from any state except
    /// `Active` and nothing leaves `Failed`.
    pub fn can_transition_to(&self, next: RecordingState) -> bool {
        use RecordingState::*;
        matches!(
            (self, next),
            (Created, SdpAttached)
                | (SdpAttached, ArmPending)
                | (ArmPending, Active)
                | (Created | SdpAttached | ArmPending, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordingState::Failed)
    }
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::SdpAttached => write!(f, "sdp-attached"),
            Self::ArmPending => write!(f, "arm-pending"),
            Self::Active => write!(f, "active"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A call's recording session
#[derive(Debug)]
pub struct RecordingSession {
    /// Unique session identifier
    pub session_id: SessionId,

    /// Owning call. The session never outlives the call.
    pub call_id: CallId,

    /// Resolved destination set, immutable for the life of the session
    pub destination: Arc<DestinationSet>,

    /// Media address negotiated for the recording leg
    pub media_address: String,

    /// Most recent SDP payload captured from the call
    pub sdp: Option<String>,

    /// Total offers captured; the payload above is revision `sdp_revision`
    pub sdp_revision: u64,

    /// Offers captured per leg
    pub caller_offers: u32,
    pub callee_offers: u32,

    /// Lifecycle state
    pub state: RecordingState,

    /// Set when the store destroys the session. An in-flight completion
    /// trigger that observes this must do nothing.
    pub released: bool,

    /// When this session was created
    pub created_at: DateTime<Utc>,
}

impl RecordingSession {
    pub fn new(
        call_id: CallId,
        destination: Arc<DestinationSet>,
        media_address: impl Into<String>,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            call_id,
            destination,
            media_address: media_address.into(),
            sdp: None,
            sdp_revision: 0,
            caller_offers: 0,
            callee_offers: 0,
            state: RecordingState::Created,
            released: false,
            created_at: Utc::now(),
        }
    }

    /// Apply a state transition, rejecting anything the state machine does
    /// not allow.
    pub fn transition_to(&mut self, next: RecordingState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(EngageError::InvalidTransition(format!(
                "session {}: {} -> {}",
                self.session_id, self.state, next
            )));
        }
        let old = self.state;
        self.state = next;
        tracing::debug!("Session {} state: {} -> {}", self.session_id, old, next);
        Ok(())
    }

    /// Move to the terminal `Failed` state. Valid from any non-`Active`
    /// state; a session that is already recording cannot fail retroactively.
    pub fn mark_failed(&mut self, reason: &str) -> Result<()> {
        if self.state == RecordingState::Failed {
            return Ok(());
        }
        self.transition_to(RecordingState::Failed)?;
        tracing::warn!("Session {} failed: {}", self.session_id, reason);
        Ok(())
    }

    /// Store the captured offer. The relay validates the payload and drives
    /// the state transition; this only records the data.
    pub fn record_offer(&mut self, leg: MediaLeg, sdp: String) {
        self.sdp = Some(sdp);
        self.sdp_revision += 1;
        match leg {
            MediaLeg::Caller => self.caller_offers += 1,
            MediaLeg::Callee => self.callee_offers += 1,
        }
    }

    pub fn has_media(&self) -> bool {
        self.sdp.is_some()
    }

    /// Cloneable snapshot for collaborators and introspection.
    pub fn info(&self) -> RecordingSessionInfo {
        RecordingSessionInfo {
            session_id: self.session_id.clone(),
            call_id: self.call_id.clone(),
            destination_name: self.destination.name.clone(),
            endpoints: self.destination.endpoints.iter().map(|e| e.uri.clone()).collect(),
            media_address: self.media_address.clone(),
            sdp: self.sdp.clone(),
            sdp_revision: self.sdp_revision,
            state: self.state,
            created_at: self.created_at,
        }
    }
}

/// Public snapshot of a recording session
///
/// Handed to the media relay when recording starts and returned by the
/// store's introspection calls. Decoupled from the live session so holders
/// cannot mutate store-owned state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSessionInfo {
    pub session_id: SessionId,
    pub call_id: CallId,
    pub destination_name: String,
    pub endpoints: Vec<String>,
    pub media_address: String,
    pub sdp: Option<String>,
    pub sdp_revision: u64,
    pub state: RecordingState,
    pub created_at: DateTime<Utc>,
}
