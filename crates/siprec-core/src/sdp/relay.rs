//! SDP Relay
//!
//! Attaches the call's current media offer to its recording session. The
//! first successful attach moves the session from `Created` to
//! `SdpAttached`; every later attach replaces the stored payload without
//! touching the state, so renegotiated offers reach the recorder too.

use tracing::debug;

use crate::errors::{EngageError, Result};
use crate::session::{RecordingState, SessionHandle};
use crate::types::{MediaLeg, SessionId};

use super::{has_media_description, has_version_line};

/// Default upper bound on accepted payloads.
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// What an attach did to the session
#[derive(Debug, Clone)]
pub struct AttachReceipt {
    pub session_id: SessionId,
    /// True when this was the session's first captured offer
    pub initial_offer: bool,
    /// Revision of the stored payload after this attach
    pub revision: u64,
}

/// Captures SDP offers into recording sessions
#[derive(Debug, Clone)]
pub struct SdpRelay {
    max_payload_bytes: usize,
}

impl SdpRelay {
    pub fn new() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    pub fn with_max_payload(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    /// Sanity-check a payload without touching any session.
    pub fn validate(&self, sdp: &str) -> Result<()> {
        if sdp.trim().is_empty() {
            return Err(EngageError::InvalidMedia("empty payload".to_string()));
        }
        if sdp.len() > self.max_payload_bytes {
            return Err(EngageError::InvalidMedia(format!(
                "payload of {} bytes exceeds limit of {}",
                sdp.len(),
                self.max_payload_bytes
            )));
        }
        if !has_version_line(sdp) {
            return Err(EngageError::InvalidMedia(
                "missing or misplaced version line".to_string(),
            ));
        }
        if !has_media_description(sdp) {
            return Err(EngageError::InvalidMedia(
                "no media description".to_string(),
            ));
        }
        Ok(())
    }

    /// Attach an offer to the session.
    ///
    /// A payload that fails validation leaves the session completely
    /// untouched. A released or failed session refuses the attach.
    pub async fn attach(
        &self,
        handle: &SessionHandle,
        leg: MediaLeg,
        sdp: &str,
    ) -> Result<AttachReceipt> {
        self.validate(sdp)?;

        let mut session = handle.lock().await;
        if session.released {
            return Err(EngageError::MediaAttachFailed(format!(
                "session {} already released",
                session.session_id
            )));
        }
        if session.state == RecordingState::Failed {
            return Err(EngageError::InvalidTransition(format!(
                "session {}: cannot attach media in state {}",
                session.session_id, session.state
            )));
        }

        let initial_offer = session.sdp_revision == 0;
        if session.state == RecordingState::Created {
            session.transition_to(RecordingState::SdpAttached)?;
        }
        session.record_offer(leg, sdp.to_string());

        debug!(
            "Captured {} offer for session {} (revision {})",
            leg, session.session_id, session.sdp_revision
        );

        Ok(AttachReceipt {
            session_id: session.session_id.clone(),
            initial_offer,
            revision: session.sdp_revision,
        })
    }
}

impl Default for SdpRelay {
    fn default() -> Self {
        Self::new()
    }
}
