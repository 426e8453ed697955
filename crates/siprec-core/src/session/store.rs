//! Session storage keyed by call
//!
//! The store is the exclusive owner of recording sessions. Entries are
//! `Arc<Mutex<RecordingSession>>`: the per-session mutex serializes the
//! engagement path against the completion trigger for the same call without
//! blocking unrelated calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::destinations::DestinationSet;
use crate::errors::{EngageError, Result};
use crate::types::CallId;

use super::session::{RecordingSession, RecordingSessionInfo, RecordingState};

/// Shared handle to a stored session
pub type SessionHandle = Arc<Mutex<RecordingSession>>;

/// Call-keyed session storage
pub struct SessionStore {
    /// Primary storage, at most one session per call
    sessions: DashMap<CallId, SessionHandle>,

    /// Upper bound on concurrent sessions; 0 means unbounded
    max_sessions: usize,

    created: AtomicU64,
    released: AtomicU64,
    failed: AtomicU64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("active", &self.sessions.len())
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

impl SessionStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store refusing new sessions beyond `max_sessions` (0 means
    /// unbounded)
    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
            created: AtomicU64::new(0),
            released: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Find the call's session or create one.
    ///
    /// Idempotent: when a session already exists it is returned unchanged and
    /// the supplied destination and media address are ignored. The boolean
    /// reports whether this call created the session.
    pub fn get_or_create(
        &self,
        call_id: &CallId,
        destination: Arc<DestinationSet>,
        media_address: &str,
    ) -> Result<(SessionHandle, bool)> {
        if let Some(existing) = self.sessions.get(call_id) {
            return Ok((existing.clone(), false));
        }

        // Capacity is checked outside the entry lock; an existing session is
        // never refused, only creation of a new one.
        if self.max_sessions > 0 && self.sessions.len() >= self.max_sessions {
            return Err(EngageError::SessionCreationFailed(format!(
                "session limit of {} reached",
                self.max_sessions
            )));
        }

        match self.sessions.entry(call_id.clone()) {
            Entry::Occupied(entry) => Ok((entry.get().clone(), false)),
            Entry::Vacant(entry) => {
                let session = RecordingSession::new(call_id.clone(), destination, media_address);
                let session_id = session.session_id.clone();
                let handle = Arc::new(Mutex::new(session));
                entry.insert(handle.clone());
                self.created.fetch_add(1, Ordering::Relaxed);
                info!("Created recording session {} for call {}", session_id, call_id);
                Ok((handle, true))
            }
        }
    }

    /// Look up the call's session
    pub fn get(&self, call_id: &CallId) -> Option<SessionHandle> {
        self.sessions.get(call_id).map(|entry| entry.clone())
    }

    /// Destroy the call's session. Absent session is a no-op, not an error.
    ///
    /// The entry is removed first, then the session is marked released under
    /// its own lock: a completion trigger racing this call observes either a
    /// missing entry or the released marker and does nothing.
    pub async fn destroy(&self, call_id: &CallId) -> Option<RecordingSessionInfo> {
        let (_, handle) = self.sessions.remove(call_id)?;
        let mut session = handle.lock().await;
        session.released = true;
        self.released.fetch_add(1, Ordering::Relaxed);
        info!("Released recording session {} for call {}", session.session_id, call_id);
        Some(session.info())
    }

    /// Synchronous eviction for engagement rollback.
    ///
    /// Only valid before a completion trigger has been armed for the session,
    /// which is exactly the window rollback runs in; nothing else can hold
    /// the session lock then.
    pub(crate) fn evict(&self, call_id: &CallId) -> Option<RecordingSessionInfo> {
        let (_, handle) = self.sessions.remove(call_id)?;
        let info = match handle.try_lock() {
            Ok(mut session) => {
                session.released = true;
                Some(session.info())
            }
            // Lock contention here means a trigger got armed after all; the
            // map removal alone already hides the session from it.
            Err(_) => None,
        };
        self.released.fetch_add(1, Ordering::Relaxed);
        debug!("Evicted recording session for call {}", call_id);
        info
    }

    pub fn contains(&self, call_id: &CallId) -> bool {
        self.sessions.contains_key(call_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Record an asynchronous recording-start failure for the stats surface.
    pub(crate) fn note_start_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot every stored session
    pub async fn snapshot(&self) -> Vec<RecordingSessionInfo> {
        let handles: Vec<SessionHandle> =
            self.sessions.iter().map(|entry| entry.value().clone()).collect();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            infos.push(handle.lock().await.info());
        }
        infos
    }

    /// Aggregate counters
    pub async fn stats(&self) -> StoreStats {
        let mut active = 0usize;
        let mut arm_pending = 0usize;
        for info in self.snapshot().await {
            match info.state {
                RecordingState::Active => active += 1,
                RecordingState::ArmPending => arm_pending += 1,
                _ => {}
            }
        }
        StoreStats {
            stored: self.sessions.len(),
            recording: active,
            arm_pending,
            total_created: self.created.load(Ordering::Relaxed),
            total_released: self.released.load(Ordering::Relaxed),
            start_failures: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Store statistics
#[derive(Debug, Default, Clone)]
pub struct StoreStats {
    pub stored: usize,
    pub recording: usize,
    pub arm_pending: usize,
    pub total_created: u64,
    pub total_released: u64,
    pub start_failures: u64,
}
