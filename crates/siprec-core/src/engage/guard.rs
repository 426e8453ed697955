//! Scoped rollback for engagement
//!
//! A session created by an engagement that later fails must not survive the
//! failure. The guard owns that obligation: every exit path releases exactly
//! what was acquired, and `commit()` on the success path disarms it.

use std::sync::Arc;

use crate::events::{EventHub, RecordingEvent};
use crate::session::SessionStore;
use crate::types::{CallId, SessionId};

pub(crate) struct EngagementGuard {
    store: Arc<SessionStore>,
    events: EventHub,
    call_id: CallId,
    session_id: SessionId,
    /// Armed only when this engagement created the session; failures never
    /// destroy a session some earlier engagement established.
    armed: bool,
}

impl EngagementGuard {
    pub(crate) fn new(
        store: Arc<SessionStore>,
        events: EventHub,
        call_id: CallId,
        session_id: SessionId,
        created: bool,
    ) -> Self {
        Self {
            store,
            events,
            call_id,
            session_id,
            armed: created,
        }
    }

    /// The engagement succeeded; the session stays.
    pub(crate) fn commit(mut self) {
        self.armed = false;
    }
}

impl Drop for EngagementGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // No trigger has been armed yet when rollback runs, so the
        // synchronous eviction cannot contend with a fire.
        if self.store.evict(&self.call_id).is_some() {
            self.events.publish(RecordingEvent::SessionReleased {
                session_id: self.session_id.clone(),
                call_id: self.call_id.clone(),
                reason: "engagement rollback".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destinations::{DestinationSet, SrsEndpoint};

    fn store_with_session() -> (Arc<SessionStore>, CallId, SessionId) {
        let store = Arc::new(SessionStore::new());
        let call_id = CallId::new();
        let destination = Arc::new(DestinationSet::new(
            "main-srs",
            vec![SrsEndpoint::new("sip:rec.example.com:5060")],
        ));
        let (handle, _) = store
            .get_or_create(&call_id, destination, "10.0.0.1:7000")
            .unwrap();
        let session_id = handle.try_lock().unwrap().session_id.clone();
        (store, call_id, session_id)
    }

    #[tokio::test]
    async fn dropped_guard_evicts_a_created_session() {
        let (store, call_id, session_id) = store_with_session();
        let hub = EventHub::new();
        let mut sub = hub.subscribe();

        let guard =
            EngagementGuard::new(store.clone(), hub, call_id.clone(), session_id, true);
        drop(guard);

        assert!(!store.contains(&call_id));
        assert!(matches!(
            sub.try_receive(),
            Some(RecordingEvent::SessionReleased { .. })
        ));
    }

    #[tokio::test]
    async fn committed_guard_leaves_the_session() {
        let (store, call_id, session_id) = store_with_session();

        let guard = EngagementGuard::new(
            store.clone(),
            EventHub::new(),
            call_id.clone(),
            session_id,
            true,
        );
        guard.commit();

        assert!(store.contains(&call_id));
    }

    #[tokio::test]
    async fn guard_for_existing_session_never_rolls_back() {
        let (store, call_id, session_id) = store_with_session();

        let guard = EngagementGuard::new(
            store.clone(),
            EventHub::new(),
            call_id.clone(),
            session_id,
            false,
        );
        drop(guard);

        assert!(store.contains(&call_id));
    }
}
