//! Test doubles for the collaborator interfaces
//!
//! Deterministic in-memory implementations with failure injection, used by
//! the crate's unit and integration tests. The notifier stores registered
//! triggers instead of firing them so tests control exactly when the
//! asynchronous arm step runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::errors::AdapterError;
use crate::session::RecordingSessionInfo;
use crate::trigger::CompletionTrigger;
use crate::types::{CallId, DialogRef, TransactionEventKind};

use super::{AdapterResult, DialogEngine, MediaRelay, TransactionNotifier};

/// Dialog engine double backed by a map of known dialogs
pub struct MockDialogEngine {
    dialogs: DashMap<CallId, DialogRef>,
    fail_create: AtomicBool,
    create_calls: AtomicUsize,
}

impl MockDialogEngine {
    pub fn new() -> Self {
        Self {
            dialogs: DashMap::new(),
            fail_create: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Pre-bind a dialog so `current_dialog` finds one without creation
    pub fn insert_dialog(&self, call_id: CallId, dialog: DialogRef) {
        self.dialogs.insert(call_id, dialog);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// How many times `create_dialog` was attempted
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDialogEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DialogEngine for MockDialogEngine {
    async fn current_dialog(&self, call_id: &CallId) -> Option<DialogRef> {
        self.dialogs.get(call_id).map(|entry| entry.clone())
    }

    async fn create_dialog(&self, call_id: &CallId) -> AdapterResult<DialogRef> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AdapterError::new("dialog engine refused to create a dialog"));
        }
        let dialog = DialogRef::new();
        self.dialogs.insert(call_id.clone(), dialog.clone());
        Ok(dialog)
    }
}

/// A registration captured by the mock notifier
pub struct ArmedTrigger {
    pub dialog: DialogRef,
    pub event: TransactionEventKind,
    pub trigger: CompletionTrigger,
}

/// Notifier double that parks registered triggers for manual firing
pub struct MockTransactionNotifier {
    armed: Mutex<Vec<ArmedTrigger>>,
    fail_watch: AtomicBool,
    watch_calls: AtomicUsize,
}

impl MockTransactionNotifier {
    pub fn new() -> Self {
        Self {
            armed: Mutex::new(Vec::new()),
            fail_watch: AtomicBool::new(false),
            watch_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_watch(&self, fail: bool) {
        self.fail_watch.store(fail, Ordering::SeqCst);
    }

    /// How many times `watch_transaction` was attempted
    pub fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }

    pub async fn armed_count(&self) -> usize {
        self.armed.lock().await.len()
    }

    /// Drain the parked registrations so the test can fire them
    pub async fn take_armed(&self) -> Vec<ArmedTrigger> {
        self.armed.lock().await.drain(..).collect()
    }
}

impl Default for MockTransactionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionNotifier for MockTransactionNotifier {
    async fn watch_transaction(
        &self,
        dialog: &DialogRef,
        event: TransactionEventKind,
        trigger: CompletionTrigger,
    ) -> AdapterResult<()> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_watch.load(Ordering::SeqCst) {
            return Err(AdapterError::new("notifier rejected the callback"));
        }
        self.armed.lock().await.push(ArmedTrigger {
            dialog: dialog.clone(),
            event,
            trigger,
        });
        Ok(())
    }
}

/// Media relay double recording every successful start
pub struct MockMediaRelay {
    started: Mutex<Vec<RecordingSessionInfo>>,
    fail_start: AtomicBool,
    start_calls: AtomicUsize,
}

impl MockMediaRelay {
    pub fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            fail_start: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// How many times `start_recording` was attempted
    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Sessions whose start succeeded
    pub async fn started_sessions(&self) -> Vec<RecordingSessionInfo> {
        self.started.lock().await.clone()
    }
}

impl Default for MockMediaRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaRelay for MockMediaRelay {
    async fn start_recording(&self, session: &RecordingSessionInfo) -> AdapterResult<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(AdapterError::new("media relay refused to start"));
        }
        self.started.lock().await.push(session.clone());
        Ok(())
    }
}

/// Convenience bundle wiring all three mocks
pub struct MockAdapters {
    pub dialogs: Arc<MockDialogEngine>,
    pub notifier: Arc<MockTransactionNotifier>,
    pub media: Arc<MockMediaRelay>,
}

impl MockAdapters {
    pub fn new() -> Self {
        Self {
            dialogs: Arc::new(MockDialogEngine::new()),
            notifier: Arc::new(MockTransactionNotifier::new()),
            media: Arc::new(MockMediaRelay::new()),
        }
    }
}

impl Default for MockAdapters {
    fn default() -> Self {
        Self::new()
    }
}
