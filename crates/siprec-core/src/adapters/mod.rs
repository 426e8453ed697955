//! Collaborator Interfaces
//!
//! The engagement layer consumes the call/dialog engine, the transaction
//! notifier and the media relay as capability traits. The real call stack
//! plugs in behind them; tests plug in the doubles from [`mock`].

use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::session::RecordingSessionInfo;
use crate::trigger::CompletionTrigger;
use crate::types::{CallId, DialogRef, TransactionEventKind};

pub mod mock;

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Access to the call engine's dialog contexts
#[async_trait]
pub trait DialogEngine: Send + Sync {
    /// Dialog context already bound to the call, if any
    async fn current_dialog(&self, call_id: &CallId) -> Option<DialogRef>;

    /// Create a dialog context for the call
    async fn create_dialog(&self, call_id: &CallId) -> AdapterResult<DialogRef>;
}

/// Registration of transaction-completion callbacks
#[async_trait]
pub trait TransactionNotifier: Send + Sync {
    /// Register a one-shot trigger fired when `event` occurs on the dialog's
    /// current transaction. The notifier owns the trigger from here on and
    /// fires it at most once, on a task independent of the caller.
    async fn watch_transaction(
        &self,
        dialog: &DialogRef,
        event: TransactionEventKind,
        trigger: CompletionTrigger,
    ) -> AdapterResult<()>;
}

/// Media replication toward the recording server
#[async_trait]
pub trait MediaRelay: Send + Sync {
    /// Begin replicating the session's media toward its SRS endpoints.
    async fn start_recording(&self, session: &RecordingSessionInfo) -> AdapterResult<()>;
}
