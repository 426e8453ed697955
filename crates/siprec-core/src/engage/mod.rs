//! Recording engagement
//!
//! The orchestrator runs the per-call engagement sequence: validate, resolve
//! the destination, ensure a dialog, find or create the session, attach the
//! current offer, register the completion trigger. Sessions created by an
//! engagement that fails partway are rolled back by a scoped guard.

mod guard;
mod orchestrator;

pub use orchestrator::{EngageRequest, EngagementHandle, EngagementOrchestrator};
