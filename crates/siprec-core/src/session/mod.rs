//! Recording session lifecycle
//!
//! One session per call, owned by the store. The state machine runs
//! `Created -> SdpAttached -> ArmPending -> Active`, with terminal `Failed`
//! reachable from any state that is not yet `Active`.

pub mod session;
pub mod store;

pub use session::{RecordingSession, RecordingSessionInfo, RecordingState};
pub use store::{SessionHandle, SessionStore, StoreStats};
