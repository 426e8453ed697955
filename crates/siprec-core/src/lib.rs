//! # SIPREC Core
//!
//! Core library for engaging SIPREC media recording on live calls. It owns
//! the recording destination registry, the per-call session store, SDP
//! capture, and the one-shot completion trigger that starts recording once
//! the signaling transaction completes.
//!
//! ## Features
//!
//! - **Destination Registry**: Config-driven, ordered SRS endpoint sets
//! - **Session Store**: At-most-one recording session per call, idempotent engage
//! - **SDP Relay**: Validated media capture with re-attach on renegotiation
//! - **Completion Trigger**: Owned, fire-once activation with rollback on failure
//! - **Events**: Broadcast stream of session lifecycle events
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `engage`: The orchestrator that drives the whole engagement sequence
//! - `destinations`: Named sets of Session Recording Server endpoints
//! - `session`: Recording session state machine and concurrent store
//! - `sdp`: Media description validation and attachment
//! - `trigger`: Transaction-completion trigger that activates recording
//! - `adapters`: Traits for the dialog, transaction, and media layers
//! - `events`: Lifecycle event hub for observers
//! - `connectors`: Administrative registry for provisioning connectors
//!
//! ## Quick Start
//!
//! ```rust
//! use siprec_core::{
//!     adapters::mock::MockAdapters, CallId, DestinationSetConfig, EngageRequest,
//!     EngagementOrchestrator, MediaLeg, SiprecConfig,
//! };
//!
//! # tokio_test::block_on(async {
//! let config = SiprecConfig::default().with_set(DestinationSetConfig::new(
//!     "main",
//!     vec!["sip:srs1.example.com:5060".to_string()],
//! ));
//! let mocks = MockAdapters::new();
//! let orchestrator = EngagementOrchestrator::new(
//!     config,
//!     mocks.dialogs.clone(),
//!     mocks.notifier.clone(),
//!     mocks.media.clone(),
//! )
//! .expect("valid configuration");
//!
//! let request = EngageRequest::new(
//!     CallId::from_value("call-1"),
//!     MediaLeg::Caller,
//!     "v=0\r\nm=audio 49170 RTP/AVP 0\r\n",
//! );
//! let handle = orchestrator
//!     .engage(request, "main", "198.51.100.7:10000")
//!     .await
//!     .expect("engagement succeeds");
//! assert!(handle.created);
//! # })
//! ```

pub mod adapters;
pub mod config;
pub mod connectors;
pub mod destinations;
pub mod engage;
pub mod errors;
pub mod events;
pub mod logging;
pub mod sdp;
pub mod session;
pub mod trigger;
pub mod types;

// Re-export key types
pub use config::{DestinationSetConfig, SiprecConfig};
pub use connectors::{ConnectorRecord, ConnectorRegistry};
pub use destinations::{DestinationRegistry, DestinationSet, SrsEndpoint};
pub use engage::{EngageRequest, EngagementHandle, EngagementOrchestrator};
pub use errors::{EngageError, Result, ENGAGE_OK};
pub use events::{EventHub, RecordingEvent, RecordingEventSubscriber};
pub use logging::{setup_logging, LoggingConfig};
pub use sdp::{AttachReceipt, SdpRelay};
pub use session::{
    RecordingSession, RecordingSessionInfo, RecordingState, SessionHandle, SessionStore,
    StoreStats,
};
pub use trigger::CompletionTrigger;
pub use types::{CallId, DialogRef, MediaLeg, SessionId, TransactionEventKind};
