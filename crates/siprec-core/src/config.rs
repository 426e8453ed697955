//! Configuration for the recording engagement layer
//!
//! Destination sets, resource limits and trigger behavior are configured
//! here, either programmatically or from a TOML file. The configuration is
//! validated before the orchestrator is built; a bad destination set never
//! makes it into a running registry.
//!
//! ## Quick Start
//!
//! ```rust
//! use siprec_core::config::{DestinationSetConfig, SiprecConfig};
//!
//! let config = SiprecConfig::default()
//!     .with_set(DestinationSetConfig::new(
//!         "main-srs",
//!         vec!["sip:rec1.example.com:5060".to_string()],
//!     ))
//!     .with_max_sessions(5000);
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## From TOML
//!
//! ```rust
//! use siprec_core::config::SiprecConfig;
//!
//! let config = SiprecConfig::from_toml_str(r#"
//!     max_sessions = 1000
//!
//!     [[destination_sets]]
//!     name = "main-srs"
//!     endpoints = ["sip:rec1.example.com:5060", "sip:rec2.example.com:5060"]
//! "#).unwrap();
//!
//! assert_eq!(config.destination_sets.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::destinations::{DestinationRegistry, DestinationSet, SrsEndpoint};
use crate::errors::{EngageError, Result};
use crate::types::TransactionEventKind;

/// One configured destination set: a name and its ordered endpoint URIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSetConfig {
    pub name: String,
    /// `sip:`/`sips:` URIs in failover order
    pub endpoints: Vec<String>,
}

impl DestinationSetConfig {
    pub fn new(name: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            endpoints,
        }
    }
}

/// Top-level configuration for the engagement layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiprecConfig {
    /// Recording destination sets, in listing order
    pub destination_sets: Vec<DestinationSetConfig>,

    /// Upper bound on concurrent recording sessions; 0 means unbounded
    pub max_sessions: usize,

    /// Upper bound on accepted SDP payload size in bytes
    pub max_sdp_bytes: usize,

    /// Transaction event the completion trigger is armed on
    pub completion_event: TransactionEventKind,
}

impl Default for SiprecConfig {
    fn default() -> Self {
        Self {
            destination_sets: Vec::new(),
            max_sessions: 0,
            max_sdp_bytes: 64 * 1024,
            completion_event: TransactionEventKind::ResponseSent,
        }
    }
}

impl SiprecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a destination set
    pub fn with_set(mut self, set: DestinationSetConfig) -> Self {
        self.destination_sets.push(set);
        self
    }

    /// Limit concurrent recording sessions (0 means unbounded)
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    /// Limit accepted SDP payload size
    pub fn with_max_sdp_bytes(mut self, max_sdp_bytes: usize) -> Self {
        self.max_sdp_bytes = max_sdp_bytes;
        self
    }

    /// Change which transaction event arms the recording
    pub fn with_completion_event(mut self, event: TransactionEventKind) -> Self {
        self.completion_event = event;
        self
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input)
            .map_err(|e| EngageError::ConfigError(format!("invalid configuration: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngageError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the whole configuration without building anything
    pub fn validate(&self) -> Result<()> {
        if self.max_sdp_bytes == 0 {
            return Err(EngageError::ConfigError(
                "max_sdp_bytes must be positive".to_string(),
            ));
        }
        self.build_registry().map(|_| ())
    }

    /// Build the destination registry this configuration describes
    pub fn build_registry(&self) -> Result<DestinationRegistry> {
        let sets = self
            .destination_sets
            .iter()
            .map(|set| {
                DestinationSet::new(
                    set.name.clone(),
                    set.endpoints
                        .iter()
                        .map(|uri| SrsEndpoint::new(uri.as_str()))
                        .collect(),
                )
            })
            .collect();
        DestinationRegistry::from_sets(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SiprecConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.completion_event, TransactionEventKind::ResponseSent);
        assert_eq!(config.max_sessions, 0);
    }

    #[test]
    fn toml_parsing_covers_all_fields() {
        let config = SiprecConfig::from_toml_str(
            r#"
            max_sessions = 200
            max_sdp_bytes = 8192
            completion_event = "Completed"

            [[destination_sets]]
            name = "main-srs"
            endpoints = ["sip:rec1.example.com:5060"]

            [[destination_sets]]
            name = "branch"
            endpoints = ["sips:rec.branch.example.com"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_sessions, 200);
        assert_eq!(config.max_sdp_bytes, 8192);
        assert_eq!(config.completion_event, TransactionEventKind::Completed);
        assert_eq!(config.destination_sets.len(), 2);

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.names(), vec!["main-srs", "branch"]);
    }

    #[test]
    fn invalid_endpoint_fails_validation() {
        let config = SiprecConfig::default().with_set(DestinationSetConfig::new(
            "bad",
            vec!["not-a-sip-uri".to_string()],
        ));
        assert!(matches!(config.validate(), Err(EngageError::ConfigError(_))));
    }

    #[test]
    fn zero_sdp_limit_fails_validation() {
        let config = SiprecConfig::default().with_max_sdp_bytes(0);
        assert!(matches!(config.validate(), Err(EngageError::ConfigError(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let result = SiprecConfig::from_toml_str("max_sessions = \"lots\"");
        assert!(matches!(result, Err(EngageError::ConfigError(_))));
    }
}
