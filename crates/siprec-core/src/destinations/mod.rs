//! Recording Destination Registry
//!
//! Maps symbolic recording-set names to ordered lists of recording-server
//! (SRS) endpoints. The registry is populated from configuration at startup
//! and is read-only afterward: resolution is a pure lookup with no side
//! effects, and a name never resolves to anything but its own set.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{EngageError, Result};

/// A single recording-server endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsEndpoint {
    /// SIP URI the recorded media is replicated toward
    pub uri: String,
}

impl SrsEndpoint {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl std::fmt::Display for SrsEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Named, ordered set of recording-server endpoints
///
/// Immutable once resolved for an engagement. Order is failover priority:
/// the first endpoint is contacted first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSet {
    pub name: String,
    pub endpoints: Vec<SrsEndpoint>,
}

impl DestinationSet {
    pub fn new(name: impl Into<String>, endpoints: Vec<SrsEndpoint>) -> Self {
        Self {
            name: name.into(),
            endpoints,
        }
    }

    /// First endpoint in failover order. The registry guarantees sets are
    /// non-empty, so this never fails for a resolved set.
    pub fn primary(&self) -> Option<&SrsEndpoint> {
        self.endpoints.first()
    }
}

/// Accepts `sip:` and `sips:` URIs with a non-empty remainder.
pub(crate) fn is_valid_srs_uri(uri: &str) -> bool {
    let rest = if let Some(rest) = uri.strip_prefix("sips:") {
        rest
    } else if let Some(rest) = uri.strip_prefix("sip:") {
        rest
    } else {
        return false;
    };
    !rest.is_empty() && !rest.chars().any(char::is_whitespace)
}

/// Name-keyed lookup of recording destination sets
///
/// Built once from configuration. Insertion order is preserved so listings
/// match the configuration file.
#[derive(Debug)]
pub struct DestinationRegistry {
    sets: IndexMap<String, Arc<DestinationSet>>,
}

impl DestinationRegistry {
    /// Build the registry, validating every set.
    ///
    /// Each set must have a unique non-empty name and at least one
    /// well-formed `sip:`/`sips:` endpoint URI.
    pub fn from_sets(sets: Vec<DestinationSet>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(sets.len());

        for set in sets {
            if set.name.trim().is_empty() {
                return Err(EngageError::ConfigError(
                    "destination set with empty name".to_string(),
                ));
            }
            if set.endpoints.is_empty() {
                return Err(EngageError::ConfigError(format!(
                    "destination set '{}' has no endpoints",
                    set.name
                )));
            }
            for endpoint in &set.endpoints {
                if !is_valid_srs_uri(&endpoint.uri) {
                    return Err(EngageError::ConfigError(format!(
                        "destination set '{}' has invalid endpoint uri '{}'",
                        set.name, endpoint.uri
                    )));
                }
            }
            let name = set.name.clone();
            if map.insert(name.clone(), Arc::new(set)).is_some() {
                return Err(EngageError::ConfigError(format!(
                    "duplicate destination set name '{}'",
                    name
                )));
            }
        }

        tracing::debug!("Destination registry built with {} sets", map.len());
        Ok(Self { sets: map })
    }

    /// Resolve a set name to its endpoint list.
    ///
    /// Pure lookup: an unknown name is a distinct error and nothing is ever
    /// substituted for the requested set.
    pub fn resolve(&self, name: &str) -> Result<Arc<DestinationSet>> {
        self.sets
            .get(name)
            .cloned()
            .ok_or_else(|| EngageError::UnknownDestination(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Set names in configuration order.
    pub fn names(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }
}
