//! Administrative connector registry
//!
//! Boundary module for the management layer's provisioning connectors. The
//! engagement core never consults this; deployments register the database
//! connectors their management interface exposes and list them back, nothing
//! more. Storage is an owned name-keyed collection: one record per name,
//! O(1) access, registration order preserved.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::{EngageError, Result};

/// A registered provisioning connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub name: String,
    /// Connection handle (URL or DSN) the management layer opens
    pub handle: String,
    /// Deployment-defined option bits, passed through verbatim
    pub flags: u32,
    /// Tables exposed under this connector, in registration order
    pub tables: Vec<String>,
}

/// Name-keyed connector storage
#[derive(Debug, Default)]
pub struct ConnectorRegistry {
    records: RwLock<IndexMap<String, ConnectorRecord>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// Register a table under a connector name.
    ///
    /// The first registration of a name creates its record; later
    /// registrations with the same name append the table to the existing
    /// record and must carry the same handle. Registering a table twice
    /// under one name is a no-op.
    pub async fn register(
        &self,
        name: impl Into<String>,
        table: impl Into<String>,
        handle: impl Into<String>,
        flags: u32,
    ) -> Result<()> {
        let name = name.into();
        let table = table.into();
        let handle = handle.into();

        if name.trim().is_empty() {
            return Err(EngageError::ConfigError(
                "connector name must not be empty".to_string(),
            ));
        }
        if table.trim().is_empty() {
            return Err(EngageError::ConfigError(format!(
                "connector '{}' registered with empty table",
                name
            )));
        }
        if handle.trim().is_empty() {
            return Err(EngageError::ConfigError(format!(
                "connector '{}' registered with empty handle",
                name
            )));
        }

        let mut records = self.records.write().await;
        match records.get_mut(&name) {
            Some(record) => {
                if record.handle != handle {
                    return Err(EngageError::ConfigError(format!(
                        "connector '{}' already registered with a different handle",
                        name
                    )));
                }
                if !record.tables.contains(&table) {
                    record.tables.push(table);
                }
            }
            None => {
                records.insert(
                    name.clone(),
                    ConnectorRecord {
                        name: name.clone(),
                        handle,
                        flags,
                        tables: vec![table],
                    },
                );
            }
        }

        debug!("Registered connector '{}'", name);
        Ok(())
    }

    /// All records in registration order
    pub async fn list_all(&self) -> Vec<ConnectorRecord> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn get(&self, name: &str) -> Option<ConnectorRecord> {
        self.records.read().await.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// JSON rendering for the management surface
    pub async fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "connectors": self.list_all().await })
    }
}
