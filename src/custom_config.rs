//! Per-organization storage for user-supplied remote store connections.
//!
//! At most one config exists per organization; saving overwrites. The
//! connection parameters stay in the client-side string store and are never
//! sent to this application's own servers.

use std::sync::Arc;

use crate::error::{StorageError, StorageResult};
use crate::storage::StringStore;
use crate::types::{CustomDatabaseConfig, normalize_org_name};

/// Key prefix for per-organization custom connection configs.
pub const CUSTOM_CONFIG_KEY_PREFIX: &str = "custom_supabase_config_";

pub struct CustomConfigStore {
    store: Arc<dyn StringStore>,
}

impl CustomConfigStore {
    pub fn new(store: Arc<dyn StringStore>) -> Self {
        Self { store }
    }

    fn key_for(org_name: &str) -> String {
        format!("{CUSTOM_CONFIG_KEY_PREFIX}{}", normalize_org_name(org_name))
    }

    /// Save (or overwrite) the connection for this organization.
    pub fn save(&self, org_name: &str, url: &str, key: &str) -> StorageResult<()> {
        let config = CustomDatabaseConfig {
            url: url.to_string(),
            key: key.to_string(),
            org_name: normalize_org_name(org_name),
        };
        let encoded = serde_json::to_string(&config)?;
        self.store
            .set(&Self::key_for(org_name), &encoded)
            .map_err(|e| StorageError::backend("Failed to save configuration", e))
    }

    /// The stored connection, if one exists. An unparsable entry reads as
    /// absent so a corrupt config cannot wedge the routing tier.
    pub fn load(&self, org_name: &str) -> Option<CustomDatabaseConfig> {
        let raw = self.store.get(&Self::key_for(org_name)).ok()??;
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(org = %normalize_org_name(org_name), error = %err,
                    "ignoring unparsable custom database config");
                None
            }
        }
    }

    pub fn has_config(&self, org_name: &str) -> bool {
        self.load(org_name).is_some()
    }

    /// Remove the stored connection. Removing a config that does not exist
    /// is not an error.
    pub fn remove(&self, org_name: &str) -> StorageResult<()> {
        self.store
            .remove(&Self::key_for(org_name))
            .map_err(|e| StorageError::backend("Failed to remove configuration", e))
    }
}
