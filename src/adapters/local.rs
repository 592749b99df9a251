//! Local persistence adapter: the universal fallback tier.
//!
//! Emulates the remote CRUD contract with one string entry per organization
//! holding a JSON-encoded array of records. Every mutation is a full-list
//! read-modify-write; list sizes are tens of records, and concurrent-writer
//! races are an accepted limitation of this tier.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::{StorageError, StorageResult};
use crate::storage::StringStore;
use crate::types::{NewRestaurant, Restaurant, normalize_org_name};

use super::RestaurantStore;

/// Key prefix for per-organization restaurant lists.
pub const RESTAURANTS_KEY_PREFIX: &str = "makan_where_restaurants_";

pub struct LocalStore {
    store: Arc<dyn StringStore>,
}

impl LocalStore {
    pub fn new(store: Arc<dyn StringStore>) -> Self {
        Self { store }
    }

    /// Whether the underlying string store accepts writes right now.
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    fn key_for(org_name: &str) -> String {
        format!("{RESTAURANTS_KEY_PREFIX}{}", normalize_org_name(org_name))
    }

    /// Read the current list. Absent or unparsable entries read as empty:
    /// a corrupt entry must never make the list page unloadable.
    fn read_list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>> {
        let raw = self
            .store
            .get(&Self::key_for(org_name))
            .map_err(|e| StorageError::backend("Failed to read local storage", e))?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Restaurant>>(&raw) {
            Ok(list) => Ok(list),
            Err(err) => {
                tracing::warn!(org = %normalize_org_name(org_name), error = %err,
                    "ignoring unparsable local restaurant list");
                Ok(Vec::new())
            }
        }
    }

    fn write_list(&self, org_name: &str, list: &[Restaurant]) -> StorageResult<()> {
        let encoded = serde_json::to_string(list)?;
        self.store
            .set(&Self::key_for(org_name), &encoded)
            .map_err(|e| StorageError::backend("Failed to write local storage", e))
    }

    /// Synthesize a locally unique id: wall-clock millis plus a random
    /// alphanumeric suffix. Collisions are negligible, not impossible.
    fn generate_id() -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(char::from)
            .collect();
        format!("local_{millis}_{suffix}")
    }
}

#[async_trait]
impl RestaurantStore for LocalStore {
    async fn list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>> {
        self.read_list(org_name)
    }

    async fn add(&self, org_name: &str, restaurant: NewRestaurant) -> StorageResult<Restaurant> {
        let mut list = self.read_list(org_name)?;
        let record = restaurant.into_restaurant(Self::generate_id(), org_name);
        list.push(record.clone());
        self.write_list(org_name, &list)?;
        Ok(record)
    }

    async fn update(
        &self,
        org_name: &str,
        id: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        let mut list = self.read_list(org_name)?;

        let Some(slot) = list.iter_mut().find(|r| r.id == id) else {
            return Err(StorageError::not_found("Restaurant not found"));
        };
        *slot = restaurant.into_restaurant(id.to_string(), org_name);
        let updated = slot.clone();

        self.write_list(org_name, &list)?;
        Ok(updated)
    }

    async fn delete(&self, org_name: &str, id: &str) -> StorageResult<()> {
        let mut list = self.read_list(org_name)?;
        list.retain(|r| r.id != id);
        self.write_list(org_name, &list)
    }
}
