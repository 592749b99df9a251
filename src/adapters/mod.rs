//! Storage adapters: one CRUD contract, three concrete backends.
//!
//! The router never cares which tier it is talking to; every backend
//! implements [`RestaurantStore`] and scopes all four operations by the
//! normalized organization key.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{NewRestaurant, Restaurant};

pub mod local;
pub mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

/// Restaurant persistence operations against one concrete backend.
///
/// Implementations must apply [`normalize_org_name`] to `org_name` before
/// using it as a filter or writing it into a record, and must never return
/// records belonging to another organization.
///
/// [`normalize_org_name`]: crate::types::normalize_org_name
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// All restaurants belonging to the organization. Order unspecified.
    async fn list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>>;

    /// Insert one record and return it with the backend-assigned id.
    async fn add(&self, org_name: &str, restaurant: NewRestaurant) -> StorageResult<Restaurant>;

    /// Full-field overwrite of the record with `id`, keeping `id` and the
    /// normalized owner. NotFound if no record matches within the
    /// organization.
    async fn update(
        &self,
        org_name: &str,
        id: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant>;

    /// Remove the record with `id`. Deleting an id that does not exist is
    /// not an error.
    async fn delete(&self, org_name: &str, id: &str) -> StorageResult<()>;
}
