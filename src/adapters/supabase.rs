//! Remote database adapter speaking PostgREST, as exposed by Supabase.
//!
//! One type serves both remote tiers: the shared store (endpoint and
//! credential from [`AppConfig`]) and a user-supplied custom store (built
//! from a [`CustomDatabaseConfig`]). Rows live in one logical table with
//! snake_case columns; the mapping to app fields is fixed and must
//! round-trip exactly.
//!
//! [`AppConfig`]: crate::config::AppConfig

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use async_trait::async_trait;

use crate::error::{ConfigValidationError, StorageError, StorageResult};
use crate::types::{CustomDatabaseConfig, NewRestaurant, PriceRange, Restaurant, normalize_org_name};

use super::RestaurantStore;

/// A non-2xx answer from the remote store, kept as the diagnostic cause
/// behind the user-facing error summary.
#[derive(Debug, Error)]
#[error("remote store returned {status}: {body}")]
pub struct RemoteResponseError {
    pub status: StatusCode,
    pub body: String,
}

/// Row ids come back as whatever the table defines: uuid/text or a numeric
/// sequence. The app treats ids as opaque strings either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_string(self) -> String {
        match self {
            RowId::Text(s) => s,
            RowId::Number(n) => n.to_string(),
        }
    }
}

/// Stored row shape (snake_case columns). `created_at` is store-managed
/// and ignored on read.
#[derive(Debug, Deserialize)]
struct RestaurantRow {
    id: RowId,
    name: String,
    cuisine: String,
    price_range: PriceRange,
    is_halal: bool,
    #[serde(default)]
    google_url: Option<String>,
    org_name: String,
}

impl RestaurantRow {
    fn into_restaurant(self) -> Restaurant {
        Restaurant {
            id: self.id.into_string(),
            name: self.name,
            cuisine: self.cuisine,
            price_range: self.price_range,
            is_halal: self.is_halal,
            google_url: self.google_url,
            org_name: self.org_name,
        }
    }
}

/// Outgoing row for insert and full-field update. The owner is always
/// written normalized.
#[derive(Debug, Serialize)]
struct NewRestaurantRow<'a> {
    name: &'a str,
    cuisine: &'a str,
    price_range: PriceRange,
    is_halal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_url: Option<&'a str>,
    org_name: String,
}

impl<'a> NewRestaurantRow<'a> {
    fn from_new(restaurant: &'a NewRestaurant, org_name: &str) -> Self {
        Self {
            name: &restaurant.name,
            cuisine: &restaurant.cuisine,
            price_range: restaurant.price_range,
            is_halal: restaurant.is_halal,
            google_url: restaurant.google_url.as_deref(),
            org_name: normalize_org_name(org_name),
        }
    }
}

/// PostgREST error codes the setup probe distinguishes. The invalid-key
/// case also shows up as a plain 401 depending on the gateway in front.
const PGRST_INVALID_JWT: &str = "PGRST116";
const PGRST_RELATION_MISSING: &str = "PGRST301";

pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
    table: String,
}

impl SupabaseStore {
    pub fn new(
        url: impl Into<String>,
        key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        let base_url = url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            key: key.into(),
            table: table.into(),
        }
    }

    /// Build a store from a user-supplied connection.
    pub fn from_config(config: &CustomDatabaseConfig, table: impl Into<String>) -> Self {
        Self::new(config.url.clone(), config.key.clone(), table)
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn failure(message: &str, response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        StorageError::backend(message, RemoteResponseError { status, body })
    }

    /// One-time setup probe for a user-supplied connection: confirms the
    /// host answers, the credential is accepted, and the table exists.
    /// Not part of the steady-state CRUD contract.
    pub async fn validate_connection(&self) -> Result<(), ConfigValidationError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(ConfigValidationError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || body.contains(PGRST_INVALID_JWT)
        {
            return Err(ConfigValidationError::BadCredential);
        }
        if body.contains(PGRST_RELATION_MISSING)
            || (status == StatusCode::NOT_FOUND && body.contains("relation"))
        {
            return Err(ConfigValidationError::MissingTable(self.table.clone()));
        }

        // Other error answers (row-level security denials and the like)
        // still prove the host, credential, and table are wired up.
        tracing::debug!(%status, "connection probe got a non-fatal error answer");
        Ok(())
    }
}

#[async_trait]
impl RestaurantStore for SupabaseStore {
    async fn list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>> {
        const SUMMARY: &str = "Unable to load restaurants. Please try again later.";

        let org_filter = format!("eq.{}", normalize_org_name(org_name));
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("org_name", org_filter.as_str())])
            .send()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;

        if !response.status().is_success() {
            return Err(Self::failure(SUMMARY, response).await);
        }

        let rows: Vec<RestaurantRow> = response
            .json()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;
        Ok(rows.into_iter().map(RestaurantRow::into_restaurant).collect())
    }

    async fn add(&self, org_name: &str, restaurant: NewRestaurant) -> StorageResult<Restaurant> {
        const SUMMARY: &str = "Unable to add restaurant. Please try again later.";

        let row = NewRestaurantRow::from_new(&restaurant, org_name);
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;

        if !response.status().is_success() {
            return Err(Self::failure(SUMMARY, response).await);
        }

        let mut rows: Vec<RestaurantRow> = response
            .json()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;
        match rows.pop() {
            Some(row) => Ok(row.into_restaurant()),
            None => Err(StorageError::backend(
                SUMMARY,
                RemoteResponseError {
                    status: StatusCode::OK,
                    body: "no row returned after insert".to_string(),
                },
            )),
        }
    }

    async fn update(
        &self,
        org_name: &str,
        id: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        const SUMMARY: &str = "Unable to update restaurant. Please try again later.";

        let row = NewRestaurantRow::from_new(&restaurant, org_name);
        let id_filter = format!("eq.{id}");
        let response = self
            .request(reqwest::Method::PATCH)
            .header("Prefer", "return=representation")
            .query(&[("id", id_filter.as_str())])
            .json(&row)
            .send()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;

        if !response.status().is_success() {
            return Err(Self::failure(SUMMARY, response).await);
        }

        let mut rows: Vec<RestaurantRow> = response
            .json()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;
        match rows.pop() {
            Some(row) => Ok(row.into_restaurant()),
            None => Err(StorageError::not_found("Restaurant not found")),
        }
    }

    async fn delete(&self, org_name: &str, id: &str) -> StorageResult<()> {
        const SUMMARY: &str = "Unable to delete restaurant. Please try again later.";

        let id_filter = format!("eq.{id}");
        let org_filter = format!("eq.{}", normalize_org_name(org_name));
        // joint id + owner filter: a guessed id cannot touch another
        // organization's row
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[
                ("id", id_filter.as_str()),
                ("org_name", org_filter.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::backend(SUMMARY, e))?;

        if !response.status().is_success() {
            return Err(Self::failure(SUMMARY, response).await);
        }

        Ok(())
    }
}
