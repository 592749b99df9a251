use serde::{Deserialize, Serialize};

/// Normalize an organization name into the canonical owner key.
///
/// Trim plus lower-case. Every adapter, the config store, and the oracle
/// must run names through this exact function so that records written as
/// `" Acme Corp "` and read as `"acme corp"` resolve to the same owner.
pub fn normalize_org_name(org_name: &str) -> String {
    org_name.trim().to_lowercase()
}

/// Price bracket for a restaurant. Serializes to the literal `$` strings
/// used by the stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Expensive => "$$$",
        }
    }
}

/// One dining option, scoped to exactly one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Unique within the owning organization's list. Assigned by whichever
    /// adapter created the record: the remote store hands back its own row
    /// id, the local adapter synthesizes one.
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub price_range: PriceRange,
    pub is_halal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_url: Option<String>,
    /// Normalized owner key. Every read and write filters on this.
    pub org_name: String,
}

/// Payload for `add` and `update`: a restaurant before an adapter has
/// assigned it an id and an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub cuisine: String,
    pub price_range: PriceRange,
    pub is_halal: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub google_url: Option<String>,
}

impl NewRestaurant {
    /// Attach an id and the normalized owner, producing a full record.
    pub fn into_restaurant(self, id: String, org_name: &str) -> Restaurant {
        Restaurant {
            id,
            name: self.name,
            cuisine: self.cuisine,
            price_range: self.price_range,
            is_halal: self.is_halal,
            google_url: self.google_url,
            org_name: normalize_org_name(org_name),
        }
    }
}

/// A user-supplied remote store connection, held in local storage.
/// At most one per organization; saving overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDatabaseConfig {
    pub url: String,
    pub key: String,
    /// Must match the normalized key the config is stored under.
    pub org_name: String,
}
