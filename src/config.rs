//! Application configuration.
//!
//! Everything process-wide (the shared store endpoint and credential, the
//! allow-list, the listen port) lives in an explicitly constructed
//! [`AppConfig`] handed to the router and server at startup. Nothing reads
//! the environment after [`AppConfig::from_env`] returns, which keeps the
//! router testable with fakes.

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::types::normalize_org_name;

/// The fixed set of organization names entitled to the shared remote store.
///
/// Parsed once from a comma-separated value; entries are trimmed,
/// lower-cased, and empty entries dropped. Membership checks normalize
/// their argument the same way.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .split(',')
            .map(normalize_org_name)
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn from_env() -> Self {
        match env::var("AUTHORIZED_USERS") {
            Ok(raw) => Self::parse(&raw),
            Err(_) => {
                warn!("AUTHORIZED_USERS is not set; no organization is authorized for the shared store");
                Self::default()
            }
        }
    }

    pub fn contains(&self, org_name: &str) -> bool {
        self.names.contains(&normalize_org_name(org_name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Endpoint and credential for the shared remote store.
#[derive(Debug, Clone)]
pub struct SharedStoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// The anon credential sent as both `apikey` and bearer token.
    pub key: String,
}

/// Top-level configuration for the server binary and the storage router.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub shared_store: SharedStoreConfig,
    /// Logical table holding restaurant rows.
    pub table: String,
    pub allow_list: AllowList,
    /// Directory backing the file string store for the local tier.
    pub data_dir: PathBuf,
    pub port: u16,
}

impl AppConfig {
    /// Load from the environment. Missing remote-store variables are fatal;
    /// everything else has a default.
    ///
    /// Variables: `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_TABLE`
    /// (default `restaurants`), `AUTHORIZED_USERS`, `MAKAN_DATA_DIR`
    /// (default `./data`), `PORT` (default `8080`).
    pub fn from_env() -> Self {
        Self {
            shared_store: SharedStoreConfig {
                url: require("SUPABASE_URL"),
                key: require("SUPABASE_ANON_KEY"),
            },
            table: env_or("SUPABASE_TABLE", "restaurants"),
            allow_list: AllowList::from_env(),
            data_dir: PathBuf::from(env_or("MAKAN_DATA_DIR", "./data")),
            port: env_or("PORT", "8080")
                .parse()
                .expect("PORT must be a number"),
        }
    }
}

fn require(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        default.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_trims_lowercases_and_drops_empties() {
        let list = AllowList::parse(" Globex ,ACME Corp,, initech ,");
        assert_eq!(list.len(), 3);
        assert!(list.contains("globex"));
        assert!(list.contains("acme corp"));
        assert!(list.contains("  Initech "));
        assert!(!list.contains("hooli"));
    }

    #[test]
    fn empty_value_authorizes_nobody() {
        let list = AllowList::parse("");
        assert!(list.is_empty());
        assert!(!list.contains(""));
        assert!(!list.contains("globex"));
    }
}
