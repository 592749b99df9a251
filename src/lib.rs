//! # Makan Where
//!
//! Keep a list of restaurants per organization and spin a wheel to pick
//! one. Records persist to a shared hosted database (for allow-listed
//! organizations), to a database the user supplies, or to per-client local
//! storage, behind one CRUD contract.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use makan_where::{AllowList, AllowListOracle, NewRestaurant, PriceRange, StorageRouter};
//! use makan_where::config::{AppConfig, SharedStoreConfig};
//! use makan_where::storage::MemoryStringStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig {
//!         shared_store: SharedStoreConfig {
//!             url: "https://proj.supabase.co".into(),
//!             key: "anon-key".into(),
//!         },
//!         table: "restaurants".into(),
//!         allow_list: AllowList::parse("globex"),
//!         data_dir: "./data".into(),
//!         port: 8080,
//!     };
//!
//!     let oracle = Arc::new(AllowListOracle::new(config.allow_list.clone()));
//!     let router = StorageRouter::from_config(
//!         &config,
//!         Arc::new(MemoryStringStore::new()),
//!         oracle,
//!     );
//!
//!     let added = router
//!         .add("acme corp", NewRestaurant {
//!             name: "Pho Co".into(),
//!             cuisine: "Vietnamese".into(),
//!             price_range: PriceRange::Moderate,
//!             is_halal: false,
//!             google_url: None,
//!         })
//!         .await?;
//!     println!("added {}", added.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! The interesting part is the [`StorageRouter`]: per call it prefers the
//! user's own store, degrades gracefully when that store misbehaves, trusts
//! the shared store for authorized organizations without any silent
//! fallback, and lands on local storage for everyone else.

pub mod adapters;
pub mod config;
pub mod custom_config;
pub mod error;
pub mod oracle;
pub mod router;
pub mod server;
pub mod storage;
pub mod types;
pub mod wheel;

// Re-export commonly used items
pub use adapters::{LocalStore, RestaurantStore, SupabaseStore};
pub use config::{AllowList, AppConfig, SharedStoreConfig};
pub use custom_config::CustomConfigStore;
pub use error::{ConfigValidationError, StorageError, StorageResult};
pub use oracle::{AllowListOracle, AuthorizationOracle, HttpOracle};
pub use router::StorageRouter;
pub use types::{CustomDatabaseConfig, NewRestaurant, PriceRange, Restaurant, normalize_org_name};
pub use wheel::{Wheel, draw_index};
