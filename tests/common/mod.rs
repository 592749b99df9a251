//! Shared test harness: storage and oracle doubles plus router builders.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use makan_where::adapters::{LocalStore, RestaurantStore};
use makan_where::custom_config::CustomConfigStore;
use makan_where::error::{StorageError, StorageResult};
use makan_where::oracle::AuthorizationOracle;
use makan_where::router::StorageRouter;
use makan_where::storage::{MemoryStringStore, StringStore};
use makan_where::types::{CustomDatabaseConfig, NewRestaurant, PriceRange, Restaurant};

/// Adapter double that records which operations reached it, while behaving
/// like a real in-memory backend underneath.
#[allow(dead_code)]
pub struct RecordingStore {
    pub calls: Arc<Mutex<Vec<String>>>,
    inner: LocalStore,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            inner: LocalStore::new(Arc::new(MemoryStringStore::new())),
        }
    }

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }
}

#[async_trait]
impl RestaurantStore for RecordingStore {
    async fn list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>> {
        self.record("list");
        self.inner.list(org_name).await
    }

    async fn add(&self, org_name: &str, restaurant: NewRestaurant) -> StorageResult<Restaurant> {
        self.record("add");
        self.inner.add(org_name, restaurant).await
    }

    async fn update(
        &self,
        org_name: &str,
        id: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        self.record("update");
        self.inner.update(org_name, id, restaurant).await
    }

    async fn delete(&self, org_name: &str, id: &str) -> StorageResult<()> {
        self.record("delete");
        self.inner.delete(org_name, id).await
    }
}

/// Adapter double that fails every operation, for misconfigured-tier and
/// incident scenarios.
#[allow(dead_code)]
pub struct FailingStore {
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn fail(&self, op: &str) -> StorageError {
        self.calls.lock().unwrap().push(op.to_string());
        StorageError::backend(
            format!("Unable to {op} restaurant(s). Please try again later."),
            std::io::Error::other("backend exploded"),
        )
    }
}

#[async_trait]
impl RestaurantStore for FailingStore {
    async fn list(&self, _org_name: &str) -> StorageResult<Vec<Restaurant>> {
        Err(self.fail("load"))
    }

    async fn add(&self, _org_name: &str, _restaurant: NewRestaurant) -> StorageResult<Restaurant> {
        Err(self.fail("add"))
    }

    async fn update(
        &self,
        _org_name: &str,
        _id: &str,
        _restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        Err(self.fail("update"))
    }

    async fn delete(&self, _org_name: &str, _id: &str) -> StorageResult<()> {
        Err(self.fail("delete"))
    }
}

/// Oracle double with a fixed answer.
#[allow(dead_code)]
pub struct StaticOracle(pub bool);

#[async_trait]
impl AuthorizationOracle for StaticOracle {
    async fn is_authorized(&self, _org_name: &str) -> bool {
        self.0
    }
}

/// String store whose writes always fail, making the local tier
/// unavailable.
#[derive(Default)]
#[allow(dead_code)]
pub struct BrokenStringStore;

impl StringStore for BrokenStringStore {
    fn get(&self, _key: &str) -> std::io::Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> std::io::Result<()> {
        Err(std::io::Error::other("storage disabled"))
    }

    fn remove(&self, _key: &str) -> std::io::Result<()> {
        Ok(())
    }
}

/// Factory handing out a broken custom store whenever a config exists.
#[allow(dead_code)]
pub fn failing_custom_factory()
-> Box<dyn Fn(&CustomDatabaseConfig) -> Arc<dyn RestaurantStore> + Send + Sync> {
    Box::new(|_config| Arc::new(FailingStore::new()))
}

/// Factory handing out one fixed store double for every config.
#[allow(dead_code)]
pub fn fixed_custom_factory(
    store: Arc<dyn RestaurantStore>,
) -> Box<dyn Fn(&CustomDatabaseConfig) -> Arc<dyn RestaurantStore> + Send + Sync> {
    Box::new(move |_config| store.clone())
}

/// Everything a routing test wants to inspect after the fact.
#[allow(dead_code)]
pub struct TestRouter {
    pub router: StorageRouter,
    pub shared_calls: Arc<Mutex<Vec<String>>>,
    pub string_store: Arc<MemoryStringStore>,
}

/// Router with a recording shared store, a memory-backed local tier, and a
/// custom tier that reports a broken backend whenever a config is present.
#[allow(dead_code)]
pub fn test_router(authorized: bool) -> TestRouter {
    test_router_with_custom(authorized, failing_custom_factory())
}

/// Same as [`test_router`] but with an injected custom-store factory.
#[allow(dead_code)]
pub fn test_router_with_custom(
    authorized: bool,
    factory: Box<dyn Fn(&CustomDatabaseConfig) -> Arc<dyn RestaurantStore> + Send + Sync>,
) -> TestRouter {
    let shared = Arc::new(RecordingStore::new());
    let shared_calls = shared.calls.clone();
    let string_store = Arc::new(MemoryStringStore::new());

    let router = StorageRouter::new(
        shared,
        LocalStore::new(string_store.clone()),
        CustomConfigStore::new(string_store.clone()),
        factory,
        Arc::new(StaticOracle(authorized)),
    );

    TestRouter {
        router,
        shared_calls,
        string_store,
    }
}

/// A plausible restaurant payload.
#[allow(dead_code)]
pub fn pho_co() -> NewRestaurant {
    NewRestaurant {
        name: "Pho Co".into(),
        cuisine: "Vietnamese".into(),
        price_range: PriceRange::Moderate,
        is_halal: false,
        google_url: None,
    }
}

#[allow(dead_code)]
pub fn nasi_lemak() -> NewRestaurant {
    NewRestaurant {
        name: "Nasi Lemak Corner".into(),
        cuisine: "Malaysian".into(),
        price_range: PriceRange::Budget,
        is_halal: true,
        google_url: Some("https://maps.google.com/nasi-lemak".into()),
    }
}
