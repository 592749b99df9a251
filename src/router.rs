//! Storage router: per-call tier selection with fallback.
//!
//! Preference order, evaluated fresh on every operation:
//!
//! 1. a user-supplied custom store, if the organization saved one; its
//!    failures are logged and swallowed, never propagated
//! 2. the shared store, if the oracle authorizes the organization; its
//!    failures are real incidents and propagate unchanged, with no silent
//!    fallback into device-local data
//! 3. the local store, for everyone else; if local storage is unusable the
//!    call fails with [`StorageError::StorageUnavailable`] and nothing
//!    else is tried
//!
//! The whole policy lives in [`StorageRouter::execute`]; the four public
//! operations only shape payloads in and out of it.

use std::sync::Arc;

use crate::adapters::{LocalStore, RestaurantStore, SupabaseStore};
use crate::config::AppConfig;
use crate::custom_config::CustomConfigStore;
use crate::error::{ConfigValidationError, StorageError, StorageResult};
use crate::oracle::AuthorizationOracle;
use crate::storage::StringStore;
use crate::types::{CustomDatabaseConfig, NewRestaurant, Restaurant, normalize_org_name};

/// Builds a store for the custom tier from a saved connection. Injectable
/// so tests can route the tier to a double.
pub type CustomStoreFactory =
    Box<dyn Fn(&CustomDatabaseConfig) -> Arc<dyn RestaurantStore> + Send + Sync>;

/// One logical CRUD call, payload included, so the tier policy can run it
/// against more than one adapter.
#[derive(Clone)]
enum Op {
    List,
    Add(NewRestaurant),
    Update(String, NewRestaurant),
    Delete(String),
}

impl Op {
    /// Verb for the user-facing failure summary.
    fn verb(&self) -> &'static str {
        match self {
            Op::List => "load restaurants",
            Op::Add(_) => "add restaurant",
            Op::Update(..) => "update restaurant",
            Op::Delete(_) => "delete restaurant",
        }
    }
}

enum OpOutput {
    Many(Vec<Restaurant>),
    One(Restaurant),
    Done,
}

async fn run_op(store: &dyn RestaurantStore, org_name: &str, op: Op) -> StorageResult<OpOutput> {
    match op {
        Op::List => store.list(org_name).await.map(OpOutput::Many),
        Op::Add(restaurant) => store.add(org_name, restaurant).await.map(OpOutput::One),
        Op::Update(id, restaurant) => store
            .update(org_name, &id, restaurant)
            .await
            .map(OpOutput::One),
        Op::Delete(id) => store.delete(org_name, &id).await.map(|_| OpOutput::Done),
    }
}

/// What one tier attempt decided for the call.
enum TierOutcome {
    /// The tier answered; hand its result (success or failure) to the caller.
    Done(StorageResult<OpOutput>),
    /// The tier failed in a way the policy absorbs; try the next tier.
    Fallthrough(StorageError),
    /// The tier does not apply to this organization.
    Skipped,
}

pub struct StorageRouter {
    shared: Arc<dyn RestaurantStore>,
    local: LocalStore,
    custom_configs: CustomConfigStore,
    custom_store_factory: CustomStoreFactory,
    oracle: Arc<dyn AuthorizationOracle>,
}

impl StorageRouter {
    /// Wire the router from application config over a string store, with
    /// real adapters on every tier.
    pub fn from_config(
        config: &AppConfig,
        string_store: Arc<dyn StringStore>,
        oracle: Arc<dyn AuthorizationOracle>,
    ) -> Self {
        let table = config.table.clone();
        Self {
            shared: Arc::new(SupabaseStore::new(
                config.shared_store.url.clone(),
                config.shared_store.key.clone(),
                table.clone(),
            )),
            local: LocalStore::new(string_store.clone()),
            custom_configs: CustomConfigStore::new(string_store),
            custom_store_factory: Box::new(move |custom| {
                Arc::new(SupabaseStore::from_config(custom, table.clone()))
            }),
            oracle,
        }
    }

    /// Assemble from parts. Tests use this to drop in doubles for any tier.
    pub fn new(
        shared: Arc<dyn RestaurantStore>,
        local: LocalStore,
        custom_configs: CustomConfigStore,
        custom_store_factory: CustomStoreFactory,
        oracle: Arc<dyn AuthorizationOracle>,
    ) -> Self {
        Self {
            shared,
            local,
            custom_configs,
            custom_store_factory,
            oracle,
        }
    }

    // ── CRUD operations ──

    pub async fn list(&self, org_name: &str) -> StorageResult<Vec<Restaurant>> {
        match self.execute(org_name, Op::List).await? {
            OpOutput::Many(restaurants) => Ok(restaurants),
            _ => unreachable!("list answers with a restaurant list"),
        }
    }

    pub async fn add(
        &self,
        org_name: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        match self.execute(org_name, Op::Add(restaurant)).await? {
            OpOutput::One(restaurant) => Ok(restaurant),
            _ => unreachable!("add answers with the created restaurant"),
        }
    }

    pub async fn update(
        &self,
        org_name: &str,
        id: &str,
        restaurant: NewRestaurant,
    ) -> StorageResult<Restaurant> {
        match self
            .execute(org_name, Op::Update(id.to_string(), restaurant))
            .await?
        {
            OpOutput::One(restaurant) => Ok(restaurant),
            _ => unreachable!("update answers with the updated restaurant"),
        }
    }

    pub async fn delete(&self, org_name: &str, id: &str) -> StorageResult<()> {
        self.execute(org_name, Op::Delete(id.to_string())).await?;
        Ok(())
    }

    // ── Tier policy ──

    /// Run one logical operation through the tier preference order. This is
    /// the only place the fallback policy exists.
    async fn execute(&self, org_name: &str, op: Op) -> StorageResult<OpOutput> {
        let org = normalize_org_name(org_name);

        match self.try_custom_tier(&org, op.clone()).await {
            TierOutcome::Done(result) => return result,
            TierOutcome::Fallthrough(cause) => {
                tracing::warn!(org = %org, operation = op.verb(), error = %cause,
                    "custom store failed, falling back to the next tier");
            }
            TierOutcome::Skipped => {}
        }

        if self.oracle.is_authorized(&org).await {
            // trusted path: results and failures both belong to the caller
            return run_op(self.shared.as_ref(), &org, op).await;
        }

        if !self.local.is_available() {
            tracing::error!(org = %org, operation = op.verb(),
                "local storage unavailable and no remote tier applies");
            return Err(StorageError::StorageUnavailable);
        }

        let verb = op.verb();
        run_op(&self.local, &org, op)
            .await
            .map_err(|err| wrap_local_failure(verb, err))
    }

    /// Step 1 of the policy: the user-owned store, which may be
    /// misconfigured and therefore degrades gracefully to the next tier.
    async fn try_custom_tier(&self, org: &str, op: Op) -> TierOutcome {
        let Some(config) = self.custom_configs.load(org) else {
            return TierOutcome::Skipped;
        };

        let store = (self.custom_store_factory)(&config);
        match run_op(store.as_ref(), org, op).await {
            Ok(output) => TierOutcome::Done(Ok(output)),
            Err(cause) => TierOutcome::Fallthrough(cause),
        }
    }

    // ── Custom config management ──

    /// Probe a user-supplied connection before it is saved. Failures stay
    /// distinguishable so the caller can show a precise message.
    pub async fn validate_custom_connection(
        &self,
        url: &str,
        key: &str,
        table: &str,
    ) -> Result<(), ConfigValidationError> {
        SupabaseStore::new(url, key, table).validate_connection().await
    }

    pub fn custom_configs(&self) -> &CustomConfigStore {
        &self.custom_configs
    }

    pub fn has_custom_config(&self, org_name: &str) -> bool {
        self.custom_configs.has_config(org_name)
    }

    /// Whether the organization would hit the shared store today. Exposed
    /// for status displays; the routing itself re-asks per call.
    pub async fn is_authorized(&self, org_name: &str) -> bool {
        self.oracle.is_authorized(org_name).await
    }
}

/// Local-tier failures surface as one wrapped kind with the cause attached.
/// NotFound and StorageUnavailable are already caller-facing and pass
/// through untouched.
fn wrap_local_failure(verb: &str, err: StorageError) -> StorageError {
    match err {
        StorageError::NotFound(_) | StorageError::StorageUnavailable => err,
        other => StorageError::Backend {
            message: format!("Unable to {verb}. Please try again later."),
            cause: Box::new(other),
        },
    }
}
