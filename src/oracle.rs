//! Authorization oracle: is an organization entitled to the shared store?
//!
//! The answer comes from a fixed allow-list held server-side. The in-process
//! [`AllowListOracle`] consults it directly; [`HttpOracle`] asks the
//! authorization endpoint over the wire. Both fail closed: any doubt means
//! "not authorized", never an error surfaced to routing.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AllowList;
use crate::types::normalize_org_name;

#[async_trait]
pub trait AuthorizationOracle: Send + Sync {
    /// Whether the organization may use the shared remote store.
    async fn is_authorized(&self, org_name: &str) -> bool;
}

/// Direct allow-list membership check, for code running next to the list.
pub struct AllowListOracle {
    allow_list: AllowList,
}

impl AllowListOracle {
    pub fn new(allow_list: AllowList) -> Self {
        Self { allow_list }
    }
}

#[async_trait]
impl AuthorizationOracle for AllowListOracle {
    async fn is_authorized(&self, org_name: &str) -> bool {
        self.allow_list.contains(org_name)
    }
}

#[derive(Debug, Deserialize)]
struct AuthCheckAnswer {
    #[serde(rename = "isAuthorized")]
    is_authorized: bool,
}

/// Oracle backed by the authorization endpoint.
///
/// POSTs `{"username": ...}` and reads `isAuthorized` from the answer.
/// Transport failures, non-2xx statuses, and malformed bodies all count as
/// not authorized; the shared database is never opened on a failed check.
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AuthorizationOracle for HttpOracle {
    async fn is_authorized(&self, org_name: &str) -> bool {
        let result = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "username": org_name }))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(org = %normalize_org_name(org_name), error = %err,
                    "authorization check unreachable, treating as not authorized");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(org = %normalize_org_name(org_name), status = %response.status(),
                "authorization check rejected, treating as not authorized");
            return false;
        }

        match response.json::<AuthCheckAnswer>().await {
            Ok(answer) => answer.is_authorized,
            Err(err) => {
                tracing::warn!(org = %normalize_org_name(org_name), error = %err,
                    "authorization check answered malformed body, treating as not authorized");
                false
            }
        }
    }
}
