//! Identity boundary: external user/admin records consumed read-only.
//!
//! The core never creates or mutates identities and never issues or verifies
//! tokens. Stored identity payloads arrive in heterogeneous shapes from the
//! upstream auth system, so all reads go through one normalization function
//! with fixed precedence instead of ad hoc probing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::store::LeadStore;

/// A normalized external identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flat(value: &Value) -> Option<Identity> {
    // `_id` is accepted as an alias of `id` for payloads persisted by older
    // document stores.
    let id = string_field(value, "id").or_else(|| string_field(value, "_id"))?;
    Some(Identity {
        id,
        name: string_field(value, "name"),
        email: string_field(value, "email"),
        phone: string_field(value, "phone"),
        created_at: string_field(value, "createdAt")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

impl Identity {
    /// Normalizes an arbitrarily-shaped stored identity payload.
    ///
    /// Precedence: a nested `user` wrapper, then a nested `data` wrapper, then
    /// the flat object itself. Returns `None` when no id can be recovered from
    /// any of those shapes.
    pub fn from_value(value: &Value) -> Option<Identity> {
        if let Some(inner) = value.get("user").filter(|v| v.is_object()) {
            if let Some(identity) = flat(inner) {
                return Some(identity);
            }
        }
        if let Some(inner) = value.get("data").filter(|v| v.is_object()) {
            if let Some(identity) = flat(inner) {
                return Some(identity);
            }
        }
        flat(value)
    }
}

/// Interface to the external identity/auth collaborator. Every reviewer-facing
/// operation resolves its bearer credential here first and aborts on
/// rejection.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a reviewer bearer credential to a reviewer identity.
    /// Missing/invalid/expired credentials fail with [`CoreError::Unauthorized`].
    async fn resolve_bearer(&self, token: &str) -> CoreResult<Identity>;

    /// Looks up a client identity by id. Absent ids fail with
    /// [`CoreError::NotFound`].
    async fn find(&self, id: &str) -> CoreResult<Identity>;
}

/// Identity provider over the lead store's identity directory, with reviewer
/// credentials checked against a single configured key.
///
/// Token verification proper belongs to the upstream auth system; the gateway
/// deployment carries one reviewer key (`ADMIN_API_KEY`) the same way other
/// privileged endpoints gate on an API key header. When no key is configured,
/// every reviewer request is rejected.
pub struct StoreBackedIdentities {
    store: Arc<LeadStore>,
    reviewer_key: Option<String>,
    reviewer: Identity,
}

impl StoreBackedIdentities {
    pub fn new(store: Arc<LeadStore>, reviewer_key: Option<String>, reviewer: Identity) -> Self {
        Self {
            store,
            reviewer_key: reviewer_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            reviewer,
        }
    }

    /// Reviewer key from `ADMIN_API_KEY`, reviewer contact from `ADMIN_EMAIL`.
    pub fn from_env(store: Arc<LeadStore>) -> Self {
        let reviewer = Identity {
            id: "reviewer".to_string(),
            name: Some("Admin".to_string()),
            email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.trim().is_empty()),
            phone: None,
            created_at: None,
        };
        Self::new(store, std::env::var("ADMIN_API_KEY").ok(), reviewer)
    }
}

#[async_trait]
impl IdentityProvider for StoreBackedIdentities {
    async fn resolve_bearer(&self, token: &str) -> CoreResult<Identity> {
        match &self.reviewer_key {
            Some(key) if token.trim() == key.as_str() => Ok(self.reviewer.clone()),
            Some(_) => Err(CoreError::Unauthorized(
                "Not authorized: invalid or expired token".to_string(),
            )),
            None => Err(CoreError::Unauthorized(
                "Not authorized: no reviewer key configured".to_string(),
            )),
        }
    }

    async fn find(&self, id: &str) -> CoreResult<Identity> {
        let doc = self
            .store
            .identity_doc(id)?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))?;
        Identity::from_value(&doc)
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))
    }
}
