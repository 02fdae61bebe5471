//! Review directory: read-only views for an authorized reviewer.
//!
//! Authorization happens at the gateway boundary before these run; both
//! operations assume a reviewer identity has already been resolved.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::handoff::HandoffRecord;
use crate::identity::Identity;
use crate::store::LeadStore;
use std::sync::Arc;

/// One row of the reviewer listing: an identity plus whether it has a
/// submitted record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusRow {
    #[serde(flatten)]
    pub identity: Identity,
    pub has_submitted_preference: bool,
    pub preference_id: Option<String>,
}

/// A handoff record with its submitter denormalized for reviewer convenience.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    /// `None` when the submitter identity has since disappeared upstream.
    pub user: Option<Identity>,
}

/// Read operations backing the reviewer endpoints.
pub struct ReviewDirectory {
    store: Arc<LeadStore>,
}

impl ReviewDirectory {
    pub fn new(store: Arc<LeadStore>) -> Self {
        Self { store }
    }

    /// Every known identity with its submission status and, when present, the
    /// id of one record referencing it. Identity documents that cannot be
    /// normalized are skipped, never an error.
    pub fn list_users_with_status(&self) -> CoreResult<Vec<UserStatusRow>> {
        let mut rows = Vec::new();
        for doc in self.store.all_identity_docs()? {
            let Some(identity) = Identity::from_value(&doc) else {
                tracing::warn!(target: "sitebrief::directory", "skipping unnormalizable identity document");
                continue;
            };
            let record = self.store.find_record_by_user(&identity.id)?;
            rows.push(UserStatusRow {
                has_submitted_preference: record.is_some(),
                preference_id: record.map(|r| r.id),
                identity,
            });
        }
        Ok(rows)
    }

    /// One record with its submitter populated, or a not-found.
    pub fn get_record(&self, id: &str) -> CoreResult<PopulatedRecord> {
        let record: HandoffRecord = self
            .store
            .record(id)?
            .ok_or_else(|| CoreError::NotFound("Preference not found".to_string()))?;
        let user = self
            .store
            .identity_doc(&record.user_id)?
            .as_ref()
            .and_then(Identity::from_value);
        Ok(PopulatedRecord {
            id: record.id,
            title: record.title,
            description: record.description,
            phone: record.phone,
            submitted_at: record.submitted_at,
            user,
        })
    }
}
