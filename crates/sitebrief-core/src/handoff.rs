//! Handoff: converts a finalized proposal into a persisted review record.
//!
//! The submit path is validate, resolve the submitter, persist, then a
//! best-effort reviewer notification. The record is durable before the
//! notification is attempted, so a dead mail channel can never fail or roll
//! back a submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::{Identity, IdentityProvider};
use crate::store::LeadStore;

/// The persisted review unit, visible to reviewers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffRecord {
    pub id: String,
    /// Must reference an existing identity at creation time.
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Server-assigned at persist time.
    pub submitted_at: DateTime<Utc>,
}

/// Wire shape of a handoff submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Reviewer notification channel. Dispatched fire-and-forget after the record
/// is durable; failures are logged and never surfaced to the submitter.
pub trait ReviewerNotifier: Send + Sync {
    fn notify(
        &self,
        submitter: &Identity,
        record: &HandoffRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// SMTP reviewer mail via lettre.
pub struct SmtpNotifier {
    transport: lettre::SmtpTransport,
    mailbox: lettre::message::Mailbox,
}

impl SmtpNotifier {
    /// Builds the notifier from `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`, and
    /// `ADMIN_EMAIL`. Returns `None` when any of them is missing, in which
    /// case submissions simply skip the notification step.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let user = std::env::var("SMTP_USER").ok()?;
        let pass = std::env::var("SMTP_PASS").ok()?;
        let admin_email = std::env::var("ADMIN_EMAIL").ok()?;

        let mailbox: lettre::message::Mailbox = admin_email.trim().parse().ok()?;
        let transport = lettre::SmtpTransport::relay(host.trim())
            .ok()?
            .credentials(lettre::transport::smtp::authentication::Credentials::new(
                user, pass,
            ))
            .build();
        Some(Self { transport, mailbox })
    }
}

impl ReviewerNotifier for SmtpNotifier {
    fn notify(
        &self,
        submitter: &Identity,
        record: &HandoffRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use lettre::Transport;

        let name = submitter.name.as_deref().unwrap_or("Unknown");
        let email = lettre::Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(format!("New website lead from {}", name))
            .body(format!(
                "User: {}\nEmail: {}\nPhone: {}\n\nTitle: {}\nDescription: {}",
                name,
                submitter.email.as_deref().unwrap_or("Not provided"),
                record.phone.as_deref().unwrap_or("Not provided"),
                record.title,
                record.description,
            ))?;
        self.transport.send(&email)?;
        Ok(())
    }
}

/// Validates, persists, and announces handoff submissions.
pub struct HandoffService {
    store: Arc<LeadStore>,
    identities: Arc<dyn IdentityProvider>,
    notifier: Option<Arc<dyn ReviewerNotifier>>,
}

impl HandoffService {
    pub fn new(
        store: Arc<LeadStore>,
        identities: Arc<dyn IdentityProvider>,
        notifier: Option<Arc<dyn ReviewerNotifier>>,
    ) -> Self {
        Self {
            store,
            identities,
            notifier,
        }
    }

    /// Submits one finalized proposal for review.
    ///
    /// Validation runs before any store access; an unknown submitter fails
    /// with a not-found and writes nothing. Exactly one record is created per
    /// successful call. Repeated submissions of the same proposal create
    /// duplicate records; there is no idempotency key in the current design.
    pub async fn submit(&self, request: SubmitRequest) -> CoreResult<HandoffRecord> {
        let required = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let (user_id, title, description) = match (
            required(&request.user_id),
            required(&request.title),
            required(&request.description),
        ) {
            (Some(u), Some(t), Some(d)) => (u, t, d),
            _ => {
                return Err(CoreError::Validation(
                    "User, title, and description are required".to_string(),
                ))
            }
        };

        let submitter = self.identities.find(&user_id).await?;

        let record = HandoffRecord {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            description,
            phone: required(&request.phone),
            submitted_at: Utc::now(),
        };
        self.store.insert_record(&record)?;
        tracing::info!(
            target: "sitebrief::handoff",
            record_id = %record.id,
            user_id = %record.user_id,
            "handoff record created"
        );

        self.dispatch_notification(submitter, record.clone());
        Ok(record)
    }

    /// Fire-and-forget reviewer notification on a blocking worker. The record
    /// is already durable; failure here is logged only.
    fn dispatch_notification(&self, submitter: Identity, record: HandoffRecord) {
        let Some(notifier) = self.notifier.clone() else {
            tracing::debug!(
                target: "sitebrief::handoff",
                "no reviewer notifier configured; skipping notification"
            );
            return;
        };
        tokio::task::spawn_blocking(move || {
            if let Err(e) = notifier.notify(&submitter, &record) {
                tracing::warn!(
                    target: "sitebrief::handoff",
                    record_id = %record.id,
                    error = %e,
                    "reviewer notification failed"
                );
            }
        });
    }
}
