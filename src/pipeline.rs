//! Lead submission pipeline: validate, persist, then notify.
//!
//! The durable write is the only success criterion. The acknowledgement email
//! is attempted once, after the write is confirmed, and its result is returned
//! as a [`NotificationOutcome`] that never turns into an error.

use crate::errors::{NotifyError, SubmissionError};
use crate::lead_store::LeadStore;
use crate::mailer::{DeliveryId, Notifier};
use crate::models::LeadRecord;
use crate::validation::validate_lead;
use chrono::Utc;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// What happened to the acknowledgement email of an accepted lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent { delivery_id: DeliveryId },
    Failed { reason: String },
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }
}

impl From<Result<DeliveryId, NotifyError>> for NotificationOutcome {
    fn from(result: Result<DeliveryId, NotifyError>) -> Self {
        match result {
            Ok(delivery_id) => NotificationOutcome::Sent { delivery_id },
            Err(e) => NotificationOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// An accepted submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The row that was written.
    pub record: LeadRecord,
    /// Best-effort; does not affect whether the submission succeeded.
    pub notification: NotificationOutcome,
}

#[derive(Clone)]
pub struct LeadPipeline {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
}

impl LeadPipeline {
    pub fn new(store: Arc<dyn LeadStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Runs one submission through validation, persistence and notification.
    ///
    /// # Errors
    ///
    /// * `SubmissionError::Rejected` - input failed validation; nothing was written or sent.
    /// * `SubmissionError::NotPersisted` - the insert failed; no email was sent.
    ///
    /// A failed notification is reported in `Submission::notification`, not as an error.
    #[tracing::instrument(skip_all, fields(submission_id = %Uuid::new_v4()))]
    pub async fn submit(&self, input: &Value) -> Result<Submission, SubmissionError> {
        let lead = validate_lead(input).map_err(|e| {
            tracing::info!("Lead rejected: {}", e);
            e
        })?;

        let fingerprint = email_fingerprint(&lead.email);
        let record = LeadRecord::new(lead, Utc::now());

        if let Err(e) = self.store.insert(&record).await {
            tracing::error!(email = %fingerprint, "Lead store write failed: {}", e);
            return Err(SubmissionError::NotPersisted(e));
        }
        tracing::info!(email = %fingerprint, "Lead stored");

        let notification = NotificationOutcome::from(self.notifier.notify(&record.lead).await);
        match &notification {
            NotificationOutcome::Sent { delivery_id } => {
                tracing::info!(email = %fingerprint, "Acknowledgement sent: {}", delivery_id)
            }
            NotificationOutcome::Failed { reason } => {
                tracing::warn!(email = %fingerprint, "Email send failed (lead saved): {}", reason)
            }
        }

        Ok(Submission {
            record,
            notification,
        })
    }
}

/// Short, stable, non-reversible tag for an email address, safe to log.
pub fn email_fingerprint(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.to_lowercase().as_bytes());
    hex::encode(&hasher.finalize()[..6])
}
