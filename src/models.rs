use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used whenever a submission carries no clinic name.
pub const DEFAULT_CLINIC_NAME: &str = "your clinic";

// ============ Domain Models ============

/// A validated, normalized lead submission.
///
/// Produced only by [`crate::validation::validate_lead`], so holding one means
/// the email has already passed the address grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Trimmed clinic name, if one was supplied.
    pub clinic_name: Option<String>,
    /// Trimmed, lower-cased clinic type (e.g. "dental").
    pub clinic_type: Option<String>,
    /// Trimmed submitter address.
    pub email: String,
    /// Trimmed website. Stored, never used in the notification.
    pub website: Option<String>,
}

impl Lead {
    /// Name used when addressing the submitter.
    pub fn display_name(&self) -> &str {
        self.clinic_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CLINIC_NAME)
    }

    /// Clinic type if it is known and non-empty.
    pub fn known_clinic_type(&self) -> Option<&str> {
        self.clinic_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// The row written to the lead store: a lead plus its acceptance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    #[serde(flatten)]
    pub lead: Lead,
    /// Server-side acceptance time, serialized as RFC 3339.
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    pub fn new(lead: Lead, created_at: DateTime<Utc>) -> Self {
        Self { lead, created_at }
    }
}

// ============ API Responses ============

/// Body of a successful `POST /api/lead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAccepted {
    pub success: bool,
    pub message: String,
}

impl Default for LeadAccepted {
    fn default() -> Self {
        Self {
            success: true,
            message: "Info received".to_string(),
        }
    }
}

/// Body of the health endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub environment: String,
}
