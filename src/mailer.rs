//! Acknowledgement email for accepted leads.
//!
//! [`EmailMessage::compose`] is pure and decides the wording; [`ResendClient`]
//! delivers it through the Resend HTTP API.

use crate::config::Config;
use crate::errors::NotifyError;
use crate::models::Lead;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PRODUCT_PARAGRAPH: &str =
    "OREN quietly runs workflows in the background — reducing admin load without disrupting your staff.";
const OFFER_PARAGRAPH: &str =
    "If you're open to it, I can walk you through how it works for your specific setup.";
const SIGNATURE_NAME: &str = "Bexruz";
const SIGNATURE_TITLE: &str = "Founder, OREN";

/// Identifier the email provider assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends the acknowledgement for an accepted lead. Best-effort: callers decide
/// what a failure means, implementations only report it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, lead: &Lead) -> Result<DeliveryId, NotifyError>;
}

/// A fully composed outbound message, serialized as the Resend request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
}

impl EmailMessage {
    /// Composes the acknowledgement for `lead`.
    ///
    /// The opening sentence names the clinic type when one is known; otherwise
    /// a generic opening is used.
    pub fn compose(lead: &Lead, from: &str, bcc: Option<&str>) -> Self {
        let clinic_name = lead.display_name();
        let intro = opening_sentence(lead.known_clinic_type());

        let text = format!(
            "Hi {clinic_name},\n\n{intro}\n\n{PRODUCT_PARAGRAPH}\n\n{OFFER_PARAGRAPH}\n\nBest,\n{SIGNATURE_NAME}\n{SIGNATURE_TITLE}"
        );

        let html = format!(
            r#"<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; color: #333; line-height: 1.6; max-width: 600px;">
  <p>Hi {name},</p>
  <p>{intro}</p>
  <p>{product}</p>
  <p>{offer}</p>
  <div style="margin-top: 32px;">
    <p style="margin: 0;">Best,</p>
    <p style="margin: 0; font-weight: 500;">{SIGNATURE_NAME}</p>
    <p style="margin: 0; color: #666; font-size: 14px;">{SIGNATURE_TITLE}</p>
  </div>
</div>"#,
            name = escape_html(clinic_name),
            intro = escape_html(&intro),
            product = escape_html(PRODUCT_PARAGRAPH),
            offer = escape_html(OFFER_PARAGRAPH),
        );

        Self {
            from: from.to_string(),
            to: lead.email.clone(),
            subject: format!("Quick note for {}", clinic_name),
            html,
            text,
            bcc: bcc.map(str::to_string),
        }
    }
}

/// Opening sentence of the acknowledgement, keyed on the clinic type.
pub fn opening_sentence(clinic_type: Option<&str>) -> String {
    match clinic_type {
        Some(kind) => format!(
            "We work with {} clinics to automate patient data securely.",
            kind
        ),
        None => "We help clinics automate patient data and daily operations.".to_string(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: String,
}

/// Client for the Resend transactional email API.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    bcc: Option<String>,
}

impl ResendClient {
    /// Creates a new `ResendClient` from configuration.
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| NotifyError::Request(format!("Failed to create Resend client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.resend_base_url.clone(),
            api_key: config.resend_api_key.clone(),
            from: config.mail_from.clone(),
            bcc: config.founder_email.clone(),
        })
    }

    /// Sends one composed message and returns the provider's id for it.
    pub async fn send(&self, message: &EmailMessage) -> Result<DeliveryId, NotifyError> {
        let url = format!("{}/emails", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(message)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let data: ResendSendResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::MalformedResponse(e.to_string()))?;

        Ok(DeliveryId(data.id))
    }
}

#[async_trait]
impl Notifier for ResendClient {
    async fn notify(&self, lead: &Lead) -> Result<DeliveryId, NotifyError> {
        let message = EmailMessage::compose(lead, &self.from, self.bcc.as_deref());
        self.send(&message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(clinic_name: Option<&str>, clinic_type: Option<&str>) -> Lead {
        Lead {
            clinic_name: clinic_name.map(str::to_string),
            clinic_type: clinic_type.map(str::to_string),
            email: "x@y.com".to_string(),
            website: Some("https://smile.example".to_string()),
        }
    }

    #[test]
    fn test_known_clinic_type_opening() {
        let message = EmailMessage::compose(
            &lead(Some("Smile Dental"), Some("dental")),
            "OREN <onboarding@resend.dev>",
            None,
        );

        assert_eq!(message.subject, "Quick note for Smile Dental");
        assert_eq!(message.to, "x@y.com");
        assert!(message
            .text
            .starts_with("Hi Smile Dental,\n\nWe work with dental clinics"));
        assert!(message.html.contains("We work with dental clinics"));
        assert!(message.bcc.is_none());
    }

    #[test]
    fn test_unknown_clinic_type_uses_generic_opening() {
        for clinic_type in [None, Some("")] {
            let message = EmailMessage::compose(&lead(None, clinic_type), "from@x.com", None);
            assert_eq!(message.subject, "Quick note for your clinic");
            assert!(message
                .text
                .contains("We help clinics automate patient data and daily operations."));
            assert!(!message.text.contains("We work with"));
        }
    }

    #[test]
    fn test_website_not_in_message() {
        let message = EmailMessage::compose(&lead(None, None), "from@x.com", None);
        assert!(!message.text.contains("smile.example"));
        assert!(!message.html.contains("smile.example"));
    }

    #[test]
    fn test_product_paragraph_wording() {
        let message = EmailMessage::compose(&lead(None, None), "from@x.com", None);
        let paragraph = "OREN quietly runs workflows in the background — reducing admin load \
                         without disrupting your staff.";
        assert!(message.text.contains(paragraph));
        assert!(message.html.contains(paragraph));
    }

    #[test]
    fn test_html_escapes_clinic_name() {
        let message = EmailMessage::compose(
            &lead(Some("<b>Evil</b> & Co"), None),
            "from@x.com",
            None,
        );
        assert!(message.html.contains("Hi &lt;b&gt;Evil&lt;/b&gt; &amp; Co,"));
        assert!(message.text.contains("Hi <b>Evil</b> & Co,"));
    }

    #[test]
    fn test_bcc_serialized_only_when_set() {
        let without = serde_json::to_value(EmailMessage::compose(&lead(None, None), "f@x.com", None))
            .unwrap();
        assert!(without.get("bcc").is_none());

        let with = serde_json::to_value(EmailMessage::compose(
            &lead(None, None),
            "f@x.com",
            Some("founder@oren.clinic"),
        ))
        .unwrap();
        assert_eq!(with["bcc"], "founder@oren.clinic");
    }
}
