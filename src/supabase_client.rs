use crate::config::{Config, StoreBackend};
use crate::errors::StoreError;
use crate::lead_store::LeadStore;
use crate::models::LeadRecord;
use async_trait::async_trait;
use std::time::Duration;

/// Client for the Supabase REST (PostgREST) interface.
///
/// Only the single-row insert used for leads is implemented.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl SupabaseClient {
    /// Creates a new `SupabaseClient` from the configured Supabase backend.
    ///
    /// Fails if the configuration selects a different backend or the HTTP
    /// client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let StoreBackend::Supabase { url, service_key } = &config.store else {
            anyhow::bail!("Supabase client requires SUPABASE_URL and SUPABASE_SERVICE_KEY");
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create Supabase client: {}", e))?;

        Ok(Self {
            client,
            base_url: url.clone(),
            service_key: service_key.clone(),
            table: config.leads_table.clone(),
        })
    }
}

#[async_trait]
impl LeadStore for SupabaseClient {
    async fn insert(&self, record: &LeadRecord) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        tracing::debug!("Inserting lead into Supabase table {}", self.table);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        Ok(())
    }
}
