use crate::config::{Config, StoreBackend};
use crate::db::Database;
use crate::errors::StoreError;
use crate::models::LeadRecord;
use crate::supabase_client::SupabaseClient;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Durable, insert-only storage for accepted leads.
///
/// One call writes exactly one row. Implementations must not retry, and must
/// only return `Ok` once the datastore has acknowledged the write.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert(&self, lead: &LeadRecord) -> Result<(), StoreError>;
}

/// Lead store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
    insert_sql: String,
}

impl PgLeadStore {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        // Table name is restricted to [A-Za-z0-9_] by config loading.
        let insert_sql = format!(
            "INSERT INTO {} (clinic_name, clinic_type, email, website, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
            config.leads_table
        );
        Self { pool, insert_sql }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn insert(&self, record: &LeadRecord) -> Result<(), StoreError> {
        let lead = &record.lead;
        sqlx::query(&self.insert_sql)
            .bind(lead.clinic_name.as_deref())
            .bind(lead.clinic_type.as_deref())
            .bind(&lead.email)
            .bind(lead.website.as_deref())
            .bind(record.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Builds the lead store selected by configuration.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn LeadStore>> {
    match &config.store {
        StoreBackend::Postgres { database_url } => {
            let db = Database::new(database_url).await?;
            tracing::info!("Database connection pool established");
            db.migrate().await?;
            tracing::info!("Database migrations applied");
            Ok(Arc::new(PgLeadStore::new(db.pool, config)))
        }
        StoreBackend::Supabase { .. } => {
            let client = SupabaseClient::new(config)?;
            tracing::info!("✓ Supabase client initialized");
            Ok(Arc::new(client))
        }
    }
}
