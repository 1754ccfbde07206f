use std::env;

use chrono::Utc;
use clinic_lead_api::config::{Config, StoreBackend};
use clinic_lead_api::db::Database;
use clinic_lead_api::lead_store::{LeadStore, PgLeadStore};
use clinic_lead_api::models::{Lead, LeadRecord};
use uuid::Uuid;

/// Integration smoke test for the PostgreSQL lead store.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn store_lead_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;
    db.migrate().await?;

    let config = Config {
        port: 0,
        environment: "test".to_string(),
        allowed_origin: "*".to_string(),
        store: StoreBackend::Postgres {
            database_url: db_url.clone(),
        },
        leads_table: "clinic_leads".to_string(),
        resend_api_key: "unused".to_string(),
        resend_base_url: "http://localhost".to_string(),
        mail_from: "OREN <onboarding@resend.dev>".to_string(),
        founder_email: None,
        http_timeout_secs: 5,
    };
    let store = PgLeadStore::new(db.pool.clone(), &config);

    // Unique address so repeated runs can be told apart.
    let email = format!("smoke-{}@example.com", Uuid::new_v4().simple());
    let record = LeadRecord::new(
        Lead {
            clinic_name: Some("Smoke Test Clinic".to_string()),
            clinic_type: None,
            email: email.clone(),
            website: None,
        },
        Utc::now(),
    );

    // No dedup: the same record twice is two rows
    store.insert(&record).await?;
    store.insert(&record).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clinic_leads WHERE email = $1")
        .bind(&email)
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(count, 2);

    let clinic_type: Option<String> =
        sqlx::query_scalar("SELECT clinic_type FROM clinic_leads WHERE email = $1 LIMIT 1")
            .bind(&email)
            .fetch_one(&db.pool)
            .await?;
    assert_eq!(clinic_type, None);

    Ok(())
}
