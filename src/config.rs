use serde::Deserialize;
use url::Url;

/// Table created by the bundled migrations.
pub const DEFAULT_LEADS_TABLE: &str = "clinic_leads";

/// Where accepted leads are written.
#[derive(Debug, Clone, Deserialize)]
pub enum StoreBackend {
    /// Direct PostgreSQL connection.
    Postgres { database_url: String },
    /// Supabase REST (PostgREST) endpoint authenticated with a service key.
    Supabase { url: String, service_key: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub allowed_origin: String,
    pub store: StoreBackend,
    pub leads_table: String,
    pub resend_api_key: String,
    pub resend_base_url: String,
    pub mail_from: String,
    pub founder_email: Option<String>,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let store = store_backend_from_env()?;
        let leads_table = leads_table_for(&store, optional_var("LEADS_TABLE"))?;

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            environment: std::env::var("APP_ENV")
                .or_else(|_| std::env::var("NODE_ENV"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "development".to_string()),
            allowed_origin: optional_var("ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
            store,
            leads_table,
            resend_api_key: std::env::var("RESEND_API_KEY")
                .map_err(|_| anyhow::anyhow!("RESEND_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("RESEND_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            resend_base_url: optional_var("RESEND_BASE_URL")
                .map(|url| require_http_url("RESEND_BASE_URL", url))
                .transpose()?
                .unwrap_or_else(|| "https://api.resend.com".to_string()),
            mail_from: optional_var("MAIL_FROM")
                .unwrap_or_else(|| "OREN <onboarding@resend.dev>".to_string()),
            founder_email: optional_var("FOUNDER_EMAIL"),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_TIMEOUT_SECS must be a whole number of seconds"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        match &config.store {
            StoreBackend::Postgres { database_url } => tracing::debug!(
                "Lead store: PostgreSQL {}...",
                redacted_prefix(database_url)
            ),
            StoreBackend::Supabase { url, .. } => tracing::debug!("Lead store: Supabase {}", url),
        }
        tracing::debug!("Leads table: {}", config.leads_table);
        tracing::debug!("Resend Base URL: {}", config.resend_base_url);
        if config.founder_email.is_some() {
            tracing::info!("Founder BCC configured for lead notifications");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First characters of a connection string, enough to tell hosts apart in
/// debug logs without printing credentials in full.
fn redacted_prefix(database_url: &str) -> String {
    database_url.chars().take(20).collect()
}

/// `LEADS_TABLE` only applies to the Supabase backend. PostgreSQL writes to the
/// table the migrations create.
fn leads_table_for(store: &StoreBackend, requested: Option<String>) -> anyhow::Result<String> {
    let Some(table) = requested else {
        return Ok(DEFAULT_LEADS_TABLE.to_string());
    };
    if !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("LEADS_TABLE may only contain letters, digits and '_'");
    }
    if matches!(store, StoreBackend::Postgres { .. }) && table != DEFAULT_LEADS_TABLE {
        anyhow::bail!(
            "LEADS_TABLE is only supported with Supabase; PostgreSQL uses the migrated {} table",
            DEFAULT_LEADS_TABLE
        );
    }
    Ok(table)
}

fn require_http_url(name: &str, raw: String) -> anyhow::Result<String> {
    let parsed = Url::parse(&raw).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// PostgreSQL takes precedence when both backends are configured.
fn store_backend_from_env() -> anyhow::Result<StoreBackend> {
    if let Some(database_url) = optional_var("DATABASE_URL").or_else(|| optional_var("DB_URL")) {
        if !database_url.starts_with("postgresql://") && !database_url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
        }
        return Ok(StoreBackend::Postgres { database_url });
    }

    match (optional_var("SUPABASE_URL"), optional_var("SUPABASE_SERVICE_KEY")) {
        (Some(url), Some(service_key)) => Ok(StoreBackend::Supabase {
            url: require_http_url("SUPABASE_URL", url)?,
            service_key,
        }),
        (Some(_), None) | (None, Some(_)) => anyhow::bail!(
            "Missing Supabase environment variables (SUPABASE_URL, SUPABASE_SERVICE_KEY)"
        ),
        (None, None) => anyhow::bail!(
            "No lead store configured: set DATABASE_URL or SUPABASE_URL and SUPABASE_SERVICE_KEY"
        ),
    }
}
