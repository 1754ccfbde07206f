//! Clinic Lead API Library
//!
//! Accepts clinic lead submissions over HTTP, validates them, stores them
//! durably and sends a best-effort acknowledgement email.
//!
//! # Modules
//!
//! - `config`: Configuration loaded from the environment.
//! - `db`: PostgreSQL pool and migrations.
//! - `errors`: Error taxonomy and HTTP error mapping.
//! - `handlers`: HTTP request handlers.
//! - `lead_store`: Lead store trait and PostgreSQL implementation.
//! - `mailer`: Acknowledgement email composition and the Resend client.
//! - `models`: Lead records and API response bodies.
//! - `pipeline`: Validate → persist → notify orchestration.
//! - `server`: Router and middleware assembly.
//! - `supabase_client`: Lead store over the Supabase REST API.
//! - `validation`: Input validation and normalization.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod lead_store;
pub mod mailer;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod supabase_client;
pub mod validation;
