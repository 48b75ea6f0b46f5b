//! # Database Module
//!
//! This module handles all database operations for the facility booking
//! backend. We use PostgreSQL for storing:
//!
//! - Facility catalog (booking policy per amenity)
//! - Points accounts and the append-only transaction ledger
//! - Bookings (status transitions only, never deleted)
//! - Lottery bids and resolutions
//!
//! ## Why PostgreSQL?
//!
//! The booking core leans on the database for its hardest guarantee:
//! a partial unique index on `(facility_id, booking_date, start_time)`
//! makes slot acquisition atomic under concurrent requests. Two racing
//! bookings for the same slot produce exactly one winner; the loser sees
//! a unique-violation error, not a silently overwritten booking. Ledger
//! writes ride in the same database transaction as the booking mutation
//! they accompany, so a crash can never separate "points charged" from
//! "booking created".
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DATABASE LAYER                          │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                  Connection Pool                      │   │
//! │  │                 (deadpool-postgres)                   │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                            │                                 │
//! │       ┌──────────┬─────────┼──────────┬───────────┐         │
//! │       ▼          ▼         ▼          ▼           ▼         │
//! │  facilities  accounts  ledger    bookings   lottery bids    │
//! │                                             + resolutions   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod models;
pub mod queries;

use deadpool_postgres::{Config, Pool, Runtime};
use thiserror::Error;
use tokio_postgres::{Config as TokioConfig, NoTls};
use tracing::{debug, info, warn};

/// Database-related errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to connect to the database
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryError(#[from] tokio_postgres::Error),

    /// Migration failed
    #[error("Migration failed: {0}")]
    MigrationError(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl DatabaseError {
    /// Whether the underlying Postgres error is a unique-constraint
    /// violation (SQLSTATE 23505).
    ///
    /// Booking insertion treats this as "lost the race for the slot",
    /// which is a legitimate outcome, not a fault.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::QueryError(e) => e
                .code()
                .map(|c| c.code() == "23505")
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Database connection wrapper.
///
/// Wraps the connection pool and provides the migration runner.
///
/// ## Usage
///
/// ```rust,ignore
/// let db = Database::connect("postgres://...").await?;
/// let facility = queries::get_facility(db.pool(), facility_id).await?;
/// ```
#[derive(Clone)]
pub struct Database {
    /// The connection pool
    pool: Pool,
}

impl Database {
    /// Connect to the PostgreSQL database.
    ///
    /// Creates a connection pool with sensible defaults (max 10
    /// connections) and verifies it with a `SELECT 1`.
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        info!("Connecting to database...");

        // Parse the connection string using tokio_postgres::Config
        let tokio_config = database_url
            .parse::<TokioConfig>()
            .map_err(|e| DatabaseError::ConfigError(format!("Invalid database URL: {}", e)))?;

        // Convert to deadpool config
        let mut config = Config::new();

        if let Some(dbname) = tokio_config.get_dbname() {
            config.dbname = Some(dbname.to_string());
        }
        if let Some(user) = tokio_config.get_user() {
            config.user = Some(user.to_string());
        }
        if let Some(password) = tokio_config.get_password() {
            // Password is &[u8], convert to String
            config.password = Some(String::from_utf8_lossy(password).to_string());
        }
        if let Some(host) = tokio_config.get_hosts().first() {
            if let tokio_postgres::config::Host::Tcp(host_str) = host {
                config.host = Some(host_str.clone());
            }
        }
        if let Some(port) = tokio_config.get_ports().first() {
            config.port = Some(*port);
        }

        config.pool = Some(deadpool_postgres::PoolConfig {
            max_size: 10,
            ..Default::default()
        });

        let pool = config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        // Test connection
        let client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// Executes `migrations/001_initial_schema.sql` as one batch. The
    /// schema uses `IF NOT EXISTS` / `ON CONFLICT DO NOTHING` throughout,
    /// and duplicate-object errors (SQLSTATE 42P07 / 42710) are tolerated
    /// so repeated startups are safe.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations...");

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        // The binary may be launched from the repo root or from a
        // deployment directory; try both.
        let migration_paths = [
            "migrations/001_initial_schema.sql",
            "../migrations/001_initial_schema.sql",
        ];

        let mut migration_sql = None;
        for path in &migration_paths {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    info!("Found migration file at: {}", path);
                    migration_sql = Some(content);
                    break;
                }
                Err(e) => debug!("Tried path '{}': {}", path, e),
            }
        }

        let migration_sql = migration_sql.ok_or_else(|| {
            DatabaseError::MigrationError(format!(
                "Could not find migration file. Tried paths: {:?}",
                migration_paths
            ))
        })?;

        match client.batch_execute(&migration_sql).await {
            Ok(_) => {
                info!("Migrations completed successfully");
                Ok(())
            }
            Err(e) => {
                // 42P07 = duplicate_table, 42710 = duplicate_object
                let is_duplicate = e
                    .code()
                    .map(|c| c.code() == "42P07" || c.code() == "42710")
                    .unwrap_or(false);

                if is_duplicate || e.to_string().contains("already exists") {
                    warn!(
                        "Some database objects already exist ({}). This is OK if migrations ran before.",
                        e
                    );
                    Ok(())
                } else {
                    Err(DatabaseError::MigrationError(e.to_string()))
                }
            }
        }
    }

    /// Get a reference to the connection pool.
    ///
    /// Use this when you need direct access to the pool
    /// for custom queries or an explicit transaction.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

// Re-export commonly used items
pub use models::*;
