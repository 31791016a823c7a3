//! Versioned schema migrations.
//!
//! The SQL under `migrations/` is compiled into the binary and applied at
//! startup before the server accepts traffic. Schema changes land as new
//! migration directories, never as runtime patches.

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Apply all pending migrations against the given database.
///
/// Runs on a blocking thread because the migration harness uses the
/// synchronous Diesel connection.
pub async fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| MigrationError::Connection(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| MigrationError::Apply(err.to_string()))?;
        for version in &applied {
            info!(migration = %version, "applied migration");
        }
        Ok(())
    })
    .await
    .map_err(|err| MigrationError::Apply(format!("migration task panicked: {err}")))?
}
