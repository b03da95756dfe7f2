use crate::db::{migrations, schema};
use crate::errors::{Error, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Process-wide store handle, created once at startup and passed explicitly
/// into every store operation. The connection closes when the last clone is
/// dropped, which covers both normal shutdown and the abnormal
/// closed-login-window path.
pub type DbPool = Arc<Mutex<Connection>>;

/// Opens (or creates) the database file, enables foreign-key enforcement,
/// ensures all tables exist and brings the schema up to date.
///
/// # Errors
///
/// Returns `Error::Storage` when the file cannot be opened or the tables
/// cannot be created, and `Error::Schema` when a migration step fails.
/// Callers treat either as fatal at startup.
#[instrument]
pub async fn init_db(db_path: &str) -> Result<DbPool> {
    debug!("Initializing database connection to: {}", db_path);
    let conn = Connection::open(db_path)
        .map_err(|e| Error::Storage(format!("Failed to open database at {db_path}: {e}")))?;

    conn.execute("PRAGMA foreign_keys = ON;", [])
        .map_err(|e| Error::Storage(format!("Failed to enable foreign keys: {e}")))?;

    info!("Database connection opened. Ensuring tables are created...");
    schema::create_tables(&conn)?;
    migrations::run_migrations(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}
