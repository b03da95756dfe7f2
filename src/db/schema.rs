use crate::errors::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

#[instrument(skip(conn))]
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    debug!("Executing CREATE TABLE statements if tables do not exist.");
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('Income', 'Expense', 'Savings')),
            description TEXT
        );

        -- (month, category) is the natural key; inserts with the same key
        -- replace the prior amount.
        CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            month TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            UNIQUE(month, category)
        );

        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            amount REAL NOT NULL,
            category TEXT NOT NULL,
            target_date TEXT NOT NULL,
            progress REAL NOT NULL DEFAULT 0.0
        );

        -- status is a textual mirror of paid; the two are kept in sync at
        -- every write.
        CREATE TABLE IF NOT EXISTS reminders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            category TEXT NOT NULL DEFAULT 'General',
            due_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Pending',
            paid INTEGER NOT NULL DEFAULT 0
        );

        COMMIT;",
    )
    .map_err(|e| Error::Storage(format!("Failed to create tables: {e}")))?;
    info!("Database tables ensured.");
    Ok(())
}
