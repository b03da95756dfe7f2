#![allow(dead_code)]
use crate::db::{DbPool, migrations, schema};
use crate::errors::{Error, Result};
use rusqlite::{Connection, params};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

// Fresh in-memory store per test, with the full schema and all migrations
// applied, exactly as init_db would leave a new file.
pub(crate) async fn setup_test_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()
        .map_err(|e| Error::Storage(format!("Test DB: Failed to open in-memory: {e}")))?;
    conn.execute("PRAGMA foreign_keys = ON;", [])
        .map_err(|e| Error::Storage(format!("Test DB: Failed to enable foreign keys: {e}")))?;
    schema::create_tables(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) struct SeedTransaction<'a> {
    pub(crate) date: &'a str,
    pub(crate) amount: f64,
    pub(crate) category: &'a str,
    pub(crate) kind: &'a str,
    pub(crate) description: Option<&'a str>,
}

// Direct insert bypassing form validation, for focused query tests.
pub(crate) fn seed_transaction(conn: &Connection, t: &SeedTransaction<'_>) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (date, amount, category, type, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let id = stmt.insert(params![t.date, t.amount, t.category, t.kind, t.description])?;
    Ok(id)
}

pub(crate) struct SeedReminder<'a> {
    pub(crate) name: &'a str,
    pub(crate) amount: f64,
    pub(crate) category: &'a str,
    pub(crate) due_date: &'a str,
    pub(crate) paid: bool,
}

pub(crate) fn seed_reminder(conn: &Connection, r: &SeedReminder<'_>) -> Result<i64> {
    let status = if r.paid { "Paid" } else { "Pending" };
    let mut stmt = conn.prepare_cached(
        "INSERT INTO reminders (name, amount, category, due_date, status, paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let id = stmt.insert(params![r.name, r.amount, r.category, r.due_date, status, r.paid])?;
    Ok(id)
}
