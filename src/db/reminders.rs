//! Reminder store: recurring bills with due dates and paid/pending state.

use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{DateRange, Reminder, ReminderStatus};
use crate::validate;
use chrono::NaiveDate;
use rusqlite::{Row, params};
use tracing::{debug, info, instrument, warn};

/// Form input for a new reminder.
#[derive(Debug)]
pub struct NewReminder<'a> {
    pub name: &'a str,
    pub amount: &'a str,
    pub category: &'a str,
    pub due_date: &'a str,
    pub status: &'a str,
}

fn map_reminder_row(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    let status_raw: String = row.get(5)?;
    let status = status_raw.parse::<ReminderStatus>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unrecognized reminder status '{status_raw}'").into(),
        )
    })?;
    Ok(Reminder {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        due_date: row.get(4)?,
        status,
        paid: row.get(6)?,
    })
}

/// Validates and persists a reminder. The `paid` flag is derived from the
/// textual status at insert time; the two never diverge.
#[instrument(skip(pool, input))]
pub async fn add_reminder(pool: &DbPool, input: &NewReminder<'_>) -> Result<i64> {
    let name = validate::require_field("name", input.name)?;
    let amount = validate::parse_unsigned_amount(input.amount)?;
    let category = validate::require_field("category", input.category)?;
    let due_date = validate::parse_date("due date", input.due_date)?;
    let status: ReminderStatus = validate::require_field("status", input.status)?.parse()?;

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO reminders (name, amount, category, due_date, status, paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    let id = stmt.insert(params![
        name,
        amount,
        category,
        due_date,
        status.as_str(),
        status.is_paid(),
    ])?;
    info!(
        "Added reminder {} '{}': {:.2} due {} ({})",
        id, name, amount, due_date, status
    );
    Ok(id)
}

/// Deletes a reminder by id.
#[instrument(skip(pool))]
pub async fn delete_reminder(pool: &DbPool, id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let affected = conn.execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
    if affected == 0 {
        warn!("Delete requested for unknown reminder {}", id);
        return Err(Error::NotFound {
            entity: "reminder",
            id,
        });
    }
    info!("Deleted reminder {}", id);
    Ok(())
}

/// Reminders due inside the inclusive range, latest due date first.
#[instrument(skip(pool))]
pub async fn query_reminders(pool: &DbPool, range: &DateRange) -> Result<Vec<Reminder>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, amount, category, due_date, status, paid
         FROM reminders
         WHERE due_date BETWEEN ?1 AND ?2
         ORDER BY due_date DESC",
    )?;
    let rows = stmt.query_map(
        params![range.start_bound(), range.end_bound()],
        map_reminder_row,
    )?;

    let mut reminders = Vec::new();
    for row in rows {
        reminders
            .push(row.map_err(|e| Error::Storage(format!("Failed to map reminder row: {e}")))?);
    }
    debug!("Fetched {} reminders in range.", reminders.len());
    Ok(reminders)
}

/// Reminders that still need attention: due on/after `today`, or unpaid
/// whatever their date. Earliest due date first, capped at `limit` (the
/// dashboard shows 5).
#[instrument(skip(pool))]
pub async fn upcoming_or_unpaid(
    pool: &DbPool,
    today: NaiveDate,
    limit: u32,
) -> Result<Vec<Reminder>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, amount, category, due_date, status, paid
         FROM reminders
         WHERE due_date >= ?1 OR paid = 0
         ORDER BY due_date ASC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![today, limit], map_reminder_row)?;

    let mut reminders = Vec::new();
    for row in rows {
        reminders
            .push(row.map_err(|e| Error::Storage(format!("Failed to map reminder row: {e}")))?);
    }
    Ok(reminders)
}
