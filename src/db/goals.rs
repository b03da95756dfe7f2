//! Goal tracker: savings/spending goals with partial-payment application.
//!
//! `amount` is the remaining target and shrinks with every payment. The
//! stored `progress` is recomputed on each payment against the amount
//! remaining *before* that payment, not the goal's original target, so
//! percentages are not additive across payments. That matches the observed
//! behavior of the desktop app and is deliberately preserved.

use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::Goal;
use crate::validate;
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info, instrument, warn};

/// Form input for a new goal.
#[derive(Debug)]
pub struct NewGoal<'a> {
    pub name: &'a str,
    pub amount: &'a str,
    pub category: &'a str,
    pub target_date: &'a str,
}

/// Rename/reschedule input; amount and progress are untouched.
#[derive(Debug)]
pub struct GoalUpdate<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub target_date: &'a str,
}

fn map_goal_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        target_date: row.get(4)?,
        progress: row.get(5)?,
    })
}

/// Creates a goal with progress 0. The amount must be strictly positive.
#[instrument(skip(pool, input))]
pub async fn add_goal(pool: &DbPool, input: &NewGoal<'_>) -> Result<i64> {
    let name = validate::require_field("name", input.name)?;
    let amount = validate::parse_positive_amount(input.amount)?;
    let category = validate::require_field("category", input.category)?;
    let target_date = validate::parse_date("target date", input.target_date)?;

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO goals (name, amount, category, target_date, progress)
         VALUES (?1, ?2, ?3, ?4, 0.0)",
    )?;
    match stmt.insert(params![name, amount, category, target_date]) {
        Ok(id) => {
            info!("Added goal {} '{}': target {:.2} by {}", id, name, amount, target_date);
            Ok(id)
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            warn!("Goal name '{}' already in use", name);
            Err(Error::Validation(format!("a goal named '{name}' already exists")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes a goal by id.
#[instrument(skip(pool))]
pub async fn delete_goal(pool: &DbPool, id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let affected = conn.execute("DELETE FROM goals WHERE id = ?1", params![id])?;
    if affected == 0 {
        warn!("Delete requested for unknown goal {}", id);
        return Err(Error::NotFound { entity: "goal", id });
    }
    info!("Deleted goal {}", id);
    Ok(())
}

/// Applies a partial payment: the remaining amount shrinks and progress is
/// recomputed against the pre-payment amount, clamped to 0..=100.
///
/// # Errors
///
/// * `Error::Validation` when the payment is malformed, non-positive, or
///   exceeds the goal's current remaining amount.
/// * `Error::NotFound` for an unknown goal id.
#[instrument(skip(pool))]
pub async fn apply_payment(pool: &DbPool, id: i64, paid_amount: &str) -> Result<()> {
    let paid = validate::parse_positive_amount(paid_amount)?;

    let mut conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock for payment".to_string()))?;
    let tx = conn
        .transaction()
        .map_err(|e| Error::Storage(format!("Failed to start transaction for payment: {e}")))?;

    let amount: Option<f64> = tx
        .query_row("SELECT amount FROM goals WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    let Some(amount) = amount else {
        return Err(Error::NotFound { entity: "goal", id });
    };
    if paid > amount {
        return Err(Error::Validation(format!(
            "payment of {paid:.2} exceeds the remaining goal amount {amount:.2}"
        )));
    }

    let new_amount = amount - paid;
    let new_progress = if amount > 0.0 {
        ((amount - new_amount) / amount * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    tx.execute(
        "UPDATE goals SET amount = ?1, progress = ?2 WHERE id = ?3",
        params![new_amount, new_progress, id],
    )?;
    tx.commit()
        .map_err(|e| Error::Storage(format!("Failed to commit payment for goal {id}: {e}")))?;

    info!(
        "Applied payment of {:.2} to goal {}: remaining {:.2}, progress {:.1}%",
        paid, id, new_amount, new_progress
    );
    Ok(())
}

/// Renames or reschedules a goal without touching amount or progress.
#[instrument(skip(pool, update))]
pub async fn update_goal(pool: &DbPool, id: i64, update: &GoalUpdate<'_>) -> Result<()> {
    let name = validate::require_field("name", update.name)?;
    let category = validate::require_field("category", update.category)?;
    let target_date = validate::parse_date("target date", update.target_date)?;

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let result = conn.execute(
        "UPDATE goals SET name = ?1, category = ?2, target_date = ?3 WHERE id = ?4",
        params![name, category, target_date, id],
    );
    match result {
        Ok(0) => {
            warn!("Update requested for unknown goal {}", id);
            Err(Error::NotFound { entity: "goal", id })
        }
        Ok(_) => {
            info!("Updated goal {}: name='{}', target {}", id, name, target_date);
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            warn!("Goal name '{}' already in use", name);
            Err(Error::Validation(format!("a goal named '{name}' already exists")))
        }
        Err(e) => Err(e.into()),
    }
}

/// All goals, latest target date first.
#[instrument(skip(pool))]
pub async fn list_goals(pool: &DbPool) -> Result<Vec<Goal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, amount, category, target_date, progress
         FROM goals
         ORDER BY target_date DESC",
    )?;
    let rows = stmt.query_map([], map_goal_row)?;

    let mut goals = Vec::new();
    for row in rows {
        goals.push(row.map_err(|e| Error::Storage(format!("Failed to map goal row: {e}")))?);
    }
    debug!("Fetched {} goals.", goals.len());
    Ok(goals)
}

/// Mean progress across all goals, 0 when none exist. Drives the overall
/// progress bar.
#[instrument(skip(pool))]
pub async fn average_progress(pool: &DbPool) -> Result<f64> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let avg: f64 = conn.query_row(
        "SELECT COALESCE(AVG(progress), 0.0) FROM goals",
        [],
        |row| row.get(0),
    )?;
    Ok(avg)
}
