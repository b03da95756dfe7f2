//! Ledger store: transaction CRUD and the aggregations the budget report,
//! dashboard charts and trend views are built on.

use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{CategoryTotal, DateRange, MonthlyTotals, Transaction, TransactionKind};
use crate::validate;
use rusqlite::{Row, params};
use tracing::{debug, info, instrument, warn};

/// Form input for a new ledger row. Money and dates arrive as raw strings
/// and are validated before anything touches the store.
#[derive(Debug)]
pub struct NewTransaction<'a> {
    pub date: &'a str,
    pub amount: &'a str,
    pub category: &'a str,
    pub kind: &'a str,
    pub description: Option<&'a str>,
}

fn map_transaction_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind_raw: String = row.get(4)?;
    let kind = kind_raw.parse::<TransactionKind>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unrecognized transaction type '{kind_raw}'").into(),
        )
    })?;
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        kind,
        description: row.get(5)?,
    })
}

/// Validates and persists a new transaction, returning the new row's id.
///
/// # Errors
///
/// `Error::Validation` for an unparseable date, an amount that does not
/// match the currency pattern (optional leading minus, up to two decimal
/// places), an unrecognized type, or a blank category/type.
#[instrument(skip(pool, input))]
pub async fn add_transaction(pool: &DbPool, input: &NewTransaction<'_>) -> Result<i64> {
    let date = validate::parse_date("date", input.date)?;
    let amount = validate::parse_amount(input.amount)?;
    let category = validate::require_field("category", input.category)?;
    let kind: TransactionKind = validate::require_field("type", input.kind)?.parse()?;
    let description = input.description.map(str::trim).filter(|d| !d.is_empty());

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (date, amount, category, type, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let id = stmt.insert(params![date, amount, category, kind.as_str(), description])?;
    info!(
        "Recorded {} transaction {}: amount={:.2}, category='{}'",
        kind, id, amount, category
    );
    Ok(id)
}

/// Deletes a transaction by id.
#[instrument(skip(pool))]
pub async fn delete_transaction(pool: &DbPool, id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let affected = conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    if affected == 0 {
        warn!("Delete requested for unknown transaction {}", id);
        return Err(Error::NotFound {
            entity: "transaction",
            id,
        });
    }
    info!("Deleted transaction {}", id);
    Ok(())
}

/// Returns transactions inside the inclusive range, newest first.
#[instrument(skip(pool))]
pub async fn query_transactions(pool: &DbPool, range: &DateRange) -> Result<Vec<Transaction>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, amount, category, type, description
         FROM transactions
         WHERE date BETWEEN ?1 AND ?2
         ORDER BY date DESC",
    )?;
    let rows = stmt.query_map(
        params![range.start_bound(), range.end_bound()],
        map_transaction_row,
    )?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions
            .push(row.map_err(|e| Error::Storage(format!("Failed to map transaction row: {e}")))?);
    }
    debug!("Fetched {} transactions in range.", transactions.len());
    Ok(transactions)
}

/// Most recent transactions by date, capped at `limit` (the dashboard
/// shows 5).
#[instrument(skip(pool))]
pub async fn recent_transactions(pool: &DbPool, limit: u32) -> Result<Vec<Transaction>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, amount, category, type, description
         FROM transactions
         ORDER BY date DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], map_transaction_row)?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions
            .push(row.map_err(|e| Error::Storage(format!("Failed to map transaction row: {e}")))?);
    }
    Ok(transactions)
}

/// Per-category sums for one transaction kind, optionally restricted to a
/// `YYYY-MM` month. Feeds the budget-actual computation and the expense
/// breakdown chart; only positive sums are meaningful for display, which
/// callers filter for themselves.
#[instrument(skip(pool))]
pub async fn sum_by_category(
    pool: &DbPool,
    kind: TransactionKind,
    month: Option<&str>,
) -> Result<Vec<CategoryTotal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;

    let mut totals = Vec::new();
    if let Some(month) = month {
        let mut stmt = conn.prepare_cached(
            "SELECT category, SUM(amount) FROM transactions
             WHERE type = ?1 AND strftime('%Y-%m', date) = ?2
             GROUP BY category
             ORDER BY category",
        )?;
        let rows = stmt.query_map(params![kind.as_str(), month], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        for row in rows {
            totals.push(row?);
        }
    } else {
        let mut stmt = conn.prepare_cached(
            "SELECT category, SUM(amount) FROM transactions
             WHERE type = ?1
             GROUP BY category
             ORDER BY category",
        )?;
        let rows = stmt.query_map(params![kind.as_str()], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        for row in rows {
            totals.push(row?);
        }
    }
    debug!("Aggregated {} {} categories.", totals.len(), kind);
    Ok(totals)
}

/// Category totals across all transaction kinds in a date range, for the
/// spending-by-category report chart.
#[instrument(skip(pool))]
pub async fn sum_by_category_in_range(
    pool: &DbPool,
    range: &DateRange,
) -> Result<Vec<CategoryTotal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT category, SUM(amount) FROM transactions
         WHERE date BETWEEN ?1 AND ?2
         GROUP BY category
         ORDER BY category",
    )?;
    let rows = stmt.query_map(params![range.start_bound(), range.end_bound()], |row| {
        Ok(CategoryTotal {
            category: row.get(0)?,
            total: row.get(1)?,
        })
    })?;

    let mut totals = Vec::new();
    for row in rows {
        totals.push(row?);
    }
    Ok(totals)
}

/// Income and expense sums per calendar month, ascending. The trend view
/// needs at least two distinct months to draw anything; that judgement is
/// left to the caller.
#[instrument(skip(pool))]
pub async fn monthly_totals(pool: &DbPool) -> Result<Vec<MonthlyTotals>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT strftime('%Y-%m', date) AS month,
                SUM(CASE WHEN type = 'Income' THEN amount ELSE 0 END) AS income,
                SUM(CASE WHEN type = 'Expense' THEN amount ELSE 0 END) AS expense
         FROM transactions
         GROUP BY month
         ORDER BY month",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(MonthlyTotals {
            month: row.get(0)?,
            income: row.get(1)?,
            expense: row.get(2)?,
        })
    })?;

    let mut months = Vec::new();
    for row in rows {
        months.push(row?);
    }
    Ok(months)
}
