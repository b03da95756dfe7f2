//! Budget engine: monthly per-category plan amounts and the
//! budget-vs-actual report.

use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::BudgetReportRow;
use crate::validate;
use chrono::Local;
use rusqlite::params;
use tracing::{info, instrument, warn};

fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}

/// Sets the planned amount for a `(month, category)` pair. A second call
/// with the same pair replaces the prior amount; exactly one row remains.
#[instrument(skip(pool))]
pub async fn set_budget(pool: &DbPool, month: &str, category: &str, amount: &str) -> Result<()> {
    let month = validate::parse_month(month)?;
    let category = validate::require_field("category", category)?;
    let amount = validate::parse_unsigned_amount(amount)?;

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    conn.execute(
        "INSERT INTO budgets (month, category, amount) VALUES (?1, ?2, ?3)
         ON CONFLICT(month, category) DO UPDATE SET amount = excluded.amount",
        params![month, category, amount],
    )?;
    info!("Set budget for {}/{}: {:.2}", month, category, amount);
    Ok(())
}

/// Removes every budget row for the month. Clearing a month that has no
/// budgets is not an error.
#[instrument(skip(pool))]
pub async fn clear_budgets(pool: &DbPool, month: &str) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let removed = conn.execute("DELETE FROM budgets WHERE month = ?1", params![month.trim()])?;
    info!("Cleared {} budget rows for {}", removed, month);
    Ok(())
}

/// Budget-vs-actual rows for one month.
///
/// Every budgeted category appears even with zero spend: the actual comes
/// from a left-outer join against that month's Expense transactions.
/// An unparseable month silently falls back to the current month, logged at
/// warn level.
#[instrument(skip(pool))]
pub async fn budget_report(pool: &DbPool, month: &str) -> Result<Vec<BudgetReportRow>> {
    let month = match validate::parse_month(month) {
        Ok(month) => month,
        Err(e) => {
            warn!(
                "Invalid month '{}' for budget report ({}); defaulting to current month",
                month, e
            );
            current_month()
        }
    };

    let conn = pool
        .lock()
        .map_err(|_| Error::Storage("Failed to acquire DB lock".to_string()))?;
    let mut stmt = conn.prepare_cached(
        "SELECT b.category, b.amount, COALESCE(t.total, 0) AS actual
         FROM budgets b
         LEFT JOIN (
             SELECT category, SUM(amount) AS total
             FROM transactions
             WHERE strftime('%Y-%m', date) = ?1 AND type = 'Expense'
             GROUP BY category
         ) t ON b.category = t.category
         WHERE b.month = ?2
         ORDER BY b.category",
    )?;
    let rows = stmt.query_map(params![month, month], |row| {
        let category: String = row.get(0)?;
        let budget: f64 = row.get(1)?;
        let actual: f64 = row.get(2)?;
        Ok((category, budget, actual))
    })?;

    let mut report = Vec::new();
    for row in rows {
        let (category, budget, actual) = row?;
        let progress = if budget > 0.0 {
            format!("{:.1}%", actual / budget * 100.0)
        } else {
            "N/A".to_string()
        };
        report.push(BudgetReportRow {
            category,
            budget,
            actual,
            difference: budget - actual,
            progress,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{SeedTransaction, init_test_tracing, seed_transaction, setup_test_db};

    fn budget_row_count(pool: &DbPool, month: &str, category: &str) -> i64 {
        let conn = pool.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM budgets WHERE month = ?1 AND category = ?2",
            params![month, category],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn set_twice_keeps_one_row_with_latest_amount() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        set_budget(&pool, "2026-05", "Food", "100").await?;
        set_budget(&pool, "2026-05", "Food", "250.50").await?;

        assert_eq!(budget_row_count(&pool, "2026-05", "Food"), 1);
        let report = budget_report(&pool, "2026-05").await?;
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].budget, 250.5);
        Ok(())
    }

    #[tokio::test]
    async fn set_validates_inputs() -> Result<()> {
        let pool = setup_test_db().await?;

        assert!(set_budget(&pool, "May 2026", "Food", "100").await.unwrap_err().is_validation());
        assert!(set_budget(&pool, "2026-05", "  ", "100").await.unwrap_err().is_validation());
        assert!(set_budget(&pool, "2026-05", "Food", "-5").await.unwrap_err().is_validation());
        assert!(set_budget(&pool, "2026-05", "Food", "1.234").await.unwrap_err().is_validation());
        Ok(())
    }

    #[tokio::test]
    async fn report_computes_difference_and_progress() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        set_budget(&pool, "2026-05", "Food", "100").await?;
        {
            let conn = pool.lock().unwrap();
            seed_transaction(
                &conn,
                &SeedTransaction {
                    date: "2026-05-02",
                    amount: 25.0,
                    category: "Food",
                    kind: "Expense",
                    description: None,
                },
            )?;
            seed_transaction(
                &conn,
                &SeedTransaction {
                    date: "2026-05-20",
                    amount: 15.0,
                    category: "Food",
                    kind: "Expense",
                    description: None,
                },
            )?;
            // Other month and other kind must not count toward the actual.
            seed_transaction(
                &conn,
                &SeedTransaction {
                    date: "2026-04-20",
                    amount: 99.0,
                    category: "Food",
                    kind: "Expense",
                    description: None,
                },
            )?;
            seed_transaction(
                &conn,
                &SeedTransaction {
                    date: "2026-05-05",
                    amount: 40.0,
                    category: "Food",
                    kind: "Income",
                    description: None,
                },
            )?;
        }

        let report = budget_report(&pool, "2026-05").await?;
        assert_eq!(report.len(), 1);
        let row = &report[0];
        assert_eq!(row.category, "Food");
        assert_eq!(row.budget, 100.0);
        assert_eq!(row.actual, 40.0);
        assert_eq!(row.difference, 60.0);
        assert_eq!(row.progress, "40.0%");
        Ok(())
    }

    #[tokio::test]
    async fn budgeted_category_without_spend_still_appears() -> Result<()> {
        let pool = setup_test_db().await?;

        set_budget(&pool, "2026-05", "Transport", "80").await?;
        let report = budget_report(&pool, "2026-05").await?;
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].actual, 0.0);
        assert_eq!(report[0].difference, 80.0);
        assert_eq!(report[0].progress, "0.0%");
        Ok(())
    }

    #[tokio::test]
    async fn zero_budget_reports_na_progress() -> Result<()> {
        let pool = setup_test_db().await?;

        set_budget(&pool, "2026-05", "Food", "0").await?;
        {
            let conn = pool.lock().unwrap();
            seed_transaction(
                &conn,
                &SeedTransaction {
                    date: "2026-05-02",
                    amount: 25.0,
                    category: "Food",
                    kind: "Expense",
                    description: None,
                },
            )?;
        }

        let report = budget_report(&pool, "2026-05").await?;
        assert_eq!(report[0].progress, "N/A");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_month_falls_back_to_current_month() -> Result<()> {
        init_test_tracing();
        let pool = setup_test_db().await?;

        let this_month = current_month();
        set_budget(&pool, &this_month, "Food", "100").await?;

        let report = budget_report(&pool, "not-a-month").await?;
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].category, "Food");
        Ok(())
    }

    #[tokio::test]
    async fn clear_removes_only_that_month() -> Result<()> {
        let pool = setup_test_db().await?;

        set_budget(&pool, "2026-05", "Food", "100").await?;
        set_budget(&pool, "2026-06", "Food", "120").await?;

        clear_budgets(&pool, "2026-05").await?;
        assert_eq!(budget_row_count(&pool, "2026-05", "Food"), 0);
        assert_eq!(budget_row_count(&pool, "2026-06", "Food"), 1);

        // Clearing an empty month is fine.
        clear_budgets(&pool, "2026-05").await?;
        Ok(())
    }
}
