//! Dashboard snapshot assembly.
//!
//! The overview screen shows four independent sections. Each one is loaded
//! on its own: a section that fails to refresh is logged, reported in the
//! returned error list and rendered empty, while the others still load.

use crate::db::{self, DbPool};
use crate::errors::Error;
use crate::models::{CategoryTotal, MonthlyTotals, Reminder, Transaction, TransactionKind};
use chrono::NaiveDate;
use tracing::{instrument, warn};

/// Row cap for the recent-transactions section.
pub const RECENT_LIMIT: u32 = 5;
/// Row cap for the upcoming-reminders section.
pub const UPCOMING_LIMIT: u32 = 5;

/// Everything the overview screen renders in one pass. Sections that failed
/// to load are empty here and listed in the accompanying [`SectionError`]s.
#[derive(Debug, Default)]
pub struct DashboardSnapshot {
    pub recent: Vec<Transaction>,
    pub upcoming: Vec<Reminder>,
    /// Expense categories with a positive sum; zero and negative sums carry
    /// no meaning on the breakdown chart.
    pub expense_breakdown: Vec<CategoryTotal>,
    /// `None` until at least two distinct months of data exist; a
    /// single-month series cannot show a trend.
    pub monthly_trend: Option<Vec<MonthlyTotals>>,
}

/// A section that failed to refresh, with the error that stopped it.
#[derive(Debug)]
pub struct SectionError {
    pub section: &'static str,
    pub error: Error,
}

/// Loads all dashboard sections, isolating failures per section.
#[instrument(skip(pool))]
pub async fn load_dashboard(
    pool: &DbPool,
    today: NaiveDate,
) -> (DashboardSnapshot, Vec<SectionError>) {
    let mut snapshot = DashboardSnapshot::default();
    let mut failures = Vec::new();

    match db::recent_transactions(pool, RECENT_LIMIT).await {
        Ok(rows) => snapshot.recent = rows,
        Err(error) => {
            warn!("Failed to refresh recent transactions: {}", error);
            failures.push(SectionError {
                section: "recent_transactions",
                error,
            });
        }
    }

    match db::upcoming_or_unpaid(pool, today, UPCOMING_LIMIT).await {
        Ok(rows) => snapshot.upcoming = rows,
        Err(error) => {
            warn!("Failed to refresh upcoming reminders: {}", error);
            failures.push(SectionError {
                section: "upcoming_reminders",
                error,
            });
        }
    }

    match db::sum_by_category(pool, TransactionKind::Expense, None).await {
        Ok(rows) => {
            snapshot.expense_breakdown = rows.into_iter().filter(|c| c.total > 0.0).collect();
        }
        Err(error) => {
            warn!("Failed to refresh expense breakdown: {}", error);
            failures.push(SectionError {
                section: "expense_breakdown",
                error,
            });
        }
    }

    match db::monthly_totals(pool).await {
        Ok(rows) => {
            snapshot.monthly_trend = if rows.len() >= 2 { Some(rows) } else { None };
        }
        Err(error) => {
            warn!("Failed to refresh monthly trends: {}", error);
            failures.push(SectionError {
                section: "monthly_trend",
                error,
            });
        }
    }

    (snapshot, failures)
}
