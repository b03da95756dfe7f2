use crate::errors::Error;
use crate::validate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower bound used when a date-range filter has no start date.
pub const MIN_QUERY_DATE: &str = "1900-01-01";
/// Upper bound used when a date-range filter has no end date.
pub const MAX_QUERY_DATE: &str = "9999-12-31";

/// Direction of a ledger entry. The desktop forms only offer `Income` and
/// `Expense`; `Savings` remains a recognized value for rows created by
/// earlier versions of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    Expense,
    Savings,
}

impl TransactionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Savings => "Savings",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(TransactionKind::Income),
            "Expense" => Ok(TransactionKind::Expense),
            "Savings" => Ok(TransactionKind::Savings),
            other => Err(Error::Validation(format!(
                "'{other}' is not a recognized transaction type (expected Income, Expense or Savings)"
            ))),
        }
    }
}

/// A single ledger row. Rows are created and deleted whole, never partially
/// updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub kind: TransactionKind,
    pub description: Option<String>,
}

/// Textual payment state of a reminder. The `paid` flag on [`Reminder`] is a
/// redundant mirror of this value and the two are kept in sync at every
/// write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    Pending,
    Paid,
}

impl ReminderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReminderStatus::Pending => "Pending",
            ReminderStatus::Paid => "Paid",
        }
    }

    pub const fn is_paid(self) -> bool {
        matches!(self, ReminderStatus::Paid)
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ReminderStatus::Pending),
            "Paid" => Ok(ReminderStatus::Paid),
            other => Err(Error::Validation(format!(
                "'{other}' is not a recognized reminder status (expected Pending or Paid)"
            ))),
        }
    }
}

/// A recurring bill reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub due_date: NaiveDate,
    pub status: ReminderStatus,
    pub paid: bool,
}

impl Reminder {
    /// A reminder is overdue once its due date has passed without payment.
    /// A paid reminder is never overdue, regardless of date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.paid && self.due_date <= today
    }
}

/// A savings goal. `amount` is the *remaining* target and shrinks as
/// payments are applied; `progress` is the stored percent-complete,
/// recomputed on every payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub target_date: NaiveDate,
    pub progress: f64,
}

/// Per-category sum produced by the ledger aggregations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Income and expense sums for one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// One row of the budget-vs-actual report. `progress` is already formatted
/// for display: a one-decimal percentage, or `"N/A"` when the budgeted
/// amount is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReportRow {
    pub category: String,
    pub budget: f64,
    pub actual: f64,
    pub difference: f64,
    pub progress: String,
}

/// Inclusive date-range filter. A missing bound falls back to
/// [`MIN_QUERY_DATE`] / [`MAX_QUERY_DATE`], making the unfiltered range
/// effectively unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses optional form inputs into a range. Blank strings count as
    /// missing bounds, matching how an empty date picker reads back.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> crate::errors::Result<Self> {
        Ok(DateRange {
            start: Self::parse_bound("start date", start)?,
            end: Self::parse_bound("end date", end)?,
        })
    }

    fn parse_bound(
        field: &str,
        raw: Option<&str>,
    ) -> crate::errors::Result<Option<NaiveDate>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => validate::parse_date(field, value).map(Some),
        }
    }

    pub(crate) fn start_bound(&self) -> String {
        self.start
            .map_or_else(|| MIN_QUERY_DATE.to_string(), |d| d.to_string())
    }

    pub(crate) fn end_bound(&self) -> String {
        self.end
            .map_or_else(|| MAX_QUERY_DATE.to_string(), |d| d.to_string())
    }
}
