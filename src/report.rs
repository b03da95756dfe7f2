//! Plain-text report export.
//!
//! Writes the transactions of a date range as a paginated text document
//! with a fixed file name, one line per row. The charting and document
//! collaborators consume the same rows through the ledger queries; this
//! module only owns the text rendering.

use crate::db::{self, DbPool};
use crate::errors::Result;
use crate::models::{DateRange, Transaction};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Fixed output file name, written into the directory the caller picks
/// (the desktop app passes its working directory).
pub const REPORT_FILE_NAME: &str = "report.txt";

/// Rows per page of the exported document.
pub const ROWS_PER_PAGE: usize = 40;

fn format_row(t: &Transaction) -> String {
    format!(
        "{}  {:>12.2}  {:<14}  {:<8}  {}",
        t.date,
        t.amount,
        t.category,
        t.kind,
        t.description.as_deref().unwrap_or("")
    )
}

fn render_report(transactions: &[Transaction], range: &DateRange) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Personal Finance Report");
    let _ = writeln!(out, "{} to {}", range.start_bound(), range.end_bound());

    for (page_index, page) in transactions.chunks(ROWS_PER_PAGE).enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Page {}", page_index + 1);
        let _ = writeln!(out, "{}", "-".repeat(72));
        for transaction in page {
            let _ = writeln!(out, "{}", format_row(transaction));
        }
    }
    out
}

/// Exports the transactions of the range, oldest first, to
/// [`REPORT_FILE_NAME`] inside `out_dir`.
///
/// Returns the written path, or `None` when the range holds no
/// transactions (nothing is written in that case).
#[instrument(skip(pool))]
pub async fn export_text_report(
    pool: &DbPool,
    range: &DateRange,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let mut transactions = db::query_transactions(pool, range).await?;
    // The store returns newest-first; the document reads oldest-first.
    transactions.reverse();

    if transactions.is_empty() {
        info!(
            "No transactions to export for {}..{}",
            range.start_bound(),
            range.end_bound()
        );
        return Ok(None);
    }

    let path = out_dir.join(REPORT_FILE_NAME);
    fs::write(&path, render_report(&transactions, range))?;
    info!(
        "Exported {} transactions to {}",
        transactions.len(),
        path.display()
    );
    Ok(Some(path))
}
