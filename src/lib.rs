//! Fintrack - the data core of a desktop personal-finance dashboard
//!
//! This crate owns everything below the widgets: credential storage and
//! verification, the SQLite schema and its additive migrations, the
//! transaction ledger with its aggregations, monthly budgets with
//! budget-vs-actual reporting, savings goals with partial payments, bill
//! reminders with overdue detection, the dashboard snapshot assembler and
//! the plain-text report exporter. The presentation layer calls these store
//! operations on user action and renders the returned rows; no other entry
//! points exist.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,
    clippy::all,
    clippy::inefficient_to_string,
    clippy::needless_pass_by_value,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::float_cmp,
    clippy::todo,
    clippy::unimplemented,
    clippy::semicolon_if_nothing_returned,
    future_incompatible,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,       // Will add gradually
    clippy::missing_panics_doc,       // Will add gradually
)]

/// Configuration loading for database path and report output
pub mod config;
/// Dashboard snapshot assembly with per-section error isolation
pub mod dashboard;
/// SQLite stores: users, transactions, budgets, goals, reminders
pub mod db;
/// Unified error types and result handling
pub mod errors;
/// Row models and shared value types
pub mod models;
/// Plain-text paginated report export
pub mod report;
/// Form-input validation helpers
pub mod validate;

pub use db::{DbPool, init_db};
pub use errors::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Initializes tracing for a desktop launch. `RUST_LOG` overrides the
/// default `info` filter. Call once, before the first store operation.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
