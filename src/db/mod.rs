pub mod budgets;
pub mod connection;
pub mod goals;
pub(crate) mod migrations;
pub mod reminders;
pub(crate) mod schema;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod transactions;
pub mod users;

pub use budgets::{budget_report, clear_budgets, set_budget};
pub use connection::{DbPool, init_db};
pub use goals::{
    GoalUpdate, NewGoal, add_goal, apply_payment, average_progress, delete_goal, list_goals,
    update_goal,
};
pub use reminders::{
    NewReminder, add_reminder, delete_reminder, query_reminders, upcoming_or_unpaid,
};
pub use transactions::{
    NewTransaction, add_transaction, delete_transaction, monthly_totals, query_transactions,
    recent_transactions, sum_by_category, sum_by_category_in_range,
};
pub use users::{authenticate_user, register_user};
