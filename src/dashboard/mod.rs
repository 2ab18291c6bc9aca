//! Dashboard module
//!
//! Provides an overview page showing financial totals for the current year,
//! the most recent transactions, and spend against each budget.

mod cards;
mod handlers;

pub use handlers::get_dashboard_page;
