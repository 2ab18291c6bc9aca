//! Reports module
//!
//! Provides a page charting monthly income against expenses.

mod charts;
mod handlers;

pub use handlers::get_reports_page;
