//! The application's route paths.
//!
//! Paths with a `{parameter}` segment are axum route templates; use
//! [format_endpoint] to turn one into a concrete URL.

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for displaying and creating a user's budgets.
pub const BUDGET_VIEW: &str = "/budget";
/// The page for displaying monthly income and expense reports.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to create users.
pub const USERS: &str = "/api/users";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to fetch the next page of transaction table rows.
pub const TRANSACTION_ROWS: &str = "/api/transactions/rows";
/// The route to create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to delete a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route for the server-sent event stream of record changes.
pub const EVENTS: &str = "/api/events";

/// Substitute `id` for the single `{parameter}` in `endpoint_path`.
///
/// Paths without a parameter are returned unchanged. Only the first
/// parameter is substituted; no endpoint in this module has more than one.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(open) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let close = endpoint_path[open..]
        .find('}')
        .map(|offset| open + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{id}{}",
        &endpoint_path[..open],
        &endpoint_path[close..]
    )
}
