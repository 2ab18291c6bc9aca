//! Reports HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState,
    aggregation::monthly_series,
    endpoints,
    html::{CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::core::get_transactions,
    user::{UserId, get_user_by_id},
};

use super::charts::{chart_view, income_expenses_chart};

/// The state needed for displaying the reports page.
#[derive(Clone)]
pub struct ReportsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with a monthly income vs expenses bar chart over all of
/// the user's transactions.
///
/// The chart refreshes itself whenever the user's transactions change.
/// Store failures are logged and the page renders with an empty chart.
pub async fn get_reports_page(
    State(state): State<ReportsState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    let (transactions, user_email) = match state.db_connection.lock() {
        Ok(connection) => {
            let transactions = get_transactions(user_id, &connection).unwrap_or_else(|error| {
                tracing::error!("Error fetching transactions for reports: {error}");
                Vec::new()
            });
            let user_email = get_user_by_id(user_id, &connection)
                .map(|user| user.email.to_string())
                .ok();

            (transactions, user_email)
        }
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            (Vec::new(), None)
        }
    };

    let series = monthly_series(&transactions, local_offset);
    let chart = income_expenses_chart(&series);

    let mut nav_bar = NavBar::new(endpoints::REPORTS_VIEW);
    if let Some(email) = user_email.as_deref() {
        nav_bar = nav_bar.with_user_email(email);
    }

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-8 text-center" { "Financial Reports" }

            div
                id="reports-content"
                class={ "w-full max-w-5xl " (CARD_STYLE) }
                hx-get=(endpoints::REPORTS_VIEW)
                hx-select="#reports-content"
                hx-swap="outerHTML"
                hx-trigger="store-changed from:body"
            {
                h2 class="text-xl font-semibold mb-4" { "Income vs. Expenses" }

                (chart_view(&chart))
            }
        }
    };

    base(
        "Reports",
        &[HeadElement::ScriptLink("/static/echarts-5.5.0.min.js".to_owned())],
        &content,
    )
    .into_response()
}

#[cfg(test)]
mod reports_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use rusqlite::params;
    use time::macros::datetime;

    use crate::{
        db::initialize,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::core::{Transaction, TransactionKind, create_transaction},
        user::UserId,
    };

    use super::{ReportsState, get_reports_page};

    const TEST_USER: UserId = UserId::new(1);

    fn get_test_state() -> ReportsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ReportsState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn renders_chart_with_monthly_buckets() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(TEST_USER, 100.0, TransactionKind::Income, "Salary")
                    .created_at(datetime!(2025-01-10 12:00 UTC)),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(TEST_USER, 40.0, TransactionKind::Expense, "Food")
                    .created_at(datetime!(2025-02-14 12:00 UTC)),
                &connection,
            )
            .unwrap();
        }

        let response = get_reports_page(State(state), Extension(TEST_USER)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let html = document.html();
        assert!(html.contains("Jan 2025"));
        assert!(html.contains("Feb 2025"));
        assert!(html.contains("income-expenses-chart"));
    }

    #[tokio::test]
    async fn renders_empty_chart_without_transactions() {
        let state = get_test_state();

        let response = get_reports_page(State(state), Extension(TEST_USER)).await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn store_failure_renders_page_with_empty_chart() {
        let state = get_test_state();
        {
            // Simulate a backend failure by dropping the table out from
            // under the query.
            let connection = state.db_connection.lock().unwrap();
            connection
                .execute("DROP TABLE transactions", params![])
                .unwrap();
        }

        let response = get_reports_page(State(state), Extension(TEST_USER)).await;

        assert_eq!(response.status(), StatusCode::OK, "failures are swallowed");
    }
}
