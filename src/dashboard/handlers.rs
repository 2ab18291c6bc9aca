//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState,
    aggregation::{calendar_year_range, period_totals},
    budget::core::get_budgets,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::core::{get_recent_transactions, get_transactions_in_range},
    user::{UserId, get_user_by_id},
};

use super::cards::{budget_overview_panel, recent_transactions_panel, totals_cards};

/// The number of transactions shown in the recent transactions panel.
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's data: income, expense and
/// savings totals for the current calendar year, the most recent
/// transactions, and spend against each budget.
///
/// The overview refreshes itself whenever the user's transactions or
/// budgets change. Store failures are logged and the page renders with
/// whatever data could be fetched.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);
    let year_range = calendar_year_range(OffsetDateTime::now_utc().to_offset(local_offset));

    let (recent_transactions, year_transactions, budgets, user_email) =
        match state.db_connection.lock() {
            Ok(connection) => {
                let recent =
                    get_recent_transactions(user_id, RECENT_TRANSACTION_COUNT, &connection)
                        .unwrap_or_else(|error| {
                            tracing::error!("Error fetching recent transactions: {error}");
                            Vec::new()
                        });
                let year = get_transactions_in_range(user_id, year_range, &connection)
                    .unwrap_or_else(|error| {
                        tracing::error!("Error fetching transactions for dashboard: {error}");
                        Vec::new()
                    });
                let budgets = get_budgets(user_id, &connection).unwrap_or_else(|error| {
                    tracing::error!("Error fetching budgets for dashboard: {error}");
                    Vec::new()
                });
                let user_email = get_user_by_id(user_id, &connection)
                    .map(|user| user.email.to_string())
                    .ok();

                (recent, year, budgets, user_email)
            }
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                (Vec::new(), Vec::new(), Vec::new(), None)
            }
        };

    let totals = period_totals(&year_transactions);

    let mut nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);
    if let Some(email) = user_email.as_deref() {
        nav_bar = nav_bar.with_user_email(email);
    }

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-8 text-center" { "Dashboard" }

            div
                id="dashboard-content"
                class="w-full flex flex-col items-center"
                hx-get=(endpoints::DASHBOARD_VIEW)
                hx-select="#dashboard-content"
                hx-swap="outerHTML"
                hx-trigger="store-changed from:body"
            {
                (totals_cards(&totals))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-8 w-full max-w-5xl"
                {
                    (recent_transactions_panel(&recent_transactions))
                    (budget_overview_panel(&budgets, &year_transactions))
                }
            }
        }
    };

    base("Dashboard", &[], &content).into_response()
}
