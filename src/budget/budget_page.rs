//! Defines the route handler for the page that displays and manages budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState,
    aggregation::{calendar_year_range, category_spend},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles,
        format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::core::{Transaction, get_transactions_in_range},
    user::{UserId, get_user_by_id},
};

use super::{core::{Budget, get_budgets}, create_endpoint::create_budget_form};

/// The state needed to display the budget page.
#[derive(Clone)]
pub struct BudgetPageState {
    /// The database connection for reading budgets and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with the user's budgets and how much of each has been
/// spent this calendar year.
///
/// The budget list refreshes itself whenever the user's budgets or
/// transactions change. Store failures are logged and the page renders with
/// whatever data could be fetched.
pub async fn get_budget_page(
    State(state): State<BudgetPageState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);
    let year_range = calendar_year_range(OffsetDateTime::now_utc().to_offset(local_offset));

    let (budgets, transactions, user_email) = match state.db_connection.lock() {
        Ok(connection) => {
            let budgets = get_budgets(user_id, &connection).unwrap_or_else(|error| {
                tracing::error!("Error fetching budgets: {error}");
                Vec::new()
            });
            let transactions = get_transactions_in_range(user_id, year_range, &connection)
                .unwrap_or_else(|error| {
                    tracing::error!("Error fetching transactions for budget: {error}");
                    Vec::new()
                });
            let user_email = get_user_by_id(user_id, &connection)
                .map(|user| user.email.to_string())
                .ok();

            (budgets, transactions, user_email)
        }
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            (Vec::new(), Vec::new(), None)
        }
    };

    let mut nav_bar = NavBar::new(endpoints::BUDGET_VIEW);
    if let Some(email) = user_email.as_deref() {
        nav_bar = nav_bar.with_user_email(email);
    }

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-8 text-center" { "Budget" }

            (create_budget_form())

            div
                id="budget-content"
                class="w-full max-w-5xl"
                hx-get=(endpoints::BUDGET_VIEW)
                hx-select="#budget-content"
                hx-swap="outerHTML"
                hx-trigger="store-changed from:body"
            {
                (budget_cards(&budgets, &transactions))
            }
        }
    };

    base("Budget", &[dollar_input_styles()], &content).into_response()
}

/// Render the grid of budget cards.
pub(crate) fn budget_cards(budgets: &[Budget], transactions: &[Transaction]) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8"
        {
            @for budget in budgets {
                (budget_card(budget, category_spend(transactions, &budget.name)))
            }
        }
    }
}

fn budget_card(budget: &Budget, spent: f64) -> Markup {
    let over_budget = spent > budget.budgeted;
    let badge = if over_budget {
        ("Over Budget", "px-2 py-1 rounded-full text-sm bg-red-200 text-red-800")
    } else {
        ("Under Budget", "px-2 py-1 rounded-full text-sm bg-green-200 text-green-800")
    };
    let bar_color = if over_budget { "bg-red-500" } else { "bg-green-500" };
    let percent = if budget.budgeted > 0.0 {
        ((spent / budget.budgeted) * 100.0).min(100.0)
    } else {
        0.0
    };

    html! {
        div class={ "budget-card " (CARD_STYLE) }
        {
            div class="flex justify-between items-center mb-4"
            {
                h2 class="text-xl font-semibold" { (budget.name) }
                span class=(badge.1) { (badge.0) }
            }

            div class="mb-4"
            {
                div class="flex justify-between mb-1"
                {
                    span { "Spent" }
                    span { (format_currency(spent)) }
                }
                div class="flex justify-between"
                {
                    span { "Budgeted" }
                    span { (format_currency(budget.budgeted)) }
                }
            }

            div class="w-full bg-gray-200 rounded-full h-4"
            {
                div
                    class={ "h-4 rounded-full " (bar_color) }
                    style={ "width: " (format!("{percent:.0}")) "%" }
                {}
            }

            button
                hx-delete=(endpoints::format_endpoint(endpoints::BUDGET, budget.id))
                hx-target="closest .budget-card"
                hx-swap="outerHTML"
                class={ "mt-4 " (BUTTON_DELETE_STYLE) }
            {
                "Delete"
            }
        }
    }
}
