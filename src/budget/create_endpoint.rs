//! Defines the endpoint for creating a new budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// axum_extra's Form maps an empty field to None where axum's rejects it.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    store::watch::{ChangeRouter, Collection},
    user::UserId,
};

use super::core::{Budget, create_budget};

/// The state needed to create a budget.
#[derive(Clone)]
pub struct CreateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// The raw form data for creating a budget.
///
/// Every field is optional at the wire level: presence is validated by the
/// handler, and a submit with missing fields is silently ignored.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    /// The budget name, which doubles as the category key.
    pub name: Option<String>,
    /// The budgeted spending limit in dollars.
    pub budgeted: Option<f64>,
}

/// The create-budget form shown on the budget page.
pub fn create_budget_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGETS_API)
            hx-disabled-elt="#submit-button"
            class="max-w-md mx-auto mb-8 space-y-4"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Budget Name"
                }

                input
                    name="name"
                    id="name"
                    type="text"
                    placeholder="e.g., Food"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="budgeted"
                    class=(FORM_LABEL_STYLE)
                {
                    "Budgeted Amount"
                }

                div class="input-wrapper w-full"
                {
                    input
                        name="budgeted"
                        id="budgeted"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="e.g., 500.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button
                type="submit" id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Add Budget"
            }
        }
    }
}

/// A route handler for creating a new budget.
///
/// A submit with a missing field, or a non-positive limit, is a silent
/// no-op. Store failures are logged and swallowed. On success the client is
/// redirected to the budget view, which renders a cleared form.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let (name, budgeted) = match (form.name.as_deref().map(str::trim), form.budgeted) {
        (Some(name), Some(budgeted)) if !name.is_empty() && budgeted > 0.0 => (name, budgeted),
        _ => return StatusCode::OK.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::OK.into_response();
        }
    };

    if let Err(error) = create_budget(Budget::build(user_id, name, budgeted), &connection) {
        tracing::error!("Error adding budget: {error}");
        return StatusCode::OK.into_response();
    }
    drop(connection);

    state.changes.notify(Collection::Budgets, user_id);

    (
        HxRedirect(endpoints::BUDGET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
