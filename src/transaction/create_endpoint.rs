//! Defines the endpoint for creating a new transaction.

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
    html::BUTTON_PRIMARY_STYLE,
    store::watch::{ChangeRouter, Collection},
    user::UserId,
};

use super::{
    core::{Transaction, TransactionKind, create_transaction},
    form::{TransactionFormValues, transaction_form_fields},
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// The raw form data for creating a transaction.
///
/// Every field is optional at the wire level: presence is validated by the
/// handler, and a submit with missing fields is silently ignored.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    pub description: Option<String>,
    /// The value of the transaction in dollars.
    pub amount: Option<f64>,
    /// The category label for the transaction.
    pub category: Option<String>,
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
}

/// The create-transaction form shown on the transactions page.
pub fn create_transaction_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-disabled-elt="#submit-button"
            class="max-w-md mx-auto mb-8 space-y-4"
        {
            (transaction_form_fields(&TransactionFormValues::default()))

            button
                type="submit" id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Add Transaction"
            }
        }
    }
}

/// A route handler for creating a new transaction.
///
/// A submit with a missing required field, or a non-positive amount, is a
/// silent no-op: the handler responds 200 with no redirect and no message.
/// Store failures are logged and likewise swallowed. On success the client
/// is redirected to the transactions view, which renders a cleared form.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let (description, amount, category, kind) = match (
        form.description.as_deref().map(str::trim),
        form.amount,
        form.category.as_deref().map(str::trim),
        form.kind,
    ) {
        (Some(description), Some(amount), Some(category), Some(kind))
            if !description.is_empty() && !category.is_empty() && amount > 0.0 =>
        {
            (description, amount, category, kind)
        }
        _ => return StatusCode::OK.into_response(),
    };

    let builder =
        Transaction::build(user_id, amount, kind, category).description(description);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::OK.into_response();
        }
    };

    if let Err(error) = create_transaction(builder, &connection) {
        tracing::error!("Error adding transaction: {error}");
        return StatusCode::OK.into_response();
    }
    drop(connection);

    state.changes.notify(Collection::Transactions, user_id);

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
