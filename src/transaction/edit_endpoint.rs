//! The edit screen for a transaction and the endpoint that applies the edit.
//!
//! Transactions are not editable in the list view: all changes go through
//! this separate screen. The creation timestamp and owner are fixed; only
//! the amount, kind, category and description can change.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, link},
    navigation::NavBar,
    store::watch::{ChangeRouter, Collection},
    user::UserId,
};

use super::{
    core::{TransactionKind, TransactionUpdate, get_transaction, update_transaction},
    form::{TransactionFormValues, transaction_form_fields},
};

/// The state needed to show the edit screen and apply an edit.
#[derive(Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// Display the edit screen for one of the user's transactions.
///
/// Requesting a transaction that does not exist, or that belongs to another
/// user, renders the 404 page.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    drop(connection);

    let values = TransactionFormValues {
        kind: transaction.kind,
        amount: Some(transaction.amount),
        category: &transaction.category,
        description: transaction.description.as_deref().unwrap_or(""),
    };

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW);
    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-8" { "Edit Transaction" }

            form
                hx-put=(endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id))
                hx-disabled-elt="#submit-button"
                class="w-full max-w-md space-y-4"
            {
                (transaction_form_fields(&values))

                button
                    type="submit" id="submit-button"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    "Update Transaction"
                }

                p class="text-center"
                {
                    (link(endpoints::TRANSACTIONS_VIEW, "Cancel"))
                }
            }
        }
    };

    Ok(base("Edit Transaction", &[dollar_input_styles()], &content).into_response())
}

/// The raw form data for editing a transaction.
///
/// Every field is optional at the wire level: presence is validated by the
/// handler, and a submit with missing fields is silently ignored.
#[derive(Debug, Deserialize)]
pub struct EditTransactionForm {
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

/// A route handler for applying an edit to a transaction.
///
/// A submit with a missing required field, or a non-positive amount, is a
/// silent no-op. Store failures are logged and swallowed. On success the
/// client is redirected back to the transactions view.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<EditTransactionForm>,
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

    let update = TransactionUpdate {
        amount,
        kind,
        category: category.to_owned(),
        description: Some(description.to_owned()),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::OK.into_response();
        }
    };

    if let Err(error) = update_transaction(transaction_id, user_id, update, &connection) {
        tracing::error!("Error updating transaction {transaction_id}: {error}");
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
