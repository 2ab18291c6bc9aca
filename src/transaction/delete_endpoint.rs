//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState,
    database_id::TransactionId,
    store::watch::{ChangeRouter, Collection},
    user::UserId,
};

use super::core::delete_transaction;

/// The state needed to delete a transaction.
#[derive(Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// Deletes are idempotent: deleting an ID that does not exist responds the
/// same as a successful delete. The response body is empty so that HTMX
/// removes the targeted table row.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::OK.into_response();
        }
    };

    if let Err(error) = delete_transaction(transaction_id, user_id, &connection) {
        tracing::error!("Error deleting transaction {transaction_id}: {error}");
        return StatusCode::OK.into_response();
    }
    drop(connection);

    state.changes.notify(Collection::Transactions, user_id);

    // The status code has to be 200 OK or HTMX will not delete the table row.
    StatusCode::OK.into_response()
}
