//! Defines the endpoint for deleting a budget.

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
    database_id::BudgetId,
    store::watch::{ChangeRouter, Collection},
    user::UserId,
};

use super::core::delete_budget;

/// The state needed to delete a budget.
#[derive(Clone)]
pub struct DeleteBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// A route handler for deleting a budget.
///
/// Budgets cannot be edited, only deleted. Deletes are idempotent: deleting
/// an ID that does not exist responds the same as a successful delete. The
/// response body is empty so that HTMX removes the targeted card.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return StatusCode::OK.into_response();
        }
    };

    if let Err(error) = delete_budget(budget_id, user_id, &connection) {
        tracing::error!("Error deleting budget {budget_id}: {error}");
        return StatusCode::OK.into_response();
    }
    drop(connection);

    state.changes.notify(Collection::Budgets, user_id);

    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::Path, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        budget::core::{Budget, create_budget, get_budgets},
        db::initialize,
        store::watch::{ChangeRouter, Collection},
        user::UserId,
    };

    use super::{DeleteBudgetState, delete_budget_endpoint};

    const TEST_USER: UserId = UserId::new(1);

    fn get_test_state() -> DeleteBudgetState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        DeleteBudgetState {
            db_connection: Arc::new(Mutex::new(conn)),
            changes: ChangeRouter::new(),
        }
    }

    #[tokio::test]
    async fn deletes_budget_and_notifies() {
        let state = get_test_state();
        let budget = {
            let connection = state.db_connection.lock().unwrap();
            create_budget(Budget::build(TEST_USER, "Food", 500.0), &connection).unwrap()
        };
        let mut receiver = state.changes.subscribe();

        let response =
            delete_budget_endpoint(State(state.clone()), Extension(TEST_USER), Path(budget.id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_budgets(TEST_USER, &connection).unwrap().is_empty());

        let event = receiver.try_recv().expect("expected a change event");
        assert_eq!(event.collection, Collection::Budgets);
    }

    #[tokio::test]
    async fn deleting_missing_budget_responds_ok() {
        let state = get_test_state();

        let response = delete_budget_endpoint(State(state), Extension(TEST_USER), Path(42)).await;

        assert_eq!(response.status(), StatusCode::OK);
    }
}
