//! The server-sent event stream that pushes record changes to open screens.
//!
//! Each connected screen holds one stream for the lifetime of the page.
//! The stream opens a live query per collection scoped to the signed-in
//! user and emits the full current result set as JSON whenever one of them
//! changes, plus one snapshot per collection on connect. Closing the page
//! drops the stream, which releases the underlying subscriptions.

use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::sse::{Event, KeepAlive, Sse},
};
use rusqlite::Connection;
use serde::Serialize;
use tokio_stream::{Stream, StreamExt};

use crate::{
    AppState, Error,
    budget::core::get_budgets,
    store::watch::{ChangeRouter, Collection},
    transaction::core::get_transactions,
    user::UserId,
};

/// The state needed to serve the event stream.
#[derive(Clone)]
pub struct EventsState {
    /// The database connection for snapshot queries.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Broadcasts record changes to live queries.
    pub changes: ChangeRouter,
}

impl FromRef<AppState> for EventsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            changes: state.changes.clone(),
        }
    }
}

/// Serialize a snapshot into an SSE event named after its collection.
///
/// Query failures do not end the stream: they are logged and delivered as
/// an `error` event so the client can distinguish them from data.
fn snapshot_event<T: Serialize>(collection: Collection, snapshot: Result<Vec<T>, Error>) -> Event {
    match snapshot.and_then(|records| {
        serde_json::to_string(&records).map_err(|error| Error::JsonSerializationError(error.to_string()))
    }) {
        Ok(json) => Event::default().event(collection.as_str()).data(json),
        Err(error) => {
            tracing::error!("Error delivering {} snapshot: {error}", collection.as_str());
            Event::default().event("error").data(collection.as_str())
        }
    }
}

/// A route handler that streams record-change snapshots for the signed-in
/// user as server-sent events.
pub async fn get_event_stream(
    State(state): State<EventsState>,
    Extension(user_id): Extension<UserId>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let transactions_live = state.changes.live_query(
        Collection::Transactions,
        user_id,
        state.db_connection.clone(),
        get_transactions,
    );
    let budgets_live = state.changes.live_query(
        Collection::Budgets,
        user_id,
        state.db_connection.clone(),
        get_budgets,
    );

    // A subscription delivers the current result set immediately, then the
    // full set again after every change.
    let initial = tokio_stream::iter([
        Ok(snapshot_event(
            Collection::Transactions,
            transactions_live.current(),
        )),
        Ok(snapshot_event(Collection::Budgets, budgets_live.current())),
    ]);

    let transaction_events = transactions_live
        .into_stream()
        .map(|snapshot| Ok(snapshot_event(Collection::Transactions, snapshot)));
    let budget_events = budgets_live
        .into_stream()
        .map(|snapshot| Ok(snapshot_event(Collection::Budgets, snapshot)));

    let stream = initial.chain(transaction_events.merge(budget_events));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod event_stream_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        store::watch::ChangeRouter,
        transaction::core::{Transaction, TransactionKind, create_transaction},
        user::UserId,
    };

    use super::{EventsState, get_event_stream};

    const TEST_USER: UserId = UserId::new(1);

    fn get_test_state() -> EventsState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        EventsState {
            db_connection: Arc::new(Mutex::new(conn)),
            changes: ChangeRouter::new(),
        }
    }

    #[tokio::test]
    async fn stream_opens_with_initial_snapshots() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(TEST_USER, 40.0, TransactionKind::Expense, "Food")
                    .description("groceries"),
                &connection,
            )
            .unwrap();
        }

        let response = get_event_stream(State(state), Extension(TEST_USER))
            .await
            .into_response();

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let mut body = response.into_body();
        let first_frame = body
            .frame()
            .await
            .expect("expected an initial event")
            .expect("body error");
        let text = String::from_utf8_lossy(first_frame.data_ref().unwrap()).to_string();

        assert!(text.contains("event: transactions"));
        assert!(
            text.contains(r#""category":"Food""#),
            "snapshot must carry the wire-format records, got: {text}"
        );
    }
}
