//! Defines the endpoint that serves further pages of transaction table rows.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState,
    store::cursor::PageCursor,
    timezone::get_local_offset,
    user::UserId,
};

use super::{
    pagination::{PageConfig, fetch_transaction_page},
    transactions_page::transaction_rows_fragment,
};

/// The state needed to serve a page of transaction rows.
#[derive(Clone)]
pub struct TransactionRowsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The config that controls how transactions are paged.
    pub page_config: PageConfig,
}

impl FromRef<AppState> for TransactionRowsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            page_config: state.page_config.clone(),
        }
    }
}

/// Query parameters for the rows endpoint.
#[derive(Debug, Deserialize)]
pub struct RowsQuery {
    /// The continuation cursor from the previous page, if any.
    pub after: Option<String>,
}

/// A route handler serving the next page of transaction table rows.
///
/// The response replaces the load-more row: it contains the new rows
/// followed by a fresh load-more row when yet another page is expected, so
/// each fetch appends to the table. On any failure the handler responds
/// with an empty body, which leaves the rows already on screen intact; the
/// user can try again.
pub async fn get_transaction_rows(
    State(state): State<TransactionRowsState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<RowsQuery>,
) -> Response {
    let after = match query.after.as_deref().map(str::parse::<PageCursor>) {
        Some(Ok(cursor)) => Some(cursor),
        Some(Err(error)) => {
            tracing::error!("Error parsing page cursor: {error}");
            return ().into_response();
        }
        None => None,
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return ().into_response();
        }
    };

    let page = match fetch_transaction_page(user_id, state.page_config.page_size, after, &connection)
    {
        Ok(page) => page,
        Err(error) => {
            tracing::error!("Error fetching more transactions: {error}");
            return ().into_response();
        }
    };
    drop(connection);

    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    transaction_rows_fragment(&page, local_offset).into_response()
}
