//! Fintrack is a web app for recording income and expenses, setting
//! category budgets, and reviewing where the money went.
//!
//! The library serves HTML directly: handlers render maud templates, htmx
//! swaps fragments, and a server-sent event stream keeps open screens in
//! sync with the record store.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod app_state;
mod auth;
mod budget;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod events;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod navigation;
mod not_found;
mod password;
mod register_user;
mod reports;
mod routing;
mod store;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use transaction::pagination::PageConfig;
pub use user::{User, UserId, get_user_by_id};

use crate::{
    internal_server_error::render_internal_server_error, not_found::get_404_not_found_response,
};

/// Waits for ctrl+c or SIGTERM, whichever arrives first, then asks the
/// server behind `handle` to drain and stop.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("could not install the ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("could not install the SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("received ctrl+c, shutting down"),
        _ = terminate => tracing::debug!("received SIGTERM, shutting down"),
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// Everything that can go wrong across the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request carried no session token cookie.
    #[error("the cookie jar has no session token")]
    CookieMissing,

    /// The session token did not parse or has lapsed. The session is treated
    /// as anonymous and the client is sent to the log-in screen.
    #[error("the session token is invalid or has expired")]
    InvalidSessionToken,

    /// The password failed the strength check at registration. The payload
    /// is a human readable hint shown next to the field.
    #[error("password is too easy to guess: {0}")]
    TooWeak(String),

    /// The hashing library failed. The payload is for server logs only and
    /// must never reach the client.
    #[error("password hashing failed: {0}")]
    HashingError(String),

    /// A value could not be serialized as JSON.
    #[error("JSON serialization failed: {0}")]
    JsonSerializationError(String),

    /// The registration email already belongs to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// A page cursor string did not have the expected shape. Cursors are
    /// opaque to clients, so this usually means a truncated or hand-edited
    /// URL; callers fall back to the first page.
    #[error("could not parse page cursor \"{0}\"")]
    InvalidCursor(String),

    /// No record matched the requested ID for this user, or a query that
    /// expects a row returned none.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An SQL error nothing above accounts for.
    #[error("unexpected SQL error: {0}")]
    SqlError(rusqlite::Error),

    /// The shared connection mutex was poisoned.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The configured canonical timezone name is unknown.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Extended code 2067: a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("unhandled SQL error: {error}");
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::DatabaseLockError => render_internal_server_error(),
            // Everything else carries details the client should not see.
            error => {
                tracing::error!("unexpected error reached a response: {error}");
                (StatusCode::INTERNAL_SERVER_ERROR, "").into_response()
            }
        }
    }
}
