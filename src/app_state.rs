//! The shared state handed to every route handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    auth::DEFAULT_COOKIE_DURATION, db::initialize, store::watch::ChangeRouter,
    transaction::pagination::PageConfig,
};

/// The state of the application server.
#[derive(Clone)]
pub struct AppState {
    /// Signs and encrypts the private cookie jar.
    pub cookie_key: Key,

    /// How long a session lives without activity.
    pub cookie_duration: Duration,

    /// Canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how transactions are paged.
    pub page_config: PageConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Broadcasts record changes to live queries and event streams.
    pub changes: ChangeRouter,
}

impl AppState {
    /// Create the shared state around an open SQLite connection, creating
    /// the domain tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        page_config: PageConfig,
    ) -> Result<Self, rusqlite::Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            page_config,
            db_connection: connection,
            changes: ChangeRouter::new(),
        })
    }
}

// Lets `PrivateCookieJar` pull its key out of the app state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::transaction::pagination::PageConfig;

    use super::AppState;

    #[test]
    fn new_initializes_database() {
        let conn = Connection::open_in_memory().unwrap();

        let state = AppState::new(conn, "42", "Etc/UTC", PageConfig::default())
            .expect("Could not create app state");

        let connection = state.db_connection.lock().unwrap();
        let table_count: i64 = connection
            .query_row(
                "SELECT COUNT(name) FROM sqlite_master WHERE type = 'table' \
                 AND name IN ('user', 'transactions', 'budgets')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 3);
    }
}
