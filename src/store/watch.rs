//! Change notification and live queries over the record store.
//!
//! SQLite has no push mechanism of its own, so the gateway broadcasts a
//! [ChangeEvent] after every successful mutation. A [LiveQuery] listens for
//! events matching its collection and owner, and requeries the full current
//! result set on each one. Consumers always receive complete snapshots,
//! never diffs.
//!
//! Dropping a [LiveQuery] drops its broadcast receiver, which releases the
//! subscription. There is no explicit cancel to forget.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{Error, user::UserId};

/// The record collections that can be watched for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// The transactions collection.
    Transactions,
    /// The budgets collection.
    Budgets,
}

impl Collection {
    /// The collection name used for server-sent event names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Transactions => "transactions",
            Collection::Budgets => "budgets",
        }
    }
}

/// A notification that some record in a collection changed.
///
/// The event intentionally carries no record data: watchers requery so that
/// every delivery is a full, current snapshot scoped to the right owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The collection that changed.
    pub collection: Collection,
    /// The user whose records changed.
    pub user_id: UserId,
}

/// The number of change events a slow watcher may fall behind before it is
/// considered lagged. Lagged watchers requery, so no change is ever lost.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Broadcasts record changes to live queries.
///
/// Cloning is cheap; all clones share one channel.
#[derive(Debug, Clone)]
pub struct ChangeRouter {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeRouter {
    /// Create a new change router with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Notify subscribers that a record owned by `user_id` changed in
    /// `collection`.
    ///
    /// Having no subscribers is not an error: mutations proceed the same
    /// whether or not anyone is watching.
    pub fn notify(&self, collection: Collection, user_id: UserId) {
        let _ = self.sender.send(ChangeEvent {
            collection,
            user_id,
        });
    }

    /// Subscribe to the raw change event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Open a live query over `collection` for the records owned by
    /// `user_id`.
    ///
    /// `query` runs once per matching change event and must return the full
    /// current result set.
    pub fn live_query<T>(
        &self,
        collection: Collection,
        user_id: UserId,
        db_connection: Arc<Mutex<Connection>>,
        query: fn(UserId, &Connection) -> Result<Vec<T>, Error>,
    ) -> LiveQuery<T> {
        LiveQuery {
            collection,
            user_id,
            db_connection,
            query,
            receiver: self.subscribe(),
        }
    }
}

impl Default for ChangeRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// A push subscription that yields the full matching result set on every
/// change to its collection.
///
/// Dropping the live query releases the subscription.
pub struct LiveQuery<T> {
    collection: Collection,
    user_id: UserId,
    db_connection: Arc<Mutex<Connection>>,
    query: fn(UserId, &Connection) -> Result<Vec<T>, Error>,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl<T> LiveQuery<T> {
    /// Run the query now and return the current result set.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the connection lock is poisoned,
    /// or any error the underlying query returns. A query error does not end
    /// the subscription.
    pub fn current(&self) -> Result<Vec<T>, Error> {
        let connection = self
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        (self.query)(self.user_id, &connection)
    }

    /// Wait for the next change to this query's collection and owner, then
    /// return the full current result set.
    ///
    /// A lagged receiver conservatively requeries rather than skipping, so a
    /// slow consumer sees a fresh snapshot instead of an error.
    ///
    /// Returns `None` if the change router has been dropped.
    pub async fn next_snapshot(&mut self) -> Option<Result<Vec<T>, Error>> {
        loop {
            match self.receiver.recv().await {
                Ok(event)
                    if event.collection == self.collection && event.user_id == self.user_id =>
                {
                    return Some(self.current());
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        "live query lagged by {skipped} change events, requerying snapshot"
                    );
                    return Some(self.current());
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Turn the live query into a stream of snapshots, one per matching
    /// change. Dropping the stream releases the subscription.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>, Error>> {
        let LiveQuery {
            collection,
            user_id,
            db_connection,
            query,
            receiver,
        } = self;

        BroadcastStream::new(receiver)
            .filter_map(move |event| match event {
                Ok(event) if event.collection == collection && event.user_id == user_id => {
                    Some(())
                }
                Ok(_) => None,
                Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        "live query lagged by {skipped} change events, requerying snapshot"
                    );
                    Some(())
                }
            })
            .map(move |_| {
                let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;
                (query)(user_id, &connection)
            })
    }
}
