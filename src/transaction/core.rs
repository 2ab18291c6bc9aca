//! Defines the core data model and database queries for transactions.

use std::{fmt::Display, ops::RangeInclusive, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId, user::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction took money out of or put money into the account.
///
/// The transaction amount is always a positive magnitude. The direction of
/// the money flow is carried by this kind, never by the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionKind {
    /// The kind as the lowercase string stored in the database and sent over
    /// the wire, e.g. "expense".
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(format!("unknown transaction kind \"{other}\"")),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The serialized field names (`userId`, `type`, `createdAt`, ...) are a wire
/// contract shared with previously stored data and must not change.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns this transaction.
    pub user_id: UserId,
    /// The amount of money spent or earned, always a positive magnitude.
    pub amount: f64,
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The free-text category label, matched against budget names.
    pub category: String,
    /// A text description of what the transaction was for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the transaction was recorded. Used as display date, sort key and
    /// filter key.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        amount: f64,
        kind: TransactionKind,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            amount,
            kind,
            category: category.to_owned(),
            description: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The creation timestamp defaults to now and the description to none.
/// Call [create_transaction] to insert the built transaction and receive
/// its store-assigned ID.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The ID of the user that will own the transaction.
    pub user_id: UserId,
    /// The monetary amount of the transaction as a positive magnitude.
    ///
    /// The direction of the money flow is carried by `kind`. Callers must
    /// validate that the amount is positive before building a transaction.
    pub amount: f64,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// The free-text category label.
    pub category: String,
    /// An optional description of the transaction.
    pub description: Option<String>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the creation timestamp for the transaction.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions (user_id, amount, kind, category, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, amount, kind, category, description, created_at",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.amount,
                builder.kind,
                &builder.category,
                &builder.description,
                timestamp_nanos(builder.created_at),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction owned by `user_id` from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, kind, category, description, created_at
             FROM transactions WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// The fields of a transaction that the edit screen may change.
///
/// The creation timestamp and owner are fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new amount as a positive magnitude.
    pub amount: f64,
    /// The new transaction kind.
    pub kind: TransactionKind,
    /// The new category label.
    pub category: String,
    /// The new description.
    pub description: Option<String>,
}

/// Update the editable fields of a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserId,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions
         SET amount = ?1, kind = ?2, category = ?3, description = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            update.amount,
            update.kind,
            &update.category,
            &update.description,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the transaction owned by `user_id` with the given `id`.
///
/// Deleting an ID that does not exist is not an error: from the caller's
/// perspective the outcome is the same as a successful delete.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Get all transactions owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(user_id: UserId, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, kind, category, description, created_at
             FROM transactions WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Get the `limit` most recent transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_recent_transactions(
    user_id: UserId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, kind, category, description, created_at
             FROM transactions WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC
             LIMIT :limit",
        )?
        .query_map(
            &[(":user_id", &user_id.as_i64()), (":limit", &(limit as i64))],
            map_transaction_row,
        )?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Get the transactions owned by `user_id` whose creation timestamp falls in
/// the inclusive `range`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_in_range(
    user_id: UserId,
    range: RangeInclusive<OffsetDateTime>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, kind, category, description, created_at
             FROM transactions
             WHERE user_id = :user_id AND created_at BETWEEN :start AND :end
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64()),
                (":start", &timestamp_nanos(*range.start())),
                (":end", &timestamp_nanos(*range.end())),
            ],
            map_transaction_row,
        )?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    // Composite index used by the page, range, and live snapshot queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_created
         ON transactions(user_id, created_at DESC, id DESC);",
        (),
    )?;

    Ok(())
}

/// The creation timestamp as the unix nanosecond integer stored in the
/// database. Integers keep range comparisons and cursor ordering exact.
pub(crate) fn timestamp_nanos(timestamp: OffsetDateTime) -> i64 {
    timestamp.unix_timestamp_nanos() as i64
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let amount = row.get(2)?;
    let kind = row.get(3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;
    let created_at_nanos: i64 = row.get(6)?;

    let created_at = OffsetDateTime::from_unix_timestamp_nanos(created_at_nanos as i128).map_err(
        |error| {
            rusqlite::Error::FromSqlConversionFailure(
                6,
                rusqlite::types::Type::Integer,
                Box::new(error),
            )
        },
    )?;

    Ok(Transaction {
        id,
        user_id: UserId::new(user_id),
        amount,
        kind,
        category,
        description,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{Error, db::initialize, user::UserId};

    use super::{
        Transaction, TransactionKind, TransactionUpdate, create_transaction, delete_transaction,
        get_recent_transactions, get_transaction, get_transactions, get_transactions_in_range,
        update_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    const TEST_USER: UserId = UserId::new(1);
    const OTHER_USER: UserId = UserId::new(2);

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            Transaction::build(TEST_USER, amount, TransactionKind::Expense, "Food")
                .description("groceries"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.kind, TransactionKind::Expense);
                assert_eq!(transaction.category, "Food");
                assert_eq!(transaction.description.as_deref(), Some("groceries"));
                assert_eq!(transaction.user_id, TEST_USER);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn get_scopes_by_owner() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(TEST_USER, 12.3, TransactionKind::Expense, "Food"),
            &conn,
        )
        .unwrap();

        let got = get_transaction(transaction.id, OTHER_USER, &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn update_changes_editable_fields() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(TEST_USER, 12.3, TransactionKind::Expense, "Food"),
            &conn,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            TEST_USER,
            TransactionUpdate {
                amount: 99.0,
                kind: TransactionKind::Income,
                category: "Salary".to_owned(),
                description: Some("pay day".to_owned()),
            },
            &conn,
        )
        .unwrap();

        let got = get_transaction(transaction.id, TEST_USER, &conn).unwrap();
        assert_eq!(got.amount, 99.0);
        assert_eq!(got.kind, TransactionKind::Income);
        assert_eq!(got.category, "Salary");
        assert_eq!(got.description.as_deref(), Some("pay day"));
        assert_eq!(got.created_at, transaction.created_at);
    }

    #[test]
    fn update_missing_transaction_returns_not_found() {
        let conn = get_test_connection();

        let result = update_transaction(
            42,
            TEST_USER,
            TransactionUpdate {
                amount: 1.0,
                kind: TransactionKind::Expense,
                category: "Food".to_owned(),
                description: None,
            },
            &conn,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_is_not_an_error() {
        let conn = get_test_connection();

        let result = delete_transaction(42, TEST_USER, &conn);

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn delete_does_not_remove_other_users_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(TEST_USER, 12.3, TransactionKind::Expense, "Food"),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, OTHER_USER, &conn).unwrap();

        assert!(get_transaction(transaction.id, TEST_USER, &conn).is_ok());
    }

    #[test]
    fn get_transactions_returns_newest_first() {
        let conn = get_test_connection();
        let start = datetime!(2025-06-01 12:00 UTC);

        for i in 0..5 {
            create_transaction(
                Transaction::build(TEST_USER, (i + 1) as f64, TransactionKind::Expense, "Food")
                    .created_at(start + Duration::days(i)),
                &conn,
            )
            .unwrap();
        }

        let got = get_transactions(TEST_USER, &conn).unwrap();

        assert_eq!(got.len(), 5);
        for window in got.windows(2) {
            assert!(
                window[0].created_at >= window[1].created_at,
                "expected transactions in descending creation order"
            );
        }
    }

    #[test]
    fn recent_transactions_returns_limit_newest() {
        let conn = get_test_connection();
        let start = datetime!(2025-06-01 12:00 UTC);

        for i in 0..8 {
            create_transaction(
                Transaction::build(TEST_USER, (i + 1) as f64, TransactionKind::Income, "Salary")
                    .created_at(start + Duration::days(i)),
                &conn,
            )
            .unwrap();
        }

        let got = get_recent_transactions(TEST_USER, 5, &conn).unwrap();

        assert_eq!(got.len(), 5);
        assert_eq!(got[0].amount, 8.0, "expected the newest transaction first");
    }

    #[test]
    fn range_query_is_inclusive_and_scoped() {
        let conn = get_test_connection();
        let in_range = datetime!(2025-03-15 12:00 UTC);
        let before = datetime!(2024-12-31 23:59 UTC);

        create_transaction(
            Transaction::build(TEST_USER, 10.0, TransactionKind::Expense, "Food")
                .created_at(in_range),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TEST_USER, 20.0, TransactionKind::Expense, "Food")
                .created_at(before),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(OTHER_USER, 30.0, TransactionKind::Expense, "Food")
                .created_at(in_range),
            &conn,
        )
        .unwrap();

        let range = datetime!(2025-01-01 00:00 UTC)..=datetime!(2025-12-31 23:59:59 UTC);
        let got = get_transactions_in_range(TEST_USER, range, &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].amount, 10.0);
    }

    #[test]
    fn get_transactions_is_scoped_by_user() {
        let conn = get_test_connection();
        let now = OffsetDateTime::now_utc();

        for _ in 0..3 {
            create_transaction(
                Transaction::build(TEST_USER, 1.0, TransactionKind::Expense, "Food")
                    .created_at(now),
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            Transaction::build(OTHER_USER, 1.0, TransactionKind::Expense, "Food").created_at(now),
            &conn,
        )
        .unwrap();

        assert_eq!(get_transactions(TEST_USER, &conn).unwrap().len(), 3);
    }
}

#[cfg(test)]
mod wire_contract_tests {
    use time::macros::datetime;

    use crate::user::UserId;

    use super::{Transaction, TransactionKind};

    #[test]
    fn serializes_with_wire_field_names() {
        let transaction = Transaction {
            id: 7,
            user_id: UserId::new(3),
            amount: 40.0,
            kind: TransactionKind::Expense,
            category: "Food".to_owned(),
            description: Some("groceries".to_owned()),
            created_at: datetime!(2025-01-15 09:30 UTC),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["userId"], 3);
        assert_eq!(json["amount"], 40.0);
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "Food");
        assert_eq!(json["description"], "groceries");
        assert_eq!(json["createdAt"], "2025-01-15T09:30:00Z");
    }

    #[test]
    fn omits_missing_description() {
        let transaction = Transaction {
            id: 1,
            user_id: UserId::new(1),
            amount: 100.0,
            kind: TransactionKind::Income,
            category: "Salary".to_owned(),
            description: None,
            created_at: datetime!(2025-01-15 09:30 UTC),
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert!(json.get("description").is_none());
        assert_eq!(json["type"], "income");
    }

    #[test]
    fn round_trips_through_json() {
        let transaction = Transaction {
            id: 7,
            user_id: UserId::new(3),
            amount: 40.0,
            kind: TransactionKind::Expense,
            category: "Food".to_owned(),
            description: None,
            created_at: datetime!(2025-01-15 09:30 UTC),
        };

        let json = serde_json::to_string(&transaction).unwrap();
        let parsed: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, transaction);
    }
}
