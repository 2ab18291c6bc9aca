//! Defines the core data model and database queries for budgets.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, database_id::BudgetId, transaction::core::timestamp_nanos, user::UserId,
};

/// A spending limit for a category of transactions.
///
/// The budget `name` doubles as the category key: spend is computed over
/// transactions whose `category` equals the name, by plain string equality.
/// A name that matches no transaction simply yields a zero spend.
///
/// The serialized field names (`userId`, `budgeted`, `createdAt`, ...) are a
/// wire contract shared with previously stored data and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The ID of the user that owns this budget.
    pub user_id: UserId,
    /// The budget name, which is also the category key.
    pub name: String,
    /// The budgeted spending limit, always a positive magnitude.
    pub budgeted: f64,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A builder for creating [Budget] instances.
///
/// The creation timestamp defaults to now. Call [create_budget] to insert
/// the built budget and receive its store-assigned ID.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBuilder {
    /// The ID of the user that will own the budget.
    pub user_id: UserId,
    /// The budget name, which is also the category key.
    pub name: String,
    /// The budgeted spending limit as a positive magnitude.
    pub budgeted: f64,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
}

impl Budget {
    /// Create a new budget.
    ///
    /// Shortcut for [BudgetBuilder] for discoverability.
    pub fn build(user_id: UserId, name: &str, budgeted: f64) -> BudgetBuilder {
        BudgetBuilder {
            user_id,
            name: name.to_owned(),
            budgeted,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

impl BudgetBuilder {
    /// Set the creation timestamp for the budget.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Create a new budget in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_budget(builder: BudgetBuilder, connection: &Connection) -> Result<Budget, Error> {
    let budget = connection
        .prepare(
            "INSERT INTO budgets (user_id, name, budgeted, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, user_id, name, budgeted, created_at",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                &builder.name,
                builder.budgeted,
                timestamp_nanos(builder.created_at),
            ),
            map_budget_row,
        )?;

    Ok(budget)
}

/// Get all budgets owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_budgets(user_id: UserId, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, budgeted, created_at
             FROM budgets WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Delete the budget owned by `user_id` with the given `id`.
///
/// Deleting an ID that does not exist is not an error: from the caller's
/// perspective the outcome is the same as a successful delete.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Create the budgets table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                budgeted REAL NOT NULL,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_budgets_user ON budgets(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Budget.
pub fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let budgeted = row.get(3)?;
    let created_at_nanos: i64 = row.get(4)?;

    let created_at = OffsetDateTime::from_unix_timestamp_nanos(created_at_nanos as i128).map_err(
        |error| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Integer,
                Box::new(error),
            )
        },
    )?;

    Ok(Budget {
        id,
        user_id: UserId::new(user_id),
        name,
        budgeted,
        created_at,
    })
}
