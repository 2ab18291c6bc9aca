//! The user model, its table, and lookups by ID and email.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A user's integer ID, distinct at the type level from transaction and
/// budget IDs so the two can never be swapped silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw store-assigned ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw integer, for binding into SQL parameters.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Each user owns their own transactions and budgets, keyed by [UserId].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The email address the user signs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` already belongs to a user,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    email: EmailAddress,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (email.as_str(), password_hash.as_ref()),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email,
        password_hash,
    })
}

/// Look up a user by ID.
///
/// # Errors
/// Returns [Error::NotFound] if no user has this ID, or [Error::SqlError]
/// on any other SQL failure.
pub fn get_user_by_id(user_id: UserId, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Look up a user by the email they sign in with.
///
/// # Errors
/// Returns [Error::NotFound] if no user has this email, or
/// [Error::SqlError] on any other SQL failure.
pub fn get_user_by_email(email: &EmailAddress, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, email, password FROM user WHERE email = :email")?
        .query_row(&[(":email", &email.as_str())], map_user_row)
        .map_err(|error| error.into())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_email: String = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserId::new(raw_id),
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
