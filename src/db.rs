//! Database initialization for the application's domain models.

use rusqlite::Connection;

use crate::{
    budget::core::create_budget_table, transaction::core::create_transaction_table,
    user::create_user_table,
};

/// Create the tables for the application's domain models if they do not
/// already exist.
///
/// # Errors
/// Returns an error if a table or index cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_user_table(connection)?;
    create_transaction_table(connection)?;
    create_budget_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("Could not initialize database");

        let mut statement = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let table_names: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect();

        for want in ["budgets", "transactions", "user"] {
            assert!(
                table_names.iter().any(|name| name == want),
                "expected table {want}, got {table_names:?}"
            );
        }
    }

    #[test]
    fn is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("first initialize failed");
        initialize(&conn).expect("second initialize failed");
    }
}
