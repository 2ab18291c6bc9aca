//! Type aliases for store-assigned record identifiers.

/// An integer ID assigned by the record store on insert.
pub type DatabaseId = i64;

/// The ID of a transaction record.
pub type TransactionId = DatabaseId;

/// The ID of a budget record.
pub type BudgetId = DatabaseId;
