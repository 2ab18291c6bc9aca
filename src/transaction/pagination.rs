//! Cursor-based paging over a user's transactions.
//!
//! Pages run newest-first and forward-only: each page carries a cursor
//! referencing its last record, and the next page starts strictly after it.
//! Whether more pages exist is inferred from the page length alone. That
//! heuristic is deliberately treated as ground truth: records deleted
//! between fetches can make it optimistic, in which case the next fetch
//! simply comes back short or empty.

use rusqlite::Connection;

use crate::{
    Error,
    store::cursor::PageCursor,
    user::UserId,
};

use super::core::{Transaction, map_transaction_row};

/// The config that controls how transactions are paged.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// The number of transactions fetched per page.
    pub page_size: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// One page of a user's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    /// The transactions in this page, newest first.
    pub transactions: Vec<Transaction>,
    /// Cursor referencing the last transaction in this page, for fetching the
    /// page after it. `None` for an empty page.
    pub next_cursor: Option<PageCursor>,
    /// Whether another fetch is expected to return more transactions.
    pub has_more: bool,
}

/// Fetch one page of transactions owned by `user_id`, ordered by creation
/// timestamp descending (ID descending as tie-break).
///
/// With `after = None` the first page is returned. Otherwise the page starts
/// strictly after the record the cursor references, so pages never overlap
/// even when records share a creation timestamp.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn fetch_transaction_page(
    user_id: UserId,
    page_size: u32,
    after: Option<PageCursor>,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let transactions: Vec<Transaction> = match after {
        Some(cursor) => connection
            .prepare(
                "SELECT id, user_id, amount, kind, category, description, created_at
                 FROM transactions
                 WHERE user_id = :user_id
                   AND (created_at < :created_at
                        OR (created_at = :created_at AND id < :id))
                 ORDER BY created_at DESC, id DESC
                 LIMIT :limit",
            )?
            .query_map(
                &[
                    (":user_id", &user_id.as_i64()),
                    (":created_at", &cursor.created_at_nanos),
                    (":id", &cursor.id),
                    (":limit", &(page_size as i64)),
                ],
                map_transaction_row,
            )?
            .map(|result| result.map_err(Error::SqlError))
            .collect::<Result<_, _>>()?,
        None => connection
            .prepare(
                "SELECT id, user_id, amount, kind, category, description, created_at
                 FROM transactions
                 WHERE user_id = :user_id
                 ORDER BY created_at DESC, id DESC
                 LIMIT :limit",
            )?
            .query_map(
                &[
                    (":user_id", &user_id.as_i64()),
                    (":limit", &(page_size as i64)),
                ],
                map_transaction_row,
            )?
            .map(|result| result.map_err(Error::SqlError))
            .collect::<Result<_, _>>()?,
    };

    let has_more = transactions.len() == page_size as usize;
    let next_cursor = transactions
        .last()
        .map(|transaction| PageCursor::new(transaction.created_at, transaction.id));

    Ok(TransactionPage {
        transactions,
        next_cursor,
        has_more,
    })
}

#[cfg(test)]
mod pagination_tests {
    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        db::initialize,
        transaction::core::{Transaction, TransactionKind, create_transaction, delete_transaction},
        user::UserId,
    };

    use super::fetch_transaction_page;

    const TEST_USER: UserId = UserId::new(1);
    const OTHER_USER: UserId = UserId::new(2);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    /// Insert `count` transactions with distinct, increasing timestamps.
    fn seed_transactions(count: i64, connection: &Connection) {
        let start = datetime!(2025-01-01 12:00 UTC);

        for i in 0..count {
            create_transaction(
                Transaction::build(TEST_USER, (i + 1) as f64, TransactionKind::Expense, "Food")
                    .created_at(start + Duration::minutes(i)),
                connection,
            )
            .unwrap();
        }
    }

    #[test]
    fn empty_store_yields_empty_page() {
        let conn = get_test_connection();

        let page = fetch_transaction_page(TEST_USER, 10, None, &conn).unwrap();

        assert!(page.transactions.is_empty());
        assert_eq!(page.next_cursor, None);
        assert!(!page.has_more);
    }

    #[test]
    fn first_page_is_newest_first() {
        let conn = get_test_connection();
        seed_transactions(5, &conn);

        let page = fetch_transaction_page(TEST_USER, 10, None, &conn).unwrap();

        assert_eq!(page.transactions.len(), 5);
        assert_eq!(page.transactions[0].amount, 5.0);
        assert_eq!(page.transactions[4].amount, 1.0);
        assert!(!page.has_more);
    }

    #[test]
    fn yields_ceil_n_over_p_pages() {
        let conn = get_test_connection();
        seed_transactions(23, &conn);
        let page_size = 10;

        let mut pages = Vec::new();
        let mut after = None;
        loop {
            let page = fetch_transaction_page(TEST_USER, page_size, after, &conn).unwrap();
            after = page.next_cursor;
            let has_more = page.has_more;
            pages.push(page);

            if !has_more {
                break;
            }
        }

        assert_eq!(pages.len(), 3, "want ceil(23/10) = 3 pages");
        assert_eq!(pages[0].transactions.len(), 10);
        assert_eq!(pages[1].transactions.len(), 10);
        assert_eq!(pages[2].transactions.len(), 3);
        assert!(pages[0].has_more);
        assert!(pages[1].has_more);
        assert!(!pages[2].has_more, "has_more must flip after the final page");

        // No overlaps and no gaps across pages.
        let ids: Vec<_> = pages
            .iter()
            .flat_map(|page| page.transactions.iter().map(|t| t.id))
            .collect();
        assert_eq!(ids.len(), 23);
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), 23, "pages must not overlap");
    }

    #[test]
    fn full_final_page_needs_one_extra_fetch() {
        // When the record count is an exact multiple of the page size the
        // length heuristic cannot see the end: the final full page reports
        // has_more and the extra fetch comes back empty.
        let conn = get_test_connection();
        seed_transactions(20, &conn);

        let first = fetch_transaction_page(TEST_USER, 10, None, &conn).unwrap();
        let second = fetch_transaction_page(TEST_USER, 10, first.next_cursor, &conn).unwrap();
        assert_eq!(second.transactions.len(), 10);
        assert!(second.has_more, "length heuristic cannot see the end yet");

        let third = fetch_transaction_page(TEST_USER, 10, second.next_cursor, &conn).unwrap();
        assert!(third.transactions.is_empty());
        assert!(!third.has_more);
    }

    #[test]
    fn ties_on_timestamp_are_broken_by_id() {
        let conn = get_test_connection();
        let same_instant = datetime!(2025-01-01 12:00 UTC);

        for i in 0..7 {
            create_transaction(
                Transaction::build(TEST_USER, (i + 1) as f64, TransactionKind::Expense, "Food")
                    .created_at(same_instant),
                &conn,
            )
            .unwrap();
        }

        let first = fetch_transaction_page(TEST_USER, 4, None, &conn).unwrap();
        let second = fetch_transaction_page(TEST_USER, 4, first.next_cursor, &conn).unwrap();

        let mut ids: Vec<_> = first
            .transactions
            .iter()
            .chain(second.transactions.iter())
            .map(|t| t.id)
            .collect();
        assert_eq!(ids.len(), 7, "no record may be skipped or repeated");
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn cursor_is_stable_across_deletions_of_paged_records() {
        let conn = get_test_connection();
        seed_transactions(15, &conn);

        let first = fetch_transaction_page(TEST_USER, 10, None, &conn).unwrap();

        // Deleting an already-paged record must not shift the next page the
        // way offset pagination would.
        delete_transaction(first.transactions[0].id, TEST_USER, &conn).unwrap();

        let second = fetch_transaction_page(TEST_USER, 10, first.next_cursor, &conn).unwrap();

        assert_eq!(second.transactions.len(), 5);
        assert!(
            first
                .transactions
                .iter()
                .all(|paged| second.transactions.iter().all(|t| t.id != paged.id)),
            "second page must not repeat first page records"
        );
    }

    #[test]
    fn pages_are_scoped_by_user() {
        let conn = get_test_connection();
        seed_transactions(3, &conn);
        create_transaction(
            Transaction::build(OTHER_USER, 99.0, TransactionKind::Expense, "Food"),
            &conn,
        )
        .unwrap();

        let page = fetch_transaction_page(TEST_USER, 10, None, &conn).unwrap();

        assert_eq!(page.transactions.len(), 3);
        assert!(page.transactions.iter().all(|t| t.user_id == TEST_USER));
    }
}
