//! Defines the route handler for the page that displays transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    user::{UserId, get_user_by_id},
};

use super::{
    core::{Transaction, TransactionKind},
    create_endpoint::create_transaction_form,
    pagination::{PageConfig, TransactionPage, fetch_transaction_page},
};

/// The state needed to display the transactions page.
#[derive(Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The config that controls how transactions are paged.
    pub page_config: PageConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            page_config: state.page_config.clone(),
        }
    }
}

/// Display a page with the user's transactions, newest first.
///
/// The first page of rows is rendered immediately; further pages are
/// appended through the load-more row. A store failure is logged and the
/// page renders with an empty table.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    let (page, user_email) = match state.db_connection.lock() {
        Ok(connection) => {
            let page = fetch_transaction_page(user_id, state.page_config.page_size, None, &connection)
                .unwrap_or_else(|error| {
                    tracing::error!("Error fetching initial transactions: {error}");
                    TransactionPage {
                        transactions: Vec::new(),
                        next_cursor: None,
                        has_more: false,
                    }
                });
            let user_email = get_user_by_id(user_id, &connection)
                .map(|user| user.email.to_string())
                .ok();

            (page, user_email)
        }
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            (
                TransactionPage {
                    transactions: Vec::new(),
                    next_cursor: None,
                    has_more: false,
                },
                None,
            )
        }
    };

    let mut nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW);
    if let Some(email) = user_email.as_deref() {
        nav_bar = nav_bar.with_user_email(email);
    }

    let content = html! {
        (nav_bar.into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-8 text-center" { "Transactions" }

            (create_transaction_form())

            div class="w-full max-w-4xl bg-white dark:bg-gray-800 rounded-lg shadow-md p-6 overflow-x-auto"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody id="transaction-rows"
                    {
                        (transaction_rows_fragment(&page, local_offset))
                    }
                }
            }
        }
    };

    base("Transactions", &[dollar_input_styles()], &content).into_response()
}

/// The display format for transaction dates, e.g. "Jan 15, 2025".
const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:none], [year]");

/// Render a page of transactions as table rows, followed by the load-more
/// row when another page is expected.
///
/// The load-more row carries the continuation cursor and replaces itself
/// with the next page's rows, so repeated loads append to the table.
pub(crate) fn transaction_rows_fragment(page: &TransactionPage, local_offset: UtcOffset) -> Markup {
    html! {
        @for transaction in &page.transactions {
            (transaction_table_row(transaction, local_offset))
        }

        @if page.has_more {
            @if let Some(cursor) = page.next_cursor {
                tr id="load-more-row"
                {
                    td colspan="5" class="px-6 py-4 text-center"
                    {
                        button
                            hx-get={ (endpoints::TRANSACTION_ROWS) "?after=" (cursor) }
                            hx-target="#load-more-row"
                            hx-swap="outerHTML"
                            hx-disabled-elt="this"
                            class=(LINK_STYLE)
                        {
                            "Load More"
                        }
                    }
                }
            }
        }
    }
}

fn transaction_table_row(transaction: &Transaction, local_offset: UtcOffset) -> Markup {
    let date = transaction
        .created_at
        .to_offset(local_offset)
        .date()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| transaction.created_at.date().to_string());

    let amount_style = match transaction.kind {
        TransactionKind::Income => "px-6 py-4 text-green-500",
        TransactionKind::Expense => "px-6 py-4 text-red-500",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description.as_deref().unwrap_or("")) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(amount_style) { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-x-4"
                {
                    a
                        href=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        hx-delete=(endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id))
                        hx-target="closest tr"
                        hx-swap="outerHTML"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}
