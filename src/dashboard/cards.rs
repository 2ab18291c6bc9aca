//! View functions for the dashboard's summary cards and overview panels.

use maud::{Markup, html};

use crate::{
    aggregation::{PeriodTotals, category_spend},
    budget::core::Budget,
    html::{CARD_STYLE, format_currency},
    transaction::core::{Transaction, TransactionKind},
};

/// The three headline cards: total income, total expenses, and savings for
/// the current calendar year.
pub(super) fn totals_cards(totals: &PeriodTotals) -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-3 gap-8 mb-8 w-full max-w-5xl"
        {
            (totals_card("Total Income", totals.income, "text-green-500"))
            (totals_card("Total Expenses", totals.expenses, "text-red-500"))
            (totals_card("Savings", totals.savings(), "text-blue-500"))
        }
    }
}

fn totals_card(title: &str, amount: f64, amount_color: &str) -> Markup {
    html! {
        div class={ (CARD_STYLE) " text-center" }
        {
            h2 class="text-xl font-semibold mb-2" { (title) }
            p class={ "text-3xl font-bold " (amount_color) } { (format_currency(amount)) }
        }
    }
}

/// The list of the user's most recent transactions.
pub(super) fn recent_transactions_panel(transactions: &[Transaction]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Recent Transactions" }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No transactions yet." }
            } @else {
                ul
                {
                    @for transaction in transactions {
                        li class="flex justify-between border-b border-gray-200 dark:border-gray-700 py-2"
                        {
                            span { (transaction.description.as_deref().unwrap_or("")) }

                            @match transaction.kind {
                                TransactionKind::Income => {
                                    span class="text-green-500" { (format_currency(transaction.amount)) }
                                }
                                TransactionKind::Expense => {
                                    span class="text-red-500" { (format_currency(transaction.amount)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The budget overview panel: per budget, the spend so far against the
/// budgeted limit with a progress bar.
pub(super) fn budget_overview_panel(budgets: &[Budget], transactions: &[Transaction]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Budget Overview" }

            @if budgets.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No budgets yet." }
            } @else {
                ul
                {
                    @for budget in budgets {
                        (budget_overview_item(budget, category_spend(transactions, &budget.name)))
                    }
                }
            }
        }
    }
}

fn budget_overview_item(budget: &Budget, spent: f64) -> Markup {
    let over_budget = spent > budget.budgeted;
    let bar_color = if over_budget { "bg-red-500" } else { "bg-green-500" };
    let percent = if budget.budgeted > 0.0 {
        ((spent / budget.budgeted) * 100.0).min(100.0)
    } else {
        0.0
    };

    html! {
        li class="mb-4"
        {
            div class="flex justify-between mb-1"
            {
                span { (budget.name) }
                span { (format_currency(spent)) " / " (format_currency(budget.budgeted)) }
            }

            div class="w-full bg-gray-200 rounded-full h-4"
            {
                div
                    class={ "h-4 rounded-full " (bar_color) }
                    style={ "width: " (format!("{percent:.0}")) "%" }
                {}
            }
        }
    }
}
