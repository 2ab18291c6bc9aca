//! Pure aggregation over in-memory transaction lists.
//!
//! Every view derives its numbers from these functions: category spend for
//! budget comparisons, income/expense/savings totals for the dashboard, and
//! the monthly series behind the reports chart. Nothing here touches the
//! store; given the same input list the output is identical regardless of
//! call order.

use std::{collections::HashMap, ops::RangeInclusive};

use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::transaction::core::{Transaction, TransactionKind};

/// The total amount spent on a category: the sum of amounts over expense
/// transactions whose category equals `category`.
///
/// Budget names are matched against transaction categories by plain string
/// equality, so a name with no matching transactions yields 0 rather than an
/// error.
pub fn category_spend(transactions: &[Transaction], category: &str) -> f64 {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense && transaction.category == category
        })
        .map(|transaction| transaction.amount)
        .sum()
}

/// Income and expense totals over a transaction set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodTotals {
    /// The sum of income amounts.
    pub income: f64,
    /// The sum of expense amounts.
    pub expenses: f64,
}

impl PeriodTotals {
    /// What was left over: income minus expenses.
    pub fn savings(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Sum transaction amounts grouped by kind.
///
/// The empty set yields zero totals and zero savings.
pub fn period_totals(transactions: &[Transaction]) -> PeriodTotals {
    let mut totals = PeriodTotals::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => totals.income += transaction.amount,
            TransactionKind::Expense => totals.expenses += transaction.amount,
        }
    }

    totals
}

/// Income and expense sums for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// The first day of the bucket's month.
    pub month: Date,
    /// The sum of income amounts in the month.
    pub income: f64,
    /// The sum of expense amounts in the month.
    pub expenses: f64,
}

/// Group transactions into per-month income and expense sums.
///
/// The bucket for a transaction is the calendar month of its creation
/// timestamp in the given `local_offset`. The output is sorted ascending by
/// calendar date regardless of input order, and transactions sharing a month
/// accumulate into a single bucket.
pub fn monthly_series(transactions: &[Transaction], local_offset: UtcOffset) -> Vec<MonthlyBucket> {
    let mut buckets: HashMap<Date, MonthlyBucket> = HashMap::new();

    for transaction in transactions {
        let month = transaction
            .created_at
            .to_offset(local_offset)
            .date()
            .replace_day(1)
            .expect("day 1 is valid for every month");

        let bucket = buckets.entry(month).or_insert(MonthlyBucket {
            month,
            income: 0.0,
            expenses: 0.0,
        });

        match transaction.kind {
            TransactionKind::Income => bucket.income += transaction.amount,
            TransactionKind::Expense => bucket.expenses += transaction.amount,
        }
    }

    let mut series: Vec<MonthlyBucket> = buckets.into_values().collect();
    series.sort_by_key(|bucket| bucket.month);
    series
}

/// A short label for a monthly bucket, e.g. "Jan 2025".
pub fn month_label(month: Date) -> String {
    let name = match month.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{} {}", name, month.year())
}

/// The inclusive range of instants covering the calendar year of
/// `now_local`, expressed in the same offset.
///
/// The dashboard and budget screens compare spending against budgets over
/// the current calendar year, so their store queries are bounded by this
/// range.
pub fn calendar_year_range(now_local: OffsetDateTime) -> RangeInclusive<OffsetDateTime> {
    let year = now_local.year();
    let offset = now_local.offset();

    let start = Date::from_calendar_date(year, Month::January, 1)
        .expect("January 1 is valid for every year")
        .midnight()
        .assume_offset(offset);
    let end = Date::from_calendar_date(year, Month::December, 31)
        .expect("December 31 is valid for every year")
        .with_hms(23, 59, 59)
        .expect("23:59:59 is a valid time")
        .assume_offset(offset);

    start..=end
}
