//! Folds daily buckets into calendar months and longer reporting periods.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::daily::DailyBucket;
use crate::errors::EngineError;
use crate::ledger::{parse_iso_date, DateWindow};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One month of a year. The `budget_*` fields currently mirror the actual
/// fields; they are kept apart so planned and actual can diverge later.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    pub month: u32,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub budget_revenue: Decimal,
    pub budget_expenses: Decimal,
}

impl MonthlyAggregate {
    fn empty(month: u32) -> Self {
        Self {
            month,
            revenue: Decimal::ZERO,
            expenses: Decimal::ZERO,
            budget_revenue: Decimal::ZERO,
            budget_expenses: Decimal::ZERO,
        }
    }

    fn fold(&mut self, bucket: &DailyBucket) {
        self.revenue += bucket.income;
        self.expenses += bucket.expense;
        self.budget_revenue += bucket.income;
        self.budget_expenses += bucket.expense;
    }

    pub fn label(&self) -> &'static str {
        MONTH_LABELS[(self.month.clamp(1, 12) - 1) as usize]
    }

    pub fn net(&self) -> Decimal {
        self.revenue - self.expenses
    }
}

/// Twelve aggregates, January through December, zero-filled for empty months.
pub fn aggregate_by_month(
    buckets: &BTreeMap<NaiveDate, DailyBucket>,
    year: i32,
) -> [MonthlyAggregate; 12] {
    let mut months: [MonthlyAggregate; 12] =
        std::array::from_fn(|idx| MonthlyAggregate::empty(idx as u32 + 1));
    for (date, bucket) in buckets {
        if date.year() == year {
            months[date.month0() as usize].fold(bucket);
        }
    }
    months
}

/// String-keyed variant; keys that do not parse as dates are skipped with a
/// warning.
pub fn aggregate_keyed_by_month(
    buckets: &BTreeMap<String, DailyBucket>,
    year: i32,
) -> [MonthlyAggregate; 12] {
    let mut parsed = BTreeMap::new();
    for (key, bucket) in buckets {
        match parse_iso_date(key) {
            Ok(date) => {
                parsed.insert(date, bucket.clone());
            }
            Err(error) => warn!(key = %key, %error, "skipping bucket with unreadable date key"),
        }
    }
    aggregate_by_month(&parsed, year)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PeriodTotals {
    pub window: DateWindow,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

pub fn aggregate_period(
    buckets: &BTreeMap<NaiveDate, DailyBucket>,
    window: DateWindow,
) -> PeriodTotals {
    let (revenue, expenses) = buckets
        .range(window.start..=window.end)
        .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), (_, bucket)| {
            (inc + bucket.income, exp + bucket.expense)
        });
    PeriodTotals {
        window,
        revenue,
        expenses,
        net: revenue - expenses,
    }
}

/// Totals for the fiscal year that begins on the 1st of `start_month` in `year`.
pub fn aggregate_fiscal_year(
    buckets: &BTreeMap<NaiveDate, DailyBucket>,
    year: i32,
    start_month: u32,
) -> Result<PeriodTotals, EngineError> {
    Ok(aggregate_period(
        buckets,
        DateWindow::fiscal_year(year, start_month)?,
    ))
}
