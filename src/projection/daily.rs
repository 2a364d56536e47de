//! Merges planned occurrences and actual ledger entries into per-day buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::RuleError;
use crate::ledger::{
    calendar::iso_key, classify, expand, expand_payroll, Classification, DateWindow, ItemKind,
    LedgerTransaction, Mode, PayrollRule, RecurringExpenseRule, VariableExpense,
};

/// Everything the builder reads, already fetched from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInputs {
    #[serde(default)]
    pub recurring_rules: Vec<RecurringExpenseRule>,
    #[serde(default)]
    pub payroll: Option<PayrollRule>,
    #[serde(default)]
    pub variable_expenses: Vec<VariableExpense>,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Payroll,
    Recurring,
    Variable,
    Ledger,
}

impl ItemSource {
    pub fn is_planned(self) -> bool {
        !matches!(self, ItemSource::Ledger)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BucketItem {
    pub name: String,
    pub amount: Decimal,
    pub kind: ItemKind,
    pub source: ItemSource,
    /// `false` for unclassified ledger entries listed for display only.
    pub counted: bool,
}

/// Totals and contributions for a single day. Amounts are magnitudes; the
/// direction lives in [`BucketItem::kind`].
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DailyBucket {
    pub income: Decimal,
    pub expense: Decimal,
    pub items: Vec<BucketItem>,
}

impl DailyBucket {
    fn push(&mut self, item: BucketItem) {
        if item.counted {
            match item.kind {
                ItemKind::Income => self.income += item.amount,
                ItemKind::Expense => self.expense += item.amount,
            }
        }
        self.items.push(item);
    }

    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Something the builder could not use; reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionIssue {
    #[error("recurring rule `{rule}` skipped: {error}")]
    Rule { rule: String, error: RuleError },
    #[error("payroll skipped: {0}")]
    Payroll(RuleError),
    #[error("expansion of `{0}` was truncated by the iteration guard")]
    Truncated(String),
    #[error("{record} has an unreadable date `{raw}`")]
    UnreadableDate { record: String, raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyProjection {
    pub window: DateWindow,
    pub buckets: BTreeMap<NaiveDate, DailyBucket>,
    pub issues: Vec<ProjectionIssue>,
}

impl DailyProjection {
    fn add(&mut self, date: NaiveDate, item: BucketItem) {
        self.buckets.entry(date).or_default().push(item);
    }

    /// Buckets keyed by `YYYY-MM-DD` strings, as the presentation layer expects.
    pub fn keyed(&self) -> BTreeMap<String, DailyBucket> {
        self.buckets
            .iter()
            .map(|(date, bucket)| (iso_key(*date), bucket.clone()))
            .collect()
    }

    pub fn total_income(&self) -> Decimal {
        self.buckets.values().map(|b| b.income).sum()
    }

    pub fn total_expense(&self) -> Decimal {
        self.buckets.values().map(|b| b.expense).sum()
    }
}

/// Builds daily buckets for `window` with every rule bounded only by its own
/// end date and the window.
pub fn build_daily_buckets(
    inputs: &ProjectionInputs,
    mode: Mode,
    window: DateWindow,
) -> DailyProjection {
    build_daily_buckets_with_horizon(inputs, mode, window, None)
}

/// Same as [`build_daily_buckets`], except recurring rules without an end date
/// stop at `open_ended_horizon` when one is given.
///
/// Stages run in a fixed order (payroll, recurring rules, variable expenses,
/// ledger transactions) and each one adds to the buckets. A planned occurrence
/// and an actual transaction on the same day are both counted.
pub fn build_daily_buckets_with_horizon(
    inputs: &ProjectionInputs,
    mode: Mode,
    window: DateWindow,
    open_ended_horizon: Option<NaiveDate>,
) -> DailyProjection {
    let mut projection = DailyProjection {
        window,
        buckets: BTreeMap::new(),
        issues: Vec::new(),
    };

    if let Some(payroll) = &inputs.payroll {
        add_payroll(&mut projection, payroll, window);
    }
    for rule in &inputs.recurring_rules {
        let rule_window = match (rule.end_date, open_ended_horizon) {
            (None, Some(horizon)) => window.clamp_end(horizon),
            _ => Some(window),
        };
        if let Some(rule_window) = rule_window {
            add_recurring(&mut projection, rule, rule_window);
        }
    }
    for expense in &inputs.variable_expenses {
        add_variable(&mut projection, expense, window);
    }
    for transaction in &inputs.transactions {
        add_transaction(&mut projection, transaction, mode, window);
    }

    debug!(
        %mode,
        start = %window.start,
        end = %window.end,
        days = projection.buckets.len(),
        issues = projection.issues.len(),
        "built daily buckets"
    );
    projection
}

fn add_payroll(projection: &mut DailyProjection, payroll: &PayrollRule, window: DateWindow) {
    match expand_payroll(payroll, window) {
        Ok(expansion) => {
            if expansion.truncated {
                projection
                    .issues
                    .push(ProjectionIssue::Truncated("payroll".into()));
            }
            for occurrence in expansion.occurrences {
                projection.add(
                    occurrence.date,
                    BucketItem {
                        name: "Salary".into(),
                        amount: occurrence.amount,
                        kind: ItemKind::Income,
                        source: ItemSource::Payroll,
                        counted: true,
                    },
                );
            }
        }
        Err(error) => {
            warn!(%error, "payroll rule skipped");
            projection.issues.push(ProjectionIssue::Payroll(error));
        }
    }
}

fn add_recurring(
    projection: &mut DailyProjection,
    rule: &RecurringExpenseRule,
    window: DateWindow,
) {
    match expand(rule, window) {
        Ok(expansion) => {
            if expansion.truncated {
                projection
                    .issues
                    .push(ProjectionIssue::Truncated(rule.name.clone()));
            }
            for occurrence in expansion.occurrences {
                projection.add(
                    occurrence.date,
                    BucketItem {
                        name: occurrence.name,
                        amount: occurrence.amount,
                        kind: ItemKind::Expense,
                        source: ItemSource::Recurring,
                        counted: true,
                    },
                );
            }
        }
        Err(error) => {
            warn!(rule = %rule.name, %error, "recurring rule skipped");
            projection.issues.push(ProjectionIssue::Rule {
                rule: rule.name.clone(),
                error,
            });
        }
    }
}

fn add_variable(projection: &mut DailyProjection, expense: &VariableExpense, window: DateWindow) {
    let date = match expense.parsed_date() {
        Ok(date) => date,
        Err(error) => {
            warn!(expense = %expense.name, %error, "variable expense skipped");
            projection.issues.push(ProjectionIssue::UnreadableDate {
                record: format!("variable expense `{}`", expense.name),
                raw: expense.date.clone(),
            });
            return;
        }
    };
    if !window.contains(date) {
        return;
    }
    projection.add(
        date,
        BucketItem {
            name: expense.name.clone(),
            amount: expense.amount.abs(),
            kind: ItemKind::Expense,
            source: ItemSource::Variable,
            counted: true,
        },
    );
}

fn add_transaction(
    projection: &mut DailyProjection,
    transaction: &LedgerTransaction,
    mode: Mode,
    window: DateWindow,
) {
    let date = match transaction.parsed_date() {
        Ok(date) => date,
        Err(error) => {
            warn!(transaction = %transaction.id, %error, "ledger transaction skipped");
            projection.issues.push(ProjectionIssue::UnreadableDate {
                record: format!("transaction `{}`", transaction.label()),
                raw: transaction.date.clone(),
            });
            return;
        }
    };
    if !window.contains(date) {
        return;
    }
    let (kind, counted) = match classify(transaction, mode) {
        Classification::Income => (ItemKind::Income, true),
        Classification::Expense => (ItemKind::Expense, true),
        Classification::Excluded => return,
        Classification::Unclassified(guess) => (guess, false),
    };
    projection.add(
        date,
        BucketItem {
            name: transaction.label().to_string(),
            amount: transaction.magnitude(),
            kind,
            source: ItemSource::Ledger,
            counted,
        },
    );
}
