//! Read-side seam to the rule and transaction store.

pub mod json_snapshot;

use std::collections::HashMap;

use crate::errors::Result;
use crate::ledger::{LedgerTransaction, Mode, PayrollRule, RecurringExpenseRule, VariableExpense};
use crate::projection::ProjectionInputs;

pub use json_snapshot::SnapshotFile;

/// Fetches the records a projection needs, scoped by owner, mode and year.
pub trait ProjectionSource {
    fn recurring_rules(&self, owner: &str, mode: Mode) -> Result<Vec<RecurringExpenseRule>>;

    fn payroll(&self, owner: &str, mode: Mode) -> Result<Option<PayrollRule>>;

    fn variable_expenses(&self, owner: &str, mode: Mode, year: i32)
        -> Result<Vec<VariableExpense>>;

    fn transactions(&self, owner: &str, mode: Mode, year: i32) -> Result<Vec<LedgerTransaction>>;

    /// Everything needed to project `year` for one owner and mode.
    fn load_inputs(&self, owner: &str, mode: Mode, year: i32) -> Result<ProjectionInputs> {
        Ok(ProjectionInputs {
            recurring_rules: self.recurring_rules(owner, mode)?,
            payroll: self.payroll(owner, mode)?,
            variable_expenses: self.variable_expenses(owner, mode, year)?,
            transactions: self.transactions(owner, mode, year)?,
        })
    }
}

/// Keeps dated records whose year matches, and those whose date cannot be
/// read so the projection can report them.
pub(crate) fn in_year(raw: &str, year: i32) -> bool {
    use chrono::Datelike;
    crate::ledger::parse_iso_date(raw)
        .map(|date| date.year() == year)
        .unwrap_or(true)
}

/// Source backed by a map; used by tests and embedders that already hold data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    books: HashMap<(String, Mode), ProjectionInputs>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, owner: impl Into<String>, mode: Mode, inputs: ProjectionInputs) {
        self.books.insert((owner.into(), mode), inputs);
    }

    fn book(&self, owner: &str, mode: Mode) -> Option<&ProjectionInputs> {
        self.books.get(&(owner.to_string(), mode))
    }
}

impl ProjectionSource for InMemorySource {
    fn recurring_rules(&self, owner: &str, mode: Mode) -> Result<Vec<RecurringExpenseRule>> {
        Ok(self
            .book(owner, mode)
            .map(|b| b.recurring_rules.clone())
            .unwrap_or_default())
    }

    fn payroll(&self, owner: &str, mode: Mode) -> Result<Option<PayrollRule>> {
        Ok(self.book(owner, mode).and_then(|b| b.payroll.clone()))
    }

    fn variable_expenses(
        &self,
        owner: &str,
        mode: Mode,
        year: i32,
    ) -> Result<Vec<VariableExpense>> {
        Ok(self
            .book(owner, mode)
            .map(|b| {
                b.variable_expenses
                    .iter()
                    .filter(|e| in_year(&e.date, year))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn transactions(&self, owner: &str, mode: Mode, year: i32) -> Result<Vec<LedgerTransaction>> {
        Ok(self
            .book(owner, mode)
            .map(|b| {
                b.transactions
                    .iter()
                    .filter(|t| in_year(&t.date, year))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
