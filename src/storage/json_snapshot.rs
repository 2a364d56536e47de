use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{in_year, ProjectionSource};
use crate::errors::{EngineError, Result};
use crate::ledger::{LedgerTransaction, Mode, PayrollRule, RecurringExpenseRule, VariableExpense};

/// Raw per-mode records. Rules are decoded one at a time so a single corrupt
/// rule is dropped with a warning instead of failing the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBook {
    #[serde(default)]
    recurring_expenses: Vec<Value>,
    #[serde(default)]
    payroll: Option<Value>,
    #[serde(default)]
    variable_expenses: Vec<VariableExpense>,
    #[serde(default)]
    transactions: Vec<LedgerTransaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawOwner {
    #[serde(default)]
    business: RawBook,
    #[serde(default)]
    personal: RawBook,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    owners: HashMap<String, RawOwner>,
}

#[derive(Debug, Clone, Default)]
struct Book {
    recurring_rules: Vec<RecurringExpenseRule>,
    payroll: Option<PayrollRule>,
    variable_expenses: Vec<VariableExpense>,
    transactions: Vec<LedgerTransaction>,
}

/// Read-only source over an exported JSON snapshot of the store:
///
/// ```json
/// { "owners": { "<owner>": { "personal": { "recurringExpenses": [], "payroll": {},
///   "variableExpenses": [], "transactions": [] }, "business": { } } } }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    books: HashMap<(String, Mode), Book>,
    skipped: Vec<String>,
}

impl SnapshotFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read_to_string(&path)?;
        let mut snapshot = Self::from_json(&data)?;
        info!(
            path = %path.display(),
            owners = snapshot.owner_count(),
            skipped = snapshot.skipped.len(),
            "loaded projection snapshot"
        );
        snapshot.path = path;
        Ok(snapshot)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(data)?;
        let mut books = HashMap::new();
        let mut skipped = Vec::new();
        for (owner, raw_owner) in raw.owners {
            for (mode, raw_book) in [
                (Mode::Business, raw_owner.business),
                (Mode::Personal, raw_owner.personal),
            ] {
                let book = decode_book(&owner, mode, raw_book, &mut skipped);
                books.insert((owner.clone(), mode), book);
            }
        }
        Ok(Self {
            path: PathBuf::new(),
            books,
            skipped,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptions of records dropped while decoding.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    fn owner_count(&self) -> usize {
        self.books.len() / 2
    }

    fn book(&self, owner: &str, mode: Mode) -> Result<&Book> {
        self.books
            .get(&(owner.to_string(), mode))
            .ok_or_else(|| EngineError::UnknownOwner(owner.to_string()))
    }
}

fn decode_book(owner: &str, mode: Mode, raw: RawBook, skipped: &mut Vec<String>) -> Book {
    let mut recurring_rules = Vec::with_capacity(raw.recurring_expenses.len());
    for value in raw.recurring_expenses {
        let label = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        match serde_json::from_value::<RecurringExpenseRule>(value) {
            Ok(rule) => recurring_rules.push(rule),
            Err(error) => {
                warn!(owner, %mode, rule = %label, %error, "skipping unreadable recurring rule");
                skipped.push(format!("{owner}/{mode}: recurring rule `{label}`: {error}"));
            }
        }
    }

    let payroll = match raw.payroll {
        Some(Value::Null) | None => None,
        Some(value) => match serde_json::from_value::<PayrollRule>(value) {
            Ok(rule) => Some(rule),
            Err(error) => {
                warn!(owner, %mode, %error, "skipping unreadable payroll settings");
                skipped.push(format!("{owner}/{mode}: payroll: {error}"));
                None
            }
        },
    };

    Book {
        recurring_rules,
        payroll,
        variable_expenses: raw.variable_expenses,
        transactions: raw.transactions,
    }
}

impl ProjectionSource for SnapshotFile {
    fn recurring_rules(&self, owner: &str, mode: Mode) -> Result<Vec<RecurringExpenseRule>> {
        Ok(self.book(owner, mode)?.recurring_rules.clone())
    }

    fn payroll(&self, owner: &str, mode: Mode) -> Result<Option<PayrollRule>> {
        Ok(self.book(owner, mode)?.payroll.clone())
    }

    fn variable_expenses(
        &self,
        owner: &str,
        mode: Mode,
        year: i32,
    ) -> Result<Vec<VariableExpense>> {
        Ok(self
            .book(owner, mode)?
            .variable_expenses
            .iter()
            .filter(|e| in_year(&e.date, year))
            .cloned()
            .collect())
    }

    fn transactions(&self, owner: &str, mode: Mode, year: i32) -> Result<Vec<LedgerTransaction>> {
        Ok(self
            .book(owner, mode)?
            .transactions
            .iter()
            .filter(|t| in_year(&t.date, year))
            .cloned()
            .collect())
    }
}
