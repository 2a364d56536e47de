use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::parse_iso_date;
use crate::errors::DateParseError;

/// Which book a projection is computed for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Business,
    #[default]
    Personal,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "business" | "entreprise" => Ok(Mode::Business),
            "personal" | "personnel" => Ok(Mode::Personal),
            other => Err(format!("unknown mode `{other}`")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Business => "business",
            Mode::Personal => "personal",
        })
    }
}

/// Stored `type` discriminator of a ledger transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Income,
    Expense,
    Revenu,
    Depense,
    Remboursement,
    PaiementFacture,
    Transfert,
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Revenu => "revenu",
            TransactionType::Depense => "depense",
            TransactionType::Remboursement => "remboursement",
            TransactionType::PaiementFacture => "paiement_facture",
            TransactionType::Transfert => "transfert",
            TransactionType::Other(raw) => raw,
        }
    }

    /// Display guess for types no mode recognizes.
    fn best_effort_kind(&self) -> ItemKind {
        match self {
            TransactionType::Income | TransactionType::Revenu => ItemKind::Income,
            TransactionType::Other(raw) if looks_like_income(raw) => ItemKind::Income,
            _ => ItemKind::Expense,
        }
    }
}

fn looks_like_income(raw: &str) -> bool {
    let raw = raw.to_ascii_lowercase();
    ["income", "revenu", "salaire", "salary", "deposit"]
        .iter()
        .any(|needle| raw.contains(needle))
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => TransactionType::Income,
            "expense" => TransactionType::Expense,
            "revenu" => TransactionType::Revenu,
            "depense" | "dépense" => TransactionType::Depense,
            "remboursement" => TransactionType::Remboursement,
            "paiement_facture" => TransactionType::PaiementFacture,
            "transfert" | "transfer" => TransactionType::Transfert,
            _ => TransactionType::Other(value),
        }
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    BetweenAccounts,
    BetweenPersons,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Income,
    Expense,
}

/// An actual ledger entry as fetched from the store. The date is kept in its
/// stored string form so a corrupt record can be skipped on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<TransferType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LedgerTransaction {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            id: String::new(),
            date: super::calendar::iso_key(date),
            amount,
            description: description.into(),
            kind,
            transfer_type: None,
            category: None,
        }
    }

    pub fn with_transfer_type(mut self, transfer_type: TransferType) -> Self {
        self.transfer_type = Some(transfer_type);
        self
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, DateParseError> {
        parse_iso_date(&self.date)
    }

    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn label(&self) -> &str {
        if self.description.trim().is_empty() {
            self.kind.as_str()
        } else {
            &self.description
        }
    }
}

/// A one-off planned expense entered in the budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct VariableExpense {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl VariableExpense {
    pub fn new(name: impl Into<String>, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            amount,
            date: super::calendar::iso_key(date),
            category: None,
        }
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, DateParseError> {
        parse_iso_date(&self.date)
    }
}

/// How a ledger transaction contributes to cash-flow totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Income,
    Expense,
    /// Internal movement; contributes to nothing.
    Excluded,
    /// Not recognized by the mode; listed for transparency under a guessed
    /// kind but not counted in totals.
    Unclassified(ItemKind),
}

pub fn classify(transaction: &LedgerTransaction, mode: Mode) -> Classification {
    match mode {
        Mode::Business => classify_business(transaction),
        Mode::Personal => classify_personal(transaction),
    }
}

fn classify_business(transaction: &LedgerTransaction) -> Classification {
    match transaction.kind {
        TransactionType::Income => Classification::Income,
        TransactionType::Expense => Classification::Expense,
        ref other => Classification::Unclassified(other.best_effort_kind()),
    }
}

fn classify_personal(transaction: &LedgerTransaction) -> Classification {
    if transaction.transfer_type == Some(TransferType::BetweenAccounts) {
        return Classification::Excluded;
    }
    match transaction.kind {
        TransactionType::Revenu | TransactionType::Income => Classification::Income,
        TransactionType::Depense
        | TransactionType::Remboursement
        | TransactionType::PaiementFacture => Classification::Expense,
        TransactionType::Transfert
            if transaction.transfer_type == Some(TransferType::BetweenPersons) =>
        {
            Classification::Expense
        }
        ref other => Classification::Unclassified(other.best_effort_kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: &str) -> LedgerTransaction {
        LedgerTransaction::new(
            NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            Decimal::from(40),
            "test",
            TransactionType::from(kind.to_string()),
        )
    }

    #[test]
    fn business_mode_recognizes_only_income_and_expense() {
        assert_eq!(classify(&tx("income"), Mode::Business), Classification::Income);
        assert_eq!(classify(&tx("expense"), Mode::Business), Classification::Expense);
        assert_eq!(
            classify(&tx("depense"), Mode::Business),
            Classification::Unclassified(ItemKind::Expense)
        );
        assert_eq!(
            classify(&tx("revenu"), Mode::Business),
            Classification::Unclassified(ItemKind::Income)
        );
    }

    #[test]
    fn personal_mode_classification() {
        assert_eq!(classify(&tx("revenu"), Mode::Personal), Classification::Income);
        assert_eq!(classify(&tx("income"), Mode::Personal), Classification::Income);
        for kind in ["depense", "remboursement", "paiement_facture"] {
            assert_eq!(classify(&tx(kind), Mode::Personal), Classification::Expense);
        }
        assert_eq!(
            classify(
                &tx("transfert").with_transfer_type(TransferType::BetweenPersons),
                Mode::Personal
            ),
            Classification::Expense
        );
        assert_eq!(
            classify(
                &tx("transfert").with_transfer_type(TransferType::BetweenAccounts),
                Mode::Personal
            ),
            Classification::Excluded
        );
        assert_eq!(
            classify(&tx("transfert"), Mode::Personal),
            Classification::Unclassified(ItemKind::Expense)
        );
    }

    #[test]
    fn type_strings_round_trip_through_serde() {
        let json = r#"{"date":"2025-02-03","amount":"12.50","type":"paiement_facture",
            "transferType":"between_persons","description":"Hydro"}"#;
        let parsed: LedgerTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, TransactionType::PaiementFacture);
        assert_eq!(parsed.transfer_type, Some(TransferType::BetweenPersons));

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["type"], "paiement_facture");

        let unknown: TransactionType = serde_json::from_str(r#""pret""#).unwrap();
        assert_eq!(unknown, TransactionType::Other("pret".into()));
    }

    #[test]
    fn mode_parses_from_french_and_english() {
        assert_eq!("Entreprise".parse::<Mode>().unwrap(), Mode::Business);
        assert_eq!("personal".parse::<Mode>().unwrap(), Mode::Personal);
        assert!("other".parse::<Mode>().is_err());
    }
}
