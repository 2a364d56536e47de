use chrono::NaiveDate;
use thiserror::Error;

/// Failure to read a `YYYY-MM-DD` calendar date from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("date `{0}` is not in YYYY-MM-DD form")]
    Malformed(String),
    #[error("date `{0}` does not exist in the calendar")]
    OutOfRange(String),
}

/// Configuration problems on a single rule. The rule contributes no
/// occurrences; the caller reports the error and carries on with other rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule `{name}` ends on {end} before it starts on {start}")]
    EndBeforeStart {
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("rule `{0}` has a negative amount")]
    NegativeAmount(String),
    #[error("biweekly payroll requires an anchor date")]
    MissingAnchor,
    #[error("payroll salary must not be negative")]
    NegativeSalary,
}

/// Crate-level error type for everything that is not a per-rule data problem.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid date: {0}")]
    Date(#[from] DateParseError),
    #[error("Invalid window: {end} is before {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Unknown owner: {0}")]
    UnknownOwner(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
