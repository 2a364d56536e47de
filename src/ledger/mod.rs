//! Rule and transaction models plus the recurrence expanders.

pub mod calendar;
pub mod payroll;
pub mod recurring;
pub mod transaction;

pub use calendar::{parse_iso_date, DateWindow};
pub use payroll::{expand_payroll, PayrollOccurrence, PayrollRule, SalaryType};
pub use recurring::{
    expand, Expansion, Occurrence, RecurrencePeriod, RecurringExpenseRule, MAX_EXPANSION_STEPS,
};
pub use transaction::{
    classify, Classification, ItemKind, LedgerTransaction, Mode, TransactionType, TransferType,
    VariableExpense,
};
