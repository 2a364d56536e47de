#![allow(dead_code)]

use budget_calendar::ledger::{RecurrencePeriod, RecurringExpenseRule};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal")
}

pub fn rule(
    name: &str,
    amount: &str,
    start: NaiveDate,
    recurrence: RecurrencePeriod,
) -> RecurringExpenseRule {
    RecurringExpenseRule::new(name.to_lowercase(), name, dec(amount), start, recurrence)
}

/// Snapshot with one owner whose personal book exercises every record kind.
pub const SNAPSHOT_JSON: &str = r#"{
  "owners": {
    "alice": {
      "personal": {
        "recurringExpenses": [
          {"id": "rent", "name": "Rent", "amount": "1200.00", "startDate": "2025-01-01", "recurrence": "monthly"},
          {"id": "bad", "name": "Broken", "amount": "10.00", "startDate": "2025-13-01", "recurrence": "monthly"},
          {"id": "gym", "name": "Gym", "amount": "25.00", "startDate": "2025-01-06", "endDate": "2025-03-31", "recurrence": "weekly"}
        ],
        "payroll": {"salaryType": "biweekly", "salary": "2100.00", "anchorDate": "2022-01-07"},
        "variableExpenses": [
          {"id": "v1", "name": "Dentist", "amount": "180.00", "date": "2025-02-12"},
          {"id": "v2", "name": "Old", "amount": "50.00", "date": "2024-12-30"}
        ],
        "transactions": [
          {"id": "t1", "date": "2025-01-15", "amount": "300.00", "type": "depense", "description": "Groceries"},
          {"id": "t2", "date": "2025-01-20", "amount": "500.00", "type": "transfert", "transferType": "between_accounts", "description": "To savings"},
          {"id": "t3", "date": "2025-01-21", "amount": "60.00", "type": "transfert", "transferType": "between_persons", "description": "Split dinner"},
          {"id": "t4", "date": "2024-06-01", "amount": "1.00", "type": "depense", "description": "Last year"}
        ]
      },
      "business": {
        "recurringExpenses": [
          {"id": "sw", "name": "Software", "amount": "49.00", "startDate": "2024-11-30", "recurrence": "quarterly"}
        ],
        "payroll": {"salaryType": "annual", "salary": "90000"},
        "transactions": [
          {"id": "b1", "date": "2025-03-03", "amount": "2500.00", "type": "income", "description": "Invoice 42"},
          {"id": "b2", "date": "2025-03-04", "amount": "40.00", "type": "depense", "description": "Lunch"}
        ]
      }
    }
  }
}"#;
