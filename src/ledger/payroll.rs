use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::calendar::{self, DateWindow};
use super::recurring::{periods_until, Expansion};
use crate::errors::RuleError;

pub const PAY_PERIOD_DAYS: i64 = 14;
pub const PAY_PERIODS_PER_YEAR: u32 = 26;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalaryType {
    /// `salary` is the annual gross, paid in twelve slices on the 1st.
    #[default]
    Annual,
    /// `salary` is the gross of one 14-day pay period.
    Biweekly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRule {
    #[serde(default)]
    pub salary_type: SalaryType,
    pub salary: Decimal,
    #[serde(default, with = "calendar::serde_iso_opt")]
    pub anchor_date: Option<NaiveDate>,
}

impl PayrollRule {
    pub fn annual(salary: Decimal) -> Self {
        Self {
            salary_type: SalaryType::Annual,
            salary,
            anchor_date: None,
        }
    }

    pub fn biweekly(salary: Decimal, anchor_date: NaiveDate) -> Self {
        Self {
            salary_type: SalaryType::Biweekly,
            salary,
            anchor_date: Some(anchor_date),
        }
    }

    /// Gross pay over a full year.
    pub fn annualized(&self) -> Decimal {
        match self.salary_type {
            SalaryType::Annual => self.salary,
            SalaryType::Biweekly => self.salary * Decimal::from(PAY_PERIODS_PER_YEAR),
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.salary.is_sign_negative() && !self.salary.is_zero() {
            return Err(RuleError::NegativeSalary);
        }
        if self.salary_type == SalaryType::Biweekly && self.anchor_date.is_none() {
            return Err(RuleError::MissingAnchor);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PayrollOccurrence {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Pay dates of `rule` inside `window`.
///
/// Annual salaries pay `salary / 12` once for every month the window touches,
/// on the 1st, or on `window.start` for a month the window enters mid-way.
/// Biweekly salaries pay every 14 days from the anchor; the first in-window
/// pay date is computed directly, so an anchor years in the past costs no
/// more than a fresh one.
pub fn expand_payroll(
    rule: &PayrollRule,
    window: DateWindow,
) -> Result<Expansion<PayrollOccurrence>, RuleError> {
    rule.validate()?;
    let mut expansion = Expansion::default();

    match rule.salary_type {
        SalaryType::Annual => {
            let monthly = rule.salary / Decimal::from(12);
            let first = calendar::month_index(window.start);
            let last = calendar::month_index(window.end);
            for offset in 0..=(last - first) {
                if !expansion.tick("payroll") {
                    break;
                }
                let Some(first_of_month) = calendar::add_months_clamped(window.start, offset, 1)
                else {
                    warn!(offset, "annual payroll ran past the calendar; stopping");
                    expansion.truncated = true;
                    break;
                };
                // A month the window only partly covers is paid on its first
                // in-window day.
                expansion.occurrences.push(PayrollOccurrence {
                    date: first_of_month.max(window.start),
                    amount: monthly,
                });
            }
        }
        SalaryType::Biweekly => {
            let anchor = rule.anchor_date.ok_or(RuleError::MissingAnchor)?;
            let mut k = periods_until(anchor, window.start, PAY_PERIOD_DAYS);
            loop {
                if !expansion.tick("payroll") {
                    break;
                }
                let date = anchor + Duration::days(k * PAY_PERIOD_DAYS);
                if date > window.end {
                    break;
                }
                expansion.occurrences.push(PayrollOccurrence {
                    date,
                    amount: rule.salary,
                });
                k += 1;
            }
        }
    }

    debug!(
        salary_type = ?rule.salary_type,
        occurrences = expansion.len(),
        iterations = expansion.iterations,
        "expanded payroll"
    );
    Ok(expansion)
}
