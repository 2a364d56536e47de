use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::calendar::{self, DateWindow};
use crate::errors::RuleError;

/// Hard cap on loop iterations for a single expansion.
pub const MAX_EXPANSION_STEPS: usize = 10_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriod {
    #[default]
    None,
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(i64),
    Months(i64),
}

impl RecurrencePeriod {
    fn step(self) -> Option<Step> {
        match self {
            RecurrencePeriod::None => None,
            RecurrencePeriod::Weekly => Some(Step::Days(7)),
            RecurrencePeriod::Biweekly => Some(Step::Days(14)),
            RecurrencePeriod::Monthly => Some(Step::Months(1)),
            RecurrencePeriod::Bimonthly => Some(Step::Months(2)),
            RecurrencePeriod::Quarterly => Some(Step::Months(3)),
            RecurrencePeriod::Yearly => Some(Step::Months(12)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecurrencePeriod::None => "Once",
            RecurrencePeriod::Weekly => "Weekly",
            RecurrencePeriod::Biweekly => "Every 2 Weeks",
            RecurrencePeriod::Monthly => "Monthly",
            RecurrencePeriod::Bimonthly => "Every 2 Months",
            RecurrencePeriod::Quarterly => "Quarterly",
            RecurrencePeriod::Yearly => "Yearly",
        }
    }
}

/// A fixed expense that repeats on a calendar schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpenseRule {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    #[serde(with = "calendar::serde_iso")]
    pub start_date: NaiveDate,
    #[serde(default, with = "calendar::serde_iso_opt")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: RecurrencePeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RecurringExpenseRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: Decimal,
        start_date: NaiveDate,
        recurrence: RecurrencePeriod,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            start_date,
            end_date: None,
            recurrence,
            category: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(RuleError::NegativeAmount(self.name.clone()));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RuleError::EndBeforeStart {
                    name: self.name.clone(),
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub name: String,
    pub amount: Decimal,
    pub rule_id: String,
    pub category: Option<String>,
}

/// Result of expanding one rule over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion<T> {
    pub occurrences: Vec<T>,
    /// Loop iterations performed; exposed so callers and tests can check
    /// that long-lived rules are not walked period by period.
    pub iterations: usize,
    /// Set when the iteration guard aborted the loop.
    pub truncated: bool,
}

impl<T> Default for Expansion<T> {
    fn default() -> Self {
        Self {
            occurrences: Vec::new(),
            iterations: 0,
            truncated: false,
        }
    }
}

impl<T> Expansion<T> {
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Counts one loop iteration; `false` once the guard trips.
    pub(crate) fn tick(&mut self, label: &str) -> bool {
        if self.iterations >= MAX_EXPANSION_STEPS {
            error!(
                rule = label,
                steps = self.iterations,
                "expansion hit the iteration guard; aborting"
            );
            self.truncated = true;
            return false;
        }
        self.iterations += 1;
        true
    }
}

/// Every date on which `rule` falls inside `window`, in ascending order.
///
/// Occurrences are always computed from the rule's own start date. Month-based
/// periods land on the start date's day-of-month, clamped to shorter months,
/// so a rule starting Jan 31 falls on Feb 28 and then Mar 31.
pub fn expand(
    rule: &RecurringExpenseRule,
    window: DateWindow,
) -> Result<Expansion<Occurrence>, RuleError> {
    rule.validate()?;
    let mut expansion = Expansion::default();

    let bound = match rule.end_date {
        Some(end) => window.end.min(end),
        None => window.end,
    };
    if rule.start_date > bound || bound < window.start {
        return Ok(expansion);
    }

    let occurrence = |date: NaiveDate| Occurrence {
        date,
        name: rule.name.clone(),
        amount: rule.amount,
        rule_id: rule.id.clone(),
        category: rule.category.clone(),
    };

    match rule.recurrence.step() {
        None => {
            expansion.tick(&rule.name);
            if window.contains(rule.start_date) {
                expansion.occurrences.push(occurrence(rule.start_date));
            }
        }
        Some(Step::Days(days)) => {
            let mut k = periods_until(rule.start_date, window.start, days);
            loop {
                if !expansion.tick(&rule.name) {
                    break;
                }
                let date = rule.start_date + Duration::days(k * days);
                if date > bound {
                    break;
                }
                expansion.occurrences.push(occurrence(date));
                k += 1;
            }
        }
        Some(Step::Months(months)) => {
            let day_of_month = rule.start_date.day();
            let gap = calendar::month_index(window.start) - calendar::month_index(rule.start_date);
            let mut k = gap.max(0).div_euclid(months);
            loop {
                if !expansion.tick(&rule.name) {
                    break;
                }
                let next = calendar::add_months_clamped(rule.start_date, k * months, day_of_month);
                let Some(date) = next else {
                    warn!(
                        rule = %rule.name,
                        step = k,
                        "recurrence ran past the calendar; stopping"
                    );
                    expansion.truncated = true;
                    break;
                };
                if date > bound {
                    break;
                }
                if date >= window.start {
                    expansion.occurrences.push(occurrence(date));
                }
                k += 1;
            }
        }
    }

    debug!(
        rule = %rule.name,
        recurrence = rule.recurrence.label(),
        occurrences = expansion.len(),
        iterations = expansion.iterations,
        "expanded recurring rule"
    );
    Ok(expansion)
}

/// Whole periods of `step_days` needed to get from `anchor` to on or after `target`.
pub(crate) fn periods_until(anchor: NaiveDate, target: NaiveDate, step_days: i64) -> i64 {
    let gap = (target - anchor).num_days();
    if gap <= 0 {
        0
    } else {
        (gap + step_days - 1) / step_days
    }
}
