//! The three places that render projections (the live calendar, the budget
//! loader and the yearly dashboard) all go through [`Projector`], which only
//! differs in the window it asks for.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::cache::ProjectionCache;
use super::daily::{DailyBucket, DailyProjection, ProjectionInputs, ProjectionIssue};
use super::monthly::{aggregate_by_month, aggregate_period, MonthlyAggregate, PeriodTotals};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::ledger::{calendar, DateWindow, ItemKind, Mode};
use crate::time::{Clock, SystemClock};

/// Totals for a displayed month, split into planned and actual channels.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub planned_income: Decimal,
    pub planned_expense: Decimal,
    pub actual_income: Decimal,
    pub actual_expense: Decimal,
}

impl MonthSummary {
    fn from_buckets(buckets: &BTreeMap<NaiveDate, DailyBucket>) -> Self {
        let mut summary = MonthSummary::default();
        for item in buckets.values().flat_map(|b| &b.items).filter(|i| i.counted) {
            match (item.kind, item.source.is_planned()) {
                (ItemKind::Income, true) => summary.planned_income += item.amount,
                (ItemKind::Income, false) => summary.actual_income += item.amount,
                (ItemKind::Expense, true) => summary.planned_expense += item.amount,
                (ItemKind::Expense, false) => summary.actual_expense += item.amount,
            }
        }
        summary.income = summary.planned_income + summary.actual_income;
        summary.expense = summary.planned_expense + summary.actual_expense;
        summary.net = summary.income - summary.expense;
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub window: DateWindow,
    pub days: BTreeMap<NaiveDate, DailyBucket>,
    pub summary: MonthSummary,
    pub issues: Vec<ProjectionIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardYear {
    pub year: i32,
    pub months: [MonthlyAggregate; 12],
    pub totals: PeriodTotals,
    pub issues: Vec<ProjectionIssue>,
}

/// Runs projections for one configuration, clock and cache.
pub struct Projector {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    cache: ProjectionCache,
}

impl Projector {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: EngineConfig, clock: impl Clock + 'static) -> Self {
        let cache = ProjectionCache::from_config(&config);
        Self {
            config,
            clock: Box::new(clock),
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn cache(&self) -> &ProjectionCache {
        &self.cache
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Last day the calendar projects open-ended rules to.
    pub fn calendar_horizon(&self) -> Option<NaiveDate> {
        let today = self.clock.today();
        calendar::add_months_clamped(
            today,
            self.config.calendar_horizon_months as i64,
            today.day(),
        )
    }

    /// One calendar month, with open-ended rules cut off at the horizon.
    pub fn calendar_month(
        &mut self,
        inputs: &ProjectionInputs,
        year: i32,
        month: u32,
    ) -> Result<CalendarMonth, EngineError> {
        let window = DateWindow::month(year, month)?;
        let horizon = self.calendar_horizon();
        let projection =
            self.cache
                .get_or_build(self.clock.as_ref(), inputs, self.config.mode, window, horizon);
        let summary = MonthSummary::from_buckets(&projection.buckets);
        Ok(CalendarMonth {
            year,
            month,
            window,
            days: projection.buckets,
            summary,
            issues: projection.issues,
        })
    }

    pub fn current_calendar_month(
        &mut self,
        inputs: &ProjectionInputs,
    ) -> Result<CalendarMonth, EngineError> {
        let today = self.clock.today();
        self.calendar_month(inputs, today.year(), today.month())
    }

    /// An arbitrary window, bounded only by the window and rule end dates.
    pub fn budget_window(
        &mut self,
        inputs: &ProjectionInputs,
        window: DateWindow,
    ) -> DailyProjection {
        self.cache
            .get_or_build(self.clock.as_ref(), inputs, self.config.mode, window, None)
    }

    /// Calendar year folded into twelve months.
    pub fn dashboard_year(
        &mut self,
        inputs: &ProjectionInputs,
        year: i32,
    ) -> Result<DashboardYear, EngineError> {
        let window = DateWindow::year(year)?;
        let projection = self.budget_window(inputs, window);
        Ok(DashboardYear {
            year,
            months: aggregate_by_month(&projection.buckets, year),
            totals: aggregate_period(&projection.buckets, window),
            issues: projection.issues,
        })
    }

    pub fn current_dashboard_year(
        &mut self,
        inputs: &ProjectionInputs,
    ) -> Result<DashboardYear, EngineError> {
        let year = self.clock.today().year();
        self.dashboard_year(inputs, year)
    }

    /// Totals for the configured fiscal year starting in `year`.
    pub fn fiscal_year(
        &mut self,
        inputs: &ProjectionInputs,
        year: i32,
    ) -> Result<PeriodTotals, EngineError> {
        let window = DateWindow::fiscal_year(year, self.config.fiscal_start_month())?;
        let projection = self.budget_window(inputs, window);
        Ok(aggregate_period(&projection.buckets, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        LedgerTransaction, PayrollRule, RecurrencePeriod, RecurringExpenseRule, TransactionType,
    };
    use crate::time::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs() -> ProjectionInputs {
        ProjectionInputs {
            recurring_rules: vec![RecurringExpenseRule::new(
                "rent",
                "Rent",
                Decimal::from(1000),
                date(2025, 1, 1),
                RecurrencePeriod::Monthly,
            )],
            payroll: Some(PayrollRule::annual(Decimal::from(36_000))),
            variable_expenses: Vec::new(),
            transactions: vec![LedgerTransaction::new(
                date(2025, 1, 1),
                Decimal::from(990),
                "Rent paid",
                TransactionType::Depense,
            )],
        }
    }

    #[test]
    fn calendar_month_splits_planned_and_actual() {
        let mut projector =
            Projector::with_clock(EngineConfig::default(), FixedClock::on(date(2025, 1, 10)));
        let view = projector.calendar_month(&inputs(), 2025, 1).unwrap();
        assert_eq!(view.summary.planned_income, Decimal::from(3000));
        assert_eq!(view.summary.planned_expense, Decimal::from(1000));
        assert_eq!(view.summary.actual_expense, Decimal::from(990));
        assert_eq!(view.summary.expense, Decimal::from(1990));
        assert_eq!(view.summary.net, Decimal::from(1010));
    }

    #[test]
    fn calendar_stops_open_ended_rules_at_the_horizon() {
        let mut projector =
            Projector::with_clock(EngineConfig::default(), FixedClock::on(date(2025, 1, 10)));
        let inside = projector.calendar_month(&inputs(), 2025, 7).unwrap();
        assert_eq!(inside.summary.planned_expense, Decimal::from(1000));
        let beyond = projector.calendar_month(&inputs(), 2025, 8).unwrap();
        assert_eq!(beyond.summary.planned_expense, Decimal::ZERO);
        assert_eq!(beyond.summary.planned_income, Decimal::from(3000));
    }

    #[test]
    fn dashboard_year_is_bounded_by_the_year_only() {
        let mut projector =
            Projector::with_clock(EngineConfig::default(), FixedClock::on(date(2025, 1, 10)));
        let dashboard = projector.dashboard_year(&inputs(), 2025).unwrap();
        assert_eq!(dashboard.months[11].expenses, Decimal::from(1000));
        assert_eq!(dashboard.totals.revenue, Decimal::from(36_000));
        assert_eq!(dashboard.totals.expenses, Decimal::from(12_990));
    }

    #[test]
    fn repeated_views_hit_the_cache() {
        let mut projector =
            Projector::with_clock(EngineConfig::default(), FixedClock::on(date(2025, 1, 10)));
        projector.dashboard_year(&inputs(), 2025).unwrap();
        projector.dashboard_year(&inputs(), 2025).unwrap();
        assert_eq!(projector.cache().hits(), 1);
    }

    #[test]
    fn fiscal_year_uses_configured_start_month() {
        let config = EngineConfig {
            fiscal_year_start_month: 4,
            ..EngineConfig::default()
        };
        let mut projector = Projector::with_clock(config, FixedClock::on(date(2025, 1, 10)));
        let totals = projector.fiscal_year(&inputs(), 2025).unwrap();
        assert_eq!(totals.window.start, date(2025, 4, 1));
        assert_eq!(totals.expenses, Decimal::from(12_000));
    }
}
