mod common;

use budget_calendar::ledger::{
    DateWindow, LedgerTransaction, Mode, PayrollRule, RecurrencePeriod, TransactionType,
    TransferType, VariableExpense,
};
use budget_calendar::projection::{
    aggregate_by_month, build_daily_buckets, build_daily_buckets_with_horizon, ItemSource,
    ProjectionInputs, ProjectionIssue,
};
use common::{date, dec, rule};
use rust_decimal::Decimal;

fn transfer(day: u32, amount: &str, transfer_type: TransferType) -> LedgerTransaction {
    LedgerTransaction::new(
        date(2025, 1, day),
        dec(amount),
        "transfer",
        TransactionType::Transfert,
    )
    .with_transfer_type(transfer_type)
}

#[test]
fn transfers_between_own_accounts_are_not_cash_flow() {
    let inputs = ProjectionInputs {
        transactions: vec![
            transfer(10, "500.00", TransferType::BetweenAccounts),
            transfer(11, "60.00", TransferType::BetweenPersons),
        ],
        ..ProjectionInputs::default()
    };

    let projection =
        build_daily_buckets(&inputs, Mode::Personal, DateWindow::month(2025, 1).unwrap());

    assert!(!projection.buckets.contains_key(&date(2025, 1, 10)));
    assert_eq!(projection.total_income(), Decimal::ZERO);
    assert_eq!(projection.total_expense(), dec("60.00"));
}

#[test]
fn building_twice_gives_the_same_buckets() {
    let inputs = ProjectionInputs {
        recurring_rules: vec![
            rule("Rent", "1200", date(2024, 1, 1), RecurrencePeriod::Monthly),
            rule("Gym", "25", date(2024, 1, 2), RecurrencePeriod::Weekly),
        ],
        payroll: Some(PayrollRule::biweekly(dec("1800"), date(2023, 1, 6))),
        variable_expenses: vec![VariableExpense::new("Dentist", dec("180"), date(2025, 2, 12))],
        transactions: vec![LedgerTransaction::new(
            date(2025, 2, 12),
            dec("42.10"),
            "Groceries",
            TransactionType::Depense,
        )],
    };
    let window = DateWindow::year(2025).unwrap();

    let first = build_daily_buckets(&inputs, Mode::Personal, window);
    let second = build_daily_buckets(&inputs, Mode::Personal, window);

    assert_eq!(first, second);
    assert_eq!(first.keyed(), second.keyed());
}

#[test]
fn monthly_totals_reconcile_with_occurrences() {
    let inputs = ProjectionInputs {
        recurring_rules: vec![rule("Rent", "100", date(2025, 1, 15), RecurrencePeriod::Monthly)],
        ..ProjectionInputs::default()
    };

    let projection =
        build_daily_buckets(&inputs, Mode::Personal, DateWindow::year(2025).unwrap());
    let months = aggregate_by_month(&projection.buckets, 2025);

    assert_eq!(projection.buckets.len(), 12);
    assert!(projection.buckets.keys().all(|d| chrono::Datelike::day(d) == 15));
    assert!(months.iter().all(|m| m.expenses == dec("100")));
    let total: Decimal = months.iter().map(|m| m.expenses).sum();
    assert_eq!(total, dec("1200"));
    assert_eq!(total, projection.total_expense());
}

#[test]
fn planned_and_actual_on_the_same_day_are_both_counted() {
    let inputs = ProjectionInputs {
        recurring_rules: vec![rule("Hydro", "80", date(2025, 1, 5), RecurrencePeriod::Monthly)],
        transactions: vec![LedgerTransaction::new(
            date(2025, 3, 5),
            dec("83.40"),
            "Hydro bill",
            TransactionType::PaiementFacture,
        )],
        ..ProjectionInputs::default()
    };

    let projection =
        build_daily_buckets(&inputs, Mode::Personal, DateWindow::month(2025, 3).unwrap());
    let bucket = &projection.buckets[&date(2025, 3, 5)];

    assert_eq!(bucket.expense, dec("163.40"));
    let sources: Vec<_> = bucket.items.iter().map(|i| i.source).collect();
    assert_eq!(sources, vec![ItemSource::Recurring, ItemSource::Ledger]);
}

#[test]
fn horizon_only_limits_open_ended_rules() {
    let inputs = ProjectionInputs {
        recurring_rules: vec![
            rule("Open", "10", date(2025, 1, 1), RecurrencePeriod::Monthly),
            rule("Bounded", "20", date(2025, 1, 1), RecurrencePeriod::Monthly)
                .with_end_date(date(2025, 12, 31)),
        ],
        ..ProjectionInputs::default()
    };

    let projection = build_daily_buckets_with_horizon(
        &inputs,
        Mode::Personal,
        DateWindow::year(2025).unwrap(),
        Some(date(2025, 6, 30)),
    );

    let open = projection
        .buckets
        .values()
        .flat_map(|b| &b.items)
        .filter(|i| i.name == "Open")
        .count();
    let bounded = projection
        .buckets
        .values()
        .flat_map(|b| &b.items)
        .filter(|i| i.name == "Bounded")
        .count();
    assert_eq!(open, 6);
    assert_eq!(bounded, 12);
}

#[test]
fn bad_records_are_reported_and_the_rest_still_projects() {
    let mut broken = LedgerTransaction::new(
        date(2025, 1, 1),
        dec("10"),
        "broken",
        TransactionType::Depense,
    );
    broken.date = "not-a-date".to_string();
    let inputs = ProjectionInputs {
        recurring_rules: vec![
            rule("Backwards", "10", date(2025, 5, 1), RecurrencePeriod::Monthly)
                .with_end_date(date(2025, 1, 1)),
            rule("Fine", "10", date(2025, 1, 1), RecurrencePeriod::Monthly),
        ],
        transactions: vec![broken],
        ..ProjectionInputs::default()
    };

    let projection =
        build_daily_buckets(&inputs, Mode::Personal, DateWindow::year(2025).unwrap());

    assert_eq!(projection.total_expense(), dec("120"));
    assert_eq!(projection.issues.len(), 2);
    assert!(matches!(projection.issues[0], ProjectionIssue::Rule { .. }));
    assert!(matches!(
        projection.issues[1],
        ProjectionIssue::UnreadableDate { .. }
    ));
}
