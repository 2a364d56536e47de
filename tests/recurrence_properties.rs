mod common;

use budget_calendar::ledger::{
    expand, expand_payroll, parse_iso_date, DateWindow, PayrollRule, RecurrencePeriod,
};
use chrono::Datelike;
use common::{date, dec, rule};

#[test]
fn monthly_rule_on_the_31st_clamps_to_short_months() {
    let rent = rule("Rent", "950.00", date(2024, 1, 31), RecurrencePeriod::Monthly);
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 5, 31)).unwrap();

    let dates: Vec<_> = expand(&rent, window)
        .unwrap()
        .occurrences
        .into_iter()
        .map(|o| o.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 4, 30),
            date(2024, 5, 31),
        ]
    );
}

#[test]
fn start_dates_are_read_as_calendar_days() {
    let start = parse_iso_date("2025-03-01").unwrap();
    assert_eq!(start, date(2025, 3, 1));
    assert_eq!(parse_iso_date("2025-03-01T00:00:00Z").unwrap(), start);

    let once = rule("Insurance", "300.00", start, RecurrencePeriod::None);
    let march = DateWindow::month(2025, 3).unwrap();
    let february = DateWindow::month(2025, 2).unwrap();

    assert_eq!(expand(&once, march).unwrap().len(), 1);
    assert!(expand(&once, february).unwrap().is_empty());
}

#[test]
fn weekly_rule_over_a_year_stays_inside_the_window() {
    let coffee = rule("Coffee", "12.50", date(2020, 6, 3), RecurrencePeriod::Weekly);
    let window = DateWindow::year(2025).unwrap();

    let expansion = expand(&coffee, window).unwrap();

    assert!((52..=53).contains(&expansion.len()));
    assert!(expansion.occurrences.iter().all(|o| window.contains(o.date)));
    assert!(expansion
        .occurrences
        .windows(2)
        .all(|pair| (pair[1].date - pair[0].date).num_days() == 7));
    assert!(!expansion.truncated);
}

#[test]
fn biweekly_anchor_years_back_does_not_walk_every_period() {
    let today = date(2025, 6, 1);
    let payroll = PayrollRule::biweekly(dec("2100.00"), date(2022, 6, 3));
    let window = DateWindow::months_from(today, 1).unwrap();

    let expansion = expand_payroll(&payroll, window).unwrap();

    assert!((2..=3).contains(&expansion.len()));
    assert!(expansion.iterations <= 4, "iterations = {}", expansion.iterations);
    for occurrence in &expansion.occurrences {
        assert_eq!((occurrence.date - date(2022, 6, 3)).num_days() % 14, 0);
        assert_eq!(occurrence.amount, dec("2100.00"));
    }
}

#[test]
fn old_monthly_rule_jumps_straight_to_the_window() {
    let phone = rule("Phone", "45.00", date(1990, 1, 20), RecurrencePeriod::Monthly);
    let window = DateWindow::month(2025, 7).unwrap();

    let expansion = expand(&phone, window).unwrap();

    assert_eq!(expansion.len(), 1);
    assert_eq!(expansion.occurrences[0].date, date(2025, 7, 20));
    assert!(expansion.iterations <= 3);
}

#[test]
fn annual_payroll_pays_a_twelfth_on_each_first() {
    let payroll = PayrollRule::annual(dec("60000"));
    let expansion = expand_payroll(&payroll, DateWindow::year(2025).unwrap()).unwrap();

    assert_eq!(expansion.len(), 12);
    assert!(expansion.occurrences.iter().all(|o| o.date.day() == 1));
    assert!(expansion.occurrences.iter().all(|o| o.amount == dec("5000")));
}

#[test]
fn annual_payroll_pays_every_month_a_rolling_window_touches() {
    let payroll = PayrollRule::annual(dec("60000"));
    let window = DateWindow::months_from(date(2025, 1, 15), 2).unwrap();

    let expansion = expand_payroll(&payroll, window).unwrap();
    let dates: Vec<_> = expansion.occurrences.iter().map(|o| o.date).collect();

    assert_eq!(
        dates,
        vec![date(2025, 1, 15), date(2025, 2, 1), date(2025, 3, 1)]
    );
}
