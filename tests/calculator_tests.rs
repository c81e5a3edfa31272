use pretty_assertions::assert_eq;
use test_case::test_case;

use finplan_domain::{Currency, FinanceError, FinancialCalculator, Money, Rate};

fn yen(amount: f64) -> Money {
    Money::jpy(amount).unwrap()
}

fn percent(value: f64) -> Rate {
    Rate::from_percentage(value).unwrap()
}

#[test]
fn ten_years_at_five_percent() {
    let result = FinancialCalculator::new()
        .compound_interest(&yen(1_000_000.0), percent(5.0), 10)
        .unwrap();

    assert_eq!(result.final_amount, yen(1_628_894.63));
    assert_eq!(result.interest_earned, yen(628_894.63));
    assert_eq!(result.total_contribution, yen(1_000_000.0));
    assert!(result.effective_rate.approx_eq(percent(5.0)));
}

#[test_case(0, 1_000_000.0 ; "no periods")]
#[test_case(1, 1_050_000.0 ; "one period")]
#[test_case(2, 1_102_500.0 ; "two periods")]
fn future_value_reference(periods: i32, expected: f64) {
    let value = FinancialCalculator::new()
        .future_value(&yen(1_000_000.0), percent(5.0), periods)
        .unwrap();
    assert_eq!(value, yen(expected));
}

#[test]
fn present_value_discounts_future_value() {
    let calc = FinancialCalculator::new();
    let future = calc.future_value(&yen(500_000.0), percent(3.0), 20).unwrap();
    let present = calc.present_value(&future, percent(3.0), 20).unwrap();
    assert!(present.equals(&yen(500_000.0)).unwrap());
}

#[test]
fn retirement_needs_without_inflation() {
    let result = FinancialCalculator::new()
        .retirement_needs(&yen(300_000.0), 25, Rate::zero(), &yen(150_000.0))
        .unwrap();

    assert_eq!(result.monthly_needs, yen(150_000.0));
    assert_eq!(result.total_needs, yen(45_000_000.0));
    assert_eq!(result.pension_coverage, yen(45_000_000.0));
    assert_eq!(result.additional_required, result.total_needs);
    assert!(!result.inflation_adjusted);
}

#[test]
fn inflation_raises_retirement_needs() {
    let calc = FinancialCalculator::new();
    let flat = calc
        .retirement_needs(&yen(300_000.0), 25, Rate::zero(), &yen(150_000.0))
        .unwrap();
    let inflated = calc
        .retirement_needs(&yen(300_000.0), 25, percent(2.0), &yen(150_000.0))
        .unwrap();

    assert!(inflated.inflation_adjusted);
    assert!(inflated.total_needs.greater_than(&flat.total_needs).unwrap());
}

#[test]
fn debt_at_zero_interest_rounds_months_up() {
    let months = FinancialCalculator::new()
        .debt_payoff_months(&yen(1_050_000.0), &yen(100_000.0), Rate::zero())
        .unwrap();
    assert_eq!(months, 11);
}

#[test_case(-1 ; "minus one")]
#[test_case(i32::MIN ; "minimum")]
fn negative_periods_are_rejected(periods: i32) {
    let calc = FinancialCalculator::new();
    let err = calc
        .compound_interest(&yen(1.0), percent(1.0), periods)
        .unwrap_err();
    assert!(matches!(err, FinanceError::InvalidPeriod(_)));
    assert!(calc.future_value(&yen(1.0), percent(1.0), periods).is_err());
    assert!(calc.present_value(&yen(1.0), percent(1.0), periods).is_err());
}

#[test]
fn savings_rate_needs_matching_currencies() {
    let usd = Money::new(1_000.0, Currency::USD).unwrap();
    let err = FinancialCalculator::new()
        .required_savings_rate(&yen(5_000_000.0), &yen(10_000_000.0), &usd, percent(3.0), 10)
        .unwrap_err();
    assert!(matches!(err, FinanceError::CurrencyMismatch { .. }));
}

#[test_case(400_000_000 ; "past the month counter")]
#[test_case(i32::MAX ; "maximum")]
fn very_long_horizons_are_invalid_periods(years: i32) {
    let calc = FinancialCalculator::new();

    let needs = calc.retirement_needs(&yen(100.0), years, Rate::zero(), &yen(50.0));
    assert!(matches!(needs, Err(FinanceError::InvalidPeriod(_))));

    let grown =
        calc.compound_interest_with_regular_payments(&yen(100.0), &yen(10.0), percent(1.0), years);
    assert!(matches!(grown, Err(FinanceError::InvalidPeriod(_))));
}
