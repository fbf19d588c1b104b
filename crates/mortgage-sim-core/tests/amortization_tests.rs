use mortgage_sim_core::amortization::installment::InstallmentMethod;
use mortgage_sim_core::amortization::simulator::{AmortizationRow, SAFETY_CEILING_MONTHS};
use mortgage_sim_core::amortization::{simulate_mortgage, LoanParameters, SimulationResult};
use mortgage_sim_core::MortgageSimError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 1.01^12 - 1: the effective annual rate equivalent to exactly 1% a month.
const EA_ONE_PERCENT_MONTHLY: Decimal = dec!(0.126825030131969720661201);

fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tol,
        "{}: expected ~{}, got {} (diff = {})",
        msg,
        expected,
        actual,
        diff
    );
}

fn plain_loan(rate_ea: Decimal) -> LoanParameters {
    LoanParameters {
        insurance_indexed: false,
        ..LoanParameters::new(dec!(100_000_000), rate_ea, 120)
    }
}

fn run(params: &LoanParameters) -> SimulationResult {
    simulate_mortgage(params).unwrap().result
}

/// Insurance, indexing, subsidy and every extra-payment feature at once.
fn full_strategy_indexed() -> LoanParameters {
    LoanParameters {
        loan_amount: dec!(180_000_000),
        rate_ea: dec!(0.085),
        months: Some(240),
        insurance: dec!(65_000),
        insurance_indexed: true,
        extra_monthly: dec!(400_000),
        seasonal_doubling: true,
        one_time_payment: dec!(5_000_000),
        annual_increase: dec!(0.05),
        is_indexed: true,
        unit_value: Some(dec!(360.5432)),
        inflation: dec!(0.045),
        has_subsidy: true,
        subsidy_points: dec!(0.04),
        subsidy_remaining_months: Some(60),
        ..LoanParameters::default()
    }
}

fn full_strategy_currency() -> LoanParameters {
    LoanParameters {
        loan_amount: dec!(180_000_000),
        rate_ea: dec!(0.135),
        months: Some(240),
        insurance: dec!(65_000),
        insurance_indexed: true,
        extra_monthly: dec!(400_000),
        seasonal_doubling: true,
        one_time_payment: dec!(2_000_000),
        annual_increase: dec!(0.03),
        inflation: dec!(0.045),
        has_subsidy: true,
        subsidy_points: dec!(0.04),
        ..LoanParameters::default()
    }
}

// ===========================================================================
// Scenario A: standard PMT, no extras
// ===========================================================================

#[test]
fn test_scenario_a_standard_annuity() {
    let result = run(&plain_loan(EA_ONE_PERCENT_MONTHLY));
    let m = &result.metrics;

    assert_close(m.monthly_rate, dec!(0.01), dec!(0.000000001), "monthly rate");
    assert_close(m.monthly_obligatory, dec!(1_434_709.48), dec!(1), "base installment");
    assert_eq!(m.installment_method, InstallmentMethod::AnnuityFormula);
    assert!(!m.is_calibrated);
    assert_eq!(result.schedule.len(), 120);
    assert_eq!(m.new_term, 120);
    assert_eq!(m.baseline_term, 120);
    assert_eq!(m.interest_saved, Decimal::ZERO);
    assert_eq!(m.months_saved, 0);
    assert!(m.settled);
    assert_eq!(result.schedule.last().unwrap().balance, Decimal::ZERO);
}

#[test]
fn test_twelve_percent_effective_annual_installment() {
    // (1.12)^(1/12) - 1 = 0.948879% per month
    let result = run(&plain_loan(dec!(0.12)));
    assert_close(
        result.metrics.monthly_obligatory,
        dec!(1_399_471.74),
        dec!(1),
        "12% EA installment",
    );
    assert_eq!(result.metrics.new_term, 120);
}

// ===========================================================================
// Scenario B: extra payment accelerates payoff
// ===========================================================================

#[test]
fn test_scenario_b_extra_payment_shortens_term() {
    let mut params = plain_loan(EA_ONE_PERCENT_MONTHLY);
    params.extra_monthly = dec!(500_000);
    let result = run(&params);
    let m = &result.metrics;

    assert!(result.schedule.len() < 120);
    assert!(m.months_saved > 0);
    assert!(m.interest_saved > Decimal::ZERO);
    assert!(m.total_payment_new < m.total_payment_original);
    assert!(m.time_reduction_pct > Decimal::ZERO);
    assert_eq!(m.baseline_term, 120);

    // First month pays the installment plus the extra.
    assert_close(
        m.monthly_total_effort,
        m.monthly_obligatory + dec!(500_000),
        dec!(0.000001),
        "first month effort",
    );
    assert!(m.effort_increase_pct > dec!(34) && m.effort_increase_pct < dec!(35));
}

// ===========================================================================
// Scenario C: calibration precedence
// ===========================================================================

#[test]
fn test_scenario_c_statement_breakdown_overrides_formula() {
    let params = LoanParameters {
        calibration_capital: Some(dec!(400_000)),
        calibration_interest: Some(dec!(1_000_000)),
        current_quota: Some(dec!(3_000_000)),
        insurance_indexed: false,
        ..LoanParameters::new(dec!(50_000_000), dec!(0.20), 60)
    };
    let result = run(&params);
    let m = &result.metrics;

    assert_eq!(m.monthly_obligatory, dec!(1_400_000));
    assert_eq!(m.installment_method, InstallmentMethod::StatementCapitalInterest);
    assert!(m.is_calibrated);
    // Implied rate from the statement: 1_000_000 / 50_000_000
    assert_eq!(m.monthly_rate, dec!(0.02));
    assert_eq!(result.schedule[0].interest_gross, dec!(1_000_000));
    assert_eq!(result.schedule[0].capital_base, dec!(400_000));
}

#[test]
fn test_statement_quota_without_term() {
    let params = LoanParameters {
        loan_amount: dec!(50_000_000),
        rate_ea: dec!(0.12),
        insurance: dec!(50_000),
        insurance_indexed: false,
        current_quota: Some(dec!(1_050_000)),
        ..LoanParameters::default()
    };
    let result = run(&params);
    let m = &result.metrics;
    assert_eq!(m.installment_method, InstallmentMethod::StatementQuota);
    assert_eq!(m.monthly_obligatory, dec!(1_050_000));
    // No term supplied: the baseline length stands in for it.
    assert_eq!(m.original_term, m.baseline_term);
    assert_eq!(m.months_saved, 0);
}

#[test]
fn test_missing_term_without_calibration_is_insufficient() {
    let params = LoanParameters {
        loan_amount: dec!(50_000_000),
        rate_ea: dec!(0.12),
        ..LoanParameters::default()
    };
    assert!(matches!(
        simulate_mortgage(&params),
        Err(MortgageSimError::InsufficientData(_))
    ));
}

// ===========================================================================
// Scenario D: subsidy clamp
// ===========================================================================

#[test]
fn test_scenario_d_subsidy_clamped_to_gross_interest() {
    let mut params = plain_loan(dec!(0.12));
    params.has_subsidy = true;
    params.subsidy_points = dec!(0.50);
    let result = run(&params);

    for row in &result.schedule {
        if row.month <= 84 {
            assert_eq!(row.subsidy, row.interest_gross, "month {}", row.month);
            assert_eq!(row.interest_net, Decimal::ZERO);
        } else {
            assert_eq!(row.subsidy, Decimal::ZERO, "month {}", row.month);
        }
    }
    assert!(result.metrics.has_subsidy);
    assert!(result.metrics.total_subsidy_benefit > Decimal::ZERO);
}

#[test]
fn test_known_subsidy_amount_respects_window() {
    let mut params = plain_loan(dec!(0.12));
    params.has_subsidy = true;
    params.subsidy_monthly_value = Some(dec!(300_000));
    params.subsidy_remaining_months = Some(24);
    let result = run(&params);

    assert_eq!(result.schedule[0].subsidy, dec!(300_000));
    assert!(result.schedule[23].subsidy > Decimal::ZERO);
    assert_eq!(result.schedule[24].subsidy, Decimal::ZERO);
}

// ===========================================================================
// Scenario E: non-convergence guard
// ===========================================================================

#[test]
fn test_scenario_e_stops_at_safety_ceiling() {
    let params = LoanParameters {
        current_quota: Some(dec!(500_000)),
        insurance_indexed: false,
        ..LoanParameters::new(dec!(100_000_000), dec!(0.12), 120)
    };
    let out = simulate_mortgage(&params).unwrap();
    let result = &out.result;

    assert_eq!(result.schedule.len(), SAFETY_CEILING_MONTHS as usize);
    assert!(!result.metrics.settled);
    assert_eq!(result.metrics.baseline_term, SAFETY_CEILING_MONTHS);
    assert_eq!(result.schedule.last().unwrap().balance, dec!(100_000_000));
    assert!(result.schedule.iter().all(|r| r.capital_total == Decimal::ZERO));
    assert_eq!(result.metrics.months_saved, 0);
    assert!(out.warnings.iter().any(|w| w.contains("did not settle")));
}

#[test]
fn test_runaway_insurance_inflation_is_an_error() {
    // Never settles, so indexed insurance compounds at 300% a year for 600
    // months.
    let params = LoanParameters {
        current_quota: Some(dec!(500_000)),
        insurance: dec!(100_000),
        insurance_indexed: true,
        inflation: dec!(3.0),
        ..LoanParameters::new(dec!(100_000_000), dec!(0.12), 120)
    };
    assert!(matches!(
        simulate_mortgage(&params),
        Err(MortgageSimError::FinancialImpossibility(_))
    ));
}

#[test]
fn test_runaway_unit_value_is_an_error() {
    let params = LoanParameters {
        is_indexed: true,
        unit_value: Some(dec!(360)),
        inflation: dec!(10.0),
        insurance_indexed: false,
        ..LoanParameters::new(dec!(100_000_000), dec!(0.12), 360)
    };
    assert!(matches!(
        simulate_mortgage(&params),
        Err(MortgageSimError::FinancialImpossibility(_))
    ));
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_zero_extras_match_baseline() {
    let params = LoanParameters {
        insurance: dec!(65_000),
        insurance_indexed: true,
        inflation: dec!(0.045),
        ..plain_loan(dec!(0.135))
    };
    let result = run(&params);
    let m = &result.metrics;

    assert_eq!(m.new_term, m.baseline_term);
    assert_eq!(m.interest_saved, Decimal::ZERO);
    assert_eq!(m.total_payment_new, m.total_payment_original);
    for point in &result.graph_data {
        assert_eq!(point.baseline_balance, point.strategy_balance);
    }
}

#[test]
fn test_more_extra_never_hurts() {
    let mut previous_term = u32::MAX;
    let mut previous_saved = dec!(-1);
    for extra in [dec!(0), dec!(100_000), dec!(250_000), dec!(500_000), dec!(1_000_000)] {
        let mut params = full_strategy_currency();
        params.extra_monthly = extra;
        let m = run(&params).metrics;
        assert!(m.new_term <= previous_term, "term grew at extra {extra}");
        assert!(m.interest_saved >= previous_saved, "savings fell at extra {extra}");
        previous_term = m.new_term;
        previous_saved = m.interest_saved;
    }
}

fn assert_rows_well_formed(rows: &[AmortizationRow], opening: Decimal) {
    let mut before = opening;
    for row in rows {
        assert!(row.balance >= Decimal::ZERO, "month {}", row.month);
        assert!(row.subsidy <= row.interest_gross, "month {}", row.month);
        assert!(row.subsidy >= Decimal::ZERO, "month {}", row.month);
        assert_close(
            row.capital_base + row.capital_extra,
            row.capital_total,
            dec!(0.0000001),
            "capital conservation",
        );
        assert!(row.capital_total <= before, "month {}", row.month);
        before = row.balance;
    }
}

#[test]
fn test_rows_well_formed_currency_loan() {
    let params = full_strategy_currency();
    let result = run(&params);
    assert_rows_well_formed(&result.schedule, params.loan_amount);
    assert!(result.metrics.settled);
    for point in &result.graph_data {
        assert!(point.baseline_balance >= Decimal::ZERO);
        assert!(point.strategy_balance >= Decimal::ZERO);
    }
}

#[test]
fn test_indexed_loan_rows() {
    let params = full_strategy_indexed();
    let result = run(&params);
    let m = &result.metrics;

    assert!(m.is_indexed);
    assert!(m.settled);
    assert!(m.months_saved > 0);
    for row in &result.schedule {
        assert!(row.balance >= Decimal::ZERO);
        assert!(row.subsidy <= row.interest_gross);
        assert!(row.unit_value.is_some());
        if row.month > 60 {
            assert_eq!(row.subsidy, Decimal::ZERO);
        }
    }
    // Unit value grows every month.
    let uv1 = result.schedule[0].unit_value.unwrap();
    let uv2 = result.schedule[1].unit_value.unwrap();
    assert!(uv2 > uv1 && uv1 > dec!(360.5432));
    // Indexed insurance grows too.
    assert!(result.schedule[1].insurance > result.schedule[0].insurance);
}

#[test]
fn test_escalation_and_seasonal_months_in_schedule() {
    let result = run(&full_strategy_currency());
    let rows = &result.schedule;

    // Month 1 carries the one-time payment.
    assert_eq!(rows[0].extra_scheduled, dec!(2_400_000));
    assert_eq!(rows[1].extra_scheduled, dec!(400_000));
    // Month 6 doubles.
    assert_eq!(rows[5].extra_scheduled, dec!(800_000));
    // Month 13 escalates by 3%; month 18 doubles the escalated amount.
    assert_eq!(rows[12].extra_scheduled, dec!(412_000));
    assert_eq!(rows[17].extra_scheduled, dec!(824_000));
}

#[test]
fn test_last_row_caps_extra_payment() {
    let result = run(&full_strategy_currency());
    let last = result.schedule.last().unwrap();
    // Settled means at or below the 100-unit threshold for currency loans.
    assert!(last.balance <= dec!(100));
    assert!(last.capital_extra <= last.extra_scheduled);
}

#[test]
fn test_idempotent() {
    let params = full_strategy_indexed();
    let first = run(&params);
    let second = run(&params);
    assert_eq!(first, second);
}

// ===========================================================================
// Chart series
// ===========================================================================

#[test]
fn test_graph_series_shape() {
    let mut params = plain_loan(EA_ONE_PERCENT_MONTHLY);
    params.extra_monthly = dec!(500_000);
    let result = run(&params);
    let graph = &result.graph_data;

    assert_eq!(graph[0].month, 0);
    assert_eq!(graph[0].baseline_balance, dec!(100_000_000));
    assert_eq!(graph[0].strategy_balance, dec!(100_000_000));
    assert_eq!(graph[1].month, 1);
    assert!(graph.iter().any(|p| p.month == result.metrics.new_term));
    assert_eq!(graph.last().unwrap().month, 120);
    assert!(graph.windows(2).all(|w| w[0].month < w[1].month));
}

#[test]
fn test_graph_closes_at_original_term_when_baseline_is_short() {
    // A statement quota larger than the formula installment ends the
    // baseline early; the range still closes at the quoted term.
    let params = LoanParameters {
        current_quota: Some(dec!(3_000_000)),
        extra_monthly: dec!(1_000_000),
        insurance_indexed: false,
        ..LoanParameters::new(dec!(100_000_000), dec!(0.12), 240)
    };
    let result = run(&params);
    let last = result.graph_data.last().unwrap();
    assert!(result.metrics.baseline_term < 240);
    assert_eq!(last.month, 240);
    assert_eq!(last.baseline_balance, Decimal::ZERO);
    assert_eq!(last.strategy_balance, Decimal::ZERO);
}
