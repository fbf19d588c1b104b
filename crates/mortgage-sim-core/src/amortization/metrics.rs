//! Comparison metrics between the baseline and strategy paths.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::installment::{Installment, InstallmentMethod};
use super::simulator::{AmortizationRow, SimulationPath};
use crate::error::MortgageSimError;
use crate::types::{Money, Rate};
use crate::MortgageSimResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Remaining term supplied by the caller, or the baseline's own length
    /// when no term was given.
    pub original_term: u32,
    pub new_term: u32,
    pub baseline_term: u32,
    pub months_saved: u32,
    pub interest_saved: Money,
    pub total_payment_original: Money,
    pub total_payment_new: Money,
    pub monthly_obligatory: Money,
    pub monthly_total_effort: Money,
    /// First strategy payment vs. the obligatory installment, in percent.
    pub effort_increase_pct: Decimal,
    pub time_reduction_pct: Decimal,
    pub installment_method: InstallmentMethod,
    pub is_calibrated: bool,
    pub is_indexed: bool,
    pub has_subsidy: bool,
    pub insurance_indexed: bool,
    pub total_subsidy_benefit: Money,
    pub cost_multiplier: Decimal,
    pub total_insurance_paid: Money,
    pub total_capital_paid: Money,
    pub monthly_rate: Rate,
    pub monthly_inflation: Rate,
    pub settled: bool,
}

/// Everything the aggregator reads from a finished run.
pub struct RunSummary<'a> {
    pub original_balance: Money,
    pub months: Option<u32>,
    pub installment: &'a Installment,
    pub baseline: &'a SimulationPath,
    pub strategy: &'a SimulationPath,
    pub schedule: &'a [AmortizationRow],
    pub strategy_settled: bool,
    pub is_indexed: bool,
    pub has_subsidy: bool,
    pub insurance_indexed: bool,
    pub monthly_rate: Rate,
    pub monthly_inflation: Rate,
}

fn overflow(what: &str) -> MortgageSimError {
    MortgageSimError::FinancialImpossibility(format!("{what} exceeds the representable range"))
}

/// Totals whose sum leaves the `Decimal` range are reported as
/// [`MortgageSimError::FinancialImpossibility`].
pub fn aggregate(run: &RunSummary<'_>) -> MortgageSimResult<SimulationMetrics> {
    let original_term = run
        .months
        .filter(|m| *m > 0)
        .unwrap_or(run.baseline.months);
    let new_term = run.strategy.months;
    let months_saved = original_term.saturating_sub(new_term);

    let interest_saved =
        (run.baseline.interest_paid - run.strategy.interest_paid).max(Decimal::ZERO);

    let total_payment = |path: &SimulationPath| {
        run.original_balance
            .checked_add(path.interest_paid)
            .and_then(|v| v.checked_add(path.insurance_paid))
            .ok_or_else(|| overflow("total payment"))
    };
    let total_payment_original = total_payment(run.baseline)?;
    let total_payment_new = total_payment(run.strategy)?;

    let cost_multiplier = if run.original_balance > Decimal::ZERO {
        total_payment_new
            .checked_div(run.original_balance)
            .ok_or_else(|| overflow("cost multiplier"))?
    } else {
        Decimal::ZERO
    };

    let monthly_obligatory = run.installment.monthly_obligatory;
    let monthly_total_effort = run
        .schedule
        .first()
        .map(|row| row.payment_total)
        .unwrap_or(Decimal::ZERO);
    let effort_increase_pct = if monthly_obligatory > Decimal::ZERO {
        (monthly_total_effort - monthly_obligatory)
            .checked_div(monthly_obligatory)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| overflow("effort increase"))?
    } else {
        Decimal::ZERO
    };

    let time_reduction_pct = if original_term > 0 {
        Decimal::from(months_saved) / Decimal::from(original_term) * dec!(100)
    } else {
        Decimal::ZERO
    };

    Ok(SimulationMetrics {
        original_term,
        new_term,
        baseline_term: run.baseline.months,
        months_saved,
        interest_saved,
        total_payment_original,
        total_payment_new,
        monthly_obligatory,
        monthly_total_effort,
        effort_increase_pct,
        time_reduction_pct,
        installment_method: run.installment.method,
        is_calibrated: run.installment.method.is_calibrated(),
        is_indexed: run.is_indexed,
        has_subsidy: run.has_subsidy,
        insurance_indexed: run.insurance_indexed,
        total_subsidy_benefit: run.strategy.subsidy_received,
        cost_multiplier,
        total_insurance_paid: run.strategy.insurance_paid,
        total_capital_paid: run.strategy.capital_paid,
        monthly_rate: run.monthly_rate,
        monthly_inflation: run.monthly_inflation,
        settled: run.strategy_settled,
    })
}
