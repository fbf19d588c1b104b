//! Mortgage strategy simulator entry point.
//!
//! Resolves the monthly rate, inflation factor, base installment and subsidy
//! once, then runs the bank-only baseline and the borrower's strategy to
//! completion and reduces both into comparison metrics, a chart series and
//! the strategy's amortization table. All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::extra_payment::ExtraPaymentPlan;
use super::installment::{resolve_installment, InstallmentContext};
use super::metrics::{aggregate, RunSummary, SimulationMetrics};
use super::rates::{monthly_inflation, resolve_monthly_rate, RateSource};
use super::sampler::{sample, GraphPoint, Trajectory};
use super::simulator::{
    AmortizationRow, MonthContext, SimulationPath, Thresholds, SAFETY_CEILING_MONTHS,
};
use super::subsidy::{Subsidy, SubsidyTerms};
use crate::error::MortgageSimError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageSimResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Loan terms and extra-payment strategy for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Outstanding principal in currency.
    pub loan_amount: Money,
    /// Outstanding principal in settlement units (indexed loans only).
    #[serde(default)]
    pub loan_amount_units: Option<Decimal>,
    /// Annual effective rate (e.g., 0.135 = 13.5% EA).
    pub rate_ea: Rate,
    /// Remaining term in months.
    #[serde(default)]
    pub months: Option<u32>,
    /// Monthly insurance premium in currency.
    #[serde(default)]
    pub insurance: Money,
    /// Grow the insurance premium with inflation.
    #[serde(default = "default_true")]
    pub insurance_indexed: bool,
    /// Recurring extra capital payment per month.
    #[serde(default)]
    pub extra_monthly: Money,
    /// Pay the recurring extra twice in the two seasonal months of each year.
    #[serde(default)]
    pub seasonal_doubling: bool,
    /// One-time extra payment in the first simulated month.
    #[serde(default)]
    pub one_time_payment: Money,
    /// Annual escalation of the recurring extra (e.g., 0.05 = +5% per year).
    #[serde(default)]
    pub annual_increase: Rate,
    /// Principal denominated in an inflation-indexed settlement unit.
    #[serde(default)]
    pub is_indexed: bool,
    /// Current currency value of one settlement unit.
    #[serde(default)]
    pub unit_value: Option<Decimal>,
    /// Annual inflation estimate (e.g., 0.045 = 4.5%).
    #[serde(default)]
    pub inflation: Rate,
    #[serde(default)]
    pub has_subsidy: bool,
    /// Subsidy rate reduction in annual points (e.g., 0.04 = 4 points).
    #[serde(default)]
    pub subsidy_points: Rate,
    /// Months of subsidy eligibility left; 84 when absent.
    #[serde(default)]
    pub subsidy_remaining_months: Option<u32>,
    /// Known monthly subsidy amount from a statement.
    #[serde(default)]
    pub subsidy_monthly_value: Option<Money>,
    /// Capital portion of the last statement.
    #[serde(default)]
    pub calibration_capital: Option<Money>,
    /// Interest portion of the last statement.
    #[serde(default)]
    pub calibration_interest: Option<Money>,
    /// Total quota (installment + insurance) of the last statement.
    #[serde(default)]
    pub current_quota: Option<Money>,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            loan_amount: Decimal::ZERO,
            loan_amount_units: None,
            rate_ea: Decimal::ZERO,
            months: None,
            insurance: Decimal::ZERO,
            insurance_indexed: true,
            extra_monthly: Decimal::ZERO,
            seasonal_doubling: false,
            one_time_payment: Decimal::ZERO,
            annual_increase: Decimal::ZERO,
            is_indexed: false,
            unit_value: None,
            inflation: Decimal::ZERO,
            has_subsidy: false,
            subsidy_points: Decimal::ZERO,
            subsidy_remaining_months: None,
            subsidy_monthly_value: None,
            calibration_capital: None,
            calibration_interest: None,
            current_quota: None,
        }
    }
}

impl LoanParameters {
    /// Plain currency loan with no insurance, extras, subsidy or calibration.
    pub fn new(loan_amount: Money, rate_ea: Rate, months: u32) -> Self {
        Self {
            loan_amount,
            rate_ea,
            months: Some(months),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub metrics: SimulationMetrics,
    pub graph_data: Vec<GraphPoint>,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate the baseline and strategy schedules for a loan.
///
/// Returns `InsufficientData` when principal, annual rate or (for indexed
/// loans) unit value are missing or non-positive, or when no remaining term
/// is given and no statement calibration applies.
pub fn simulate_mortgage(
    params: &LoanParameters,
) -> MortgageSimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let unit_value = validate(params)?;

    let balance_units = if params.is_indexed {
        params
            .loan_amount_units
            .filter(|u| *u > Decimal::ZERO)
            .unwrap_or(params.loan_amount / unit_value)
    } else {
        params.loan_amount
    };
    let original_balance = balance_units.checked_mul(unit_value).ok_or_else(|| {
        MortgageSimError::FinancialImpossibility(
            "loan amount in currency exceeds the representable range".into(),
        )
    })?;

    let rate =
        resolve_monthly_rate(params.rate_ea, params.calibration_interest, params.loan_amount)?;
    let inflation =
        monthly_inflation(params.is_indexed, params.insurance_indexed, params.inflation)?;
    log::debug!(
        "monthly rate {} ({:?}), monthly inflation {}",
        rate.rate,
        rate.source,
        inflation
    );

    let installment = resolve_installment(&InstallmentContext {
        balance_units,
        unit_value,
        is_indexed: params.is_indexed,
        monthly_rate: rate.rate,
        monthly_inflation: inflation,
        insurance: params.insurance,
        months: params.months,
        calibration_capital: params.calibration_capital,
        calibration_interest: params.calibration_interest,
        current_quota: params.current_quota,
    })?;
    log::debug!(
        "base installment {} units via {:?}",
        installment.amount_units,
        installment.method
    );

    let subsidy = Subsidy::resolve(
        &SubsidyTerms {
            enabled: params.has_subsidy,
            points: params.subsidy_points,
            monthly_value: params.subsidy_monthly_value,
            remaining_months: params.subsidy_remaining_months,
            rate_ea: params.rate_ea,
            original_balance: params.loan_amount,
        },
        rate.rate,
    )?;
    if params.has_subsidy && !subsidy.is_active() {
        warnings.push(
            "Subsidy enabled but neither points nor a monthly amount were supplied".into(),
        );
    }

    let first_interest = balance_units.checked_mul(rate.rate);
    if first_interest.map_or(true, |interest| installment.amount_units <= interest) {
        let msg = "Base installment does not cover the first month's interest; \
                   scheduled capital is zero until extra payments reduce the balance";
        log::warn!("{msg}");
        warnings.push(msg.into());
    }

    let ctx = MonthContext {
        monthly_rate: rate.rate,
        monthly_inflation: inflation,
        installment_units: installment.amount_units,
        is_indexed: params.is_indexed,
        insurance_indexed: params.insurance_indexed,
        subsidy,
        thresholds: Thresholds::for_loan(params.is_indexed),
    };

    let mut baseline =
        SimulationPath::new(balance_units, unit_value, params.insurance, ExtraPaymentPlan::none());
    let mut strategy = SimulationPath::new(
        balance_units,
        unit_value,
        params.insurance,
        ExtraPaymentPlan {
            monthly: params.extra_monthly,
            seasonal_doubling: params.seasonal_doubling,
            one_time: params.one_time_payment,
            annual_increase: params.annual_increase,
        },
    );

    baseline.run(&ctx)?;
    let schedule = strategy.run(&ctx)?;

    let baseline_settled = baseline.is_settled(&ctx);
    let strategy_settled = strategy.is_settled(&ctx);
    if !baseline_settled {
        warnings.push(format!(
            "Baseline schedule did not settle within {} months; remaining balance {}",
            SAFETY_CEILING_MONTHS,
            baseline.balance()?.round_dp(2)
        ));
    }
    if !strategy_settled {
        warnings.push(format!(
            "Strategy schedule did not settle within {} months; remaining balance {}",
            SAFETY_CEILING_MONTHS,
            strategy.balance()?.round_dp(2)
        ));
    }

    let metrics = aggregate(&RunSummary {
        original_balance,
        months: params.months,
        installment: &installment,
        baseline: &baseline,
        strategy: &strategy,
        schedule: &schedule,
        strategy_settled,
        is_indexed: params.is_indexed,
        has_subsidy: params.has_subsidy,
        insurance_indexed: params.insurance_indexed,
        monthly_rate: rate.rate,
        monthly_inflation: inflation,
    })?;

    let graph_data = sample(
        original_balance,
        Trajectory {
            balances: &baseline.balances,
            settled: baseline_settled,
        },
        Trajectory {
            balances: &strategy.balances,
            settled: strategy_settled,
        },
        metrics.original_term,
    );

    let rate_note = match rate.source {
        RateSource::StatementImplied => "statement-implied monthly rate",
        RateSource::EffectiveAnnual => "effective-annual monthly rate",
    };
    let methodology = format!(
        "Baseline vs strategy amortization; {}; {}",
        installment.method.description(),
        rate_note
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &methodology,
        params,
        warnings,
        elapsed,
        SimulationResult {
            metrics,
            graph_data,
            schedule,
        },
    ))
}

/// Check required fields and return the starting unit value (1 for
/// currency loans).
fn validate(params: &LoanParameters) -> MortgageSimResult<Decimal> {
    if params.loan_amount <= Decimal::ZERO {
        return Err(MortgageSimError::InsufficientData(
            "loan_amount must be positive".into(),
        ));
    }
    if params.rate_ea <= Decimal::ZERO {
        return Err(MortgageSimError::InsufficientData(
            "rate_ea must be positive".into(),
        ));
    }
    let unit_value = if params.is_indexed {
        match params.unit_value {
            Some(v) if v > Decimal::ZERO => v,
            _ => {
                return Err(MortgageSimError::InsufficientData(
                    "unit_value must be positive for indexed loans".into(),
                ))
            }
        }
    } else {
        Decimal::ONE
    };

    let non_negative = [
        ("insurance", params.insurance),
        ("extra_monthly", params.extra_monthly),
        ("one_time_payment", params.one_time_payment),
        ("annual_increase", params.annual_increase),
        ("subsidy_points", params.subsidy_points),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(MortgageSimError::InvalidInput {
                field: field.into(),
                reason: "Value cannot be negative".into(),
            });
        }
    }
    if params.inflation <= -Decimal::ONE {
        return Err(MortgageSimError::InvalidInput {
            field: "inflation".into(),
            reason: "Inflation must be greater than -100%".into(),
        });
    }
    Ok(unit_value)
}
