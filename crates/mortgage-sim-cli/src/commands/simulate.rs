use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use mortgage_sim_core::amortization::{simulate_mortgage, LoanParameters};

use crate::input;

/// Which part of the simulation result to print.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum View {
    /// Comparison metrics only
    Summary,
    /// Month-by-month strategy amortization table
    Schedule,
    /// Down-sampled baseline vs strategy balances
    Graph,
    /// The complete output envelope
    Full,
}

/// Arguments for a strategy simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SimulateArgs {
    /// Path to a JSON or YAML parameter file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Part of the result to print
    #[arg(long, value_enum, default_value = "summary")]
    pub view: View,

    /// Outstanding principal in currency
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual effective rate (e.g. 0.135 for 13.5% EA)
    #[arg(long)]
    pub rate_ea: Option<Decimal>,

    /// Remaining term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Monthly insurance premium
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,

    /// Keep the insurance premium flat instead of growing it with inflation
    #[arg(long)]
    pub flat_insurance: bool,

    /// Recurring extra capital payment per month
    #[arg(long, default_value = "0")]
    pub extra_monthly: Decimal,

    /// Double the recurring extra in months 6 and 12 of every year
    #[arg(long)]
    pub seasonal_doubling: bool,

    /// One-time extra payment in the first month
    #[arg(long, default_value = "0")]
    pub one_time_payment: Decimal,

    /// Annual escalation of the recurring extra (e.g. 0.05 for +5%/year)
    #[arg(long, default_value = "0")]
    pub annual_increase: Decimal,

    /// Current value of one settlement unit; marks the loan as indexed
    #[arg(long)]
    pub unit_value: Option<Decimal>,

    /// Outstanding principal in settlement units
    #[arg(long)]
    pub loan_amount_units: Option<Decimal>,

    /// Annual inflation estimate (e.g. 0.045 for 4.5%)
    #[arg(long, default_value = "0")]
    pub inflation: Decimal,

    /// Subsidy rate reduction in annual points (e.g. 0.04)
    #[arg(long)]
    pub subsidy_points: Option<Decimal>,

    /// Known monthly subsidy amount from a statement
    #[arg(long)]
    pub subsidy_monthly_value: Option<Decimal>,

    /// Remaining months of subsidy eligibility (default 84)
    #[arg(long)]
    pub subsidy_months: Option<u32>,

    /// Capital portion of the last statement
    #[arg(long)]
    pub calibration_capital: Option<Decimal>,

    /// Interest portion of the last statement
    #[arg(long)]
    pub calibration_interest: Option<Decimal>,

    /// Total quota of the last statement (installment + insurance)
    #[arg(long)]
    pub current_quota: Option<Decimal>,
}

impl SimulateArgs {
    fn to_params(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        Ok(LoanParameters {
            loan_amount: self
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            loan_amount_units: self.loan_amount_units,
            rate_ea: self
                .rate_ea
                .ok_or("--rate-ea is required (or provide --input)")?,
            months: self.months,
            insurance: self.insurance,
            insurance_indexed: !self.flat_insurance,
            extra_monthly: self.extra_monthly,
            seasonal_doubling: self.seasonal_doubling,
            one_time_payment: self.one_time_payment,
            annual_increase: self.annual_increase,
            is_indexed: self.unit_value.is_some(),
            unit_value: self.unit_value,
            inflation: self.inflation,
            has_subsidy: self.subsidy_points.is_some() || self.subsidy_monthly_value.is_some(),
            subsidy_points: self.subsidy_points.unwrap_or(Decimal::ZERO),
            subsidy_remaining_months: self.subsidy_months,
            subsidy_monthly_value: self.subsidy_monthly_value,
            calibration_capital: self.calibration_capital,
            calibration_interest: self.calibration_interest,
            current_quota: self.current_quota,
        })
    }
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: LoanParameters = if let Some(ref path) = args.input {
        input::file::read_params(path)?
    } else if let Some(piped) = input::stdin::read_piped()? {
        piped
    } else {
        args.to_params()?
    };

    let output = simulate_mortgage(&params)?;
    let value = match args.view {
        View::Full => serde_json::to_value(&output)?,
        View::Summary => json!({
            "result": output.result.metrics,
            "methodology": output.methodology,
            "warnings": output.warnings,
        }),
        View::Schedule => serde_json::to_value(&output.result.schedule)?,
        View::Graph => serde_json::to_value(&output.result.graph_data)?,
    };
    Ok(value)
}
