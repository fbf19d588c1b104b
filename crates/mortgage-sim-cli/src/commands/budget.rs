use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use mortgage_sim_core::budget::{self, BudgetInput};

use crate::input;

/// Arguments for the household budget study
#[derive(Args)]
pub struct BudgetArgs {
    /// Path to a JSON or YAML budget file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    #[arg(long, default_value = "0")]
    pub housing: Decimal,

    #[arg(long, default_value = "0")]
    pub food: Decimal,

    #[arg(long, default_value = "0")]
    pub transport: Decimal,

    #[arg(long, default_value = "0")]
    pub utilities: Decimal,

    #[arg(long, default_value = "0")]
    pub entertainment: Decimal,

    #[arg(long, default_value = "0")]
    pub others: Decimal,

    /// Fraction of the surplus to allocate to extra payments
    #[arg(long)]
    pub allocation_share: Option<Decimal>,
}

pub fn run_budget(args: BudgetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let budget_input: BudgetInput = if let Some(ref path) = args.input {
        input::file::read_params(path)?
    } else if let Some(piped) = input::stdin::read_piped()? {
        piped
    } else {
        BudgetInput {
            income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            housing: args.housing,
            food: args.food,
            transport: args.transport,
            utilities: args.utilities,
            entertainment: args.entertainment,
            others: args.others,
            allocation_share: args.allocation_share.unwrap_or(dec!(0.70)),
        }
    };
    let result = budget::analyze_budget(&budget_input)?;
    Ok(serde_json::to_value(result)?)
}
