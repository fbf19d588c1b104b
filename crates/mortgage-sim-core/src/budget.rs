//! Household budget study: how much of the monthly surplus can go to extra
//! mortgage payments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageSimError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageSimResult;

/// Share of the surplus recommended for extra payments when none is given.
const DEFAULT_ALLOCATION_SHARE: Rate = dec!(0.70);

fn default_share() -> Rate {
    DEFAULT_ALLOCATION_SHARE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    /// Net monthly income.
    pub income: Money,
    #[serde(default)]
    pub housing: Money,
    #[serde(default)]
    pub food: Money,
    #[serde(default)]
    pub transport: Money,
    #[serde(default)]
    pub utilities: Money,
    #[serde(default)]
    pub entertainment: Money,
    #[serde(default)]
    pub others: Money,
    /// Fraction of the surplus to allocate (0.70 = 70%).
    #[serde(default = "default_share")]
    pub allocation_share: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub category: String,
    pub amount: Money,
    /// Fraction of total expenses.
    pub share: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOutput {
    pub total_expenses: Money,
    /// Income minus expenses; negative when spending exceeds income.
    pub surplus: Money,
    /// Whole-currency extra payment to feed into the simulator.
    pub recommended_extra: Money,
    pub breakdown: Vec<ExpenseShare>,
}

impl BudgetInput {
    fn categories(&self) -> [(&'static str, Money); 6] {
        [
            ("housing", self.housing),
            ("food", self.food),
            ("transport", self.transport),
            ("utilities", self.utilities),
            ("entertainment", self.entertainment),
            ("others", self.others),
        ]
    }
}

/// Compute the surplus and the recommended monthly extra payment.
pub fn analyze_budget(input: &BudgetInput) -> MortgageSimResult<ComputationOutput<BudgetOutput>> {
    let start = Instant::now();
    validate(input)?;
    let mut warnings: Vec<String> = Vec::new();

    let categories = input.categories();
    let total_expenses: Money = categories.iter().map(|(_, amount)| *amount).sum();
    let surplus = input.income - total_expenses;
    if surplus < Decimal::ZERO {
        warnings.push(format!(
            "Expenses exceed income by {}; no extra payment is recommended",
            -surplus
        ));
    }

    let recommended_extra = (surplus * input.allocation_share)
        .floor()
        .max(Decimal::ZERO);

    let breakdown = categories
        .iter()
        .filter(|(_, amount)| *amount > Decimal::ZERO)
        .map(|(category, amount)| ExpenseShare {
            category: (*category).to_string(),
            amount: *amount,
            share: *amount / total_expenses,
        })
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Budget surplus allocation",
        input,
        warnings,
        elapsed,
        BudgetOutput {
            total_expenses,
            surplus,
            recommended_extra,
            breakdown,
        },
    ))
}

fn validate(input: &BudgetInput) -> MortgageSimResult<()> {
    if input.income < Decimal::ZERO {
        return Err(MortgageSimError::InvalidInput {
            field: "income".into(),
            reason: "Income cannot be negative".into(),
        });
    }
    for (field, amount) in input.categories() {
        if amount < Decimal::ZERO {
            return Err(MortgageSimError::InvalidInput {
                field: field.into(),
                reason: "Expense cannot be negative".into(),
            });
        }
    }
    if input.allocation_share < Decimal::ZERO || input.allocation_share > Decimal::ONE {
        return Err(MortgageSimError::InvalidInput {
            field: "allocation_share".into(),
            reason: "Allocation share must be between 0 and 1".into(),
        });
    }
    Ok(())
}
