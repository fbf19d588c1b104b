//! Base installment (principal + interest, excluding insurance).
//!
//! Candidates are tried in a fixed order and the first applicable one wins:
//! statement capital + interest, statement total quota, then the closed-form
//! level-payment annuity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rates::compound_factor;
use crate::error::MortgageSimError;
use crate::types::{Money, Rate};
use crate::MortgageSimResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentMethod {
    /// Capital + interest figures taken from a payment statement.
    StatementCapitalInterest,
    /// Total statement quota less the insurance premium.
    StatementQuota,
    /// Level-payment annuity over the remaining term.
    AnnuityFormula,
}

impl InstallmentMethod {
    pub fn is_calibrated(&self) -> bool {
        !matches!(self, InstallmentMethod::AnnuityFormula)
    }

    pub fn description(&self) -> &'static str {
        match self {
            InstallmentMethod::StatementCapitalInterest => {
                "Statement calibration (capital + interest)"
            }
            InstallmentMethod::StatementQuota => "Statement calibration (total quota)",
            InstallmentMethod::AnnuityFormula => "Level-payment annuity (PMT)",
        }
    }
}

/// Resolved base installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Fixed installment in settlement units (currency when not indexed).
    pub amount_units: Decimal,
    /// Installment plus insurance in currency, as a borrower would see it on
    /// the first statement.
    pub monthly_obligatory: Money,
    pub method: InstallmentMethod,
}

/// Everything an installment candidate may consult.
#[derive(Debug, Clone, Copy)]
pub struct InstallmentContext {
    pub balance_units: Decimal,
    pub unit_value: Decimal,
    pub is_indexed: bool,
    pub monthly_rate: Rate,
    pub monthly_inflation: Rate,
    pub insurance: Money,
    pub months: Option<u32>,
    pub calibration_capital: Option<Money>,
    pub calibration_interest: Option<Money>,
    pub current_quota: Option<Money>,
}

impl InstallmentContext {
    fn to_units(&self, amount: Money) -> Decimal {
        if self.is_indexed {
            amount / self.unit_value
        } else {
            amount
        }
    }
}

type Candidate = fn(&InstallmentContext) -> MortgageSimResult<Option<Installment>>;

const CANDIDATES: [Candidate; 3] = [
    from_statement_breakdown,
    from_statement_quota,
    from_annuity_formula,
];

/// Resolve the base installment from the first applicable candidate.
pub fn resolve_installment(ctx: &InstallmentContext) -> MortgageSimResult<Installment> {
    for candidate in CANDIDATES {
        if let Some(installment) = candidate(ctx)? {
            return Ok(installment);
        }
    }
    Err(MortgageSimError::InsufficientData(
        "remaining term in months is required when no statement calibration is supplied".into(),
    ))
}

fn from_statement_breakdown(ctx: &InstallmentContext) -> MortgageSimResult<Option<Installment>> {
    let (Some(capital), Some(interest)) = (ctx.calibration_capital, ctx.calibration_interest)
    else {
        return Ok(None);
    };
    if capital <= Decimal::ZERO || interest <= Decimal::ZERO {
        return Ok(None);
    }
    let total = capital + interest;
    Ok(Some(Installment {
        amount_units: ctx.to_units(total),
        monthly_obligatory: total + ctx.insurance,
        method: InstallmentMethod::StatementCapitalInterest,
    }))
}

fn from_statement_quota(ctx: &InstallmentContext) -> MortgageSimResult<Option<Installment>> {
    match ctx.current_quota {
        Some(quota) if quota > ctx.insurance && quota > Decimal::ZERO => Ok(Some(Installment {
            amount_units: ctx.to_units(quota - ctx.insurance),
            monthly_obligatory: quota,
            method: InstallmentMethod::StatementQuota,
        })),
        _ => Ok(None),
    }
}

fn from_annuity_formula(ctx: &InstallmentContext) -> MortgageSimResult<Option<Installment>> {
    let n = match ctx.months {
        Some(n) if n > 0 => n,
        _ => return Ok(None),
    };
    let amount_units = annuity_payment(ctx.balance_units, ctx.monthly_rate, n)?;

    // The first installment is collected after one month of unit growth.
    let first_month_currency = if ctx.is_indexed {
        (Decimal::ONE + ctx.monthly_inflation)
            .checked_mul(ctx.unit_value)
            .and_then(|uv| uv.checked_mul(amount_units))
            .ok_or_else(|| {
                MortgageSimError::FinancialImpossibility(
                    "first indexed installment overflowed".into(),
                )
            })?
    } else {
        amount_units
    };

    Ok(Some(Installment {
        amount_units,
        monthly_obligatory: first_month_currency + ctx.insurance,
        method: InstallmentMethod::AnnuityFormula,
    }))
}

/// Level-payment annuity: balance * (r * (1+r)^n) / ((1+r)^n - 1).
pub fn annuity_payment(
    balance: Decimal,
    monthly_rate: Rate,
    months: u32,
) -> MortgageSimResult<Decimal> {
    if months == 0 {
        return Err(MortgageSimError::InvalidInput {
            field: "months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if monthly_rate.is_zero() {
        return Ok(balance / Decimal::from(months));
    }

    let factor = compound_factor(monthly_rate, months)?;
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(MortgageSimError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }
    // factor / denom stays near 1 for long terms, where factor itself may be
    // close to the top of the Decimal range.
    balance
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(factor / denom))
        .ok_or_else(|| {
            MortgageSimError::FinancialImpossibility(format!(
                "annuity payment on {balance} at {monthly_rate} overflowed"
            ))
        })
}
