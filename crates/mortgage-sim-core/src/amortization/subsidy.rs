//! Time-bounded public interest subsidy ("rate shaving").
//!
//! The subsidy is a per-month factor applied to the outstanding balance for
//! months inside the eligibility window, never exceeding the month's gross
//! interest.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rates::annual_to_monthly;
use crate::types::{Money, Rate};
use crate::MortgageSimResult;

/// Eligibility window used when the remaining subsidy months are unknown.
pub const DEFAULT_SUBSIDY_MONTHS: u32 = 84;

/// How the subsidy factor was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsidyBasis {
    None,
    /// Known monthly subsidy amount divided by the original balance.
    StatementAmount,
    /// Difference between the full monthly rate and the monthly rate at
    /// `annual_rate - points`.
    RatePoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsidy {
    pub factor: Rate,
    pub limit_month: u32,
    pub basis: SubsidyBasis,
}

/// Inputs needed to derive the subsidy factor.
#[derive(Debug, Clone, Copy)]
pub struct SubsidyTerms {
    pub enabled: bool,
    pub points: Rate,
    pub monthly_value: Option<Money>,
    pub remaining_months: Option<u32>,
    pub rate_ea: Rate,
    pub original_balance: Money,
}

impl Subsidy {
    pub fn none() -> Self {
        Self {
            factor: Decimal::ZERO,
            limit_month: 0,
            basis: SubsidyBasis::None,
        }
    }

    /// Derive the subsidy once per run. A known monthly amount takes
    /// precedence over rate points.
    pub fn resolve(terms: &SubsidyTerms, monthly_rate: Rate) -> MortgageSimResult<Self> {
        if !terms.enabled {
            return Ok(Self::none());
        }

        let limit_month = terms
            .remaining_months
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_SUBSIDY_MONTHS);

        let known_amount = terms.monthly_value.filter(|v| *v > Decimal::ZERO);
        if let Some(amount) = known_amount {
            if terms.original_balance > Decimal::ZERO {
                return Ok(Self {
                    factor: amount / terms.original_balance,
                    limit_month,
                    basis: SubsidyBasis::StatementAmount,
                });
            }
        }

        if terms.points > Decimal::ZERO {
            let reduced_annual = (terms.rate_ea - terms.points).max(Decimal::ZERO);
            let reduced_monthly = annual_to_monthly(reduced_annual)?;
            return Ok(Self {
                factor: monthly_rate - reduced_monthly,
                limit_month,
                basis: SubsidyBasis::RatePoints,
            });
        }

        Ok(Self {
            limit_month,
            ..Self::none()
        })
    }

    pub fn is_active(&self) -> bool {
        self.basis != SubsidyBasis::None
    }

    /// Portion of `gross_interest` absorbed by the subsidy in `month`.
    /// Zero after the eligibility window; clamped to `[0, gross_interest]`.
    pub fn amount(&self, month: u32, balance: Money, gross_interest: Money) -> Money {
        if !self.is_active() || month > self.limit_month {
            return Decimal::ZERO;
        }
        (balance * self.factor)
            .min(gross_interest)
            .max(Decimal::ZERO)
    }
}
