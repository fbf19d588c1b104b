//! Monthly rate resolution and inflation indexing.
//!
//! Every rate in a run is derived once, up front: the monthly interest rate
//! (either the standard effective-annual conversion or the rate implied by a
//! statement's interest figure) and the monthly inflation factor that grows
//! the settlement unit and, optionally, the insurance premium.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageSimError;
use crate::types::{Money, Rate};
use crate::MortgageSimResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Where the monthly interest rate of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Statement interest divided by the outstanding balance.
    StatementImplied,
    /// `(1 + EA)^(1/12) - 1` from the annual effective rate.
    EffectiveAnnual,
}

/// The single monthly rate used for every calculation of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRate {
    pub rate: Rate,
    pub source: RateSource,
}

/// Convert an annual effective rate to its monthly equivalent.
/// monthly = (1 + annual)^(1/12) - 1
pub fn annual_to_monthly(annual: Rate) -> MortgageSimResult<Rate> {
    if annual.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let base = Decimal::ONE + annual;
    if base <= Decimal::ZERO {
        return Err(MortgageSimError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Annual rate must be greater than -100%".into(),
        });
    }
    let root = base
        .checked_powd(Decimal::ONE / MONTHS_PER_YEAR)
        .ok_or_else(|| {
            MortgageSimError::FinancialImpossibility(format!(
                "monthly conversion of annual rate {annual} overflowed"
            ))
        })?;
    Ok(root - Decimal::ONE)
}

/// Compound growth factor (1 + rate)^periods.
pub fn compound_factor(rate: Rate, periods: u32) -> MortgageSimResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            MortgageSimError::FinancialImpossibility(format!(
                "compounding {rate} over {periods} periods overflowed"
            ))
        })
}

/// Resolve the monthly interest rate.
///
/// A positive statement interest figure against a positive balance wins: the
/// lender's actually-charged interest is a better guide than the theoretical
/// conversion of the quoted annual rate.
pub fn resolve_monthly_rate(
    rate_ea: Rate,
    calibration_interest: Option<Money>,
    balance: Money,
) -> MortgageSimResult<MonthlyRate> {
    match calibration_interest {
        Some(interest) if interest > Decimal::ZERO && balance > Decimal::ZERO => Ok(MonthlyRate {
            rate: interest / balance,
            source: RateSource::StatementImplied,
        }),
        _ => Ok(MonthlyRate {
            rate: annual_to_monthly(rate_ea)?,
            source: RateSource::EffectiveAnnual,
        }),
    }
}

/// Monthly inflation factor shared by the settlement unit and the insurance
/// premium. Zero when neither series is indexed.
pub fn monthly_inflation(
    is_indexed: bool,
    insurance_indexed: bool,
    annual_inflation: Rate,
) -> MortgageSimResult<Rate> {
    if !is_indexed && !insurance_indexed {
        return Ok(Decimal::ZERO);
    }
    annual_to_monthly(annual_inflation)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_annual_to_monthly_twelve_percent() {
        // 1.12^(1/12) - 1 = 0.0094887929...
        let monthly = annual_to_monthly(dec!(0.12)).unwrap();
        assert_close(monthly, dec!(0.0094887929), dec!(0.0000000001), "12% EA");
    }

    #[test]
    fn test_annual_to_monthly_round_trip() {
        let monthly = annual_to_monthly(dec!(0.135)).unwrap();
        let annual = compound_factor(monthly, 12).unwrap() - Decimal::ONE;
        assert_close(annual, dec!(0.135), dec!(0.000000001), "round trip");
    }

    #[test]
    fn test_annual_to_monthly_zero() {
        assert_eq!(annual_to_monthly(Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_annual_to_monthly_rejects_minus_100() {
        assert!(annual_to_monthly(dec!(-1)).is_err());
    }

    #[test]
    fn test_statement_interest_gives_implied_rate() {
        let rate =
            resolve_monthly_rate(dec!(0.12), Some(dec!(1_000_000)), dec!(100_000_000)).unwrap();
        assert_eq!(rate.rate, dec!(0.01));
        assert_eq!(rate.source, RateSource::StatementImplied);
    }

    #[test]
    fn test_zero_statement_interest_falls_back_to_formula() {
        let rate =
            resolve_monthly_rate(dec!(0.12), Some(Decimal::ZERO), dec!(100_000_000)).unwrap();
        assert_eq!(rate.source, RateSource::EffectiveAnnual);
        assert!(rate.rate > dec!(0.0094) && rate.rate < dec!(0.0095));
    }

    #[test]
    fn test_inflation_zero_when_nothing_indexed() {
        assert_eq!(
            monthly_inflation(false, false, dec!(0.05)).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_inflation_applies_to_either_series() {
        let a = monthly_inflation(true, false, dec!(0.045)).unwrap();
        let b = monthly_inflation(false, true, dec!(0.045)).unwrap();
        assert_eq!(a, b);
        assert!(a > Decimal::ZERO);
    }

    #[test]
    fn test_compound_factor_integer_power() {
        assert_eq!(compound_factor(dec!(0.1), 2).unwrap(), dec!(1.21));
    }
}
