//! Voluntary extra capital payments: a recurring monthly amount, seasonal
//! doubling, a one-time initial payment and a compounding annual escalation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Months per escalation / seasonal cycle.
const CYCLE_MONTHS: u32 = 12;

/// Positions inside each 12-month cycle where the recurring amount doubles
/// (mid-year and year-end bonus months).
const SEASONAL_SLOTS: [u32; 2] = [6, 0];

/// A borrower's extra-payment strategy, expressed in currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentPlan {
    pub monthly: Money,
    pub seasonal_doubling: bool,
    pub one_time: Money,
    pub annual_increase: Rate,
}

impl ExtraPaymentPlan {
    /// The bank-only plan: nothing beyond the scheduled installment.
    pub fn none() -> Self {
        Self {
            monthly: Decimal::ZERO,
            seasonal_doubling: false,
            one_time: Decimal::ZERO,
            annual_increase: Decimal::ZERO,
        }
    }

    /// Recurring amount after the escalation rule for `month` has been
    /// applied to `current`. Compounds once per 12-month boundary, never in
    /// the first cycle. `None` when the compounded amount overflows.
    pub fn escalate(&self, month: u32, current: Money) -> Option<Money> {
        if self.annual_increase > Decimal::ZERO && is_escalation_month(month) {
            let factor = Decimal::ONE.checked_add(self.annual_increase)?;
            current.checked_mul(factor)
        } else {
            Some(current)
        }
    }

    /// Extra payment due in `month` given the (already escalated) recurring
    /// amount.
    pub fn amount_for_month(&self, month: u32, recurring: Money) -> Option<Money> {
        let mut amount = recurring;
        if self.seasonal_doubling && is_seasonal_month(month) {
            amount = amount.checked_add(recurring)?;
        }
        if month == 1 {
            amount = amount.checked_add(self.one_time)?;
        }
        Some(amount)
    }
}

/// Whether `month` (1-based) falls in a seasonal doubling slot.
pub fn is_seasonal_month(month: u32) -> bool {
    SEASONAL_SLOTS.contains(&(month % CYCLE_MONTHS))
}

/// Whether `month` (1-based) opens a new 12-month cycle after the first.
pub fn is_escalation_month(month: u32) -> bool {
    month > 1 && month % CYCLE_MONTHS == 1
}
