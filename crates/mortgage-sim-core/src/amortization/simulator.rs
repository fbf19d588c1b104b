//! Month-by-month amortization loop.
//!
//! Baseline and strategy are two [`SimulationPath`] records advanced by the
//! same [`SimulationPath::step`]; they differ only by their extra-payment
//! plan. Balances are carried in settlement units and converted to currency
//! with the path's own unit value when rows are emitted.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::extra_payment::ExtraPaymentPlan;
use super::subsidy::Subsidy;
use crate::error::MortgageSimError;
use crate::types::{Money, Rate};
use crate::MortgageSimResult;

/// Hard stop for paths that never amortise (e.g. installment below interest).
pub const SAFETY_CEILING_MONTHS: u32 = 600;

/// Balance thresholds, in settlement units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// A path keeps running while its balance is above this.
    pub settle: Decimal,
    /// A balance below this after a payment snaps to exactly zero.
    pub snap: Decimal,
}

impl Thresholds {
    pub fn for_loan(is_indexed: bool) -> Self {
        if is_indexed {
            Self {
                settle: dec!(0.01),
                snap: dec!(0.0001),
            }
        } else {
            Self {
                settle: dec!(100),
                snap: Decimal::ONE,
            }
        }
    }
}

/// Per-run constants shared by both paths.
#[derive(Debug, Clone, Copy)]
pub struct MonthContext {
    pub monthly_rate: Rate,
    pub monthly_inflation: Rate,
    pub installment_units: Decimal,
    pub is_indexed: bool,
    pub insurance_indexed: bool,
    pub subsidy: Subsidy,
    pub thresholds: Thresholds,
}

/// One simulated month of the strategy path, in currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    /// Out-of-pocket payment: net interest + capital + insurance.
    pub payment_total: Money,
    pub interest_gross: Money,
    pub subsidy: Money,
    pub interest_net: Money,
    pub insurance: Money,
    pub capital_base: Money,
    pub capital_extra: Money,
    pub capital_total: Money,
    pub balance: Money,
    /// Extra payment scheduled for the month before any capping.
    pub extra_scheduled: Money,
    pub unit_value: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct SimulationPath {
    pub balance_units: Decimal,
    pub unit_value: Decimal,
    pub insurance: Money,
    pub extra_monthly: Money,
    pub interest_paid: Money,
    pub insurance_paid: Money,
    pub subsidy_received: Money,
    pub capital_paid: Money,
    pub months: u32,
    /// Currency balance at the end of each simulated month.
    pub balances: Vec<Money>,
    plan: ExtraPaymentPlan,
}

impl SimulationPath {
    pub fn new(
        balance_units: Decimal,
        unit_value: Decimal,
        insurance: Money,
        plan: ExtraPaymentPlan,
    ) -> Self {
        Self {
            balance_units,
            unit_value,
            insurance,
            extra_monthly: plan.monthly,
            interest_paid: Decimal::ZERO,
            insurance_paid: Decimal::ZERO,
            subsidy_received: Decimal::ZERO,
            capital_paid: Decimal::ZERO,
            months: 0,
            balances: Vec::new(),
            plan,
        }
    }

    pub fn is_running(&self, ctx: &MonthContext) -> bool {
        self.balance_units > ctx.thresholds.settle && self.months < SAFETY_CEILING_MONTHS
    }

    pub fn is_settled(&self, ctx: &MonthContext) -> bool {
        self.balance_units <= ctx.thresholds.settle
    }

    /// Outstanding balance in currency at the current unit value.
    pub fn balance(&self) -> MortgageSimResult<Money> {
        checked(
            self.balance_units.checked_mul(self.unit_value),
            "balance",
            self.months,
        )
    }

    /// Run until settled or the safety ceiling, returning one row per month.
    pub fn run(&mut self, ctx: &MonthContext) -> MortgageSimResult<Vec<AmortizationRow>> {
        let mut rows = Vec::new();
        while self.is_running(ctx) {
            rows.push(self.step(ctx)?);
        }
        if !self.is_settled(ctx) {
            log::warn!(
                "path stopped at safety ceiling of {} months with balance {}",
                SAFETY_CEILING_MONTHS,
                self.balance()?.round_dp(2)
            );
        }
        Ok(rows)
    }

    /// Advance one month.
    ///
    /// Unit value and insurance compound every month, so a run with extreme
    /// inflation can leave the `Decimal` range; that surfaces as
    /// [`MortgageSimError::FinancialImpossibility`].
    pub fn step(&mut self, ctx: &MonthContext) -> MortgageSimResult<AmortizationRow> {
        self.months += 1;
        let month = self.months;

        let growth = checked(
            Decimal::ONE.checked_add(ctx.monthly_inflation),
            "inflation factor",
            month,
        )?;
        if ctx.is_indexed {
            self.unit_value = checked(self.unit_value.checked_mul(growth), "unit value", month)?;
        }
        if ctx.insurance_indexed {
            self.insurance = checked(self.insurance.checked_mul(growth), "insurance", month)?;
        }
        self.extra_monthly = checked(
            self.plan.escalate(month, self.extra_monthly),
            "escalated extra payment",
            month,
        )?;

        let balance = self.balance_units;
        let interest_gross = checked(balance.checked_mul(ctx.monthly_rate), "interest", month)?;
        let subsidy = ctx.subsidy.amount(month, balance, interest_gross);
        let interest_net = interest_gross - subsidy;

        let mut capital_base = (ctx.installment_units - interest_gross).max(Decimal::ZERO);
        let extra_scheduled = checked(
            self.plan.amount_for_month(month, self.extra_monthly),
            "extra payment",
            month,
        )?;
        let mut capital_extra = if ctx.is_indexed {
            checked(
                extra_scheduled.checked_div(self.unit_value),
                "extra payment in units",
                month,
            )?
        } else {
            extra_scheduled
        };

        let mut capital_total = capital_base.saturating_add(capital_extra);
        if capital_total > balance {
            capital_total = balance;
            if balance < capital_base {
                capital_base = balance;
                capital_extra = Decimal::ZERO;
            } else {
                capital_extra = balance - capital_base;
            }
        }

        self.balance_units -= capital_total;
        if self.balance_units < ctx.thresholds.snap {
            self.balance_units = Decimal::ZERO;
        }

        let uv = self.unit_value;
        let to_currency = |units: Decimal, what: &str| checked(units.checked_mul(uv), what, month);
        let interest_gross_c = to_currency(interest_gross, "interest")?;
        let interest_net_c = to_currency(interest_net, "net interest")?;
        let subsidy_c = to_currency(subsidy, "subsidy")?;
        let capital_base_c = to_currency(capital_base, "base capital")?;
        let capital_extra_c = to_currency(capital_extra, "extra capital")?;
        let capital_total_c = to_currency(capital_total, "capital")?;
        let balance_c = self.balance()?;
        let payment_total = checked(
            interest_net_c
                .checked_add(capital_base_c)
                .and_then(|v| v.checked_add(self.insurance))
                .and_then(|v| v.checked_add(capital_extra_c)),
            "payment",
            month,
        )?;

        self.interest_paid = checked(
            self.interest_paid.checked_add(interest_net_c),
            "interest paid",
            month,
        )?;
        self.insurance_paid = checked(
            self.insurance_paid.checked_add(self.insurance),
            "insurance paid",
            month,
        )?;
        self.subsidy_received = checked(
            self.subsidy_received.checked_add(subsidy_c),
            "subsidy received",
            month,
        )?;
        self.capital_paid = checked(
            self.capital_paid.checked_add(capital_total_c),
            "capital paid",
            month,
        )?;
        self.balances.push(balance_c);

        Ok(AmortizationRow {
            month,
            payment_total,
            interest_gross: interest_gross_c,
            subsidy: subsidy_c,
            interest_net: interest_net_c,
            insurance: self.insurance,
            capital_base: capital_base_c,
            capital_extra: capital_extra_c,
            capital_total: capital_total_c,
            balance: balance_c,
            extra_scheduled,
            unit_value: ctx.is_indexed.then_some(uv),
        })
    }
}

/// Map an overflowed checked operation to an error naming the quantity.
fn checked(value: Option<Decimal>, what: &str, month: u32) -> MortgageSimResult<Decimal> {
    value.ok_or_else(|| {
        MortgageSimError::FinancialImpossibility(format!(
            "{what} exceeds the representable range in month {month}"
        ))
    })
}
