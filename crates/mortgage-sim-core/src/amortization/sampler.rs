//! Down-sampling of the two balance trajectories for charting.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Cadence, in months, of regular chart points.
const SAMPLE_EVERY: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPoint {
    pub month: u32,
    pub baseline_balance: Money,
    pub strategy_balance: Money,
}

/// A finished path as seen by the sampler.
#[derive(Debug, Clone, Copy)]
pub struct Trajectory<'a> {
    /// Currency balance at the end of each month, month 1 first.
    pub balances: &'a [Money],
    pub settled: bool,
}

impl Trajectory<'_> {
    fn len(&self) -> u32 {
        self.balances.len() as u32
    }

    /// Balance at `month`; a settled path stays at zero, an unsettled one
    /// holds its last balance.
    fn at(&self, month: u32) -> Money {
        match self.balances.get(month as usize - 1) {
            Some(balance) => *balance,
            None if self.settled => Decimal::ZERO,
            None => self.balances.last().copied().unwrap_or(Decimal::ZERO),
        }
    }

    fn settles_at(&self, month: u32) -> bool {
        self.settled && month == self.len()
    }
}

fn round_currency(amount: Money) -> Money {
    amount
        .max(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Month 0, month 1, every third month, and the month each path settles;
/// closes the range at `original_term` with a zero point when the strategy
/// finishes early.
pub fn sample(
    original_balance: Money,
    baseline: Trajectory<'_>,
    strategy: Trajectory<'_>,
    original_term: u32,
) -> Vec<GraphPoint> {
    let opening = round_currency(original_balance);
    let mut points = vec![GraphPoint {
        month: 0,
        baseline_balance: opening,
        strategy_balance: opening,
    }];

    let horizon = baseline.len().max(strategy.len());
    for month in 1..=horizon {
        let due = month == 1
            || month % SAMPLE_EVERY == 0
            || baseline.settles_at(month)
            || strategy.settles_at(month);
        if due {
            points.push(GraphPoint {
                month,
                baseline_balance: round_currency(baseline.at(month)),
                strategy_balance: round_currency(strategy.at(month)),
            });
        }
    }

    let last_month = points.last().map(|p| p.month).unwrap_or(0);
    if strategy.len() < original_term && last_month < original_term {
        points.push(GraphPoint {
            month: original_term,
            baseline_balance: Decimal::ZERO,
            strategy_balance: Decimal::ZERO,
        });
    }

    points
}
