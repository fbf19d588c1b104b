//! Mortgage amortization simulation: a baseline (bank-only) schedule and a
//! borrower strategy schedule run side by side under one shared set of
//! rate, inflation and subsidy assumptions.

pub mod engine;
pub mod extra_payment;
pub mod installment;
pub mod metrics;
pub mod rates;
pub mod sampler;
pub mod simulator;
pub mod subsidy;

pub use engine::{simulate_mortgage, LoanParameters, SimulationResult};
