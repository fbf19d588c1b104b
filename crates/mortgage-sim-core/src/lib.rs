pub mod error;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "budget")]
pub mod budget;

pub use error::MortgageSimError;
pub use types::*;

/// Standard result type for all mortgage-sim operations
pub type MortgageSimResult<T> = Result<T, MortgageSimError>;
