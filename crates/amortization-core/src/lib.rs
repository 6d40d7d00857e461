pub mod error;
pub mod schedule;
pub mod terms;
pub mod time_value;
pub mod types;

#[cfg(feature = "export")]
pub mod export;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all amortization operations
pub type AmortizationResult<T> = Result<T, AmortizationError>;
