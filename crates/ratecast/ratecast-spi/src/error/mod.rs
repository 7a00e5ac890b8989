//! Error module containing error types and result aliases

mod ratecast_error;

pub use ratecast_error::RatecastError;

/// Result type for rate forecasting operations
pub type Result<T> = std::result::Result<T, RatecastError>;
