//! Rate Forecasting Service Provider Interface
//!
//! Value types, error type and collaborator traits for the rate forecasting
//! pipeline.

pub mod contract;
pub mod error;
pub mod model;

pub use contract::{DataSource, OrderSearch, SeriesClient};
pub use error::{RatecastError, Result};
pub use model::*;
