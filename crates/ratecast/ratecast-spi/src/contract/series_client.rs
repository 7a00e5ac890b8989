//! Remote statistics API client seam.

use crate::error::Result;
use crate::model::{SeriesRequest, TimeSeries};

/// Low-level client for a remote statistics API.
///
/// Transport, authentication and rate limiting belong to the implementation.
pub trait SeriesClient: Send + Sync {
    /// Provider series id for a logical series name, if the provider has one.
    fn series_id(&self, name: &str) -> Option<String>;

    /// Download observations for a provider series id.
    fn download(&self, series_id: &str, request: &SeriesRequest) -> Result<TimeSeries>;
}
