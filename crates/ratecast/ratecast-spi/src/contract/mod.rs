//! Seams between the pipeline and its collaborators.

mod data_source;
mod order_search;
mod series_client;

pub use data_source::DataSource;
pub use order_search::OrderSearch;
pub use series_client::SeriesClient;
