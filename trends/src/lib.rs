pub mod aggregate;
pub mod client;
pub mod error;
pub mod metrics_defs;
pub mod normalize;
pub mod query;
pub mod series;
pub mod testutils;

pub use aggregate::Aggregator;
pub use client::{GoogleTrendsClient, TrendsClient};
pub use error::{QueryError, TrendsError, UpstreamError};
pub use query::TrendsQuery;
pub use series::{LongRecord, RawRecord, RawRow, RawSeries, RawTimestamp};
