use crate::client::TrendsClient;
use crate::error::TrendsError;
use crate::metrics_defs::GEOS_SKIPPED;
use crate::query::TrendsQuery;
use crate::series::{RawRecord, RawSeries};
use std::sync::Arc;

/// Fans one query out across its geos and merges the surviving results.
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<dyn TrendsClient>,
}

impl Aggregator {
    pub fn new(client: Arc<dyn TrendsClient>) -> Self {
        Self { client }
    }

    /// Queries every geo in list order, one upstream call at a time.
    ///
    /// A geo that fails or comes back empty is logged and dropped; partial
    /// coverage beats an all-or-nothing failure. Calls are sequential on
    /// purpose, the upstream rate-limits aggressively. Only when no geo
    /// produced data does the request fail, with [`TrendsError::NoDataFound`].
    pub async fn interest_over_time(
        &self,
        query: &TrendsQuery,
    ) -> Result<Vec<RawRecord>, TrendsError> {
        let mut records = Vec::new();

        for geo in &query.geos {
            let result = self
                .client
                .interest_over_time(&query.keywords, geo, &query.timeframe)
                .await;

            match result {
                Ok(series) if series.is_empty() => {
                    tracing::warn!(geo = %geo, "upstream returned no data, skipping geo");
                    metrics::counter!(GEOS_SKIPPED.name, "reason" => "empty").increment(1);
                }
                Ok(series) => melt(&series, geo, &query.keywords, &mut records),
                Err(error) => {
                    tracing::warn!(geo = %geo, error = %error, "upstream query failed, skipping geo");
                    metrics::counter!(GEOS_SKIPPED.name, "reason" => "error").increment(1);
                }
            }
        }

        if records.is_empty() {
            return Err(TrendsError::NoDataFound);
        }
        Ok(records)
    }
}

/// Reshapes one wide per-geo series into long records.
///
/// Output order is row-major: upstream row order first, then keyword order
/// within each row, so responses are deterministic. Values are paired with
/// keywords positionally; the upstream client guarantees each row carries
/// one value per requested keyword.
fn melt(series: &RawSeries, geo: &str, keywords: &[String], out: &mut Vec<RawRecord>) {
    for row in &series.rows {
        for (keyword, value) in keywords.iter().zip(&row.values) {
            out.push(RawRecord {
                date: row.timestamp,
                geo: geo.to_string(),
                keyword: keyword.clone(),
                value: *value,
            });
        }
    }
}
