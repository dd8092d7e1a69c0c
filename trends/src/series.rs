use chrono::{DateTime, Utc};
use serde::Serialize;

/// Timestamp as delivered by the upstream.
///
/// The widget API has returned both representations over time: an absolute
/// instant, or a raw count of milliseconds since the Unix epoch. Both stay
/// supported; only the normalizer turns them into strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTimestamp {
    Utc(DateTime<Utc>),
    EpochMillis(i64),
}

/// One wide-format row: a timestamp plus one value per requested keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub timestamp: RawTimestamp,
    /// Parallel to the keyword list of the originating query. The producing
    /// client rejects rows whose length does not match the request;
    /// consumers may rely on that and pair positionally.
    pub values: Vec<i64>,
}

/// Wide-format result of a single per-geo upstream query.
///
/// Extra upstream columns (e.g. `isPartial`) are dropped by the client and
/// never reach this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeries {
    pub rows: Vec<RawRow>,
}

impl RawSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A melted record whose date still carries the upstream representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub date: RawTimestamp,
    pub geo: String,
    pub keyword: String,
    pub value: i64,
}

/// Final long-format output record, one per (timestamp, geo, keyword).
///
/// `date` is canonical `"YYYY-MM-DD HH:MM:SS"` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRecord {
    pub date: String,
    pub geo: String,
    pub keyword: String,
    pub value: i64,
}
