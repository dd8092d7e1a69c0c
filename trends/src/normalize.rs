use crate::series::{LongRecord, RawRecord, RawTimestamp};
use chrono::{DateTime, Utc};

const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats an upstream timestamp as canonical `"YYYY-MM-DD HH:MM:SS"` UTC.
///
/// Absolute instants are formatted directly, with no timezone conversion.
/// Epoch milliseconds are divided down to seconds and interpreted as UTC.
/// Out-of-range epochs clamp to the Unix epoch.
pub fn canonical_date(timestamp: RawTimestamp) -> String {
    let instant = match timestamp {
        RawTimestamp::Utc(dt) => dt,
        RawTimestamp::EpochMillis(ms) => {
            DateTime::<Utc>::from_timestamp(ms / 1000, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        }
    };
    instant.format(CANONICAL_FORMAT).to_string()
}

/// Rewrites every record's date to the canonical string form.
///
/// Order and all other fields are preserved. This is the single point where
/// upstream timestamp representations become strings; nothing downstream
/// sees a raw timestamp.
pub fn normalize(records: Vec<RawRecord>) -> Vec<LongRecord> {
    records
        .into_iter()
        .map(|record| LongRecord {
            date: canonical_date(record.date),
            geo: record.geo,
            keyword: record.keyword,
            value: record.value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis() {
        let date = canonical_date(RawTimestamp::EpochMillis(1_700_000_000_000));
        assert_eq!(date, "2023-11-14 22:13:20");
    }

    #[test]
    fn test_absolute_instant_matches_millis_for_same_instant() {
        let instant = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            canonical_date(RawTimestamp::Utc(instant)),
            canonical_date(RawTimestamp::EpochMillis(1_700_000_000_000)),
        );
    }

    #[test]
    fn test_out_of_range_epoch_clamps() {
        let date = canonical_date(RawTimestamp::EpochMillis(i64::MAX));
        assert_eq!(date, "1970-01-01 00:00:00");
    }

    #[test]
    fn test_normalize_preserves_order_and_fields() {
        let records = vec![
            RawRecord {
                date: RawTimestamp::EpochMillis(1_700_000_000_000),
                geo: "US".into(),
                keyword: "Bitcoin".into(),
                value: 42,
            },
            RawRecord {
                date: RawTimestamp::Utc(DateTime::<Utc>::UNIX_EPOCH),
                geo: "GB".into(),
                keyword: "Ethereum".into(),
                value: 7,
            },
        ];

        let normalized = normalize(records);
        assert_eq!(
            normalized,
            vec![
                LongRecord {
                    date: "2023-11-14 22:13:20".into(),
                    geo: "US".into(),
                    keyword: "Bitcoin".into(),
                    value: 42,
                },
                LongRecord {
                    date: "1970-01-01 00:00:00".into(),
                    geo: "GB".into(),
                    keyword: "Ethereum".into(),
                    value: 7,
                },
            ]
        );
    }
}
