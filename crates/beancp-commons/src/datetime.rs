//! Date and time conversions
//!
//! Naive timestamps are interpreted as UTC. Text uses RFC 3339 in both
//! directions; text with another offset is normalized to UTC when parsed.

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};

use beancp_core::Converter;

pub fn datetime_converters() -> Vec<Converter> {
    vec![
        Converter::new::<DateTime<Utc>, NaiveDateTime>(|v| v.naive_utc()),
        Converter::new::<NaiveDateTime, DateTime<Utc>>(|v| v.and_utc()),
        Converter::new::<DateTime<Utc>, String>(|v| v.to_rfc3339()),
        Converter::with_mapper::<String, DateTime<Utc>>(|_, text| {
            let parsed = DateTime::parse_from_rfc3339(text)
                .with_context(|| format!("'{}' is not an RFC 3339 timestamp", text))?;
            Ok(parsed.with_timezone(&Utc))
        }),
        Converter::new::<DateTime<Utc>, i64>(|v| v.timestamp_millis()),
    ]
}
