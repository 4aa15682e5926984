use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};
use serde::Serializer;

use crate::errors::{Error, Result};

/// Width of an ingest bucket in seconds.
pub const BUCKET_SECONDS: i64 = 10;
/// Length of the query window in seconds.
pub const WINDOW_SECONDS: i64 = 60 * 60;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Asia/Kuala_Lumpur has been UTC+08:00 without DST since 1982.
const LOCAL_OFFSET_SECONDS: i32 = 8 * 60 * 60;

/// Source of wall-clock time for the handlers.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn local_offset() -> Result<FixedOffset> {
    FixedOffset::east_opt(LOCAL_OFFSET_SECONDS)
        .ok_or_else(|| Error::Clock(format!("invalid offset {}s", LOCAL_OFFSET_SECONDS)))
}

/// Floors `now` to the start of its bucket and returns it as local wall time.
pub fn bucket_start(now: DateTime<Utc>) -> Result<NaiveDateTime> {
    let secs = now.timestamp();
    let floored = secs - secs.rem_euclid(BUCKET_SECONDS);
    let bucket = DateTime::<Utc>::from_timestamp(floored, 0)
        .ok_or_else(|| Error::Clock(format!("timestamp {} out of range", floored)))?;

    Ok(bucket.with_timezone(&local_offset()?).naive_local())
}

/// Local wall time one window before `now`.
pub fn window_start(now: DateTime<Utc>) -> Result<NaiveDateTime> {
    now.with_timezone(&local_offset()?)
        .naive_local()
        .checked_sub_signed(Duration::seconds(WINDOW_SECONDS))
        .ok_or_else(|| Error::Clock(format!("cannot compute window start for {}", now)))
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
