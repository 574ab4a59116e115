//! Dates as EDINET sees them.

use chrono::{Duration, NaiveDate, Utc};

/// EDINET dates submissions in Japan Standard Time (UTC+9, no DST).
const JST_OFFSET_HOURS: i64 = 9;

/// Today's date in Japan.
pub(crate) fn today_jst() -> NaiveDate {
    (Utc::now() + Duration::hours(JST_OFFSET_HOURS)).date_naive()
}

/// Every day from `start` through `end`, both included.
pub(crate) fn date_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, String> {
    if end < start {
        return Err(format!("--until {end} is before --date {start}"));
    }
    Ok(start.iter_days().take_while(|day| *day <= end).collect())
}
