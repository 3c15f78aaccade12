//! Wall-clock helpers. Hours are stamped in a fixed offset from [`Tuning`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use wellfin_core::{TaskDescriptor, Tuning};

pub fn local_offset(tuning: &Tuning) -> FixedOffset {
    FixedOffset::east_opt(tuning.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// `date` (or today) at `hour:00` local time.
pub fn at_hour(date: Option<NaiveDate>, hour: u32, offset: FixedOffset) -> DateTime<Utc> {
    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let local = date.and_time(time);
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Parses an RFC 3339 instant, or a naive `YYYY-MM-DDTHH:MM[:SS]` read as local time.
pub fn parse_instant(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accepts `YYYY-MM-DD` or anything [`parse_instant`] understands.
pub fn parse_date(value: &str, offset: FixedOffset) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_instant(value, offset).map(|dt| dt.with_timezone(&offset).date_naive()))
}

/// The day a task belongs to: its explicit date, else the day of its scheduled time.
pub fn task_date(task: &TaskDescriptor, offset: FixedOffset) -> Option<NaiveDate> {
    task.scheduled_date
        .or_else(|| task.scheduled_time.map(|t| t.with_timezone(&offset).date_naive()))
}
