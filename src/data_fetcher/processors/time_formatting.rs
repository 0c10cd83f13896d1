use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Parses the timestamps the API emits.
///
/// Accepts RFC 3339 (`2025-05-01T12:00:00Z`, `+08:00` offsets) and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS` forms, which are
/// read as UTC.
///
/// # Examples
///
/// ```
/// use bangumi_rank::data_fetcher::processors::parse_api_timestamp;
///
/// assert!(parse_api_timestamp("2025-05-01T12:00:00Z").is_some());
/// assert!(parse_api_timestamp("2025-05-01 12:00:00").is_some());
/// assert!(parse_api_timestamp("yesterday").is_none());
/// ```
pub fn parse_api_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Formats an API timestamp in local time as `YYYY/MM/DD HH:MM:SS`.
///
/// Unparseable input is returned unchanged.
pub fn format_date_time(raw: &str) -> String {
    format_date_time_in(raw, &Local)
}

/// Same as [`format_date_time`] for an explicit timezone.
pub fn format_date_time_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_api_timestamp(raw) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%Y/%m/%d %H:%M:%S")
            .to_string(),
        None => raw.to_string(),
    }
}
