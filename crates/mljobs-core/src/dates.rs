use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// `NaiveDate::num_days_from_ce` of 1970-01-01; polars stores `Date` as days since then.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// chrono's `%Y` accepts one or two digits, so `5/1/23` would otherwise land in year 5.
const MIN_PLAUSIBLE_YEAR: i32 = 1000;

static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%y",
];

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a posting date written in any of the common layouts found in scraped job
/// boards. Returns `None` instead of an error so a bad value never drops its row.
pub fn parse_posting_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let dates = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok());
    let datetimes = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date());
    let zoned = [
        DateTime::parse_from_rfc3339(trimmed),
        DateTime::parse_from_rfc2822(trimmed),
    ]
    .into_iter()
    .filter_map(|parsed| parsed.ok())
    .map(|dt| dt.date_naive());
    // bare year-month, e.g. "2023-05"
    let year_month = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok();

    dates
        .chain(datetimes)
        .chain(zoned)
        .chain(year_month)
        .find(|date| date.year() >= MIN_PLAUSIBLE_YEAR)
}

/// Truncates a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// `YYYY-MM` label used for month buckets.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
