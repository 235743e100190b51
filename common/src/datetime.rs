//! Lenient date parsing and day arithmetic.
//!
//! Dates that could not be parsed are represented as `None` rather than a
//! sentinel value, and every helper accepting a date treats `None` the same
//! way: a missing start yields zero, a missing end means "now".

use crate::error::{CommonError, CommonResult};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Layout used by search APIs (`YYYY-MM-DD`).
pub const SEARCH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Zone-less layouts tried after RFC 3339, in order. All are read as UTC.
const NAIVE_DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%SZ",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S",
];

const NAIVE_DATE_LAYOUTS: &[&str] = &[SEARCH_DATE_FORMAT, "%m/%d/%Y", "%Y%m%d"];

const OFFSET_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

const CLOCK_LAYOUT: &str = "%H:%M";

fn from_naive(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    naive.and_utc().fixed_offset()
}

/// Parse a date in any of the commonly exchanged layouts.
///
/// Input is trimmed first. Accepted layouts, tried in order: RFC 3339,
/// `YYYY-MM-DD` (padding optional), `YYYY-MM-DDTHH:MM:SSZ`, `M/D/YYYY`,
/// `M/D/YYYY h:mm:ss AM`, `YYYY-MM-DDTHH:MM:SS.fff+0000`,
/// `YYYY-MM-DDTHH:MM:SS`, `YYYYMMDD` and `HH:MM` (on 1 January of year 0).
///
/// ```
/// use svc_common::datetime::string_to_date;
///
/// assert!(string_to_date("2018-1-1").is_some());
/// assert!(string_to_date("7/9/2014 12:00:00 AM").is_some());
/// assert!(string_to_date("x").is_none());
/// ```
#[must_use]
pub fn string_to_date(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date);
    }
    if let Some(date) = NAIVE_DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(input, layout).ok())
    {
        return date.and_hms_opt(0, 0, 0).map(from_naive);
    }
    if let Ok(date) = DateTime::parse_from_str(input, OFFSET_LAYOUT) {
        return Some(date);
    }
    if let Some(date) = NAIVE_DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
    {
        return Some(from_naive(date));
    }

    let time = chrono::NaiveTime::parse_from_str(input, CLOCK_LAYOUT).ok()?;
    NaiveDate::from_ymd_opt(0, 1, 1).map(|day| from_naive(day.and_time(time)))
}

/// Format a date in the search layout (`YYYY-MM-DD`).
#[must_use]
pub fn to_search_date_format<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(SEARCH_DATE_FORMAT).to_string()
}

/// Parse `input` leniently and format it in the search layout.
///
/// Blank or unparseable input yields an empty string.
#[must_use]
pub fn to_search_date_format_from_string(input: &str) -> String {
    string_to_date(input)
        .map(|date| to_search_date_format(&date))
        .unwrap_or_default()
}

fn has_error_items(layout: &str) -> bool {
    StrftimeItems::new(layout).any(|item| matches!(item, Item::Error))
}

/// Re-format `date` from the strftime layout `from` to the layout `to`.
///
/// When `date` does not match `from`, the input is returned unchanged. When
/// `to` is not a valid layout, `to` itself is returned.
///
/// ```
/// use svc_common::datetime::convert_date_format;
///
/// assert_eq!(convert_date_format("20190214", "%Y%m%d", "%d.%m.%Y"), "14.02.2019");
/// assert_eq!(convert_date_format("asdf", "%Y%m%d", "%d.%m.%Y"), "asdf");
/// ```
#[must_use]
pub fn convert_date_format(date: &str, from: &str, to: &str) -> String {
    if has_error_items(from) {
        return date.to_string();
    }

    let parsed = DateTime::parse_from_str(date, from)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(date, from).ok().map(from_naive))
        .or_else(|| {
            NaiveDate::parse_from_str(date, from)
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(from_naive)
        });

    match parsed {
        None => date.to_string(),
        Some(_) if has_error_items(to) => to.to_string(),
        Some(parsed) => parsed.format(to).to_string(),
    }
}

/// Earliest representable timestamp, `0001-01-01T00:00:00Z`.
#[must_use]
pub fn min_time() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(DateTime::<Utc>::MIN_UTC.fixed_offset(), from_naive)
}

/// Latest timestamp used as an open upper bound, `9999-12-31T23:59:59.999Z`.
#[must_use]
pub fn max_time() -> DateTime<FixedOffset> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|day| day.and_hms_milli_opt(23, 59, 59, 999))
        .map_or(DateTime::<Utc>::MAX_UTC.fixed_offset(), from_naive)
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

/// Whole days between two dates, truncated toward zero.
///
/// A missing `from` yields 0; a missing `to` means now.
#[must_use]
pub fn calc_days(from: Option<DateTime<FixedOffset>>, to: Option<DateTime<FixedOffset>>) -> i64 {
    let Some(from) = from else {
        return 0;
    };
    let to = to.unwrap_or_else(now);
    (to - from).num_days()
}

/// Inclusive count of weekdays between two dates, ignoring holidays.
///
/// A missing `from` yields 0; a missing `to` means now.
///
/// ```
/// use svc_common::datetime::{calc_business_days, string_to_date};
///
/// let from = string_to_date("2016-06-01T00:00:00Z");
/// let to = string_to_date("2016-06-06T00:00:00Z");
/// assert_eq!(calc_business_days(from, to), 4);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn calc_business_days(
    from: Option<DateTime<FixedOffset>>,
    to: Option<DateTime<FixedOffset>>,
) -> i64 {
    let Some(from) = from else {
        return 0;
    };
    let to = to.unwrap_or_else(now);

    let total_days = (to - from).num_days() as f32;
    let from_wd = from.weekday().num_days_from_sunday();
    let to_wd = to.weekday().num_days_from_sunday();
    let weekday_delta = from_wd as f32 - to_wd as f32;

    let mut business_days = (1.0 + (total_days * 5.0 - weekday_delta * 2.0) / 7.0) as i64;
    if to_wd == 6 {
        business_days -= 1;
    }
    if from_wd == 0 {
        business_days -= 1;
    }
    business_days
}

/// Whether `date` lies within `[start, end]`.
#[must_use]
pub fn is_date_in_span<Tz: TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    date: &DateTime<Tz>,
) -> bool {
    start <= date && date <= end
}

/// A record date that may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComparableDate {
    /// The date, `None` when the record carries no value
    pub date: Option<DateTime<FixedOffset>>,
}

impl ComparableDate {
    /// Wrap a date.
    #[must_use]
    pub const fn new(date: DateTime<FixedOffset>) -> Self {
        Self { date: Some(date) }
    }

    /// Whether this date is at or after `other`. Unset dates never are.
    #[must_use]
    pub fn equal_or_after(&self, other: &DateTime<FixedOffset>) -> bool {
        self.date.is_some_and(|date| date >= *other)
    }

    /// Whether this date is at or before `other`. Unset dates never are.
    #[must_use]
    pub fn equal_or_before(&self, other: &DateTime<FixedOffset>) -> bool {
        self.date.is_some_and(|date| date <= *other)
    }
}

impl From<DateTime<FixedOffset>> for ComparableDate {
    fn from(date: DateTime<FixedOffset>) -> Self {
        Self::new(date)
    }
}

/// A record spanning a time range.
pub trait TimeBound {
    /// First instant of the record.
    fn start(&self) -> ComparableDate;
    /// Last instant of the record.
    fn end(&self) -> ComparableDate;
}

/// Whether a record's range overlaps the optional `[start, end]` bounds.
///
/// Without bounds every record matches. With only a start bound the record
/// must end at or after it; with only an end bound it must start at or
/// before it; with both the ranges must overlap.
///
/// # Errors
///
/// Returns [`CommonError::InvalidTimeBound`] when the record's start or end
/// is unset.
pub fn time_range_in_bounds<R: TimeBound + ?Sized>(
    record: &R,
    start: Option<&DateTime<FixedOffset>>,
    end: Option<&DateTime<FixedOffset>>,
) -> CommonResult<bool> {
    let (record_start, record_end) = (record.start(), record.end());
    if record_start.date.is_none() || record_end.date.is_none() {
        return Err(CommonError::invalid_time_bound(
            "the record cannot contain unset dates",
        ));
    }

    Ok(match (start, end) {
        (None, None) => true,
        (Some(start), None) => record_end.equal_or_after(start),
        (None, Some(end)) => record_start.equal_or_before(end),
        (Some(start), Some(end)) => {
            record_start.equal_or_before(end) && record_end.equal_or_after(start)
        }
    })
}
