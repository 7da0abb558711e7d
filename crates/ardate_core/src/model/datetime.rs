//! Dirty-tracking calendrical value.
//!
//! # Responsibility
//! - Wrap a `jiff::Zoned` and re-expose its state-changing entry points.
//! - Report every mutating call to the bound owner before delegating.
//! - Format through the friendly-name registry.
//!
//! # Invariants
//! - Every mutating call fires the binding exactly once, whether or not the
//!   instant changes and whether or not the engine accepts the arguments.
//! - Reads always reflect the wrapped `Zoned`; there is no cached value.
//! - Duplicates (including `Clone`) start unattached.

use crate::format::{SharedFormats, CANONICAL_PATTERN};
use crate::model::binding::{DirtyBinding, DirtyTracker};
use jiff::civil::{self, Date, ISOWeekDate, Time, Weekday};
use jiff::fmt::strtime;
use jiff::fmt::temporal::{Pieces, PiecesOffset};
use jiff::tz::{Offset, TimeZone};
use jiff::{Span, Timestamp, Zoned};
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::num::ParseIntError;
use std::rc::Rc;

pub type DateTimeResult<T> = Result<T, DateTimeError>;

/// Errors raised while constructing, mutating or formatting a `DateTime`.
#[derive(Debug)]
pub enum DateTimeError {
    /// Input could not be interpreted by the engine.
    Parse { input: String, source: jiff::Error },
    /// `@<seconds>` input with a non-integer payload.
    UnixSeconds {
        input: String,
        source: ParseIntError,
    },
    /// Unknown or unloadable IANA time zone name.
    TimeZone { name: String, source: jiff::Error },
    /// Engine rejected a mutation, usually because the result is out of range.
    Range {
        operation: &'static str,
        source: jiff::Error,
    },
    /// Engine rejected the resolved pattern.
    Format { pattern: String, source: jiff::Error },
}

impl Display for DateTimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { input, source } => {
                write!(f, "failed to parse datetime `{input}`: {source}")
            }
            Self::UnixSeconds { input, source } => {
                write!(f, "invalid unix timestamp `{input}`: {source}")
            }
            Self::TimeZone { name, source } => write!(f, "unknown time zone `{name}`: {source}"),
            Self::Range { operation, source } => write!(f, "{operation} failed: {source}"),
            Self::Format { pattern, source } => {
                write!(f, "failed to format with pattern `{pattern}`: {source}")
            }
        }
    }
}

impl Error for DateTimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. }
            | Self::TimeZone { source, .. }
            | Self::Range { source, .. }
            | Self::Format { source, .. } => Some(source),
            Self::UnixSeconds { source, .. } => Some(source),
        }
    }
}

fn range_error(operation: &'static str) -> impl FnOnce(jiff::Error) -> DateTimeError {
    move |source| DateTimeError::Range { operation, source }
}

/// A date/time attribute value that reports in-place mutation to its owner.
///
/// Every date or datetime column hydrated by the ORM layer becomes one of
/// these. Mutating methods return `&mut Self` (wrapped in a `Result` when
/// the engine can reject the call) so they chain:
///
/// ```
/// use ardate_core::DateTime;
/// use jiff::{tz, Span};
///
/// let zone = tz::TimeZone::fixed(tz::offset(-5));
/// let mut value = DateTime::new("2010-01-02 03:04:05", Some(zone))?;
/// value.add_interval(Span::new().days(1))?.set_time(12, 0, None, None)?;
/// assert_eq!(value.format(Some("db"))?, "2010-01-03 12:00:00");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DateTime {
    zoned: Zoned,
    formats: SharedFormats,
    binding: DirtyBinding,
}

impl DateTime {
    /// Builds a value from a string, delegating interpretation to the engine.
    ///
    /// - `""` and `"now"` (any case) yield the current instant.
    /// - `"@<seconds>"` yields a unix timestamp in UTC.
    /// - A bracketed IANA annotation (`...[America/New_York]`) selects that zone.
    /// - A `Z` or numeric offset selects a fixed-offset zone.
    /// - Otherwise the civil datetime (date-only means midnight) is placed in
    ///   `time_zone`, or in the system zone when `None`.
    ///
    /// # Errors
    /// - `DateTimeError::Parse` when the engine cannot interpret `source`.
    pub fn new(source: &str, time_zone: Option<TimeZone>) -> DateTimeResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("now") {
            let zone = time_zone.unwrap_or_else(TimeZone::system);
            return Ok(Self::from_zoned(Zoned::now().with_time_zone(zone)));
        }

        if let Some(seconds) = trimmed.strip_prefix('@') {
            let seconds = seconds
                .parse::<i64>()
                .map_err(|source| DateTimeError::UnixSeconds {
                    input: trimmed.to_string(),
                    source,
                })?;
            return Self::from_timestamp(seconds, Some(TimeZone::UTC));
        }

        let zoned = parse_zoned(trimmed, time_zone).map_err(|source| DateTimeError::Parse {
            input: trimmed.to_string(),
            source,
        })?;
        Ok(Self::from_zoned(zoned))
    }

    /// Like [`DateTime::new`], with the zone given as an IANA name.
    pub fn parse_in(source: &str, zone_name: &str) -> DateTimeResult<Self> {
        let zone = TimeZone::get(zone_name).map_err(|source| DateTimeError::TimeZone {
            name: zone_name.to_string(),
            source,
        })?;
        Self::new(source, Some(zone))
    }

    /// Parses `source` with an explicit strptime pattern.
    ///
    /// Returns `None` when parsing fails; callers must check before use.
    /// The zone comes from a parsed offset (`%z`) or IANA name (`%Q`) when
    /// the pattern has one, otherwise from `time_zone` (system when `None`).
    /// Missing time fields mean midnight.
    pub fn parse_from_pattern(
        pattern: &str,
        source: &str,
        time_zone: Option<TimeZone>,
    ) -> Option<Self> {
        let parsed = match strtime::parse(pattern, source) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(
                    "event=parse_from_pattern module=model status=failed pattern={pattern} error={err}"
                );
                return None;
            }
        };

        let has_zone = parsed.offset().is_some() || parsed.iana_time_zone().is_some();
        match parsed.to_zoned() {
            Ok(zoned) => return Some(Self::from_zoned(zoned)),
            Err(err) if has_zone => {
                debug!(
                    "event=parse_from_pattern module=model status=failed pattern={pattern} error={err}"
                );
                return None;
            }
            Err(_) => {}
        }

        let datetime = parsed
            .to_datetime()
            .or_else(|_| parsed.to_date().map(|date| date.to_datetime(Time::midnight())));
        let zone = time_zone.unwrap_or_else(TimeZone::system);
        match datetime.and_then(|datetime| zone.to_zoned(datetime)) {
            Ok(zoned) => Some(Self::from_zoned(zoned)),
            Err(err) => {
                debug!(
                    "event=parse_from_pattern module=model status=failed pattern={pattern} error={err}"
                );
                None
            }
        }
    }

    /// Builds a value from unix seconds, in `time_zone` or the system zone.
    pub fn from_timestamp(seconds: i64, time_zone: Option<TimeZone>) -> DateTimeResult<Self> {
        let timestamp = Timestamp::from_second(seconds).map_err(range_error("from_timestamp"))?;
        let zone = time_zone.unwrap_or_else(TimeZone::system);
        Ok(Self::from_zoned(timestamp.to_zoned(zone)))
    }

    /// Current instant in the system zone.
    pub fn now() -> Self {
        Self::from_zoned(Zoned::now())
    }

    /// Wraps an engine value. The result uses the global format registry.
    pub fn from_zoned(zoned: Zoned) -> Self {
        Self {
            zoned,
            formats: SharedFormats::global(),
            binding: DirtyBinding::new(),
        }
    }

    /// Rebinds this value to another format registry.
    pub fn with_formats(mut self, formats: SharedFormats) -> Self {
        self.formats = formats;
        self
    }

    pub fn formats(&self) -> &SharedFormats {
        &self.formats
    }

    // ---------------------------------------------------------------------
    // Reads

    pub fn as_zoned(&self) -> &Zoned {
        &self.zoned
    }

    pub fn into_zoned(self) -> Zoned {
        self.zoned
    }

    pub fn timestamp(&self) -> Timestamp {
        self.zoned.timestamp()
    }

    pub fn unix_seconds(&self) -> i64 {
        self.zoned.timestamp().as_second()
    }

    pub fn time_zone(&self) -> &TimeZone {
        self.zoned.time_zone()
    }

    pub fn offset(&self) -> Offset {
        self.zoned.offset()
    }

    pub fn datetime(&self) -> civil::DateTime {
        self.zoned.datetime()
    }

    pub fn year(&self) -> i16 {
        self.zoned.year()
    }

    pub fn month(&self) -> i8 {
        self.zoned.month()
    }

    pub fn day(&self) -> i8 {
        self.zoned.day()
    }

    pub fn hour(&self) -> i8 {
        self.zoned.hour()
    }

    pub fn minute(&self) -> i8 {
        self.zoned.minute()
    }

    pub fn second(&self) -> i8 {
        self.zoned.second()
    }

    pub fn microsecond(&self) -> i16 {
        self.zoned.microsecond()
    }

    // ---------------------------------------------------------------------
    // Mutations

    /// Adds a calendar or time interval.
    pub fn add_interval(&mut self, interval: Span) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| zoned.checked_add(interval).map_err(range_error("add_interval")))
    }

    /// Subtracts a calendar or time interval.
    pub fn subtract_interval(&mut self, interval: Span) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| {
            zoned
                .checked_sub(interval)
                .map_err(range_error("subtract_interval"))
        })
    }

    /// Applies a relative or absolute expression.
    ///
    /// Accepted, in order:
    /// - an interval (`"1 day"`, `"-2 hours"`, `"+1 week"`, `"P1W"`), added
    ///   to the current value;
    /// - `now`, `midnight`/`today`, `noon`, `tomorrow`, `yesterday`;
    /// - a time of day (`"10:30"`), replacing the time on the current date;
    /// - a date or datetime (`"2010-01-01"`), interpreted like
    ///   [`DateTime::new`] in the current zone.
    ///
    /// Other natural-language phrases (`"next monday"`) are rejected.
    pub fn modify(&mut self, expression: &str) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| apply_expression(zoned, expression.trim()))
    }

    /// Sets the calendar date, keeping the time of day.
    ///
    /// Out-of-range months and days roll over: month 13 is January of the
    /// next year, day 0 is the last day of the previous month.
    pub fn set_date(&mut self, year: i16, month: i64, day: i64) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| {
            let start = Date::new(year, 1, 1)
                .map_err(range_error("set_date"))?
                .to_datetime(zoned.time());
            let datetime = roll(
                start,
                [
                    Span::new().try_months(month.saturating_sub(1)),
                    Span::new().try_days(day.saturating_sub(1)),
                ],
            )
            .map_err(range_error("set_date"))?;
            zoned
                .time_zone()
                .to_zoned(datetime)
                .map_err(range_error("set_date"))
        })
    }

    /// Sets the time of day. Missing seconds or microseconds mean zero and
    /// out-of-range fields roll into adjacent days.
    pub fn set_time(
        &mut self,
        hour: i64,
        minute: i64,
        second: Option<i64>,
        microsecond: Option<i64>,
    ) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| {
            let start = zoned.date().to_datetime(Time::midnight());
            let datetime = roll(
                start,
                [
                    Span::new().try_hours(hour),
                    Span::new().try_minutes(minute),
                    Span::new().try_seconds(second.unwrap_or(0)),
                    Span::new().try_microseconds(microsecond.unwrap_or(0)),
                ],
            )
            .map_err(range_error("set_time"))?;
            zoned
                .time_zone()
                .to_zoned(datetime)
                .map_err(range_error("set_time"))
        })
    }

    /// Moves to the given unix second, keeping the zone.
    pub fn set_timestamp(&mut self, seconds: i64) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| {
            let timestamp =
                Timestamp::from_second(seconds).map_err(range_error("set_timestamp"))?;
            Ok(timestamp.to_zoned(zoned.time_zone().clone()))
        })
    }

    /// Changes the zone, keeping the instant. Always counts as a mutation.
    pub fn set_timezone(&mut self, time_zone: TimeZone) -> &mut Self {
        self.binding.fire();
        self.zoned = self.zoned.with_time_zone(time_zone);
        self
    }

    /// Sets an ISO 8601 week date (`day` 1 = Monday, default 1), keeping the
    /// time of day. Out-of-range weeks and days roll over.
    pub fn set_iso_week_date(
        &mut self,
        year: i16,
        week: i64,
        day: Option<i64>,
    ) -> DateTimeResult<&mut Self> {
        self.apply(|zoned| {
            let start = ISOWeekDate::new(year, 1, Weekday::Monday)
                .map_err(range_error("set_iso_week_date"))?
                .date()
                .to_datetime(zoned.time());
            let datetime = roll(
                start,
                [
                    Span::new().try_weeks(week.saturating_sub(1)),
                    Span::new().try_days(day.unwrap_or(1).saturating_sub(1)),
                ],
            )
            .map_err(range_error("set_iso_week_date"))?;
            zoned
                .time_zone()
                .to_zoned(datetime)
                .map_err(range_error("set_iso_week_date"))
        })
    }

    fn apply<F>(&mut self, mutation: F) -> DateTimeResult<&mut Self>
    where
        F: FnOnce(&Zoned) -> DateTimeResult<Zoned>,
    {
        self.binding.fire();
        self.zoned = mutation(&self.zoned)?;
        Ok(self)
    }

    // ---------------------------------------------------------------------
    // Formatting

    /// Formats with a friendly name, a raw strftime pattern, or the registry
    /// default when `None`.
    ///
    /// # Errors
    /// - `DateTimeError::Format` when the engine rejects the resolved pattern.
    pub fn format(&self, name_or_pattern: Option<&str>) -> DateTimeResult<String> {
        let pattern = self.formats.resolve(name_or_pattern);
        strtime::format(pattern.as_bytes(), &self.zoned)
            .map_err(|source| DateTimeError::Format { pattern, source })
    }

    /// ISO 8601 with numeric offset, independent of the default format.
    pub fn to_canonical_string(&self) -> String {
        self.zoned.strftime(CANONICAL_PATTERN).to_string()
    }

    // ---------------------------------------------------------------------
    // Owner binding

    /// Binds this value to `owner`'s `attribute`, replacing any prior binding.
    pub fn attach_owner<T>(&mut self, owner: &Rc<T>, attribute: impl Into<String>)
    where
        T: DirtyTracker + 'static,
    {
        self.binding.attach(owner, attribute);
    }

    pub fn detach_owner(&mut self) {
        self.binding.detach();
    }

    pub fn owner_attribute(&self) -> Option<&str> {
        self.binding.attribute()
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    /// Independent copy with the same instant, zone and registry, unattached.
    pub fn duplicate(&self) -> Self {
        Self {
            zoned: self.zoned.clone(),
            formats: self.formats.clone(),
            binding: DirtyBinding::new(),
        }
    }
}

fn apply_expression(zoned: &Zoned, expression: &str) -> DateTimeResult<Zoned> {
    if let Ok(interval) = expression.parse::<Span>() {
        return zoned.checked_add(interval).map_err(range_error("modify"));
    }

    let zone = zoned.time_zone().clone();
    let date = zoned.date();
    let start_of = |date: Date, time: Time| zone.to_zoned(date.to_datetime(time));
    let keyword = match expression.to_ascii_lowercase().as_str() {
        "now" => Some(Ok(zoned.clone())),
        "midnight" | "today" => Some(start_of(date, Time::midnight())),
        "noon" => Some(start_of(date, Time::constant(12, 0, 0, 0))),
        "tomorrow" => Some(date.tomorrow().and_then(|day| start_of(day, Time::midnight()))),
        "yesterday" => Some(date.yesterday().and_then(|day| start_of(day, Time::midnight()))),
        _ => None,
    };
    if let Some(result) = keyword {
        return result.map_err(range_error("modify"));
    }

    if let Ok(time) = expression.parse::<Time>() {
        return start_of(date, time).map_err(range_error("modify"));
    }

    parse_zoned(expression, Some(zone.clone())).map_err(|source| DateTimeError::Parse {
        input: expression.to_string(),
        source,
    })
}

fn parse_zoned(source: &str, time_zone: Option<TimeZone>) -> Result<Zoned, jiff::Error> {
    let pieces = Pieces::parse(source)?;
    if pieces.time_zone_annotation().is_some() {
        return source.parse::<Zoned>();
    }

    let datetime = pieces
        .date()
        .to_datetime(pieces.time().unwrap_or(Time::midnight()));
    let zone = match pieces.offset() {
        Some(PiecesOffset::Zulu) => TimeZone::UTC,
        Some(PiecesOffset::Numeric(numeric)) => TimeZone::fixed(numeric.offset()),
        _ => time_zone.unwrap_or_else(TimeZone::system),
    };
    zone.to_zoned(datetime)
}

fn roll<const N: usize>(
    start: civil::DateTime,
    steps: [Result<Span, jiff::Error>; N],
) -> Result<civil::DateTime, jiff::Error> {
    let mut datetime = start;
    for step in steps {
        datetime = datetime.checked_add(step?)?;
    }
    Ok(datetime)
}

impl Clone for DateTime {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.zoned.timestamp() == other.zoned.timestamp()
            && self.zoned.offset() == other.zoned.offset()
            && self.zoned.time_zone().iana_name() == other.zoned.time_zone().iana_name()
    }
}

impl Eq for DateTime {}

impl Debug for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateTime")
            .field("zoned", &self.zoned)
            .field("binding", &self.binding)
            .finish()
    }
}

impl Display for DateTime {
    /// Renders with the registry default, falling back to the canonical form
    /// when the default pattern cannot be rendered.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.format(None) {
            Ok(text) => f.write_str(&text),
            Err(err) => {
                warn!("event=display_fallback module=model status=error error={err}");
                f.write_str(&self.to_canonical_string())
            }
        }
    }
}

impl From<Zoned> for DateTime {
    fn from(value: Zoned) -> Self {
        Self::from_zoned(value)
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::new(&text, None).map_err(serde::de::Error::custom)
    }
}
