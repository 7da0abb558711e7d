//! `rusqlite` conversions for `DateTime`.

use crate::model::binding::DirtyTracker;
use crate::model::datetime::DateTime;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use std::rc::Rc;

/// Registry entry used when writing values to storage.
pub const STORAGE_FORMAT_KEY: &str = "db";

// The Unix epoch in SQLite julian days: `select julianday('1970-01-01T00:00:00Z')`.
const UNIX_EPOCH_AS_JULIAN_DAYS: f64 = 2440587.5;
// SQLite assumes 24 hours in every day.
const SECONDS_PER_DAY: f64 = 86400.0;

// Text columns carry no offset, so values are written in the zone `FromSql`
// reads them back in.
impl ToSql for DateTime {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let stored = DateTime::from_zoned(self.as_zoned().with_time_zone(TimeZone::system()))
            .with_formats(self.formats().clone());
        let text = stored
            .format(Some(STORAGE_FORMAT_KEY))
            .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for DateTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(_) => {
                let text = value.as_str()?;
                DateTime::new(text, None).map_err(|err| FromSqlError::Other(Box::new(err)))
            }
            ValueRef::Integer(seconds) => DateTime::from_timestamp(seconds, None)
                .map_err(|err| FromSqlError::Other(Box::new(err))),
            ValueRef::Real(days) => julian_days_to_datetime(days),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

fn julian_days_to_datetime(days: f64) -> FromSqlResult<DateTime> {
    let seconds = (days - UNIX_EPOCH_AS_JULIAN_DAYS) * SECONDS_PER_DAY;
    let timestamp = SignedDuration::try_from_secs_f64(seconds)
        .and_then(Timestamp::from_duration)
        .map_err(|err| FromSqlError::Other(Box::new(err)))?;
    Ok(DateTime::from_zoned(timestamp.to_zoned(TimeZone::system())))
}

/// Reads `column` from `row` and binds the result to `owner` under the
/// column's name. `NULL` yields `None`.
pub fn hydrate_attribute<T>(
    row: &Row<'_>,
    column: &str,
    owner: &Rc<T>,
) -> rusqlite::Result<Option<DateTime>>
where
    T: DirtyTracker + 'static,
{
    let value: Option<DateTime> = row.get(column)?;
    Ok(value.map(|mut value| {
        value.attach_owner(owner, column);
        value
    }))
}
