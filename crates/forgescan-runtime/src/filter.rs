use chrono::{DateTime, NaiveDate, Utc};
use forgescan_types::{RawRecord, RawTimestamp};
use serde::Serialize;

use crate::{Error, Result};

/// Inclusive calendar-date window over a session's start date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(after: Option<&str>, before: Option<&str>) -> Result<Self> {
        Ok(Self {
            after: after.map(parse_date).transpose()?,
            before: before.map(parse_date).transpose()?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.after.is_none_or(|after| date >= after)
            && self.before.is_none_or(|before| date <= before)
    }

    /// Sessions without a usable start time are always admitted.
    pub fn admits(&self, start: Option<DateTime<Utc>>) -> bool {
        match start {
            Some(start) => self.contains(start.date_naive()),
            None => true,
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Timestamp of the first record that carries one, as written.
pub fn first_timestamp(records: &[RawRecord]) -> Option<&RawTimestamp> {
    records.iter().find_map(|r| r.timestamp.as_ref())
}

/// Start instant of a session. An unparseable first timestamp counts as none.
pub fn session_start(records: &[RawRecord]) -> Option<DateTime<Utc>> {
    let raw = first_timestamp(records)?;
    match raw.to_utc() {
        Ok(start) => Some(start),
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unparseable session timestamp");
            None
        }
    }
}
