//! Date-range lower bounds for the feed filter.

use crate::params::DateRange;
use chrono::{DateTime, Duration, FixedOffset, Months, Offset, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Where "today" starts.
///
/// The web app used the server's local midnight, which silently depends on
/// the host timezone. Here the choice is explicit configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DayBoundary {
    /// Midnight UTC
    #[default]
    Utc,
    /// Midnight at a fixed offset from UTC
    Offset(FixedOffset),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid day boundary {0:?}: expected \"utc\" or an offset like \"+02:00\"")]
pub struct DayBoundaryParseError(pub String);

impl DayBoundary {
    pub fn offset(&self) -> FixedOffset {
        match self {
            DayBoundary::Utc => Utc.fix(),
            DayBoundary::Offset(offset) => *offset,
        }
    }

    /// Most recent midnight at or before `now`, as a UTC instant.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let offset = self.offset();
        let local = now.with_timezone(&offset);
        local
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| offset.from_local_datetime(&midnight).single())
            .map(|midnight| midnight.with_timezone(&Utc))
            // Fixed offsets have no gaps, so this is never reached
            .unwrap_or(now)
    }
}

impl FromStr for DayBoundary {
    type Err = DayBoundaryParseError;

    /// Accepts `utc`, `z`, or `±HH:MM` / `±HHMM` / `±HH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
            return Ok(DayBoundary::Utc);
        }

        let err = || DayBoundaryParseError(s.to_string());

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(err()),
        };

        if !rest.is_ascii() {
            return Err(err());
        }
        let (hours, minutes) = match rest.len() {
            2 => (rest, "00"),
            4 => (&rest[..2], &rest[2..]),
            5 if rest.as_bytes()[2] == b':' => (&rest[..2], &rest[3..]),
            _ => return Err(err()),
        };
        if !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let hours: i32 = hours.parse().map_err(|_| err())?;
        let minutes: i32 = minutes.parse().map_err(|_| err())?;
        if hours > 23 || minutes > 59 {
            return Err(err());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DayBoundary::Offset)
            .ok_or_else(err)
    }
}

impl TryFrom<String> for DayBoundary {
    type Error = DayBoundaryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBoundary::Utc => write!(f, "utc"),
            DayBoundary::Offset(offset) => write!(f, "{}", offset),
        }
    }
}

impl DateRange {
    /// Earliest creation time a product may have to fall in this range.
    ///
    /// - `Today`: start of the current day at `boundary`
    /// - `ThisWeek`: `now - 7 days`
    /// - `ThisMonth`: `now - 1 calendar month`, clamped to the end of a
    ///   shorter month (Mar 31 -> Feb 28)
    /// - `AllTime`: no bound
    pub fn lower_bound(&self, now: DateTime<Utc>, boundary: DayBoundary) -> Option<DateTime<Utc>> {
        match self {
            DateRange::AllTime => None,
            DateRange::Today => Some(boundary.start_of_day(now)),
            DateRange::ThisWeek => Some(now - Duration::days(7)),
            DateRange::ThisMonth => Some(
                now.checked_sub_months(Months::new(1))
                    .unwrap_or_else(|| now - Duration::days(30)),
            ),
        }
    }
}
