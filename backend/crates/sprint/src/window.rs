use chrono::NaiveDateTime;
use serde::Serialize;
use sprintpulse_common::error::{PulseError, PulseResult};

use crate::time::{parse_date_only, Timestamp};

/// Inclusive `[start, end]` range that decides what "happened in the sprint".
///
/// Both bounds are timezone-naive and `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SprintWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl SprintWindow {
    /// Build a window from two upstream timestamps.
    ///
    /// The bounds must share awareness; they are normalised to naive
    /// wall-clock time afterwards.
    pub fn new(start: Timestamp, end: Timestamp) -> PulseResult<Self> {
        start.try_cmp(&end)?;
        Self::from_naive(start.to_naive(), end.to_naive())
    }

    pub fn from_naive(start: NaiveDateTime, end: NaiveDateTime) -> PulseResult<Self> {
        if start > end {
            return Err(PulseError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a window from raw bound strings.
    ///
    /// A date-only end bound covers that whole day.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> PulseResult<Self> {
        let start = start
            .filter(|s| !s.trim().is_empty())
            .ok_or(PulseError::MissingWindow("start"))?;
        let end = end
            .filter(|s| !s.trim().is_empty())
            .ok_or(PulseError::MissingWindow("end"))?;

        let start_ts = Timestamp::parse(start)?;
        let end_ts = match parse_date_only(end) {
            Some(day) => Timestamp::Naive(
                day.date()
                    .and_hms_opt(23, 59, 59)
                    .ok_or_else(|| PulseError::UnparsableTimestamp(end.to_string()))?,
            ),
            None => Timestamp::parse(end)?,
        };

        // A date-only bound carries no offset, so it pairs with either kind.
        if parse_date_only(start).is_some() || parse_date_only(end).is_some() {
            return Self::from_naive(start_ts.to_naive(), end_ts.to_naive());
        }
        Self::new(start_ts, end_ts)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }
}
