//! Timestamp parsing and the duration formats shown on the sprint dashboard.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sprintpulse_common::error::{PulseError, PulseResult};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
/// Jira working day.
const DAY: u64 = 8 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Hours in a standard working day, used for worklog deviation.
pub const WORKDAY_HOURS: f64 = 8.0;

/// Aware offsets that RFC 3339 rejects, e.g. Jira's `+0700`.
const AWARE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A timestamp as it arrived from upstream, before normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Timestamp {
    pub fn parse(raw: &str) -> PulseResult<Self> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self::Aware(dt));
        }
        for fmt in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
                return Ok(Self::Aware(dt));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(Self::Naive(dt));
            }
        }
        if let Some(dt) = parse_date_only(raw) {
            return Ok(Self::Naive(dt));
        }

        Err(PulseError::UnparsableTimestamp(raw.to_string()))
    }

    pub fn is_aware(&self) -> bool {
        matches!(self, Self::Aware(_))
    }

    /// Drop the offset, keeping the wall-clock time.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self {
            Self::Aware(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    /// Compare two timestamps of the same awareness.
    ///
    /// Mixing an aware and a naive value is an error rather than a guess:
    /// normalise with [`Timestamp::to_naive`] first.
    pub fn try_cmp(&self, other: &Timestamp) -> PulseResult<Ordering> {
        match (self, other) {
            (Self::Aware(a), Self::Aware(b)) => Ok(a.cmp(b)),
            (Self::Naive(a), Self::Naive(b)) => Ok(a.cmp(b)),
            (Self::Aware(a), Self::Naive(n)) | (Self::Naive(n), Self::Aware(a)) => {
                Err(PulseError::TimestampComparison {
                    aware: a.to_rfc3339(),
                    naive: n.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(dt) => write!(f, "{dt}"),
        }
    }
}

/// Midnight of a bare `YYYY-MM-DD` value.
pub(crate) fn parse_date_only(raw: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse and normalise in one step; `None` for missing or unparsable input.
pub fn parse_naive(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.filter(|s| !s.trim().is_empty())
        .and_then(|s| Timestamp::parse(s).ok())
        .map(|ts| ts.to_naive())
}

/// Jira-style duration: 1w = 7d, 1d = 8h, 1h = 60m.
///
/// `0` renders as `"0m"`; negative input keeps a leading `-`.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return format!("-{}", format_unsigned_duration(seconds.unsigned_abs()));
    }
    format_unsigned_duration(seconds.unsigned_abs())
}

fn format_unsigned_duration(seconds: u64) -> String {
    let parts = [
        (seconds / WEEK, 'w'),
        ((seconds / DAY) % 7, 'd'),
        ((seconds / HOUR) % 8, 'h'),
        ((seconds / MINUTE) % 60, 'm'),
    ];

    let rendered: Vec<String> = parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if rendered.is_empty() {
        "0m".to_string()
    } else {
        rendered.join(" ")
    }
}

/// Clock-hour rendering used in worklog tables: `"2h 30m"`, `"1h"`, `"45m"`.
pub fn format_time_spent(seconds: i64) -> String {
    if seconds <= 0 {
        return "0h".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

pub fn seconds_to_hours(seconds: i64) -> f64 {
    if seconds == 0 {
        return 0.0;
    }
    round2(seconds as f64 / 3600.0)
}

/// `12.25` → `"12.25h"`, `3.0` → `"3.0h"`.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.1}h")
    } else {
        format!("{hours}h")
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Time since an issue was last touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Elapsed {
    pub hours: i64,
    pub hours_label: String,
    pub days_label: String,
}

pub fn elapsed_since(then: NaiveDateTime, now: NaiveDateTime) -> Elapsed {
    let hours = (now - then).num_hours().max(0);
    Elapsed {
        hours,
        hours_label: format!("{hours}h"),
        days_label: format!("{}d {}h", hours / 24, hours % 24),
    }
}
