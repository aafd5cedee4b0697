use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::RawWorklog;
use crate::time::{format_hours, round2, seconds_to_hours, Timestamp, WORKDAY_HOURS};
use crate::window::SprintWindow;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorklogFacts {
    pub count_worklog: usize,
    pub time_spent_in_sprint_seconds: i64,
    pub time_spent_in_sprint_hours: f64,
    pub unique_loggers_count: usize,
    pub skipped_entries: usize,
}

impl WorklogFacts {
    pub fn hours_label(&self) -> String {
        format_hours(self.time_spent_in_sprint_hours)
    }
}

/// Reduce worklogs to time-in-window totals.
///
/// Only `time_spent_in_sprint_*` is scoped to the window; the entry count
/// and the distinct-author count cover every entry.
pub fn aggregate(worklogs: &[RawWorklog], window: &SprintWindow) -> WorklogFacts {
    let mut facts = WorklogFacts {
        count_worklog: worklogs.len(),
        ..WorklogFacts::default()
    };

    let authors: HashSet<&str> = worklogs.iter().map(|w| w.author.as_str()).collect();
    facts.unique_loggers_count = authors.len();

    for worklog in worklogs {
        let Some(raw) = worklog.started.as_deref() else {
            facts.skipped_entries += 1;
            continue;
        };
        match Timestamp::parse(raw) {
            Ok(ts) if window.contains(ts.to_naive()) => {
                facts.time_spent_in_sprint_seconds += worklog.time_spent_seconds;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(author = %worklog.author, error = %e, "skipping worklog entry");
                facts.skipped_entries += 1;
            }
        }
    }

    facts.time_spent_in_sprint_hours = seconds_to_hours(facts.time_spent_in_sprint_seconds);
    facts
}

/// One user's row in the daily hours table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub user: String,
    /// Aligned with [`WorklogPivot::dates`].
    pub hours: Vec<f64>,
    pub total: f64,
}

/// User by day hours table, dates ascending, users by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorklogPivot {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<PivotRow>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
    pub skipped_entries: usize,
}

impl WorklogPivot {
    /// Totals are only worth showing across more than one day.
    pub fn show_totals(&self) -> bool {
        self.dates.len() > 1
    }
}

pub fn daily_pivot(worklogs: &[RawWorklog]) -> WorklogPivot {
    let mut seconds: BTreeMap<&str, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut skipped_entries = 0;

    for worklog in worklogs {
        let day = match worklog.started.as_deref().map(Timestamp::parse) {
            Some(Ok(ts)) => ts.to_naive().date(),
            _ => {
                skipped_entries += 1;
                continue;
            }
        };
        dates.insert(day);
        *seconds
            .entry(worklog.author.as_str())
            .or_default()
            .entry(day)
            .or_default() += worklog.time_spent_seconds;
    }

    let dates: Vec<NaiveDate> = dates.into_iter().collect();
    let mut column_seconds = vec![0i64; dates.len()];

    let rows = seconds
        .into_iter()
        .map(|(user, by_day)| {
            let mut row_seconds = 0;
            let hours = dates
                .iter()
                .enumerate()
                .map(|(i, day)| {
                    let secs = by_day.get(day).copied().unwrap_or(0);
                    column_seconds[i] += secs;
                    row_seconds += secs;
                    round2(secs as f64 / 3600.0)
                })
                .collect();
            PivotRow {
                user: user.to_string(),
                hours,
                total: round2(row_seconds as f64 / 3600.0),
            }
        })
        .collect();

    let grand_seconds: i64 = column_seconds.iter().sum();

    WorklogPivot {
        dates,
        rows,
        column_totals: column_seconds
            .into_iter()
            .map(|s| round2(s as f64 / 3600.0))
            .collect(),
        grand_total: round2(grand_seconds as f64 / 3600.0),
        skipped_entries,
    }
}

/// Signed distance from a standard working day.
pub fn deviation_from_workday(hours: f64) -> f64 {
    hours - WORKDAY_HOURS
}
