use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sprintpulse_common::error::{PulseError, PulseResult};

/// Leave granularity, serialised with the labels the leave store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOffType {
    #[serde(rename = "Cả ngày")]
    FullDay,
    #[serde(rename = "Buổi sáng")]
    Morning,
    #[serde(rename = "Buổi chiều")]
    Afternoon,
}

impl TimeOffType {
    pub fn days(&self) -> f64 {
        match self {
            Self::FullDay => 1.0,
            Self::Morning | Self::Afternoon => 0.5,
        }
    }

    pub fn is_full_day(&self) -> bool {
        matches!(self, Self::FullDay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub user_name: String,
    pub time_off: TimeOffType,
    pub note: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOffStats {
    pub user_name: String,
    pub total_days: f64,
    pub full_days: usize,
    pub half_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTimeOffSummary {
    pub year: i32,
    pub month: u32,
    pub total_records: usize,
    pub unique_users: usize,
    pub user_stats: Vec<TimeOffStats>,
}

/// Per-user leave totals, ordered by user name.
pub fn user_stats(records: &[TimeOffRecord]) -> Vec<TimeOffStats> {
    let mut by_user: BTreeMap<&str, TimeOffStats> = BTreeMap::new();

    for record in records {
        let stats = by_user
            .entry(record.user_name.as_str())
            .or_insert_with(|| TimeOffStats {
                user_name: record.user_name.clone(),
                total_days: 0.0,
                full_days: 0,
                half_days: 0,
            });
        stats.total_days += record.time_off.days();
        if record.time_off.is_full_day() {
            stats.full_days += 1;
        } else {
            stats.half_days += 1;
        }
    }

    by_user.into_values().collect()
}

pub fn group_by_date(records: &[TimeOffRecord]) -> BTreeMap<NaiveDate, Vec<&TimeOffRecord>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&TimeOffRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.date).or_default().push(record);
    }
    grouped
}

pub fn monthly_summary(
    records: &[TimeOffRecord],
    year: i32,
    month: u32,
) -> PulseResult<MonthlyTimeOffSummary> {
    if !(1..=12).contains(&month) {
        return Err(PulseError::Validation(format!("month must be 1-12, got {month}")));
    }

    let in_month: Vec<TimeOffRecord> = records
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .cloned()
        .collect();

    let users: BTreeSet<&str> = in_month.iter().map(|r| r.user_name.as_str()).collect();
    let unique_users = users.len();

    tracing::debug!(year, month, records = in_month.len(), "summarised time off");

    Ok(MonthlyTimeOffSummary {
        year,
        month,
        total_records: in_month.len(),
        unique_users,
        user_stats: user_stats(&in_month),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, date: &str, user: &str, time_off: TimeOffType) -> TimeOffRecord {
        TimeOffRecord {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            user_name: user.to_string(),
            time_off,
            note: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn sample() -> Vec<TimeOffRecord> {
        vec![
            record(1, "2024-05-02", "Minh", TimeOffType::FullDay),
            record(2, "2024-05-02", "An", TimeOffType::Morning),
            record(3, "2024-05-06", "Minh", TimeOffType::Afternoon),
            record(4, "2024-06-03", "An", TimeOffType::FullDay),
        ]
    }

    #[test]
    fn labels_round_trip_through_serde() {
        let json = serde_json::to_value(TimeOffType::Morning).unwrap();
        assert_eq!(json, serde_json::json!("Buổi sáng"));
        let parsed: TimeOffType = serde_json::from_value(serde_json::json!("Cả ngày")).unwrap();
        assert_eq!(parsed, TimeOffType::FullDay);
        assert!(serde_json::from_value::<TimeOffType>(serde_json::json!("Full day")).is_err());
    }

    #[test]
    fn user_stats_weights_half_days() {
        let stats = user_stats(&sample());
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].user_name, "An");
        assert_eq!(stats[0].total_days, 1.5);
        assert_eq!(stats[0].full_days, 1);
        assert_eq!(stats[0].half_days, 1);

        assert_eq!(stats[1].user_name, "Minh");
        assert_eq!(stats[1].total_days, 1.5);
        assert_eq!(stats[1].half_days, 1);
    }

    #[test]
    fn group_by_date_is_date_ordered() {
        let records = sample();
        let grouped = group_by_date(&records);
        let dates: Vec<String> = grouped.keys().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-05-02", "2024-05-06", "2024-06-03"]);
        assert_eq!(grouped.values().next().map(Vec::len), Some(2));
    }

    #[test]
    fn monthly_summary_filters_to_month() {
        let summary = monthly_summary(&sample(), 2024, 5).unwrap();
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.unique_users, 2);
        assert_eq!(summary.user_stats[0].total_days, 0.5);
        assert_eq!(summary.user_stats[1].total_days, 1.5);

        let empty = monthly_summary(&sample(), 2023, 5).unwrap();
        assert_eq!(empty.total_records, 0);
        assert!(empty.user_stats.is_empty());
    }

    #[test]
    fn invalid_month_is_rejected() {
        for month in [0, 13] {
            let err = monthly_summary(&sample(), 2024, month).unwrap_err();
            assert!(matches!(err, PulseError::Validation(_)), "got: {err:?}");
        }
    }
}
