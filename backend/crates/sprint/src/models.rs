use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status every issue starts in before its first recorded transition.
pub const STATUS_TO_DO: &str = "To Do";
pub const STATUS_DONE: &str = "Done";
pub const STATUS_REOPEN: &str = "Reopen";
pub const STATUS_CLOSE: &str = "Close";
pub const ISSUE_TYPE_EPIC: &str = "Epic";

const STATUS_FIELD: &str = "status";

/// One field change inside a changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeItem {
    pub field: String,
    pub from_string: Option<String>,
    pub to_string: Option<String>,
}

/// A changelog history entry as fetched. `created` is kept raw so that
/// unparsable values can be reported instead of failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChangelogEntry {
    pub created: Option<String>,
    pub author: Option<String>,
    pub items: Vec<ChangeItem>,
}

impl RawChangelogEntry {
    /// `(from, to)` when this entry changes the status field and nothing else.
    ///
    /// Bulk edits touching several fields at once are not status transitions.
    pub fn status_transition(&self) -> Option<(&str, &str)> {
        match self.items.as_slice() {
            [item] if item.field.eq_ignore_ascii_case(STATUS_FIELD) => Some((
                item.from_string.as_deref().unwrap_or(""),
                item.to_string.as_deref().unwrap_or(""),
            )),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorklog {
    pub author: String,
    pub started: Option<String>,
    pub time_spent_seconds: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTracking {
    pub original_estimate: Option<String>,
    pub remaining_estimate: Option<String>,
    pub time_spent: Option<String>,
    pub original_estimate_seconds: Option<i64>,
    pub remaining_estimate_seconds: Option<i64>,
    pub time_spent_seconds: Option<i64>,
}

/// Team-specific custom fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFields {
    pub is_development: bool,
    pub is_popup: bool,
    pub feature: Option<String>,
    pub tech: Option<String>,
    pub env: Option<String>,
    pub customer: Option<String>,
    pub estimate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub tester: Option<String>,
    pub priority: Option<String>,
    pub custom: CustomFields,
    pub time_tracking: TimeTracking,
    pub subtask_count: usize,
    pub due_date: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub closed_sprint_count: usize,
    /// Upstream reported more worklogs than it embedded.
    pub worklog_truncated: bool,
    pub worklogs: Vec<RawWorklog>,
    pub changelog: Vec<RawChangelogEntry>,
}

/// A status change that survived changelog filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTransition {
    pub created: Option<NaiveDateTime>,
    pub author: Option<String>,
    pub from_status: String,
    pub to_status: String,
}

/// Per-sprint view of one issue. Built once by [`crate::enrich::enrich`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub status_in_sprint: String,
    pub issue_type: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub tester: Option<String>,
    pub priority: Option<String>,
    pub points: f64,
    pub estimate: Option<String>,
    pub tech: Option<String>,
    pub env: Option<String>,
    pub customer: Option<String>,
    pub feature: Option<String>,
    pub is_development: bool,
    pub is_popup: bool,
    pub has_subtasks: bool,
    pub is_show_dashboard: bool,
    pub active_in_sprint: bool,

    pub original_estimate: String,
    pub time_spent: String,
    pub remaining_estimate: String,
    pub original_estimate_seconds: i64,
    pub time_spent_seconds: i64,
    pub remaining_estimate_seconds: i64,
    pub remaining_seconds: i64,
    pub remaining: String,

    pub closed_sprint_count: usize,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,

    pub count_worklog: usize,
    pub time_spent_in_sprint_seconds: i64,
    pub time_spent_in_sprint_hours: f64,
    pub unique_loggers_count: usize,

    pub first_time_in_progress: Option<NaiveDateTime>,
    pub count_reopen: u32,
    pub has_reopen: bool,
    pub reopen_in_sprint: bool,
    pub is_done_in_sprint: bool,
    pub time_done_in_sprint: Option<NaiveDateTime>,
    pub duration_hours_to_done: Option<f64>,
    pub duration_days_to_done: f64,

    pub transitions: Vec<StatusTransition>,
    /// Worklog and changelog entries dropped for bad timestamps.
    pub skipped_timestamps: usize,
}
