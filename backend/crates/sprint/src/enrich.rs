use crate::changelog;
use crate::models::{EnrichedIssue, RawIssue, ISSUE_TYPE_EPIC, STATUS_CLOSE, STATUS_TO_DO};
use crate::time::{format_duration, parse_naive, round2};
use crate::window::SprintWindow;
use crate::worklog;

/// Eligible for dashboard metrics: not an Epic, flagged for development,
/// assigned, and without subtasks.
pub fn is_show_dashboard(issue: &RawIssue) -> bool {
    issue.issue_type != ISSUE_TYPE_EPIC
        && issue.custom.is_development
        && issue.assignee.as_deref().is_some_and(|a| !a.is_empty())
        && issue.subtask_count == 0
}

/// Combine an issue's fields with its changelog and worklog facts.
pub fn enrich(issue: &RawIssue, window: &SprintWindow) -> EnrichedIssue {
    let changes = changelog::process(&issue.changelog, window);
    let logs = worklog::aggregate(&issue.worklogs, window);

    if issue.worklog_truncated {
        tracing::warn!(key = %issue.key, "worklog list is truncated, in-sprint time may be low");
    }

    let tracking = &issue.time_tracking;
    let original_estimate_seconds = tracking.original_estimate_seconds.unwrap_or(0);
    let time_spent_seconds = tracking.time_spent_seconds.unwrap_or(0);
    let remaining_seconds = original_estimate_seconds - time_spent_seconds;

    let points = tracking
        .original_estimate_seconds
        .filter(|s| *s != 0)
        .map(|s| round2(s as f64 / 3600.0))
        .unwrap_or(0.0);

    let show_dashboard = is_show_dashboard(issue);
    let is_to_do = issue.status == STATUS_TO_DO && show_dashboard;
    let worked_in_sprint = logs.time_spent_in_sprint_seconds > 0
        && issue.status != STATUS_CLOSE
        && show_dashboard;
    let active_in_sprint = is_to_do || worked_in_sprint;

    let duration_hours_to_done = changes.duration_hours_to_done();

    EnrichedIssue {
        key: issue.key.clone(),
        summary: issue.summary.clone(),
        status: issue.status.clone(),
        status_in_sprint: changes.status_in_sprint,
        issue_type: issue.issue_type.clone(),
        assignee: issue.assignee.clone(),
        reporter: issue.reporter.clone(),
        tester: issue.tester.clone(),
        priority: issue.priority.clone(),
        points,
        estimate: issue.custom.estimate.clone(),
        tech: issue.custom.tech.clone(),
        env: issue.custom.env.clone(),
        customer: issue.custom.customer.clone(),
        feature: issue.custom.feature.clone(),
        is_development: issue.custom.is_development,
        is_popup: issue.custom.is_popup,
        has_subtasks: issue.subtask_count > 0,
        is_show_dashboard: show_dashboard,
        active_in_sprint,

        original_estimate: label_or_zero(tracking.original_estimate.as_deref()),
        time_spent: label_or_zero(tracking.time_spent.as_deref()),
        remaining_estimate: label_or_zero(tracking.remaining_estimate.as_deref()),
        original_estimate_seconds,
        time_spent_seconds,
        remaining_estimate_seconds: tracking.remaining_estimate_seconds.unwrap_or(0),
        remaining_seconds,
        remaining: format_duration(remaining_seconds),

        closed_sprint_count: issue.closed_sprint_count,
        created_at: parse_naive(issue.created.as_deref()),
        updated_at: parse_naive(issue.updated.as_deref()),
        due_date: parse_naive(issue.due_date.as_deref()),

        count_worklog: logs.count_worklog,
        time_spent_in_sprint_seconds: logs.time_spent_in_sprint_seconds,
        time_spent_in_sprint_hours: logs.time_spent_in_sprint_hours,
        unique_loggers_count: logs.unique_loggers_count,

        first_time_in_progress: changes.first_time_in_progress,
        count_reopen: changes.count_reopen,
        has_reopen: changes.has_reopen,
        reopen_in_sprint: changes.reopen_in_sprint,
        is_done_in_sprint: changes.is_done_in_sprint,
        time_done_in_sprint: changes.time_done_in_sprint,
        duration_hours_to_done,
        duration_days_to_done: changes.duration_days_to_done,

        transitions: changes.transitions,
        skipped_timestamps: changes.skipped_timestamps + logs.skipped_entries,
    }
}

pub fn enrich_all(issues: &[RawIssue], window: &SprintWindow) -> Vec<EnrichedIssue> {
    issues
        .iter()
        .map(|issue| {
            let enriched = enrich(issue, window);
            tracing::debug!(
                key = %enriched.key,
                status_in_sprint = %enriched.status_in_sprint,
                active = enriched.active_in_sprint,
                "enriched issue"
            );
            enriched
        })
        .collect()
}

fn label_or_zero(label: Option<&str>) -> String {
    label.unwrap_or("0h").to_string()
}
