use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use sprintpulse_common::error::{PulseError, PulseResult};
use sprintpulse_sprint::jira::{JiraSprint, SprintExport};
use sprintpulse_sprint::time::format_hours;
use sprintpulse_sprint::{
    elapsed_since, enrich_all, Elapsed, EnrichedIssue, RawIssue, SprintMetrics, SprintWindow,
};

/// One line of the per-issue table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueRow {
    pub key: String,
    pub summary: String,
    pub assignee: Option<String>,
    pub status: String,
    pub status_in_sprint: String,
    pub points: f64,
    pub time_in_sprint: String,
    pub remaining: String,
    pub active_in_sprint: bool,
    pub is_done_in_sprint: bool,
    pub count_reopen: u32,
    pub since_update: Option<Elapsed>,
}

impl IssueRow {
    fn from_enriched(issue: &EnrichedIssue, now: NaiveDateTime) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.summary.clone(),
            assignee: issue.assignee.clone(),
            status: issue.status.clone(),
            status_in_sprint: issue.status_in_sprint.clone(),
            points: issue.points,
            time_in_sprint: format_hours(issue.time_spent_in_sprint_hours),
            remaining: issue.remaining.clone(),
            active_in_sprint: issue.active_in_sprint,
            is_done_in_sprint: issue.is_done_in_sprint,
            count_reopen: issue.count_reopen,
            since_update: issue.updated_at.map(|updated| elapsed_since(updated, now)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SprintReport {
    pub sprint: Option<String>,
    pub window: SprintWindow,
    pub metrics: SprintMetrics,
    pub issues: Vec<IssueRow>,
    pub truncated_worklogs: usize,
    pub skipped_timestamps: usize,
}

/// Explicit bounds take precedence over the sprint's own dates, per bound.
pub fn resolve_window(
    sprint: Option<&JiraSprint>,
    start_override: Option<&str>,
    end_override: Option<&str>,
) -> PulseResult<SprintWindow> {
    let start = start_override.or_else(|| sprint.and_then(|s| s.start_date.as_deref()));
    let end = end_override.or_else(|| sprint.and_then(|s| s.end_date.as_deref()));
    SprintWindow::from_bounds(start, end)
}

pub fn build_report(
    export: SprintExport,
    start_override: Option<&str>,
    end_override: Option<&str>,
    status_order: &[String],
    now: NaiveDateTime,
) -> PulseResult<SprintReport> {
    let window = resolve_window(export.sprint.as_ref(), start_override, end_override)?;
    let sprint = export.sprint.as_ref().map(JiraSprint::display_name);

    let raw: Vec<RawIssue> = export.issues.into_iter().map(|i| i.into_raw()).collect();
    let truncated_worklogs = raw.iter().filter(|i| i.worklog_truncated).count();

    let enriched = enrich_all(&raw, &window);
    let metrics = SprintMetrics::compute(&enriched, status_order);
    let skipped_timestamps = enriched.iter().map(|i| i.skipped_timestamps).sum();

    tracing::info!(
        issues = enriched.len(),
        visible = metrics.count_issues,
        active = metrics.count_issues_active,
        skipped_timestamps,
        "built sprint report"
    );

    Ok(SprintReport {
        sprint,
        window,
        metrics,
        issues: enriched
            .iter()
            .map(|issue| IssueRow::from_enriched(issue, now))
            .collect(),
        truncated_worklogs,
        skipped_timestamps,
    })
}

pub async fn load_export(path: &Path) -> PulseResult<SprintExport> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PulseError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&body).map_err(|e| {
        PulseError::Validation(format!("{} is not a sprint export: {e}", path.display()))
    })
}
