use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sprintpulse_common::error::PulseResult;

use crate::window::SprintWindow;

/// Anything Jira represents as `{ "name": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraNamed {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUserRef {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraTimeTracking {
    pub original_estimate: Option<String>,
    pub remaining_estimate: Option<String>,
    pub time_spent: Option<String>,
    pub original_estimate_seconds: Option<i64>,
    pub remaining_estimate_seconds: Option<i64>,
    pub time_spent_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraWorklog {
    pub author: Option<JiraUserRef>,
    pub started: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: i64,
    /// Plain text on API v2, an ADF document on v3.
    pub comment: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraWorklogPage {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub worklogs: Vec<JiraWorklog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraChangelogItem {
    pub field: String,
    pub from_string: Option<String>,
    pub to_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraHistory {
    pub created: Option<String>,
    pub author: Option<JiraUserRef>,
    #[serde(default)]
    pub items: Vec<JiraChangelogItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraChangelog {
    #[serde(default)]
    pub histories: Vec<JiraHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Option<JiraNamed>,
    pub issuetype: Option<JiraNamed>,
    pub assignee: Option<JiraUserRef>,
    pub reporter: Option<JiraUserRef>,
    pub priority: Option<JiraNamed>,
    pub timeoriginalestimate: Option<i64>,
    pub timetracking: Option<JiraTimeTracking>,
    #[serde(default)]
    pub subtasks: Vec<serde_json::Value>,
    pub duedate: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    #[serde(rename = "closedSprints", default)]
    pub closed_sprints: Vec<serde_json::Value>,
    pub worklog: Option<JiraWorklogPage>,
    /// `customfield_*` values, whose shape varies per field.
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraIssueFields,
    pub changelog: Option<JiraChangelog>,
}

/// A board sprint from `/rest/agile/1.0/board/{id}/sprint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSprint {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub origin_board_id: Option<i64>,
    pub goal: Option<String>,
}

impl JiraSprint {
    /// Window covered by the sprint. Future sprints have no dates yet.
    pub fn window(&self) -> PulseResult<SprintWindow> {
        SprintWindow::from_bounds(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.name, self.state.to_uppercase())
    }

    fn state_rank(&self) -> u8 {
        match self.state.to_lowercase().as_str() {
            "active" => 0,
            "future" => 1,
            "closed" => 2,
            _ => 3,
        }
    }
}

/// Active first, then future, then closed; upstream order within a state.
pub fn sort_sprints_by_state(sprints: &mut [JiraSprint]) {
    sprints.sort_by_key(JiraSprint::state_rank);
}

/// On-disk export consumed by the report service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintExport {
    pub sprint: Option<JiraSprint>,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}
