use serde_json::Value;

use super::models::{
    JiraHistory, JiraIssue, JiraIssueFields, JiraTimeTracking, JiraUserRef, JiraWorklog,
};
use crate::models::{
    ChangeItem, CustomFields, RawChangelogEntry, RawIssue, RawWorklog, TimeTracking,
};

const FIELD_DEVELOPMENT: &str = "customfield_10160";
const FIELD_POPUP: &str = "customfield_10130";
const FIELD_FEATURE: &str = "customfield_10132";
const FIELD_ESTIMATE: &str = "customfield_10159";
const FIELD_CUSTOMER: &str = "customfield_10092";
const FIELD_TESTER: &str = "customfield_10031";
const FIELD_ENV: &str = "customfield_10191";
const FIELD_TECH: &str = "customfield_10192";

const FLAG_YES: &str = "YES";

impl JiraIssueFields {
    /// Read a single-select or user-picker custom field.
    ///
    /// Multi-selects contribute their first option.
    fn custom_value(&self, field_id: &str, attr: &str) -> Option<String> {
        let value = match self.custom.get(field_id)? {
            Value::Array(items) => items.first()?,
            other => other,
        };
        let text = match value {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get(attr)?.as_str()?,
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn custom_flag(&self, field_id: &str) -> bool {
        self.custom_value(field_id, "value").as_deref() == Some(FLAG_YES)
    }

    fn custom_fields(&self) -> CustomFields {
        CustomFields {
            is_development: self.custom_flag(FIELD_DEVELOPMENT),
            is_popup: self.custom_flag(FIELD_POPUP),
            feature: self.custom_value(FIELD_FEATURE, "value"),
            tech: self.custom_value(FIELD_TECH, "value"),
            env: self.custom_value(FIELD_ENV, "value"),
            customer: self.custom_value(FIELD_CUSTOMER, "value"),
            estimate: self.custom_value(FIELD_ESTIMATE, "value"),
        }
    }

    fn time_tracking(&self) -> TimeTracking {
        let tracking = self.timetracking.clone().unwrap_or_default();
        let JiraTimeTracking {
            original_estimate,
            remaining_estimate,
            time_spent,
            original_estimate_seconds,
            remaining_estimate_seconds,
            time_spent_seconds,
        } = tracking;
        TimeTracking {
            original_estimate,
            remaining_estimate,
            time_spent,
            original_estimate_seconds: original_estimate_seconds.or(self.timeoriginalestimate),
            remaining_estimate_seconds,
            time_spent_seconds,
        }
    }
}

fn display_name(user: Option<&JiraUserRef>) -> Option<String> {
    user.and_then(|u| u.display_name.clone())
}

/// Plain text of a worklog comment; ADF documents are flattened.
fn comment_text(comment: Option<&Value>) -> Option<String> {
    fn collect(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(text)) = map.get("text") {
                    out.push(text.clone());
                }
                if let Some(content) = map.get("content") {
                    collect(content, out);
                }
            }
            Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
            _ => {}
        }
    }

    match comment? {
        Value::String(s) => Some(s.clone()),
        other => {
            let mut parts = Vec::new();
            collect(other, &mut parts);
            (!parts.is_empty()).then(|| parts.join(" "))
        }
    }
}

fn worklog_to_raw(worklog: &JiraWorklog) -> RawWorklog {
    RawWorklog {
        author: display_name(worklog.author.as_ref()).unwrap_or_default(),
        started: worklog.started.clone(),
        time_spent_seconds: worklog.time_spent_seconds,
        comment: comment_text(worklog.comment.as_ref()),
    }
}

fn history_to_raw(history: &JiraHistory) -> RawChangelogEntry {
    RawChangelogEntry {
        created: history.created.clone(),
        author: display_name(history.author.as_ref()),
        items: history
            .items
            .iter()
            .map(|item| ChangeItem {
                field: item.field.clone(),
                from_string: item.from_string.clone(),
                to_string: item.to_string.clone(),
            })
            .collect(),
    }
}

impl JiraIssue {
    /// Flatten the wire payload into the shape enrichment works on.
    pub fn into_raw(self) -> RawIssue {
        let f = &self.fields;

        let (worklogs, worklog_truncated) = match &f.worklog {
            Some(page) => (
                page.worklogs.iter().map(worklog_to_raw).collect(),
                page.total > page.worklogs.len(),
            ),
            None => (Vec::new(), false),
        };

        let changelog = self
            .changelog
            .as_ref()
            .map(|c| c.histories.iter().map(history_to_raw).collect())
            .unwrap_or_default();

        RawIssue {
            summary: f.summary.clone(),
            status: f.status.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            issue_type: f.issuetype.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            assignee: display_name(f.assignee.as_ref()),
            reporter: display_name(f.reporter.as_ref()),
            tester: f.custom_value(FIELD_TESTER, "displayName"),
            priority: f.priority.as_ref().map(|p| p.name.clone()),
            custom: f.custom_fields(),
            time_tracking: f.time_tracking(),
            subtask_count: f.subtasks.len(),
            due_date: f.duedate.clone(),
            created: f.created.clone(),
            updated: f.updated.clone(),
            closed_sprint_count: f.closed_sprints.len(),
            worklog_truncated,
            worklogs,
            changelog,
            key: self.key,
        }
    }
}
