//! Jira Agile payloads and their translation into [`crate::models::RawIssue`].

mod convert;
pub mod models;

pub use models::{sort_sprints_by_state, JiraIssue, JiraSprint, SprintExport};
