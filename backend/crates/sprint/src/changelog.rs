//! Replays an issue's status history against a sprint window.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::models::{RawChangelogEntry, StatusTransition, STATUS_DONE, STATUS_REOPEN, STATUS_TO_DO};
use crate::time::{round2, Timestamp};
use crate::window::SprintWindow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangelogFacts {
    pub status_in_sprint: String,
    pub first_time_in_progress: Option<NaiveDateTime>,
    pub count_reopen: u32,
    pub has_reopen: bool,
    pub reopen_in_sprint: bool,
    pub is_done_in_sprint: bool,
    pub time_done_in_sprint: Option<NaiveDateTime>,
    #[serde(skip)]
    pub duration_to_done: Option<Duration>,
    pub duration_days_to_done: f64,
    pub transitions: Vec<StatusTransition>,
    pub skipped_timestamps: usize,
}

impl ChangelogFacts {
    pub fn duration_hours_to_done(&self) -> Option<f64> {
        self.duration_to_done.map(|d| d.num_seconds() as f64 / 3600.0)
    }
}

impl Default for ChangelogFacts {
    fn default() -> Self {
        Self {
            status_in_sprint: STATUS_TO_DO.to_string(),
            first_time_in_progress: None,
            count_reopen: 0,
            has_reopen: false,
            reopen_in_sprint: false,
            is_done_in_sprint: false,
            time_done_in_sprint: None,
            duration_to_done: None,
            duration_days_to_done: 0.0,
            transitions: Vec::new(),
            skipped_timestamps: 0,
        }
    }
}

/// Reduce raw changelog entries to sprint-scoped facts.
///
/// Rules, applied to single-field status transitions in time order:
///   - `status_in_sprint` is the to-status of the last transition at or
///     before the window end (starts at "To Do")
///   - every transition out of "Reopen" bumps `count_reopen`; the last one
///     decides `reopen_in_sprint`
///   - the first in-window transition into "Done" sets the done timestamp
///
/// Status transitions whose timestamp cannot be parsed sort first, never
/// count as in-window, and are tallied in `skipped_timestamps`. Other
/// entries are dropped before their timestamps are looked at.
pub fn process(entries: &[RawChangelogEntry], window: &SprintWindow) -> ChangelogFacts {
    let mut facts = ChangelogFacts::default();

    let mut parsed: Vec<(Option<NaiveDateTime>, &str, &str, &RawChangelogEntry)> = entries
        .iter()
        .filter_map(|entry| {
            let (from, to) = entry.status_transition()?;
            Some((parse_created(entry, &mut facts.skipped_timestamps), from, to, entry))
        })
        .collect();
    // Stable: equal timestamps keep upstream order, `None` sorts first.
    parsed.sort_by_key(|(created, ..)| *created);

    for (created, from, to, entry) in parsed {
        let in_window = created.is_some_and(|ts| window.contains(ts));

        if created.is_some_and(|ts| ts <= window.end()) {
            facts.status_in_sprint = to.to_string();
        }

        if from == STATUS_REOPEN {
            facts.count_reopen += 1;
            facts.reopen_in_sprint = in_window;
        }

        if to == STATUS_DONE && in_window && !facts.is_done_in_sprint {
            facts.is_done_in_sprint = true;
            facts.time_done_in_sprint = created;
        }

        facts.transitions.push(StatusTransition {
            created,
            author: entry.author.clone(),
            from_status: from.to_string(),
            to_status: to.to_string(),
        });
    }

    facts.has_reopen = facts.count_reopen > 0;
    facts.first_time_in_progress = facts.transitions.iter().find_map(|t| t.created);

    if let (Some(done), Some(started)) = (facts.time_done_in_sprint, facts.first_time_in_progress) {
        let duration = done - started;
        facts.duration_days_to_done = round2(duration.num_seconds() as f64 / 3600.0 / 24.0);
        facts.duration_to_done = Some(duration);
    }

    facts
}

fn parse_created(entry: &RawChangelogEntry, skipped: &mut usize) -> Option<NaiveDateTime> {
    let raw = entry.created.as_deref()?;
    match Timestamp::parse(raw) {
        Ok(ts) => Some(ts.to_naive()),
        Err(e) => {
            tracing::warn!(error = %e, "skipping changelog timestamp");
            *skipped += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeItem;
    use proptest::prelude::*;

    fn window() -> SprintWindow {
        SprintWindow::from_bounds(Some("2024-05-01"), Some("2024-05-14")).unwrap()
    }

    fn transition(created: &str, from: &str, to: &str) -> RawChangelogEntry {
        RawChangelogEntry {
            created: Some(created.to_string()),
            author: Some("Alice".to_string()),
            items: vec![ChangeItem {
                field: "status".to_string(),
                from_string: Some(from.to_string()),
                to_string: Some(to.to_string()),
            }],
        }
    }

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn empty_history_stays_to_do() {
        let facts = process(&[], &window());
        assert_eq!(facts.status_in_sprint, "To Do");
        assert_eq!(facts.count_reopen, 0);
        assert!(!facts.has_reopen);
        assert!(!facts.is_done_in_sprint);
        assert!(facts.time_done_in_sprint.is_none());
        assert!(facts.first_time_in_progress.is_none());
        assert!(facts.duration_to_done.is_none());
        assert_eq!(facts.duration_days_to_done, 0.0);
    }

    #[test]
    fn done_then_reopened_inside_window() {
        let entries = vec![
            transition("2024-05-03T10:00:00", "Done", "Reopen"),
            transition("2024-04-29T09:00:00", "To Do", "In Progress"),
            transition("2024-05-02T15:00:00", "In Progress", "Done"),
        ];
        let facts = process(&entries, &window());

        assert!(facts.is_done_in_sprint);
        assert_eq!(facts.time_done_in_sprint, Some(naive("2024-05-02T15:00:00")));
        // Reopen is only counted when leaving it.
        assert_eq!(facts.count_reopen, 0);
        assert_eq!(facts.status_in_sprint, "Reopen");
        assert_eq!(facts.first_time_in_progress, Some(naive("2024-04-29T09:00:00")));
        assert_eq!(facts.duration_hours_to_done(), Some(78.0));
        assert_eq!(facts.duration_days_to_done, 3.25);
    }

    #[test]
    fn transitions_after_window_end_do_not_move_status() {
        let entries = vec![
            transition("2024-05-02T10:00:00", "To Do", "In Progress"),
            transition("2024-05-20T10:00:00", "In Progress", "Done"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.status_in_sprint, "In Progress");
        assert!(!facts.is_done_in_sprint);
    }

    #[test]
    fn transitions_before_window_still_set_status() {
        let entries = vec![transition("2024-04-20T10:00:00", "To Do", "Blocked")];
        let facts = process(&entries, &window());
        assert_eq!(facts.status_in_sprint, "Blocked");
    }

    #[test]
    fn first_done_in_window_wins() {
        let entries = vec![
            transition("2024-05-02T10:00:00", "In Progress", "Done"),
            transition("2024-05-03T10:00:00", "Done", "Reopen"),
            transition("2024-05-04T10:00:00", "Reopen", "Done"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.time_done_in_sprint, Some(naive("2024-05-02T10:00:00")));
        assert_eq!(facts.count_reopen, 1);
        assert!(facts.reopen_in_sprint);
    }

    #[test]
    fn done_before_window_is_not_done_in_sprint() {
        let entries = vec![transition("2024-04-25T10:00:00", "In Progress", "Done")];
        let facts = process(&entries, &window());
        assert!(!facts.is_done_in_sprint);
        assert_eq!(facts.status_in_sprint, "Done");
        assert!(facts.duration_to_done.is_none());
    }

    #[test]
    fn reopen_in_sprint_is_last_wins() {
        // In-window reopen followed by a later out-of-window one.
        let entries = vec![
            transition("2024-05-03T10:00:00", "Reopen", "In Progress"),
            transition("2024-05-20T10:00:00", "Reopen", "In Progress"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.count_reopen, 2);
        assert!(facts.has_reopen);
        assert!(!facts.reopen_in_sprint);

        // Out-of-window first, in-window last.
        let entries = vec![
            transition("2024-04-20T10:00:00", "Reopen", "In Progress"),
            transition("2024-05-03T10:00:00", "Reopen", "In Progress"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.count_reopen, 2);
        assert!(facts.reopen_in_sprint);
    }

    #[test]
    fn bulk_edits_are_ignored() {
        let mut bulk = transition("2024-05-02T10:00:00", "To Do", "Done");
        bulk.items.push(ChangeItem {
            field: "resolution".to_string(),
            from_string: None,
            to_string: Some("Fixed".to_string()),
        });
        let facts = process(&[bulk], &window());
        assert_eq!(facts.status_in_sprint, "To Do");
        assert!(!facts.is_done_in_sprint);
        assert!(facts.transitions.is_empty());
    }

    #[test]
    fn transitions_on_window_bounds_are_in_sprint() {
        let entries = vec![
            transition("2024-05-01T00:00:00", "Reopen", "In Progress"),
            transition("2024-05-14T23:59:59", "In Progress", "Done"),
        ];
        let facts = process(&entries, &window());
        assert!(facts.reopen_in_sprint);
        assert!(facts.is_done_in_sprint);
        assert_eq!(facts.time_done_in_sprint, Some(naive("2024-05-14T23:59:59")));
        assert_eq!(facts.status_in_sprint, "Done");
    }

    #[test]
    fn one_second_past_end_is_out_of_sprint() {
        let entries = vec![transition("2024-05-15T00:00:00", "In Progress", "Done")];
        let facts = process(&entries, &window());
        assert!(!facts.is_done_in_sprint);
        assert_eq!(facts.status_in_sprint, "To Do");
    }

    #[test]
    fn bad_timestamps_on_non_status_entries_are_not_counted() {
        let mut bulk = transition("garbage", "To Do", "Done");
        bulk.items.push(ChangeItem {
            field: "resolution".to_string(),
            from_string: None,
            to_string: Some("Fixed".to_string()),
        });
        let assignee_change = RawChangelogEntry {
            created: Some("also garbage".to_string()),
            author: None,
            items: vec![ChangeItem {
                field: "assignee".to_string(),
                from_string: None,
                to_string: Some("Bob".to_string()),
            }],
        };
        let entries = vec![
            bulk,
            assignee_change,
            transition("not a date", "To Do", "In Progress"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.skipped_timestamps, 1);
        assert_eq!(facts.transitions.len(), 1);
    }

    #[test]
    fn unparsable_timestamp_is_counted_and_sorted_first() {
        let entries = vec![
            transition("2024-05-02T10:00:00", "To Do", "In Progress"),
            transition("not a date", "In Progress", "Done"),
        ];
        let facts = process(&entries, &window());

        assert_eq!(facts.skipped_timestamps, 1);
        assert!(!facts.is_done_in_sprint);
        assert_eq!(facts.status_in_sprint, "In Progress");
        assert_eq!(facts.transitions[0].to_status, "Done");
        assert!(facts.transitions[0].created.is_none());
        assert_eq!(facts.first_time_in_progress, Some(naive("2024-05-02T10:00:00")));
    }

    #[test]
    fn aware_and_naive_entries_are_normalised_before_comparing() {
        let entries = vec![
            transition("2024-05-02T10:00:00.000+0700", "To Do", "In Progress"),
            transition("2024-05-03T10:00:00", "In Progress", "Done"),
        ];
        let facts = process(&entries, &window());
        assert_eq!(facts.first_time_in_progress, Some(naive("2024-05-02T10:00:00")));
        assert!(facts.is_done_in_sprint);
        assert_eq!(facts.duration_days_to_done, 1.0);
    }

    proptest! {
        #[test]
        fn count_reopen_grows_with_reopen_transitions(extra in 0usize..20) {
            let mut entries = vec![
                transition("2024-05-02T10:00:00", "Reopen", "In Progress"),
            ];
            let base = process(&entries, &window()).count_reopen;

            for i in 0..extra {
                entries.push(transition(
                    &format!("2024-05-03T10:{:02}:00", i % 60),
                    "Reopen",
                    "In Progress",
                ));
            }
            let grown = process(&entries, &window()).count_reopen;

            prop_assert!(grown >= base);
            prop_assert_eq!(grown as usize, 1 + extra);
        }
    }
}
