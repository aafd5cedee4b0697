use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::models::EnrichedIssue;

/// Ordered label → count pairs for one grouping of issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricRollup {
    entries: Vec<(String, usize)>,
}

impl MetricRollup {
    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Serialize)]
struct RollupEntry<'a> {
    label: &'a str,
    count: usize,
}

impl Serialize for MetricRollup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(label, count)| RollupEntry { label, count: *count }),
        )
    }
}

/// Count issues by a selected label.
///
/// Labels named in `priority_order` come first, in that order, when present.
/// Remaining labels follow by descending count; ties keep first-seen order.
/// Issues for which `key` yields `None` are not counted.
pub fn rollup<'a, F>(
    issues: impl IntoIterator<Item = &'a EnrichedIssue>,
    key: F,
    priority_order: &[String],
) -> MetricRollup
where
    F: Fn(&EnrichedIssue) -> Option<&str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for issue in issues {
        let Some(label) = key(issue) else {
            continue;
        };
        match index.get(label) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(label.to_string(), counts.len());
                counts.push((label.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let mut entries = Vec::with_capacity(counts.len());
    for wanted in priority_order {
        if let Some(pos) = counts.iter().position(|(l, _)| l == wanted) {
            entries.push(counts.remove(pos));
        }
    }
    entries.extend(counts);

    MetricRollup { entries }
}

/// Bucket for issues that carry no value for the grouped field.
pub const UNSET_LABEL: &str = "";

/// Field an issue is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Status,
    IssueType,
    Priority,
    Feature,
}

impl Dimension {
    /// Every issue lands in some bucket, so per-dimension totals match the
    /// subset size.
    pub fn select<'a>(&self, issue: &'a EnrichedIssue) -> Option<&'a str> {
        let label = match self {
            Self::Status => issue.status_in_sprint.as_str(),
            Self::IssueType => issue.issue_type.as_str(),
            Self::Priority => issue.priority.as_deref().unwrap_or(UNSET_LABEL),
            Self::Feature => issue.feature.as_deref().unwrap_or(UNSET_LABEL),
        };
        Some(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubsetRollup {
    pub all: MetricRollup,
    pub active: MetricRollup,
}

/// Dashboard summary for one sprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SprintMetrics {
    pub count_issues: usize,
    pub count_issues_active: usize,
    pub by_status: SubsetRollup,
    pub by_type: SubsetRollup,
    pub by_priority: SubsetRollup,
    pub by_feature: SubsetRollup,
}

impl SprintMetrics {
    /// "all" covers dashboard-visible issues, "active" covers issues
    /// active in the sprint. Only the status grouping honours `status_order`.
    pub fn compute(issues: &[EnrichedIssue], status_order: &[String]) -> Self {
        let visible: Vec<&EnrichedIssue> = issues.iter().filter(|i| i.is_show_dashboard).collect();
        let active: Vec<&EnrichedIssue> = issues.iter().filter(|i| i.active_in_sprint).collect();

        let by_count: &[String] = &[];
        let subset = |dimension: Dimension, order: &[String]| SubsetRollup {
            all: rollup(visible.iter().copied(), |i| dimension.select(i), order),
            active: rollup(active.iter().copied(), |i| dimension.select(i), order),
        };

        let metrics = Self {
            count_issues: visible.len(),
            count_issues_active: active.len(),
            by_status: subset(Dimension::Status, status_order),
            by_type: subset(Dimension::IssueType, by_count),
            by_priority: subset(Dimension::Priority, by_count),
            by_feature: subset(Dimension::Feature, by_count),
        };

        tracing::debug!(
            visible = metrics.count_issues,
            active = metrics.count_issues_active,
            "computed sprint metrics"
        );
        metrics
    }
}
