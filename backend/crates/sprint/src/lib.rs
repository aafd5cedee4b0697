pub mod changelog;
pub mod enrich;
pub mod jira;
pub mod models;
pub mod rollup;
pub mod time;
pub mod time_off;
pub mod window;
pub mod worklog;

pub use changelog::{process, ChangelogFacts};
pub use enrich::{enrich, enrich_all, is_show_dashboard};
pub use models::{EnrichedIssue, RawChangelogEntry, RawIssue, RawWorklog};
pub use rollup::{rollup, Dimension, MetricRollup, SprintMetrics, UNSET_LABEL};
pub use time::{elapsed_since, format_duration, Elapsed, Timestamp};
pub use window::SprintWindow;
pub use worklog::{aggregate, daily_pivot, WorklogFacts, WorklogPivot};
