use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use sprintpulse_common::error::{PulseError, PulseResult};

/// Status display priority used when `STATUS_ORDER` is not set.
pub const DEFAULT_STATUS_ORDER: &[&str] = &[
    "To Do",
    "In Progress",
    "Review",
    "Testing",
    "Reopen",
    "Done",
    "Close",
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub issues_path: PathBuf,
    pub sprint_start: Option<String>,
    pub sprint_end: Option<String>,
    pub status_order: Vec<String>,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> PulseResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        let status_order = match env::var("STATUS_ORDER") {
            Ok(raw) => parse_csv_list("STATUS_ORDER", &raw)?,
            Err(_) => DEFAULT_STATUS_ORDER.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            issues_path: PathBuf::from(get_var("SPRINT_ISSUES_PATH")?),
            sprint_start: get_var_opt("SPRINT_START"),
            sprint_end: get_var_opt("SPRINT_END"),
            status_order,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }
}

/// Split a comma-separated value, trimming entries and dropping blanks.
/// Returns `Err` if nothing is left.
pub fn parse_csv_list(key: &str, raw: &str) -> PulseResult<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        return Err(PulseError::Config(format!(
            "{key} is set but contains no entries"
        )));
    }

    Ok(items)
}

fn get_var(key: &str) -> PulseResult<String> {
    env::var(key).map_err(|_| PulseError::Config(format!("{key} is required but not set")))
}

fn get_var_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_vars() {
        for key in [
            "SPRINT_ISSUES_PATH",
            "SPRINT_START",
            "SPRINT_END",
            "STATUS_ORDER",
            "LOG_LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn config_from_env_succeeds_with_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("SPRINT_ISSUES_PATH", "/tmp/sprint.json");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.issues_path, PathBuf::from("/tmp/sprint.json"));
        assert!(cfg.sprint_start.is_none());
        assert!(cfg.sprint_end.is_none());
        assert_eq!(cfg.status_order.len(), DEFAULT_STATUS_ORDER.len());
        assert_eq!(cfg.status_order[0], "To Do");
        assert_eq!(cfg.log_level, "info");

        clear_vars();
    }

    #[test]
    fn config_from_env_fails_without_issues_path() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        let result = AppConfig::from_env();
        assert!(matches!(result, Err(PulseError::Config(_))));
    }

    #[test]
    fn config_reads_window_overrides_and_status_order() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("SPRINT_ISSUES_PATH", "sprint.json");
        env::set_var("SPRINT_START", "2024-05-01");
        env::set_var("SPRINT_END", "2024-05-14");
        env::set_var("STATUS_ORDER", "Done, To Do");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.sprint_start.as_deref(), Some("2024-05-01"));
        assert_eq!(cfg.sprint_end.as_deref(), Some("2024-05-14"));
        assert_eq!(cfg.status_order, vec!["Done", "To Do"]);

        clear_vars();
    }

    #[test]
    fn blank_status_order_is_a_config_error() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");
        clear_vars();

        env::set_var("SPRINT_ISSUES_PATH", "sprint.json");
        env::set_var("STATUS_ORDER", " , ,");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("STATUS_ORDER"), "got: {err}");

        clear_vars();
    }

    #[test]
    fn parse_csv_list_trims_and_drops_blanks() {
        let items = parse_csv_list("K", "  In Progress ,, Done").unwrap();
        assert_eq!(items, vec!["In Progress", "Done"]);
    }
}
