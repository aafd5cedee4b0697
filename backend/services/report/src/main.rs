mod report;

use sprintpulse_common::error::{PulseError, PulseResult};
use sprintpulse_config::{init_tracing, AppConfig};

use crate::report::{build_report, load_export};

async fn run(config: &AppConfig) -> PulseResult<()> {
    let export = load_export(&config.issues_path).await?;
    tracing::info!(
        path = %config.issues_path.display(),
        issues = export.issues.len(),
        "loaded sprint export"
    );

    let now = chrono::Local::now().naive_local();
    let report = build_report(
        export,
        config.sprint_start.as_deref(),
        config.sprint_end.as_deref(),
        &config.status_order,
        now,
    )?;

    let body =
        serde_json::to_string_pretty(&report).map_err(|e| PulseError::Internal(e.to_string()))?;
    println!("{body}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = init_tracing("info");
            tracing::error!(error = %e, "failed to load config");
            std::process::exit(1);
        }
    };
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    tracing::info!(service = "sprintpulse-report", "starting");

    if let Err(e) = run(&config).await {
        tracing::error!(error = %e, "sprint report failed");
        std::process::exit(1);
    }
}
