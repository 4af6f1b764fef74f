mod bootstrap;

use anyhow::Result;
use serde::Serialize;

use evdash_core::settings::Settings;
use evdash_data::analysis::{analyze, AnalysisResult};
use evdash_data::reader::{load_records, LoadReport};
use evdash_runtime::orchestrator::DashboardOrchestrator;
use evdash_ui::app::{App, ViewMode};

/// Document printed by `--output json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    analysis: &'a AnalysisResult,
    load_report: &'a LoadReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, last_used_issues) = Settings::load_with_last_used();
    let filter = settings.initial_filter()?;

    bootstrap::ensure_directories()?;

    let tui = settings.output == "tui";
    // The TUI owns the terminal, so its log goes to a file.
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| tui.then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;
    for issue in &last_used_issues {
        issue.log();
    }

    tracing::info!("evdash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Output: {}, View: {}, Theme: {}, Filter: {} {}–{}",
        settings.output,
        settings.view,
        settings.theme,
        filter.make_label(),
        filter.year_range.min(),
        filter.year_range.max()
    );

    let data_path = match bootstrap::discover_data_path(settings.data.as_deref()) {
        Some(path) => path,
        None => {
            let fallback = bootstrap::app_dir().join("data");
            tracing::warn!(
                "No dataset found; pass --data or set EVDASH_DATA. Using {}",
                fallback.display()
            );
            fallback
        }
    };
    tracing::info!("Dataset: {}", data_path.display());

    if tui {
        let orchestrator = DashboardOrchestrator::new(data_path, filter.clone());
        let (rx, handle) = orchestrator.start();

        let app = App::new(&settings.theme, ViewMode::from_name(&settings.view), filter);

        // Raw mode delivers Ctrl+C as a key event, handled inside the TUI.
        app.run(rx, handle).await?;
    } else {
        let path = data_path.clone();
        let report = tokio::task::spawn_blocking(move || load_records(&path)).await?;
        let analysis = analyze(&report.records, &filter);

        let document = JsonReport {
            analysis: &analysis,
            load_report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}
