//! The `update` command: fetch the trailing window and merge it into the
//! dataset file.

use reachlog_core::{AppConfig, UpdateOrchestrator, UpdateReport};
use reachlog_graph::InsightsClient;
use reachlog_store::CsvStore;

use crate::table::render_records;

/// Run one update over the trailing window.
///
/// `days` overrides the configured window length. With `dry_run` the merged
/// dataset is reported but not written.
///
/// # Errors
///
/// Returns an error if the Graph credentials are not configured, the client
/// cannot be built, the existing dataset cannot be read, or the merged
/// dataset cannot be saved. Per-day fetch failures are logged and skipped,
/// not propagated.
pub(crate) async fn run_update(
    config: &AppConfig,
    days: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = InsightsClient::from_config(config)?;
    let store = CsvStore::new(&config.dataset_path);

    let mut options = config.update_options()?;
    if let Some(days) = days {
        options.window_days = days;
    }
    options.dry_run = dry_run;

    let orchestrator = UpdateOrchestrator::new(client, store, options)?;
    let report = orchestrator.run().await?;

    print_report(&report, orchestrator.store());
    Ok(())
}

fn print_report(report: &UpdateReport, store: &CsvStore) {
    let rows: Vec<_> = report
        .merged
        .iter()
        .filter_map(|date| report.dataset.get(*date))
        .collect();
    if !rows.is_empty() {
        print!("{}", render_records(&rows));
    }

    println!(
        "Merged {} day(s), skipped {} day(s).",
        report.merged.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.date, skipped.reason);
    }
    if report.payload_issues > 0 {
        println!(
            "  {} payload issue(s) logged; see warnings above.",
            report.payload_issues
        );
    }

    if report.persisted {
        println!(
            "Saved {} day(s) to {}.",
            report.dataset.len(),
            store.path().display()
        );
    } else {
        println!(
            "Dry run: {} day(s) would be written to {}.",
            report.dataset.len(),
            store.path().display()
        );
    }
}
