//! Read-only command handlers: `show` and `window`.

use reachlog_core::{day_window_for, AppConfig, DatasetStore};
use reachlog_store::CsvStore;

use crate::table::render_records;

/// Print up to `limit` stored days, most recent first.
///
/// # Errors
///
/// Returns an error if the dataset file exists but cannot be read.
pub(crate) fn run_show(config: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let store = CsvStore::new(&config.dataset_path);
    let Some(dataset) = store.load()? else {
        println!("No dataset at {} yet.", store.path().display());
        return Ok(());
    };

    let rows: Vec<_> = dataset.newest_first().into_iter().take(limit).collect();
    print!("{}", render_records(&rows));
    println!("{} of {} day(s) shown.", rows.len(), dataset.len());
    Ok(())
}

/// Print the inclusive epoch-second window of a `dd/mm/yyyy` date on the
/// configured clock.
///
/// # Errors
///
/// Returns an error if `date` is not a valid `dd/mm/yyyy` date.
pub(crate) fn run_window(config: &AppConfig, date: &str) -> anyhow::Result<()> {
    let window = day_window_for(date, &config.clock())?;
    println!("since={} until={}", window.start, window.end);
    Ok(())
}
