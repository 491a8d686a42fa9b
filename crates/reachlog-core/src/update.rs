//! Incremental update of the stored dataset over a trailing window of days.
//!
//! [`UpdateOrchestrator`] walks the window from today backwards. For each day
//! it computes the query window, fetches the raw metrics (and optionally the
//! follower count), normalizes them and merges the record into the dataset it
//! loaded at the start of the run. A day whose fetch fails is logged and
//! skipped; the rest of the run continues. The dataset is saved once, after
//! the last day.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::dataset::Dataset;
use crate::date::CalendarDate;
use crate::normalize::{normalize_day, NormalizedDay};
use crate::window::{AccountClock, DayWindow};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote source of daily account metrics.
pub trait InsightsSource {
    type Error: std::fmt::Display;

    /// Raw insights payload for the metrics tracked as `total_value`.
    fn fetch_metrics(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Follower count reported for the window.
    fn fetch_follower_count(
        &self,
        account_id: &str,
        window: DayWindow,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

/// Where the dataset lives between runs.
pub trait DatasetStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Dataset>, Self::Error>;

    fn save(&self, dataset: &Dataset) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("trailing window must cover at least one day")]
    EmptyWindow,

    #[error("cannot step back {offset} days from {today}")]
    DateOutOfRange { today: CalendarDate, offset: u32 },

    #[error("failed to load dataset: {0}")]
    Load(#[source] BoxError),

    #[error("failed to save dataset: {0}")]
    Persist(#[source] BoxError),
}

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub account_id: String,
    /// Number of days to refresh, today included.
    pub window_days: u32,
    /// Whether to issue the separate follower-count request per day.
    pub fetch_follower_count: bool,
    pub clock: AccountClock,
    /// Skip the final save.
    pub dry_run: bool,
}

impl UpdateOptions {
    #[must_use]
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_follower_count: true,
            clock: AccountClock::default(),
            dry_run: false,
        }
    }
}

/// A day left out of the run and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDay {
    pub date: CalendarDate,
    pub reason: String,
}

/// Outcome of one update run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub dataset: Dataset,
    /// Days merged, most recent first.
    pub merged: Vec<CalendarDate>,
    pub skipped: Vec<SkippedDay>,
    /// Number of payload entries ignored during normalization.
    pub payload_issues: usize,
    pub persisted: bool,
}

pub struct UpdateOrchestrator<S, D> {
    source: S,
    store: D,
    options: UpdateOptions,
}

impl<S, D> UpdateOrchestrator<S, D>
where
    S: InsightsSource,
    D: DatasetStore,
{
    /// # Errors
    ///
    /// Returns [`UpdateError::EmptyWindow`] if `options.window_days` is zero.
    pub fn new(source: S, store: D, options: UpdateOptions) -> Result<Self, UpdateError> {
        if options.window_days == 0 {
            return Err(UpdateError::EmptyWindow);
        }
        Ok(Self {
            source,
            store,
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    #[must_use]
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Runs the update for the window ending today on the configured clock.
    ///
    /// # Errors
    ///
    /// See [`UpdateOrchestrator::run_from`].
    pub async fn run(&self) -> Result<UpdateReport, UpdateError> {
        self.run_from(self.options.clock.today()).await
    }

    /// Runs the update for the window ending on `today`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Load`] or [`UpdateError::Persist`] when the store
    /// fails, and [`UpdateError::DateOutOfRange`] if the window reaches past
    /// the supported calendar. Per-day fetch failures are reported in
    /// [`UpdateReport::skipped`] instead.
    pub async fn run_from(&self, today: CalendarDate) -> Result<UpdateReport, UpdateError> {
        let days = trailing_days(today, self.options.window_days)?;
        let mut dataset = self
            .store
            .load()
            .map_err(|e| UpdateError::Load(Box::new(e)))?
            .unwrap_or_default();

        tracing::info!(
            days = days.len(),
            existing = dataset.len(),
            from = %today,
            "starting insights update"
        );

        let mut merged = Vec::with_capacity(days.len());
        let mut skipped = Vec::new();
        let mut payload_issues = 0usize;

        for date in days {
            match self.process_day(date).await {
                Ok(day) => {
                    payload_issues += day.issues.len();
                    log_issues(date, &day);
                    dataset.merge([day.record]);
                    merged.push(date);
                }
                Err(reason) => {
                    tracing::warn!(date = %date, error = %reason, "skipping day; fetch failed");
                    skipped.push(SkippedDay { date, reason });
                }
            }
        }

        let persisted = if self.options.dry_run {
            tracing::info!(rows = dataset.len(), "dry run; dataset not saved");
            false
        } else {
            self.store
                .save(&dataset)
                .map_err(|e| UpdateError::Persist(Box::new(e)))?;
            true
        };

        tracing::info!(
            merged = merged.len(),
            skipped = skipped.len(),
            rows = dataset.len(),
            "insights update finished"
        );

        Ok(UpdateReport {
            dataset,
            merged,
            skipped,
            payload_issues,
            persisted,
        })
    }

    async fn process_day(&self, date: CalendarDate) -> Result<NormalizedDay, String> {
        let window = self.options.clock.day_window(date);
        let account_id = self.options.account_id.as_str();
        tracing::debug!(date = %date, since = window.start, until = window.end, "fetching day");

        let payload = self
            .source
            .fetch_metrics(account_id, window)
            .await
            .map_err(|e| format!("metrics request failed: {e}"))?;

        let follower_count = if self.options.fetch_follower_count {
            let count = self
                .source
                .fetch_follower_count(account_id, window)
                .await
                .map_err(|e| format!("follower count request failed: {e}"))?;
            Some(count)
        } else {
            None
        };

        Ok(normalize_day(&payload, date, follower_count))
    }
}

/// The `window_days` dates ending on `today`, most recent first.
///
/// # Errors
///
/// Returns [`UpdateError::EmptyWindow`] for a zero-day window and
/// [`UpdateError::DateOutOfRange`] if a date would precede chrono's range.
pub fn trailing_days(
    today: CalendarDate,
    window_days: u32,
) -> Result<Vec<CalendarDate>, UpdateError> {
    if window_days == 0 {
        return Err(UpdateError::EmptyWindow);
    }
    (0..window_days)
        .map(|offset| {
            today
                .days_before(offset)
                .ok_or(UpdateError::DateOutOfRange { today, offset })
        })
        .collect()
}

fn log_issues(date: CalendarDate, day: &NormalizedDay) {
    for issue in &day.issues {
        if issue.is_malformed() {
            tracing::warn!(date = %date, issue = %issue, "ignored malformed payload entry");
        } else {
            tracing::debug!(date = %date, issue = %issue, "ignored payload entry");
        }
    }
}

#[cfg(test)]
#[path = "update_test.rs"]
mod tests;
