//! Core of the insights sync: dates and day windows, the fixed metric schema,
//! payload normalization, the last-write-wins dataset merge, and the update
//! orchestrator that drives them.

mod app_config;
mod config;
pub mod dataset;
pub mod date;
mod error;
pub mod metrics;
pub mod normalize;
pub mod record;
pub mod update;
pub mod window;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{merge_records, Dataset};
pub use date::{CalendarDate, DATE_FORMAT};
pub use error::{ConfigError, FormatError};
pub use metrics::{Metric, MetricSet};
pub use normalize::{normalize_day, NormalizedDay, PayloadIssue};
pub use record::DailyRecord;
pub use update::{
    trailing_days, DatasetStore, InsightsSource, SkippedDay, UpdateError, UpdateOptions,
    UpdateOrchestrator, UpdateReport, DEFAULT_WINDOW_DAYS,
};
pub use window::{day_window_for, AccountClock, DayWindow};
