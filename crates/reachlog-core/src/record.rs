use crate::date::CalendarDate;
use crate::metrics::{Metric, MetricSet};

/// One row of the dataset: a date, its derived labels, and every metric.
///
/// Labels are always derived from the date so two records for the same day
/// cannot disagree on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    date: CalendarDate,
    month: String,
    weekday: String,
    metrics: MetricSet,
}

impl DailyRecord {
    #[must_use]
    pub fn new(date: CalendarDate, metrics: MetricSet) -> Self {
        Self {
            date,
            month: date.month_name(),
            weekday: date.weekday_name(),
            metrics,
        }
    }

    #[must_use]
    pub fn date(&self) -> CalendarDate {
        self.date
    }

    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    #[must_use]
    pub fn weekday(&self) -> &str {
        &self.weekday
    }

    #[must_use]
    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    #[must_use]
    pub fn metric(&self, metric: Metric) -> u64 {
        self.metrics.get(metric)
    }
}
