use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use reachlog_core::{CalendarDate, DailyRecord, Dataset, DatasetStore, Metric, MetricSet};
use tempfile::NamedTempFile;

use crate::error::StoreError;

pub const MONTH_COLUMN: &str = "Month";
pub const DATE_COLUMN: &str = "Date";
pub const WEEKDAY_COLUMN: &str = "Day of the Week";

/// Dataset stored as a single CSV file.
///
/// A missing file loads as "no dataset yet". Saves go through a temporary
/// file in the same directory and a rename, so an interrupted save leaves the
/// previous file intact.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl DatasetStore for CsvStore {
    type Error = StoreError;

    fn load(&self) -> Result<Option<Dataset>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no dataset file yet");
                return Ok(None);
            }
            Err(e) => return Err(self.io_error(e)),
        };
        let dataset = read_dataset(file)?;
        tracing::debug!(path = %self.path.display(), rows = dataset.len(), "dataset loaded");
        Ok(Some(dataset))
    }

    fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        write_dataset(&mut tmp, dataset)?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::info!(path = %self.path.display(), rows = dataset.len(), "dataset saved");
        Ok(())
    }
}

/// Parses a dataset from CSV.
///
/// Columns are matched by header name, so column order and unknown extra
/// columns do not matter. A metric column that is absent loads as zero and
/// an empty cell reads as zero. Rows repeating a date keep the last one.
///
/// # Errors
///
/// Returns [`StoreError::MissingColumn`] without a `Date` column,
/// [`StoreError::InvalidRow`] for an unparseable date or count, and
/// [`StoreError::Csv`] for malformed CSV.
pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(Dataset::new());
    }
    let column = |name: &str| headers.iter().position(|h| h == name);

    let date_idx =
        column(DATE_COLUMN).ok_or_else(|| StoreError::MissingColumn(DATE_COLUMN.to_owned()))?;
    let metric_columns: Vec<(Metric, usize)> = Metric::ALL
        .into_iter()
        .filter_map(|metric| match column(metric.name()) {
            Some(idx) => Some((metric, idx)),
            None => {
                tracing::warn!(column = metric.name(), "metric column missing; loading as zero");
                None
            }
        })
        .collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        let invalid = |reason: String| StoreError::InvalidRow { line, reason };

        let date = CalendarDate::parse(row.get(date_idx).unwrap_or_default())
            .map_err(|e| invalid(e.to_string()))?;

        let mut metrics = MetricSet::zeroed();
        for &(metric, idx) in &metric_columns {
            let cell = row.get(idx).unwrap_or_default();
            let value = parse_count(cell).ok_or_else(|| {
                invalid(format!("{metric} value '{cell}' is not a non-negative integer"))
            })?;
            metrics.set(metric, value);
        }
        records.push(DailyRecord::new(date, metrics));
    }

    let row_count = records.len();
    let dataset = Dataset::from_records(records);
    if dataset.len() < row_count {
        tracing::warn!(
            dropped = row_count - dataset.len(),
            "dataset file repeats dates; kept the last row for each"
        );
    }
    Ok(dataset)
}

/// Writes `dataset` as CSV with the fixed header, in dataset order.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if writing fails.
pub fn write_dataset<W: io::Write>(writer: W, dataset: &Dataset) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![MONTH_COLUMN, DATE_COLUMN, WEEKDAY_COLUMN];
    header.extend(Metric::ALL.into_iter().map(Metric::name));
    wtr.write_record(&header)?;

    for record in dataset {
        let mut row = vec![
            record.month().to_owned(),
            record.date().to_string(),
            record.weekday().to_owned(),
        ];
        row.extend(record.metrics().iter().map(|(_, value)| value.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads a stored count. Empty cells are zero; integral floats such as
/// `150.0` are accepted for files written by spreadsheet tools.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(0);
    }
    cell.parse::<u64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}
