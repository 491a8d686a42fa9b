//! Flat-file persistence for the dataset.
//!
//! The dataset is stored as one CSV file: `Month`, `Date`, `Day of the Week`
//! followed by one column per metric in schema order. The whole file is read
//! at the start of a run and replaced at the end; there is no append path.

mod csv_store;
mod error;

pub use csv_store::{
    read_dataset, write_dataset, CsvStore, DATE_COLUMN, MONTH_COLUMN, WEEKDAY_COLUMN,
};
pub use error::StoreError;
