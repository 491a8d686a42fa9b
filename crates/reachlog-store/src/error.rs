use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("dataset file is missing the '{0}' column")]
    MissingColumn(String),

    #[error("invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}
