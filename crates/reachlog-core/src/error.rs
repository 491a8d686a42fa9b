use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// A date string that does not match the `dd/mm/yyyy` layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{input}' (expected dd/mm/yyyy): {reason}")]
pub struct FormatError {
    pub input: String,
    pub reason: String,
}
