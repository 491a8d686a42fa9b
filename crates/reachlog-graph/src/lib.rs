pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::InsightsClient;
pub use error::GraphError;
