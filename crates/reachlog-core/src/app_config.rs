use std::path::PathBuf;

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::update::UpdateOptions;
use crate::window::AccountClock;

#[derive(Clone)]
pub struct AppConfig {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub dataset_path: PathBuf,
    pub window_days: u32,
    pub fetch_follower_count: bool,
    /// `None` means the host's local time zone.
    pub timezone: Option<Tz>,
    pub graph_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub log_level: String,
}

impl AppConfig {
    #[must_use]
    pub fn clock(&self) -> AccountClock {
        self.timezone.map_or(AccountClock::Local, AccountClock::Zone)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `REACHLOG_ACCESS_TOKEN` is unset.
    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("REACHLOG_ACCESS_TOKEN".to_string()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `REACHLOG_ACCOUNT_ID` is unset.
    pub fn require_account_id(&self) -> Result<&str, ConfigError> {
        self.account_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("REACHLOG_ACCOUNT_ID".to_string()))
    }

    /// Orchestrator options derived from this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if no account id is configured.
    pub fn update_options(&self) -> Result<UpdateOptions, ConfigError> {
        Ok(UpdateOptions {
            account_id: self.require_account_id()?.to_string(),
            window_days: self.window_days,
            fetch_follower_count: self.fetch_follower_count,
            clock: self.clock(),
            dry_run: false,
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("account_id", &self.account_id)
            .field("dataset_path", &self.dataset_path)
            .field("window_days", &self.window_days)
            .field("fetch_follower_count", &self.fetch_follower_count)
            .field("timezone", &self.timezone)
            .field("graph_base_url", &self.graph_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("log_level", &self.log_level)
            .finish()
    }
}
