//! Runtime configuration loaded from the environment.
//!
//! Binaries call `dotenvy::dotenv()` first, so a `.env` file in the working
//! directory feeds the same variables.

use std::env;
use std::path::PathBuf;

use super::error::{ChurnError, ChurnResult};
use super::log::LogFormat;

/// Run the service loads when `CHURN_RUN_ID` is not set.
pub const DEFAULT_RUN_ID: &str = "60980fc781d4480db329374e48dc7a24";

/// Snapshot of configuration values consumed by the binaries.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub data_file: PathBuf,
    pub tracking_uri: String,
    pub experiment: String,
    pub run_id: String,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub log_format: LogFormat,
    pub train_config: Option<PathBuf>,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> ChurnResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ChurnResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = env_or("CHURN_PORT", "5000");
        let port = port
            .parse::<u16>()
            .map_err(|_| ChurnError::Config(format!("CHURN_PORT '{port}' is not a valid port")))?;

        let log_format = env_or("CHURN_LOG_FORMAT", "text").parse::<LogFormat>()?;

        Ok(Self {
            data_file: PathBuf::from(env_or(
                "CHURN_DATA_FILE",
                "./data/WA_Fn-UseC_-Telco-Customer-Churn.csv",
            )),
            tracking_uri: env_or("CHURN_TRACKING_URI", "file://./mlruns"),
            experiment: env_or("CHURN_EXPERIMENT", "4"),
            run_id: env_or("CHURN_RUN_ID", DEFAULT_RUN_ID),
            host: env_or("CHURN_HOST", "127.0.0.1"),
            port,
            log_filter: env_or("CHURN_LOG", "info,tower_http=info"),
            log_format,
            train_config: lookup("CHURN_TRAIN_CONFIG").map(PathBuf::from),
        })
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
