//! Logging setup emitting plain text or JSON lines.
//!
//! Events carry structured fields (`ev`, `run_id`, `rows`, `dur_ms`, `code`)
//! so the JSON output stays greppable by event name.

use std::str::FromStr;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::error::{ChurnError, ChurnResult};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Output encoding for log lines.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ChurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ChurnError::Config(format!(
                "CHURN_LOG_FORMAT '{other}' is not one of text, json"
            ))),
        }
    }
}

/// Install the global subscriber. The filter is always validated; once a
/// subscriber is installed, later calls install nothing.
pub fn init(filter: &str, format: LogFormat) -> ChurnResult<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|err| ChurnError::Config(format!("log filter '{filter}': {err}")))?;
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
    };
    installed.map_err(|err| ChurnError::Logging(err.to_string()))?;
    let _ = INSTALLED.set(());

    tracing::debug!(ev = "log.init", ?format, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_formats() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn invalid_filter_is_a_config_error() {
        assert!(matches!(
            init("churn=loud", LogFormat::Text),
            Err(ChurnError::Config(_))
        ));
    }
}
