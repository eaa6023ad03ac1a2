//! Error handling primitives shared across the crate.
//!
//! Every failure funnels into [`ChurnError`]; the stable [`ErrorCode`] it maps
//! to is what logs and the HTTP layer key off.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Stable error codes surfaced in logs and used to pick HTTP status codes.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Input failed validation (bad rows, bad request bodies, unseen categories).
    InvalidInput = 1,
    /// Requested model artefact was not available.
    ModelMissing = 2,
    /// Filesystem failure outside of artefact lookups.
    Io = 3,
    /// Configuration could not be parsed.
    Config = 4,
    /// Catch-all for bugs and library failures.
    Internal = 5,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Canonical error type for the crate.
#[derive(Debug, Error)]
pub enum ChurnError {
    /// Reading or writing a file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The CSV reader rejected the input.
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    /// A row did not have one cell per column.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A declared column is absent from the table.
    #[error("column '{0}' is missing")]
    MissingColumn(String),
    /// A cell could not be interpreted the way its column requires.
    #[error("column '{column}' holds an invalid value: {reason}")]
    InvalidValue { column: String, reason: String },
    /// A categorical value was never observed while fitting.
    #[error("unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },
    /// The label column held something other than a churn flag.
    #[error("unrecognised churn label '{0}'")]
    InvalidLabel(String),
    /// The request body could not be turned into a customer record.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Split parameters or partition sizes were unusable.
    #[error("invalid split: {0}")]
    InvalidSplit(String),
    /// The classifier failed to fit.
    #[error("model fitting failed: {0}")]
    Fit(String),
    /// No artefact exists at the expected location.
    #[error("no model artifact at {}", .0.display())]
    ModelMissing(PathBuf),
    /// Tracking URI uses a storage scheme this build cannot reach.
    #[error("unsupported artifact scheme '{0}'")]
    UnsupportedScheme(String),
    /// A run identifier failed validation.
    #[error("invalid run identifier '{0}'")]
    InvalidRunId(String),
    /// Artefact (de)serialisation failed.
    #[error("artifact encoding failed: {0}")]
    Serde(#[from] serde_json::Error),
    /// Configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The HTTP listener failed to bind or stopped with an error.
    #[error("http server on {addr}: {source}")]
    Serve {
        addr: String,
        source: std::io::Error,
    },
    /// The tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Result alias used throughout the crate.
pub type ChurnResult<T> = Result<T, ChurnError>;

impl ChurnError {
    /// IO helper capturing the offending path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Validation helper for cells.
    pub fn invalid_value(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Machine parsable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChurnError::Csv(_)
            | ChurnError::RaggedRow { .. }
            | ChurnError::MissingColumn(_)
            | ChurnError::InvalidValue { .. }
            | ChurnError::UnknownCategory { .. }
            | ChurnError::InvalidLabel(_)
            | ChurnError::InvalidRequest(_)
            | ChurnError::InvalidSplit(_)
            | ChurnError::InvalidRunId(_) => ErrorCode::InvalidInput,
            ChurnError::ModelMissing(_) => ErrorCode::ModelMissing,
            ChurnError::Io { .. } | ChurnError::Serve { .. } => ErrorCode::Io,
            ChurnError::UnsupportedScheme(_) | ChurnError::Config(_) => ErrorCode::Config,
            ChurnError::Fit(_) | ChurnError::Serde(_) | ChurnError::Logging(_) => {
                ErrorCode::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Ok as u32, 0);
        assert_eq!(ErrorCode::InvalidInput as u32, 1);
        assert_eq!(ErrorCode::ModelMissing as u32, 2);
        assert_eq!(ErrorCode::Io as u32, 3);
        assert_eq!(ErrorCode::Config as u32, 4);
        assert_eq!(ErrorCode::Internal as u32, 5);
    }

    #[test]
    fn request_errors_are_invalid_input() {
        let err = ChurnError::UnknownCategory {
            column: "Contract".into(),
            value: "Ten year".into(),
        };
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(
            err.to_string(),
            "unknown category 'Ten year' for column 'Contract'"
        );
        assert_eq!(
            ChurnError::MissingColumn("tenure".into()).code(),
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn startup_errors_keep_their_class() {
        assert_eq!(
            ChurnError::ModelMissing(PathBuf::from("mlruns/4/x")).code(),
            ErrorCode::ModelMissing
        );
        let io = ChurnError::io(
            "data.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.code(), ErrorCode::Io);
        assert!(io.to_string().contains("data.csv"));
    }
}
