use std::path::{Path, PathBuf};
use thiserror::Error;

/// how the pass runner must react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// drop this network for the current pass, nothing was written
    Skip,
    /// a value could not be read and falls back to its bootstrap default
    Default,
    /// abort the pass
    Fatal,
}

#[derive(Error, Debug)]
pub enum ChartsError {
    #[error("daemon {endpoint} unreachable: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: ureq::Error,
    },
    #[error("empty response from {0}")]
    EmptyResponse(String),
    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("daemon {endpoint} returned an error: {message}")]
    Rpc { endpoint: String, message: String },
    #[error("failed to decode {what} from {endpoint}: {reason}")]
    Decode {
        endpoint: String,
        what: &'static str,
        reason: String,
    },
    #[error("malformed chart {path}: {source}")]
    MalformedChart {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unparseable checkpoint {path}: {value:?}")]
    Checkpoint { path: PathBuf, value: String },
    #[error("inconsistent commit journal {path}: {reason}")]
    Journal { path: PathBuf, reason: String },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChartsError {
    pub fn severity(&self) -> Severity {
        match self {
            ChartsError::Unreachable { .. }
            | ChartsError::EmptyResponse(_)
            | ChartsError::MalformedResponse { .. }
            | ChartsError::Rpc { .. } => Severity::Skip,
            ChartsError::Checkpoint { .. } => Severity::Default,
            ChartsError::Decode { .. }
            | ChartsError::MalformedChart { .. }
            | ChartsError::Journal { .. }
            | ChartsError::Io { .. } => Severity::Fatal,
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ChartsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
