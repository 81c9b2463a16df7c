#![forbid(unsafe_code)]

//! Runtime error type.
//!
//! Navigation never fails through this type: boundary hits and missing marks
//! become notices. Errors here come from building a figure out of bad data,
//! loading configuration, or talking to storage.

use thiserror::Error;

use chartnav_core::{SeriesError, TopologyError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
    #[error("unknown trace: {0}")]
    UnknownTrace(String),
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
    #[error("invalid trace data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_joined() {
        let e = EngineError::InvalidConfig(vec!["a".into(), "b".into()]);
        assert_eq!(e.to_string(), "invalid configuration: a; b");
    }

    #[test]
    fn series_error_converts() {
        let e: EngineError = SeriesError::EmptySeries.into();
        assert_eq!(e.to_string(), "series error: series contains no numeric values");
    }
}
