// Error types shared by every stage of the compiler.
use thiserror::Error;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A title, number or required field could not be read from a document.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("{path} is not a valid recommendation: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("ARC number must be in x.xxxx.x format, got {0:?}")]
    InvalidArc(String),

    #[error("config error: {field}: {message}")]
    Config { field: String, message: String },

    /// The template does not have the shape the compiler writes into.
    #[error("template error: {0}")]
    Template(String),

    #[error("chart images not found under {0}; save the energy chart workbook as a web page (.htm)")]
    ChartsNotFound(PathBuf),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ReportError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
