use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum HallError {
    #[error("{entity} not found: {key}")]
    #[diagnostic(code(studyhall::not_found))]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {0}")]
    #[diagnostic(code(studyhall::conflict))]
    Conflict(String),

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(studyhall::invalid_argument))]
    InvalidArgument(String),

    #[error("CSV error: {0}")]
    #[diagnostic(code(studyhall::csv))]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(studyhall::io))]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    #[diagnostic(code(studyhall::rocksdb))]
    RocksDBError(#[from] rocksdb::Error),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(studyhall::config), help("check the file passed with --config"))]
    ConfigError(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(studyhall::internal))]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl HallError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<serde_json::Error> for HallError {
    fn from(e: serde_json::Error) -> Self {
        Self::InternalError(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, HallError>;
