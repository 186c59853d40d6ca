use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = EtlError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Load failed for table {table}: {message}")]
    Load {
        table: String,
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    pub fn schema(message: impl Into<String>) -> Self {
        EtlError::Schema(message.into())
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EtlError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn load(table: impl Into<String>, source: rusqlite::Error) -> Self {
        EtlError::Load {
            table: table.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    // Rejected before the store was touched.
    pub fn load_rejected(table: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::Load {
            table: table.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EtlError::NotFound(_) => "NotFoundError",
            EtlError::Schema(_) => "SchemaError",
            EtlError::Parse { .. } => "ParseError",
            EtlError::Load { .. } => "LoadError",
            EtlError::Query(_) => "QueryError",
            EtlError::Io(_) => "IoError",
            EtlError::Config(_) => "ConfigError",
        }
    }
}
