use thiserror::Error;

/// Main error type for Cartograph operations
#[derive(Error, Debug)]
pub enum CartographError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Unknown graph node: {0}")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, CartographError>;
