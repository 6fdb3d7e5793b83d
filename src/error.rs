use thiserror::Error;

/// Main error type for metamodel extraction
#[derive(Error, Debug)]
pub enum EmeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Host API error: {0}")]
    HostApi(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    #[error("Duplicate package: {0}")]
    DuplicatePackage(String),

    #[error("Model already has a root package, cannot add {0:?} as root")]
    DuplicateRoot(String),

    #[error("Missing package: {0:?}")]
    MissingPackage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

impl EmeError {
    pub fn host(message: impl Into<String>) -> Self {
        Self::HostApi(message.into())
    }

    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EmeError>;
