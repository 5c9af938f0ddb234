//! Error types for Tally.
//!
//! Errors are grouped by the layer that raises them: the receipt optimization
//! pipeline, configuration loading, and record/blob storage. Each pipeline
//! variant carries the source file name so a failed upload can be reported
//! against the file the user picked.

use thiserror::Error;

/// Top-level error type for Tally operations.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Receipt optimization errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Record or blob storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Receipt optimization errors, one per pipeline stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source bytes are not a loadable image
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Drawing surface could not be allocated or a draw failed
    #[error("Render error for {name}: {message}")]
    Render { name: String, message: String },

    /// The encoder failed or produced no data
    #[error("Encode error for {name}: {message}")]
    Encode { name: String, message: String },

    /// Source exceeds the configured size limit
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },
}

impl PipelineError {
    /// Short stage label used in logs.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::FileTooLarge { .. } => "validate",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Render { .. } => "render",
            PipelineError::Encode { .. } => "encode",
        }
    }
}

/// Record repository and blob store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this id in the collection
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Record could not be converted to or from its typed form
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Blob path is empty, absolute, or escapes the store root
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    /// Underlying filesystem failure
    #[error("Blob store IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Tally results.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Convenience type alias for storage-specific results.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
