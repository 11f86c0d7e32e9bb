use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for blorb operations
pub type Result<T> = std::result::Result<T, BlorbError>;

/// Unified error type for all blorb operations
///
/// Control-list errors carry the 1-based line number of the offending entry.
#[derive(Debug, Error)]
pub enum BlorbError {
    // Control list errors
    #[error("{line}: Illegal use '{token}'")]
    UnrecognizedUsage { line: usize, token: String },

    #[error("{line}: Illegal type '{kind}' for use '{usage}' in '{}'", path.display())]
    DisallowedTypeForUsage {
        line: usize,
        usage: String,
        kind: String,
        path: PathBuf,
    },

    #[error("{line}: duplicated bibliographic info")]
    DuplicateMetadata { line: usize },

    #[error("{line}: duplicated cover")]
    DuplicateCover { line: usize },

    #[error("{line}: missing file name after '{token}'")]
    MalformedFilePath { line: usize, token: String },

    #[error("{line}: can't open file '{}': {source}", path.display())]
    UnreadableResourceFile {
        line: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{line}: unrecognized file extension '{extension}' in '{}'", path.display())]
    UnrecognizedExtension {
        line: usize,
        extension: String,
        path: PathBuf,
    },

    #[error("Too many chunks: limit is {limit}")]
    ChunkCapacityExceeded { limit: usize },

    #[error("can't open Blorb Resources Control File '{}': {source}", path.display())]
    UnreadableControlFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Container errors
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Invalid resource index: {0}")]
    InvalidIndex(String),

    #[error("Container too large: offset {0} does not fit in 32 bits")]
    ContainerTooLarge(u64),

    // Configuration errors
    #[error("Unsupported functionality: '{0}'")]
    UnsupportedPersonality(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for BlorbError {
    fn from(err: toml::de::Error) -> Self {
        BlorbError::Config(err.to_string())
    }
}

impl BlorbError {
    /// Control-list line the error originates from, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            BlorbError::UnrecognizedUsage { line, .. }
            | BlorbError::DisallowedTypeForUsage { line, .. }
            | BlorbError::DuplicateMetadata { line }
            | BlorbError::DuplicateCover { line }
            | BlorbError::MalformedFilePath { line, .. }
            | BlorbError::UnreadableResourceFile { line, .. }
            | BlorbError::UnrecognizedExtension { line, .. } => Some(*line),
            _ => None,
        }
    }
}
