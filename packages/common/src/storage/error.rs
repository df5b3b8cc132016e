use thiserror::Error;

/// Errors that can occur in the document and upload stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested file was not found.
    #[error("file not found: {0}")]
    NotFound(String),

    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed or serialized.
    #[error("malformed JSON document {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The file exceeds the configured size limit.
    #[error("file exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    /// The file name is not a flat, visible name.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
}
