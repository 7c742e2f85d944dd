use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Misuse of the stream or a schema mismatch; see `pqstream_core::Error`.
    #[error(transparent)]
    Stream(#[from] pqstream_core::Error),

    /// Failure reported by the Parquet engine, passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] parquet::errors::ParquetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("column '{column}' holds invalid UTF-8: {source}")]
    InvalidUtf8 {
        column: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl Error {
    /// The stream-level error, if this is one.
    pub fn stream_error(&self) -> Option<&pqstream_core::Error> {
        match self {
            Error::Stream(e) => Some(e),
            _ => None,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Stream(e) => e.suggestions(),
            Error::Storage(_) | Error::Io(_) => vec![
                "Check the file path and permissions".into(),
                "Verify the file is a complete Parquet file (footer written)".into(),
            ],
            Error::InvalidUtf8 { .. } => {
                vec!["Declare binary columns without the UTF8 annotation".into()]
            }
        }
    }
}
