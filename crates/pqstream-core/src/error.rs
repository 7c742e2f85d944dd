use thiserror::Error;

use crate::schema::{ColumnType, LogicalKind, PhysicalType};

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("column index out of range: index {index}, number of columns {width}")]
    IndexOutOfRange { index: usize, width: usize },

    /// `expected` is the descriptor's type, `actual` the type the caller supplied.
    #[error("column '{column}' type mismatch: column is {expected}, given {actual}")]
    SchemaMismatch {
        column: String,
        expected: ColumnType,
        actual: ColumnType,
    },

    #[error("column '{column}' produced {count} values for a single row slot")]
    ValueCountMismatch { column: String, count: usize },

    #[error("row ended after {columns_done} of {num_columns} columns")]
    IncompleteRow { columns_done: usize, num_columns: usize },

    #[error("cannot skip rows at column {column_index}; finish the current row first")]
    IllegalSkip { column_index: usize },

    #[error("cannot write null to non-nullable column '{column}'")]
    NotNullable { column: String },

    #[error("end of stream reached")]
    EndOfStream,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("internal invariant failed: {0}")]
    Invariant(String),

    /// Error with context chain for better debugging
    #[error("error in {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Add context to an error, creating an error chain.
    ///
    /// # Example
    /// ```rust,no_run
    /// use pqstream_core::error::Error;
    /// let err = Error::EndOfStream;
    /// let err = err.with_context("while reading trades.parquet");
    /// ```
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self) as Box<dyn std::error::Error + Send + Sync>,
        }
    }

    /// Get suggestions for common errors.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::SchemaMismatch { column, expected, .. } => {
                let mut hints = vec![
                    format!("Column '{}' expects {}", column, expected),
                    "Write and read columns in schema order".into(),
                    "Fixed-length values must match the declared length exactly".into(),
                ];
                if matches!(expected.logical, LogicalKind::Other(_))
                    || expected.physical == PhysicalType::Int96
                {
                    hints.push(
                        "No Rust type maps onto this column; use skip_columns() or read_value()"
                            .into(),
                    );
                }
                hints
            }
            Error::IncompleteRow { columns_done, num_columns } => vec![format!(
                "{} more column(s) must be written, read or skipped before ending the row",
                num_columns - columns_done.min(num_columns)
            )],
            Error::IllegalSkip { .. } => {
                vec!["Call end_row() (or skip_columns) before skip_rows()".into()]
            }
            Error::NotNullable { column } => vec![format!(
                "Declare '{}' as OPTIONAL to store absent values",
                column
            )],
            Error::UnsupportedSchema(_) => vec![
                "Only flat schemas of scalar columns are supported".into(),
                "Flatten nested groups and repeated fields before streaming".into(),
            ],
            Error::EndOfStream => vec!["Check eof() before reading the next row".into()],
            _ => vec![],
        }
    }
}
