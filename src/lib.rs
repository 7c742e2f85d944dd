#![forbid(unsafe_code)]
//! pqstream: typed row-at-a-time streams over Parquet files.
//!
//! Re-exports the workspace crates so applications and the integration tests
//! depend on a single package:
//! - `pqstream-core`: schema descriptors, type guard, values, configuration.
//! - `pqstream-io`: `StreamWriter`, `StreamReader` and the schema binder.

pub use pqstream_core::{config, guard, schema, value};
pub use pqstream_io::{binder, compression, readers, writers};

pub use pqstream_core::Error as StreamError;
pub use pqstream_core::{
    Annotation, Codec, ColumnDescriptor, ColumnType, FromValue, IntoValue, LogicalKind,
    PhysicalType, Schema, StreamType, TimestampMicros, TimestampMillis, Value, WriterConfig,
};
pub use pqstream_io::{bind_schema, Error, Result, StreamReader, StreamWriter};
