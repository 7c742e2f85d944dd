#![forbid(unsafe_code)]
//! pqstream-core: shared kernel for the pqstream row adapter.
//!
//! This crate contains only *pure* types and validation: column descriptors,
//! the type guard both streams run before every access, the value model and
//! writer configuration. There is **no I/O** and **no storage engine** here.
//!
//! Crates that use this:
//! - pqstream-io: binds Parquet schemas to `Schema` and drives the typed
//!   `StreamWriter`/`StreamReader` over Parquet containers.
//! - pqstream-cli: loads `WriterConfig` and prints `Value`s.

pub mod config;
pub mod error;
pub mod guard;
pub mod schema;
pub mod value;

pub use config::{Codec, WriterConfig};
pub use error::{Error, Result};
pub use schema::{Annotation, ColumnDescriptor, ColumnType, LogicalKind, PhysicalType, Schema};
pub use value::{FromValue, IntoValue, StreamType, TimestampMicros, TimestampMillis, Value};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
