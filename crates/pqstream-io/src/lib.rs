#![forbid(unsafe_code)]
//! pqstream-io: typed row streams over Parquet containers.
//!
//! - `binder`: Parquet schema tree → flat `pqstream_core::Schema`.
//! - `writers`: `StreamWriter` plus the buffered row group it fills.
//! - `readers`: `StreamReader` plus the per-column cursors it drains.
//! - `compression`: `Codec` → Parquet writer properties.

pub mod binder;
pub mod compression;
pub mod error;
pub mod readers;
pub mod writers;

pub use binder::bind_schema;
pub use error::{Error, Result};
pub use readers::stream::StreamReader;
pub use writers::stream::StreamWriter;
