//! Sequential typed writer over a Parquet container.
//!
//! Values are written one column at a time in schema order; `end_row()` closes
//! the row. Rows accumulate in a buffered row group which is flushed to the
//! container when its estimated size passes the configured threshold (checked
//! only at row boundaries), on `new_row_group()`, and at teardown.
//!
//! ```rust,no_run
//! # fn run(file_writer: parquet::file::writer::SerializedFileWriter<std::fs::File>) -> pqstream_io::Result<()> {
//! use pqstream_io::StreamWriter;
//! use pqstream_core::TimestampMicros;
//!
//! let mut writer = StreamWriter::new(file_writer)?;
//! writer.set_max_row_group_size(1000);
//! writer
//!     .write("Stk #1")?
//!     .write(b"ADD\0")?
//!     .write(-14i32)?
//!     .write(0.901f64)?
//!     .write(TimestampMicros(1_571_237_793_919_738))?;
//! writer.end_row()?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::TypePtr;
use pqstream_core::config::{self, WriterConfig};
use pqstream_core::error::Error as StreamError;
use pqstream_core::guard;
use pqstream_core::schema::Schema;
use pqstream_core::value::{IntoValue, Value};
use tracing::{debug, info, warn};

use super::column_buffer::RowGroupBuffer;
use crate::binder::bind_schema;
use crate::compression::writer_properties;
use crate::error::Result;

pub struct StreamWriter<W: Write + Send> {
    /// `None` once the container has been closed.
    file_writer: Option<SerializedFileWriter<W>>,
    /// The open row group, exclusively owned; flushed exactly once.
    row_group: Option<RowGroupBuffer>,
    schema: Arc<Schema>,
    column_index: usize,
    row_group_size: u64,
    max_row_group_size: u64,
    num_rows: u64,
    num_row_groups: usize,
}

impl StreamWriter<File> {
    /// Create `path` and stream rows of `schema` into it.
    pub fn create(path: impl AsRef<Path>, schema: TypePtr, config: &WriterConfig) -> Result<Self> {
        let file = File::create(path)?;
        Self::try_new(file, schema, config)
    }
}

impl<W: Write + Send> StreamWriter<W> {
    /// Wrap an open container, using the process-default row-group size.
    pub fn new(file_writer: SerializedFileWriter<W>) -> Result<Self> {
        Self::with_config(file_writer, &WriterConfig::default())
    }

    /// Wrap an open container. Only `config.max_row_group_size` applies here;
    /// compression is a property of the container itself.
    pub fn with_config(file_writer: SerializedFileWriter<W>, config: &WriterConfig) -> Result<Self> {
        let schema = Arc::new(bind_schema(file_writer.schema_descr())?);
        let max_row_group_size = config.effective_max_row_group_size();
        debug!(
            columns = schema.num_columns(),
            max_row_group_size, "opened stream writer"
        );
        Ok(Self {
            file_writer: Some(file_writer),
            row_group: Some(RowGroupBuffer::new(&schema)),
            schema,
            column_index: 0,
            row_group_size: 0,
            max_row_group_size,
            num_rows: 0,
            num_row_groups: 0,
        })
    }

    /// Open a container over `sink` with the compression from `config`.
    pub fn try_new(sink: W, schema: TypePtr, config: &WriterConfig) -> Result<Self> {
        let props = Arc::new(writer_properties(config));
        let file_writer = SerializedFileWriter::new(sink, schema, props)?;
        Self::with_config(file_writer, config)
    }

    /// Default threshold for writers constructed after this call that do not
    /// set their own. Existing writers are unaffected.
    pub fn set_default_max_row_group_size(max_size: u64) {
        config::set_default_max_row_group_size(max_size);
    }

    /// 0 disables size-based rotation.
    pub fn set_max_row_group_size(&mut self, max_size: u64) {
        self.max_row_group_size = max_size;
    }

    pub fn max_row_group_size(&self) -> u64 {
        self.max_row_group_size
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_columns(&self) -> usize {
        self.schema.num_columns()
    }

    pub fn current_column(&self) -> usize {
        self.column_index
    }

    /// Rows completed with `end_row()`.
    pub fn current_row(&self) -> u64 {
        self.num_rows
    }

    /// Row groups flushed to the container so far.
    pub fn num_row_groups(&self) -> usize {
        self.num_row_groups
    }

    pub fn write<T: IntoValue>(&mut self, value: T) -> Result<&mut Self> {
        guard::check(&self.schema, self.column_index, T::column_type())?;
        self.write_slot(Some(value.into_value()))
    }

    /// Write a present value or a null; the type is checked either way.
    pub fn write_optional<T: IntoValue>(&mut self, value: Option<T>) -> Result<&mut Self> {
        guard::check(&self.schema, self.column_index, T::column_type())?;
        match value {
            Some(v) => self.write_slot(Some(v.into_value())),
            None => self.write_null(),
        }
    }

    pub fn write_null(&mut self) -> Result<&mut Self> {
        guard::check_nullable(&self.schema, self.column_index)?;
        self.write_slot(None)
    }

    /// Fixed-length bytes; `bytes.len()` must equal the column's declared length.
    pub fn write_fixed(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.write_value(Value::Fixed(bytes.to_vec()))
    }

    pub fn write_value(&mut self, value: Value) -> Result<&mut Self> {
        guard::check(&self.schema, self.column_index, value.column_type())?;
        self.write_slot(Some(value))
    }

    fn write_slot(&mut self, value: Option<Value>) -> Result<&mut Self> {
        let row_group = self.row_group.as_mut().ok_or(StreamError::EndOfStream)?;
        let buffered = row_group.write(self.column_index, value)?;
        self.column_index += 1;
        if self.max_row_group_size > 0 {
            self.row_group_size += buffered as u64;
        }
        Ok(self)
    }

    /// Complete the current row. Every column must have been written.
    pub fn end_row(&mut self) -> Result<()> {
        let num_columns = self.schema.num_columns();
        let row_group = self.row_group.as_mut().ok_or(StreamError::EndOfStream)?;
        if self.column_index < num_columns {
            return Err(StreamError::IncompleteRow {
                columns_done: self.column_index,
                num_columns,
            }
            .into());
        }
        row_group.end_row();
        self.column_index = 0;
        self.num_rows += 1;

        if self.max_row_group_size > 0 {
            if self.row_group_size > self.max_row_group_size {
                debug!(
                    estimate = self.row_group_size,
                    threshold = self.max_row_group_size,
                    "row group size threshold exceeded"
                );
                self.new_row_group()?;
            }
            // Writes add each column's cumulative buffered size, so the next
            // completed row leaves the open group's full size in the estimate.
            self.row_group_size = 0;
        }
        Ok(())
    }

    /// Flush the open row group and start a new one. Only legal between rows.
    pub fn new_row_group(&mut self) -> Result<()> {
        if self.column_index != 0 {
            return Err(StreamError::IncompleteRow {
                columns_done: self.column_index,
                num_columns: self.schema.num_columns(),
            }
            .into());
        }
        let file_writer = self.file_writer.as_mut().ok_or(StreamError::EndOfStream)?;
        if let Some(row_group) = self.row_group.take() {
            Self::flush_row_group(row_group, file_writer, &mut self.num_row_groups)?;
        }
        self.row_group = Some(RowGroupBuffer::new(&self.schema));
        self.row_group_size = 0;
        Ok(())
    }

    /// Flush the open row group and close the container. Repeated calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if let Some(file_writer) = self.finish()? {
            file_writer.close()?;
            info!(
                rows = self.num_rows,
                row_groups = self.num_row_groups,
                "closed stream writer"
            );
        }
        Ok(())
    }

    /// Close the container and hand back the sink it wrote to.
    pub fn into_inner(mut self) -> Result<W> {
        let file_writer = self.finish()?.ok_or(StreamError::EndOfStream)?;
        Ok(file_writer.into_inner()?)
    }

    /// Take the container out of the writer, flushing the open row group into it.
    fn finish(&mut self) -> Result<Option<SerializedFileWriter<W>>> {
        let Some(mut file_writer) = self.file_writer.take() else {
            return Ok(None);
        };
        if let Some(mut row_group) = self.row_group.take() {
            if row_group.discard_partial_row() {
                warn!(
                    columns_done = self.column_index,
                    "discarding incomplete row at teardown"
                );
                self.column_index = 0;
            }
            Self::flush_row_group(row_group, &mut file_writer, &mut self.num_row_groups)?;
        }
        Ok(Some(file_writer))
    }

    /// Empty row groups are dropped rather than written.
    fn flush_row_group(
        row_group: RowGroupBuffer,
        file_writer: &mut SerializedFileWriter<W>,
        num_row_groups: &mut usize,
    ) -> Result<()> {
        let rows = row_group.num_rows();
        if rows == 0 {
            return Ok(());
        }
        let buffered_bytes = row_group.buffered_bytes();
        let metadata = row_group.flush(file_writer)?;
        debug!(
            row_group = *num_row_groups,
            rows,
            buffered_bytes,
            total_byte_size = metadata.total_byte_size(),
            compressed_size = metadata.compressed_size(),
            "flushed row group"
        );
        *num_row_groups += 1;
        Ok(())
    }
}

impl<W: Write + Send> Drop for StreamWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close stream writer on drop");
        }
    }
}
