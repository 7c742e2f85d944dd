//! Buffered row group: the per-column write primitive behind `StreamWriter`.
//!
//! Parquet writes a row group one column chunk at a time, while a stream
//! produces values row by row across all columns. Each column therefore
//! accumulates its values (and definition levels, for nullable columns) here
//! until the row group is flushed, at which point every chunk is handed to the
//! engine's typed column writers in schema order.

use std::io::Write;

use parquet::column::writer::ColumnWriter;
use parquet::data_type::{ByteArray, FixedLenByteArray, Int96};
use parquet::file::metadata::RowGroupMetaDataPtr;
use parquet::file::writer::SerializedFileWriter;
use pqstream_core::error::Error as StreamError;
use pqstream_core::schema::{ColumnDescriptor, PhysicalType, Schema};
use pqstream_core::value::Value;

use crate::error::Result;

enum ColumnValues {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    /// No value kind maps here; only nulls are ever buffered.
    Int96(Vec<Int96>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<ByteArray>),
    FixedLenByteArray(Vec<FixedLenByteArray>),
}

impl ColumnValues {
    fn for_type(physical: PhysicalType) -> Self {
        match physical {
            PhysicalType::Boolean => ColumnValues::Bool(Vec::new()),
            PhysicalType::Int32 => ColumnValues::Int32(Vec::new()),
            PhysicalType::Int64 => ColumnValues::Int64(Vec::new()),
            PhysicalType::Int96 => ColumnValues::Int96(Vec::new()),
            PhysicalType::Float => ColumnValues::Float(Vec::new()),
            PhysicalType::Double => ColumnValues::Double(Vec::new()),
            PhysicalType::ByteArray => ColumnValues::ByteArray(Vec::new()),
            PhysicalType::FixedLenByteArray => ColumnValues::FixedLenByteArray(Vec::new()),
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            ColumnValues::Bool(v) => v.truncate(len),
            ColumnValues::Int32(v) => v.truncate(len),
            ColumnValues::Int64(v) => v.truncate(len),
            ColumnValues::Int96(v) => v.truncate(len),
            ColumnValues::Float(v) => v.truncate(len),
            ColumnValues::Double(v) => v.truncate(len),
            ColumnValues::ByteArray(v) => v.truncate(len),
            ColumnValues::FixedLenByteArray(v) => v.truncate(len),
        }
    }

    fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Int96(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::ByteArray(v) => v.len(),
            ColumnValues::FixedLenByteArray(v) => v.len(),
        }
    }

    /// Append `value` in its physical representation; returns its plain-encoded size.
    ///
    /// Unsigned integers are stored by bit pattern in the signed physical type.
    fn push(&mut self, value: Value) -> Option<usize> {
        let size = match (self, value) {
            (ColumnValues::Bool(buf), Value::Bool(v)) => {
                buf.push(v);
                1
            }
            (ColumnValues::Int32(buf), Value::Int8(v)) => {
                buf.push(v as i32);
                4
            }
            (ColumnValues::Int32(buf), Value::Int16(v)) => {
                buf.push(v as i32);
                4
            }
            (ColumnValues::Int32(buf), Value::Int32(v)) => {
                buf.push(v);
                4
            }
            (ColumnValues::Int32(buf), Value::UInt8(v)) => {
                buf.push(v as i32);
                4
            }
            (ColumnValues::Int32(buf), Value::UInt16(v)) => {
                buf.push(v as i32);
                4
            }
            (ColumnValues::Int32(buf), Value::UInt32(v)) => {
                buf.push(v as i32);
                4
            }
            (ColumnValues::Int64(buf), Value::Int64(v))
            | (ColumnValues::Int64(buf), Value::TimestampMillis(v))
            | (ColumnValues::Int64(buf), Value::TimestampMicros(v)) => {
                buf.push(v);
                8
            }
            (ColumnValues::Int64(buf), Value::UInt64(v)) => {
                buf.push(v as i64);
                8
            }
            (ColumnValues::Float(buf), Value::Float(v)) => {
                buf.push(v);
                4
            }
            (ColumnValues::Double(buf), Value::Double(v)) => {
                buf.push(v);
                8
            }
            (ColumnValues::ByteArray(buf), Value::Bytes(bytes)) => {
                let size = 4 + bytes.len();
                buf.push(ByteArray::from(bytes));
                size
            }
            (ColumnValues::ByteArray(buf), Value::Utf8(s)) => {
                let size = 4 + s.len();
                buf.push(ByteArray::from(s.into_bytes()));
                size
            }
            (ColumnValues::FixedLenByteArray(buf), Value::Fixed(bytes)) => {
                let size = bytes.len();
                buf.push(FixedLenByteArray::from(bytes));
                size
            }
            _ => return None,
        };
        Some(size)
    }
}

/// Values buffered for one column of the open row group.
pub struct ColumnBuffer {
    name: String,
    values: ColumnValues,
    /// Present for nullable columns: 1 = value present, 0 = null.
    def_levels: Option<Vec<i16>>,
    buffered_bytes: usize,
}

impl ColumnBuffer {
    pub fn new(descriptor: &ColumnDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            values: ColumnValues::for_type(descriptor.physical_type()),
            def_levels: descriptor.nullable.then(Vec::new),
            buffered_bytes: 0,
        }
    }

    /// Buffer one slot. `None` records a null and stores no physical value.
    pub fn push(&mut self, value: Option<Value>) -> Result<()> {
        match (value, self.def_levels.as_mut()) {
            (Some(value), defs) => {
                let size = self.values.push(value).ok_or_else(|| {
                    StreamError::Invariant(format!(
                        "value does not match physical type of column '{}'",
                        self.name
                    ))
                })?;
                self.buffered_bytes += size;
                if let Some(defs) = defs {
                    defs.push(1);
                }
            }
            (None, Some(defs)) => defs.push(0),
            (None, None) => {
                return Err(StreamError::NotNullable {
                    column: self.name.clone(),
                }
                .into())
            }
        }
        Ok(())
    }

    /// Estimated bytes buffered for this column, after encoding.
    pub fn estimated_buffered_bytes(&self) -> usize {
        self.buffered_bytes
    }

    /// Number of row slots (values and nulls) buffered.
    pub fn num_slots(&self) -> usize {
        match &self.def_levels {
            Some(defs) => defs.len(),
            None => self.values.len(),
        }
    }

    /// Drop everything after the first `slots` row slots.
    fn truncate(&mut self, slots: usize) {
        let values = match self.def_levels.as_mut() {
            Some(defs) => {
                defs.truncate(slots);
                defs.iter().filter(|&&d| d > 0).count()
            }
            None => slots,
        };
        self.values.truncate(values);
    }

    fn write_to(&self, writer: &mut ColumnWriter<'_>) -> Result<usize> {
        let defs = self.def_levels.as_deref();
        let written = match (&self.values, writer) {
            (ColumnValues::Bool(v), ColumnWriter::BoolColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::Int32(v), ColumnWriter::Int32ColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::Int64(v), ColumnWriter::Int64ColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::Int96(v), ColumnWriter::Int96ColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::Float(v), ColumnWriter::FloatColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::Double(v), ColumnWriter::DoubleColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::ByteArray(v), ColumnWriter::ByteArrayColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            (ColumnValues::FixedLenByteArray(v), ColumnWriter::FixedLenByteArrayColumnWriter(w)) => {
                w.write_batch(&v[..], defs, None)?
            }
            _ => {
                return Err(StreamError::Invariant(format!(
                    "engine column writer does not match column '{}'",
                    self.name
                ))
                .into())
            }
        };
        Ok(written)
    }
}

/// The open row group: one `ColumnBuffer` per schema column.
pub struct RowGroupBuffer {
    columns: Vec<ColumnBuffer>,
    num_rows: usize,
}

impl RowGroupBuffer {
    pub fn new(schema: &Schema) -> Self {
        Self {
            columns: schema.columns().iter().map(ColumnBuffer::new).collect(),
            num_rows: 0,
        }
    }

    /// Buffer one slot for `column`; returns that column's estimated buffered
    /// size after the write.
    pub fn write(&mut self, column: usize, value: Option<Value>) -> Result<usize> {
        let buffer = self.columns.get_mut(column).ok_or_else(|| {
            StreamError::Invariant(format!("row group has no column {}", column))
        })?;
        buffer.push(value)?;
        Ok(buffer.estimated_buffered_bytes())
    }

    pub fn end_row(&mut self) {
        self.num_rows += 1;
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn buffered_bytes(&self) -> usize {
        self.columns.iter().map(|c| c.estimated_buffered_bytes()).sum()
    }

    /// Discard slots of a row that was started but never ended.
    /// Returns true if anything was dropped.
    pub fn discard_partial_row(&mut self) -> bool {
        let mut dropped = false;
        for column in &mut self.columns {
            if column.num_slots() > self.num_rows {
                column.truncate(self.num_rows);
                dropped = true;
            }
        }
        dropped
    }

    /// Append this row group to `file`, writing each column chunk in schema order.
    pub fn flush<W: Write + Send>(
        self,
        file: &mut SerializedFileWriter<W>,
    ) -> Result<RowGroupMetaDataPtr> {
        let mut row_group = file.next_row_group()?;
        for column in &self.columns {
            let mut column_writer = row_group.next_column()?.ok_or_else(|| {
                StreamError::Invariant(format!(
                    "container schema has no column for '{}'",
                    column.name
                ))
            })?;
            column.write_to(column_writer.untyped())?;
            column_writer.close()?;
        }
        Ok(row_group.close()?)
    }
}
