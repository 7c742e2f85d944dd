//! Per-column read cursor over one row group.
//!
//! Wraps the engine's typed `ColumnReader` and reads exactly one row slot per
//! call, decoding the physical value into a `Value` of the kind the column
//! descriptor names. Columns with no value kind decode by physical type;
//! INT96 comes back as its raw 12 bytes.

use parquet::column::reader::{ColumnReader, ColumnReaderImpl};
use parquet::data_type::DataType;
use pqstream_core::schema::{ColumnDescriptor, ColumnType, LogicalKind};
use pqstream_core::value::Value;

use crate::error::{Error, Result};

pub struct ColumnCursor {
    name: String,
    column_type: ColumnType,
    nullable: bool,
    reader: ColumnReader,
    def_levels: Vec<i16>,
}

impl ColumnCursor {
    pub fn new(descriptor: &ColumnDescriptor, reader: ColumnReader) -> Self {
        Self {
            name: descriptor.name.clone(),
            column_type: descriptor.column_type,
            nullable: descriptor.nullable,
            reader,
            def_levels: Vec::with_capacity(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the next row slot. Returns the engine's values-read count together
    /// with the decoded value, if one was produced.
    pub fn read_slot(&mut self) -> Result<(usize, Option<Value>)> {
        let column_type = self.column_type;
        self.def_levels.clear();
        let defs = if self.nullable {
            Some(&mut self.def_levels)
        } else {
            None
        };

        let (count, value) = match &mut self.reader {
            ColumnReader::BoolColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(Value::Bool))
            }
            ColumnReader::Int32ColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(|v| int32_value(column_type, v)))
            }
            ColumnReader::Int64ColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(|v| int64_value(column_type, v)))
            }
            ColumnReader::FloatColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(Value::Float))
            }
            ColumnReader::DoubleColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(Value::Double))
            }
            ColumnReader::ByteArrayColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                let value = match v {
                    Some(bytes) if column_type.logical == LogicalKind::Utf8 => {
                        let text = String::from_utf8(bytes.data().to_vec()).map_err(|source| {
                            Error::InvalidUtf8 {
                                column: self.name.clone(),
                                source,
                            }
                        })?;
                        Some(Value::Utf8(text))
                    }
                    Some(bytes) => Some(Value::Bytes(bytes.data().to_vec())),
                    None => None,
                };
                (n, value)
            }
            ColumnReader::FixedLenByteArrayColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                (n, v.map(|bytes| Value::Fixed(bytes.data().to_vec())))
            }
            ColumnReader::Int96ColumnReader(r) => {
                let (n, v) = read_one(r, defs)?;
                let raw = v.map(|v| {
                    v.data()
                        .iter()
                        .flat_map(|word| word.to_le_bytes())
                        .collect::<Vec<u8>>()
                });
                (n, raw.map(Value::Fixed))
            }
        };
        Ok((count, value))
    }

    /// Discard the next `rows` slots; returns how many the engine skipped.
    pub fn skip(&mut self, rows: usize) -> Result<usize> {
        let skipped = match &mut self.reader {
            ColumnReader::BoolColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::Int32ColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::Int64ColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::Int96ColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::FloatColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::DoubleColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::ByteArrayColumnReader(r) => r.skip_records(rows)?,
            ColumnReader::FixedLenByteArrayColumnReader(r) => r.skip_records(rows)?,
        };
        Ok(skipped)
    }
}

fn read_one<T: DataType>(
    reader: &mut ColumnReaderImpl<T>,
    def_levels: Option<&mut Vec<i16>>,
) -> Result<(usize, Option<T::T>)> {
    let mut values = Vec::with_capacity(1);
    let (_, values_read, _) = reader.read_records(1, def_levels, None, &mut values)?;
    Ok((values_read, values.pop()))
}

fn int32_value(column_type: ColumnType, v: i32) -> Value {
    match column_type.logical {
        LogicalKind::Int { bit_width: 8, signed: true } => Value::Int8(v as i8),
        LogicalKind::Int { bit_width: 16, signed: true } => Value::Int16(v as i16),
        LogicalKind::Int { bit_width: 8, signed: false } => Value::UInt8(v as u8),
        LogicalKind::Int { bit_width: 16, signed: false } => Value::UInt16(v as u16),
        LogicalKind::Int { signed: false, .. } => Value::UInt32(v as u32),
        _ => Value::Int32(v),
    }
}

fn int64_value(column_type: ColumnType, v: i64) -> Value {
    match column_type.logical {
        LogicalKind::TimestampMillis => Value::TimestampMillis(v),
        LogicalKind::TimestampMicros => Value::TimestampMicros(v),
        LogicalKind::Int { signed: false, .. } => Value::UInt64(v as u64),
        _ => Value::Int64(v),
    }
}
