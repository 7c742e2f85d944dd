//! Parquet schema tree → flat `Schema`.
//!
//! Only flat schemas bind: every top-level field must be a primitive that is
//! REQUIRED or OPTIONAL. Groups and REPEATED fields fail with
//! `UnsupportedSchema` instead of being flattened.
//!
//! Every primitive column binds. Logical types come from the legacy converted
//! type, falling back to the logical annotation for the few (nanosecond
//! times, UUID, FLOAT16) that have no converted equivalent. Annotations with
//! no value kind are kept as `LogicalKind::Other`, so typed access to such a
//! column fails the guard while skipping and untyped reads still work.

use parquet::basic::{ConvertedType, LogicalType, Repetition, TimeUnit, Type as ParquetType};
use parquet::schema::types::{ColumnDescriptor as ParquetColumn, SchemaDescriptor};
use pqstream_core::error::Error as StreamError;
use pqstream_core::schema::{
    Annotation, ColumnDescriptor, ColumnType, LogicalKind, PhysicalType, Schema,
};

use crate::error::Result;

pub fn bind_schema(descr: &SchemaDescriptor) -> Result<Schema> {
    for field in descr.root_schema().get_fields() {
        if field.is_group() {
            return Err(unsupported(format!(
                "field '{}' is a nested group",
                field.name()
            )));
        }
        let info = field.get_basic_info();
        if info.has_repetition() && info.repetition() == Repetition::REPEATED {
            return Err(unsupported(format!("field '{}' is repeated", field.name())));
        }
    }

    let columns = descr
        .columns()
        .iter()
        .map(|col| bind_column(col))
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::new(columns))
}

fn bind_column(col: &ParquetColumn) -> Result<ColumnDescriptor> {
    if col.max_rep_level() > 0 {
        return Err(unsupported(format!("column '{}' is repeated", col.name())));
    }

    let physical = match col.physical_type() {
        ParquetType::BOOLEAN => PhysicalType::Boolean,
        ParquetType::INT32 => PhysicalType::Int32,
        ParquetType::INT64 => PhysicalType::Int64,
        ParquetType::INT96 => PhysicalType::Int96,
        ParquetType::FLOAT => PhysicalType::Float,
        ParquetType::DOUBLE => PhysicalType::Double,
        ParquetType::BYTE_ARRAY => PhysicalType::ByteArray,
        ParquetType::FIXED_LEN_BYTE_ARRAY => PhysicalType::FixedLenByteArray,
    };

    let logical = match col.converted_type() {
        ConvertedType::NONE => match col.logical_type() {
            Some(annotation) => LogicalKind::Other(annotation_only(&annotation)),
            None => LogicalKind::None,
        },
        ConvertedType::INT_8 => LogicalKind::Int { bit_width: 8, signed: true },
        ConvertedType::INT_16 => LogicalKind::Int { bit_width: 16, signed: true },
        ConvertedType::INT_32 => LogicalKind::Int { bit_width: 32, signed: true },
        ConvertedType::INT_64 => LogicalKind::Int { bit_width: 64, signed: true },
        ConvertedType::UINT_8 => LogicalKind::Int { bit_width: 8, signed: false },
        ConvertedType::UINT_16 => LogicalKind::Int { bit_width: 16, signed: false },
        ConvertedType::UINT_32 => LogicalKind::Int { bit_width: 32, signed: false },
        ConvertedType::UINT_64 => LogicalKind::Int { bit_width: 64, signed: false },
        ConvertedType::UTF8 => LogicalKind::Utf8,
        ConvertedType::TIMESTAMP_MILLIS => LogicalKind::TimestampMillis,
        ConvertedType::TIMESTAMP_MICROS => LogicalKind::TimestampMicros,
        ConvertedType::DATE => LogicalKind::Other(Annotation::Date),
        ConvertedType::TIME_MILLIS => LogicalKind::Other(Annotation::TimeMillis),
        ConvertedType::TIME_MICROS => LogicalKind::Other(Annotation::TimeMicros),
        ConvertedType::DECIMAL => LogicalKind::Other(Annotation::Decimal),
        ConvertedType::ENUM => LogicalKind::Other(Annotation::Enum),
        ConvertedType::JSON => LogicalKind::Other(Annotation::Json),
        ConvertedType::BSON => LogicalKind::Other(Annotation::Bson),
        ConvertedType::INTERVAL => LogicalKind::Other(Annotation::Interval),
        _ => LogicalKind::Other(Annotation::Unknown),
    };

    let length = match physical {
        PhysicalType::FixedLenByteArray => col.type_length().max(0) as usize,
        _ => 0,
    };

    Ok(ColumnDescriptor::new(
        col.name(),
        ColumnType {
            physical,
            logical,
            length,
        },
        col.max_def_level() > 0,
    ))
}

/// Annotations the legacy converted type cannot express.
fn annotation_only(annotation: &LogicalType) -> Annotation {
    match annotation {
        LogicalType::Timestamp {
            unit: TimeUnit::NANOS(_),
            ..
        } => Annotation::TimestampNanos,
        LogicalType::Time {
            unit: TimeUnit::NANOS(_),
            ..
        } => Annotation::TimeNanos,
        LogicalType::Uuid => Annotation::Uuid,
        LogicalType::Float16 => Annotation::Float16,
        _ => Annotation::Unknown,
    }
}

fn unsupported(msg: String) -> crate::error::Error {
    StreamError::UnsupportedSchema(msg).into()
}
