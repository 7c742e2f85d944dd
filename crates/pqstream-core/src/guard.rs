//! Type guard shared by both streams.
//!
//! Every typed read or write is checked here before the storage engine is
//! touched. The check is exact: physical type, logical type and fixed length
//! must all equal the descriptor. A shorter fixed-length buffer would be read
//! past its end and a longer one silently truncated, so neither is accepted.

use crate::error::{Error, Result};
use crate::schema::{ColumnDescriptor, ColumnType, Schema};

/// Confirm that `expected` matches the descriptor at `column_index`.
pub fn check(schema: &Schema, column_index: usize, expected: ColumnType) -> Result<&ColumnDescriptor> {
    let descriptor = descriptor_at(schema, column_index)?;
    if descriptor.column_type != expected {
        return Err(Error::SchemaMismatch {
            column: descriptor.name.clone(),
            expected: descriptor.column_type,
            actual: expected,
        });
    }
    Ok(descriptor)
}

/// Confirm that the column at `column_index` can hold an absent value.
pub fn check_nullable(schema: &Schema, column_index: usize) -> Result<&ColumnDescriptor> {
    let descriptor = descriptor_at(schema, column_index)?;
    if !descriptor.nullable {
        return Err(Error::NotNullable {
            column: descriptor.name.clone(),
        });
    }
    Ok(descriptor)
}

fn descriptor_at(schema: &Schema, column_index: usize) -> Result<&ColumnDescriptor> {
    schema.column(column_index).ok_or(Error::IndexOutOfRange {
        index: column_index,
        width: schema.num_columns(),
    })
}
