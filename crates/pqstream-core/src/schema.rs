//! Column descriptors for flat row schemas. Pure data; no storage engine here.
//!
//! `pqstream-io` builds a `Schema` from the Parquet schema tree; both streams
//! then consult it (read-only) on every access through `guard::check`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical storage representation of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Int96,
    ByteArray,
    FixedLenByteArray,
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int96 => "INT96",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::ByteArray => "BYTE_ARRAY",
            PhysicalType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        };
        f.write_str(name)
    }
}

/// Semantic refinement of a physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKind {
    None,
    Int { bit_width: u8, signed: bool },
    Utf8,
    TimestampMillis,
    TimestampMicros,
    /// Bound and skippable, but no Rust type maps onto it.
    Other(Annotation),
}

/// Annotations carried through binding that have no typed access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Annotation {
    Date,
    TimeMillis,
    TimeMicros,
    TimeNanos,
    TimestampNanos,
    Decimal,
    Enum,
    Json,
    Bson,
    Interval,
    Uuid,
    Float16,
    Unknown,
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Annotation::Date => "DATE",
            Annotation::TimeMillis => "TIME_MILLIS",
            Annotation::TimeMicros => "TIME_MICROS",
            Annotation::TimeNanos => "TIME_NANOS",
            Annotation::TimestampNanos => "TIMESTAMP_NANOS",
            Annotation::Decimal => "DECIMAL",
            Annotation::Enum => "ENUM",
            Annotation::Json => "JSON",
            Annotation::Bson => "BSON",
            Annotation::Interval => "INTERVAL",
            Annotation::Uuid => "UUID",
            Annotation::Float16 => "FLOAT16",
            Annotation::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl fmt::Display for LogicalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalKind::None => f.write_str("NONE"),
            LogicalKind::Int { bit_width, signed: true } => write!(f, "INT_{}", bit_width),
            LogicalKind::Int { bit_width, signed: false } => write!(f, "UINT_{}", bit_width),
            LogicalKind::Utf8 => f.write_str("UTF8"),
            LogicalKind::TimestampMillis => f.write_str("TIMESTAMP_MILLIS"),
            LogicalKind::TimestampMicros => f.write_str("TIMESTAMP_MICROS"),
            LogicalKind::Other(annotation) => annotation.fmt(f),
        }
    }
}

/// The (physical type, logical type, length) triple every access is checked against.
///
/// `length` is the fixed byte length for `FixedLenByteArray` and 0 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType {
    pub physical: PhysicalType,
    pub logical: LogicalKind,
    pub length: usize,
}

impl ColumnType {
    pub const BOOLEAN: ColumnType = ColumnType::new(PhysicalType::Boolean, LogicalKind::None);
    pub const FLOAT: ColumnType = ColumnType::new(PhysicalType::Float, LogicalKind::None);
    pub const DOUBLE: ColumnType = ColumnType::new(PhysicalType::Double, LogicalKind::None);
    pub const UTF8: ColumnType = ColumnType::new(PhysicalType::ByteArray, LogicalKind::Utf8);
    pub const BINARY: ColumnType = ColumnType::new(PhysicalType::ByteArray, LogicalKind::None);
    pub const TIMESTAMP_MILLIS: ColumnType =
        ColumnType::new(PhysicalType::Int64, LogicalKind::TimestampMillis);
    pub const TIMESTAMP_MICROS: ColumnType =
        ColumnType::new(PhysicalType::Int64, LogicalKind::TimestampMicros);

    pub const fn new(physical: PhysicalType, logical: LogicalKind) -> Self {
        Self {
            physical,
            logical,
            length: 0,
        }
    }

    /// Integer column of the given width; widths up to 32 are stored as INT32.
    pub const fn int(bit_width: u8, signed: bool) -> Self {
        let physical = if bit_width > 32 {
            PhysicalType::Int64
        } else {
            PhysicalType::Int32
        };
        Self::new(physical, LogicalKind::Int { bit_width, signed })
    }

    pub const fn fixed(length: usize) -> Self {
        Self {
            physical: PhysicalType::FixedLenByteArray,
            logical: LogicalKind::None,
            length,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.physical, self.logical)?;
        if self.physical == PhysicalType::FixedLenByteArray {
            write!(f, "[{}]", self.length)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.column_type.physical
    }

    pub fn logical_type(&self) -> LogicalKind {
        self.column_type.logical
    }

    pub fn fixed_length(&self) -> usize {
        self.column_type.length
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repetition = if self.nullable { "optional" } else { "required" };
        write!(f, "{} {} {}", repetition, self.column_type, self.name)
    }
}

/// Ordered column descriptors; the order is the mandatory per-row access order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(idx)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
