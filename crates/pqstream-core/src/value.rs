//! Value model for row streams.
//!
//! `Value` is the closed set of kinds a column slot can hold; an absent slot
//! in a nullable column is `Option::<Value>::None`. Typed access goes through
//! three small traits:
//! - `StreamType`: the column type a Rust type maps onto (checked by the guard),
//! - `IntoValue`: conversion for writing,
//! - `FromValue`: conversion for reading.
//!
//! `[u8; N]` maps onto a fixed-length column of exactly `N` bytes; runtime
//! lengths use `Value::Fixed` (or the streams' `write_fixed`/`read_fixed`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    TimestampMillis(i64),
    TimestampMicros(i64),
    Fixed(Vec<u8>),
    Bytes(Vec<u8>),
    Utf8(String),
}

impl Value {
    /// Column type this value must be written to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Bool(_) => ColumnType::BOOLEAN,
            Value::Int8(_) => ColumnType::int(8, true),
            Value::Int16(_) => ColumnType::int(16, true),
            Value::Int32(_) => ColumnType::int(32, true),
            Value::Int64(_) => ColumnType::int(64, true),
            Value::UInt8(_) => ColumnType::int(8, false),
            Value::UInt16(_) => ColumnType::int(16, false),
            Value::UInt32(_) => ColumnType::int(32, false),
            Value::UInt64(_) => ColumnType::int(64, false),
            Value::Float(_) => ColumnType::FLOAT,
            Value::Double(_) => ColumnType::DOUBLE,
            Value::TimestampMillis(_) => ColumnType::TIMESTAMP_MILLIS,
            Value::TimestampMicros(_) => ColumnType::TIMESTAMP_MICROS,
            Value::Fixed(bytes) => ColumnType::fixed(bytes.len()),
            Value::Bytes(_) => ColumnType::BINARY,
            Value::Utf8(_) => ColumnType::UTF8,
        }
    }
}

/// Milliseconds since the Unix epoch, stored as INT64 / TIMESTAMP_MILLIS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimestampMillis(pub i64);

/// Microseconds since the Unix epoch, stored as INT64 / TIMESTAMP_MICROS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimestampMicros(pub i64);

/// Durations past `i64::MAX` units saturate.
impl From<Duration> for TimestampMillis {
    fn from(d: Duration) -> Self {
        TimestampMillis(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Durations past `i64::MAX` units saturate.
impl From<Duration> for TimestampMicros {
    fn from(d: Duration) -> Self {
        TimestampMicros(i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
    }
}

pub trait StreamType {
    fn column_type() -> ColumnType;
}

pub trait IntoValue: StreamType {
    fn into_value(self) -> Value;
}

pub trait FromValue: StreamType + Sized {
    /// `None` if `value` is not of this type's kind.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! scalar_value {
    ($ty:ty, $variant:ident, $column_type:expr) => {
        impl StreamType for $ty {
            fn column_type() -> ColumnType {
                $column_type
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

scalar_value!(bool, Bool, ColumnType::BOOLEAN);
scalar_value!(i8, Int8, ColumnType::int(8, true));
scalar_value!(i16, Int16, ColumnType::int(16, true));
scalar_value!(i32, Int32, ColumnType::int(32, true));
scalar_value!(i64, Int64, ColumnType::int(64, true));
scalar_value!(u8, UInt8, ColumnType::int(8, false));
scalar_value!(u16, UInt16, ColumnType::int(16, false));
scalar_value!(u32, UInt32, ColumnType::int(32, false));
scalar_value!(u64, UInt64, ColumnType::int(64, false));
scalar_value!(f32, Float, ColumnType::FLOAT);
scalar_value!(f64, Double, ColumnType::DOUBLE);
scalar_value!(String, Utf8, ColumnType::UTF8);
scalar_value!(Vec<u8>, Bytes, ColumnType::BINARY);

impl StreamType for TimestampMillis {
    fn column_type() -> ColumnType {
        ColumnType::TIMESTAMP_MILLIS
    }
}

impl IntoValue for TimestampMillis {
    fn into_value(self) -> Value {
        Value::TimestampMillis(self.0)
    }
}

impl FromValue for TimestampMillis {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::TimestampMillis(v) => Some(TimestampMillis(v)),
            _ => None,
        }
    }
}

impl StreamType for TimestampMicros {
    fn column_type() -> ColumnType {
        ColumnType::TIMESTAMP_MICROS
    }
}

impl IntoValue for TimestampMicros {
    fn into_value(self) -> Value {
        Value::TimestampMicros(self.0)
    }
}

impl FromValue for TimestampMicros {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::TimestampMicros(v) => Some(TimestampMicros(v)),
            _ => None,
        }
    }
}

impl StreamType for &str {
    fn column_type() -> ColumnType {
        ColumnType::UTF8
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Utf8(self.to_owned())
    }
}

impl StreamType for &[u8] {
    fn column_type() -> ColumnType {
        ColumnType::BINARY
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl<const N: usize> StreamType for [u8; N] {
    fn column_type() -> ColumnType {
        ColumnType::fixed(N)
    }
}

impl<const N: usize> IntoValue for [u8; N] {
    fn into_value(self) -> Value {
        Value::Fixed(self.to_vec())
    }
}

impl<const N: usize> FromValue for [u8; N] {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Fixed(bytes) => bytes.try_into().ok(),
            _ => None,
        }
    }
}

impl<const N: usize> StreamType for &[u8; N] {
    fn column_type() -> ColumnType {
        ColumnType::fixed(N)
    }
}

impl<const N: usize> IntoValue for &[u8; N] {
    fn into_value(self) -> Value {
        Value::Fixed(self.to_vec())
    }
}
