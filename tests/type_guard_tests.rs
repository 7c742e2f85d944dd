//! Type guard tests: every typed access must match the column descriptor exactly

use parquet::basic::{ConvertedType, Type as ParquetType};
use parquet::data_type::{Int32Type, Int64Type};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::types::TypePtr;
use pqstream::guard;
use pqstream::{
    Annotation, ColumnDescriptor, ColumnType, Error, LogicalKind, PhysicalType, Schema,
    StreamError, TimestampMicros, Value, WriterConfig,
};
use test_data_gen::*;

fn assert_mismatch(err: Error, column: &str, expected: ColumnType, actual: ColumnType) {
    match err {
        Error::Stream(StreamError::SchemaMismatch {
            column: c,
            expected: e,
            actual: a,
        }) => {
            assert_eq!(c, column);
            assert_eq!(e, expected);
            assert_eq!(a, actual);
        }
        other => panic!("Expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_guard_accepts_exact_match() {
    let schema = Schema::new(vec![
        ColumnDescriptor::new("id", ColumnType::int(32, true), false),
        ColumnDescriptor::new("code", ColumnType::fixed(4), true),
    ]);
    let descriptor = guard::check(&schema, 1, ColumnType::fixed(4)).expect("should match");
    assert_eq!(descriptor.name, "code");
    assert!(guard::check_nullable(&schema, 1).is_ok());
}

#[test]
fn test_guard_rejects_length_and_logical_differences() {
    let schema = Schema::new(vec![
        ColumnDescriptor::new("code", ColumnType::fixed(4), false),
        ColumnDescriptor::new("count", ColumnType::int(32, false), false),
    ]);

    let err = guard::check(&schema, 0, ColumnType::fixed(3)).unwrap_err();
    assert!(matches!(err, StreamError::SchemaMismatch { .. }));
    let err = guard::check(&schema, 0, ColumnType::fixed(5)).unwrap_err();
    assert!(matches!(err, StreamError::SchemaMismatch { .. }));

    let signed = ColumnType::new(
        PhysicalType::Int32,
        LogicalKind::Int {
            bit_width: 32,
            signed: true,
        },
    );
    let err = guard::check(&schema, 1, signed).unwrap_err();
    assert!(matches!(err, StreamError::SchemaMismatch { .. }));

    let err = guard::check_nullable(&schema, 1).unwrap_err();
    assert!(matches!(err, StreamError::NotNullable { ref column } if column == "count"));
}

#[test]
fn test_guard_rejects_index_past_width() {
    let schema = Schema::new(vec![ColumnDescriptor::new("flag", ColumnType::BOOLEAN, false)]);
    let err = guard::check(&schema, 1, ColumnType::BOOLEAN).unwrap_err();
    assert!(matches!(err, StreamError::IndexOutOfRange { index: 1, width: 1 }));
}

#[test]
fn test_writer_rejects_wrong_types_without_advancing() {
    let mut writer = memory_writer(stock_schema(), &WriterConfig::default());

    let err = writer.write(42i32).err().expect("int into utf8 column");
    assert_mismatch(err, "string_field", ColumnType::UTF8, ColumnType::int(32, true));
    assert_eq!(writer.current_column(), 0);

    writer.write("Stk #0").unwrap();

    let err = writer.write(*b"ADD").err().expect("3 bytes into fixed(4)");
    assert_mismatch(err, "char_field", ColumnType::fixed(4), ColumnType::fixed(3));
    let err = writer.write_fixed(b"ADDED").err().expect("5 bytes into fixed(4)");
    assert_mismatch(err, "char_field", ColumnType::fixed(4), ColumnType::fixed(5));
    writer.write_fixed(b"ADD\0").unwrap();

    let err = writer.write(7u32).err().expect("unsigned into signed column");
    assert_mismatch(err, "int32_field", ColumnType::int(32, true), ColumnType::int(32, false));
    let err = writer.write(7i64).err().expect("int64 into int32 column");
    assert_mismatch(err, "int32_field", ColumnType::int(32, true), ColumnType::int(64, true));
    writer.write(7i32).unwrap();

    let err = writer.write(1.0f32).err().expect("float into double column");
    assert_mismatch(err, "double_field", ColumnType::DOUBLE, ColumnType::FLOAT);
    writer.write(1.0f64).unwrap();

    // Same physical type, different logical type
    let err = writer.write(5i64).err().expect("plain int64 into timestamp");
    assert_mismatch(
        err,
        "timestamp_field",
        ColumnType::TIMESTAMP_MICROS,
        ColumnType::int(64, true),
    );
    let err = writer
        .write_value(Value::TimestampMillis(5))
        .err()
        .expect("millis into micros");
    assert_mismatch(
        err,
        "timestamp_field",
        ColumnType::TIMESTAMP_MICROS,
        ColumnType::TIMESTAMP_MILLIS,
    );
    writer.write(TimestampMicros(5)).unwrap();
    assert_eq!(writer.current_column(), 5);

    let err = writer.write(true).err().expect("write past last column");
    assert!(matches!(
        err.stream_error(),
        Some(StreamError::IndexOutOfRange { index: 5, width: 5 })
    ));
    writer.end_row().unwrap();
    writer.close().unwrap();
}

#[test]
fn test_reader_rejects_wrong_types() {
    let mut reader = memory_reader(stock_file(1, 0));

    let err = reader.read::<Vec<u8>>().unwrap_err();
    assert_mismatch(err, "string_field", ColumnType::UTF8, ColumnType::BINARY);
    assert_eq!(reader.current_column(), 0);
    let _: String = reader.read().unwrap();

    let err = reader.read_fixed(3).unwrap_err();
    assert_mismatch(err, "char_field", ColumnType::fixed(4), ColumnType::fixed(3));
    let err = reader.read::<[u8; 8]>().unwrap_err();
    assert_mismatch(err, "char_field", ColumnType::fixed(4), ColumnType::fixed(8));
    let _: [u8; 4] = reader.read().unwrap();

    let err = reader.read::<u32>().unwrap_err();
    assert_mismatch(err, "int32_field", ColumnType::int(32, true), ColumnType::int(32, false));
    assert_eq!(reader.read::<i32>().unwrap(), stock_row(0).int_value);

    let err = reader.read::<f32>().unwrap_err();
    assert_mismatch(err, "double_field", ColumnType::DOUBLE, ColumnType::FLOAT);
    assert_eq!(reader.read::<f64>().unwrap(), stock_row(0).double_value);

    let err = reader.read::<i64>().unwrap_err();
    assert_mismatch(
        err,
        "timestamp_field",
        ColumnType::TIMESTAMP_MICROS,
        ColumnType::int(64, true),
    );
    assert_eq!(reader.read::<TimestampMicros>().unwrap(), stock_row(0).timestamp);

    let err = reader.read::<bool>().unwrap_err();
    assert!(matches!(
        err.stream_error(),
        Some(StreamError::IndexOutOfRange { index: 5, width: 5 })
    ));
    reader.end_row().unwrap();
    assert!(reader.eof());
}

/// [id INT64/INT_64, day INT32/DATE, plain INT32/NONE]
fn mixed_annotation_schema() -> TypePtr {
    message(vec![
        primitive("id", ParquetType::INT64, ConvertedType::INT_64, false),
        primitive("day", ParquetType::INT32, ConvertedType::DATE, false),
        primitive("plain", ParquetType::INT32, ConvertedType::NONE, false),
    ])
}

/// Two rows written straight through the engine's column writers.
fn mixed_annotation_file() -> Vec<u8> {
    let mut file_writer =
        SerializedFileWriter::new(Vec::new(), mixed_annotation_schema(), Default::default())
            .unwrap();
    let mut row_group = file_writer.next_row_group().unwrap();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<Int64Type>()
        .write_batch(&[1, 2], None, None)
        .unwrap();
    column.close().unwrap();
    for values in [[19_000, 19_001], [-5, 5]] {
        let mut column = row_group.next_column().unwrap().unwrap();
        column
            .typed::<Int32Type>()
            .write_batch(&values, None, None)
            .unwrap();
        column.close().unwrap();
    }
    row_group.close().unwrap();
    file_writer.into_inner().unwrap()
}

const DATE: ColumnType = ColumnType::new(PhysicalType::Int32, LogicalKind::Other(Annotation::Date));
const PLAIN_INT32: ColumnType = ColumnType::new(PhysicalType::Int32, LogicalKind::None);

#[test]
fn test_writer_rejects_typed_writes_to_unannotated_and_date_columns() {
    let mut writer = memory_writer(mixed_annotation_schema(), &WriterConfig::default());
    writer.write(1i64).unwrap();

    let err = writer.write(19_000i32).err().expect("i32 into DATE column");
    assert_mismatch(err, "day", DATE, ColumnType::int(32, true));
    let err = writer
        .write_value(Value::Int32(19_000))
        .err()
        .expect("untyped Int32 into DATE column");
    assert_mismatch(err, "day", DATE, ColumnType::int(32, true));
    assert_eq!(writer.current_column(), 1);

    let mut writer = memory_writer(
        message(vec![primitive(
            "plain",
            ParquetType::INT32,
            ConvertedType::NONE,
            false,
        )]),
        &WriterConfig::default(),
    );
    let err = writer.write(7i32).err().expect("i32 into INT32/NONE column");
    assert_mismatch(err, "plain", PLAIN_INT32, ColumnType::int(32, true));
    assert_eq!(writer.current_column(), 0);
}

#[test]
fn test_reader_skips_columns_it_cannot_type() {
    let mut reader = memory_reader(mixed_annotation_file());
    assert_eq!(reader.num_rows(), 2);

    assert_eq!(reader.read::<i64>().unwrap(), 1);
    let err = reader.read::<i32>().unwrap_err();
    assert!(err.suggestions().iter().any(|s| s.contains("skip_columns()")));
    assert_mismatch(err, "day", DATE, ColumnType::int(32, true));
    assert_eq!(reader.current_column(), 1);
    assert_eq!(reader.skip_columns(1).unwrap(), 1);

    let err = reader.read::<i32>().unwrap_err();
    assert_mismatch(err, "plain", PLAIN_INT32, ColumnType::int(32, true));
    assert_eq!(reader.read_value().unwrap(), Some(Value::Int32(-5)));
    reader.end_row().unwrap();

    // Untyped reads decode by physical type
    assert_eq!(
        reader.read_row().unwrap(),
        vec![
            Some(Value::Int64(2)),
            Some(Value::Int32(19_001)),
            Some(Value::Int32(5)),
        ]
    );
    assert!(reader.eof());

    let mut reader = memory_reader(mixed_annotation_file());
    assert_eq!(reader.skip_rows(1).unwrap(), 1);
    assert_eq!(reader.read::<i64>().unwrap(), 2);
}
