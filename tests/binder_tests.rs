//! Parquet schema binding

use parquet::basic::{ConvertedType, Type as ParquetType};
use parquet::schema::types::SchemaDescriptor;
use pqstream::{bind_schema, Annotation, ColumnType, LogicalKind, PhysicalType};
use test_data_gen::*;

#[test]
fn test_stock_schema_binds_in_order() {
    let descr = SchemaDescriptor::new(stock_schema());
    let schema = bind_schema(&descr).expect("flat schema binds");

    assert_eq!(schema.num_columns(), 5);
    let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "string_field",
            "char_field",
            "int32_field",
            "double_field",
            "timestamp_field"
        ]
    );

    let types: Vec<ColumnType> = schema.columns().iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::UTF8,
            ColumnType::fixed(4),
            ColumnType::int(32, true),
            ColumnType::DOUBLE,
            ColumnType::TIMESTAMP_MICROS,
        ]
    );
    assert!(schema.columns().iter().all(|c| !c.nullable));
    assert_eq!(schema.index_of("double_field"), Some(3));
    assert_eq!(schema.column(1).map(|c| c.fixed_length()), Some(4));
}

#[test]
fn test_annotations_and_nullability() {
    let descr = SchemaDescriptor::new(message(vec![
        primitive("a", ParquetType::INT32, ConvertedType::UINT_16, true),
        primitive("b", ParquetType::INT64, ConvertedType::UINT_64, false),
        primitive("c", ParquetType::BYTE_ARRAY, ConvertedType::NONE, true),
        primitive("d", ParquetType::INT64, ConvertedType::TIMESTAMP_MILLIS, false),
        primitive("e", ParquetType::FLOAT, ConvertedType::NONE, false),
    ]));
    let schema = bind_schema(&descr).expect("flat schema binds");

    let a = schema.column(0).unwrap();
    assert!(a.nullable);
    assert_eq!(a.physical_type(), PhysicalType::Int32);
    assert_eq!(
        a.logical_type(),
        LogicalKind::Int {
            bit_width: 16,
            signed: false
        }
    );
    assert_eq!(schema.column(1).unwrap().column_type, ColumnType::int(64, false));
    assert_eq!(schema.column(2).unwrap().column_type, ColumnType::BINARY);
    assert!(schema.column(2).unwrap().nullable);
    assert_eq!(
        schema.column(3).unwrap().column_type,
        ColumnType::TIMESTAMP_MILLIS
    );
    assert_eq!(schema.column(4).unwrap().column_type, ColumnType::FLOAT);
}

#[test]
fn test_unannotated_integers_keep_no_logical_type() {
    let descr = SchemaDescriptor::new(message(vec![
        primitive("plain32", ParquetType::INT32, ConvertedType::NONE, false),
        primitive("plain64", ParquetType::INT64, ConvertedType::NONE, true),
    ]));
    let schema = bind_schema(&descr).expect("flat schema binds");
    assert_eq!(
        schema.column(0).unwrap().column_type,
        ColumnType::new(PhysicalType::Int32, LogicalKind::None)
    );
    assert_eq!(
        schema.column(1).unwrap().column_type,
        ColumnType::new(PhysicalType::Int64, LogicalKind::None)
    );
    assert_eq!(
        schema.column(0).unwrap().to_string(),
        "required INT32/NONE plain32"
    );
}

#[test]
fn test_annotations_without_value_kind_still_bind() {
    let descr = SchemaDescriptor::new(message(vec![
        primitive("day", ParquetType::INT32, ConvertedType::DATE, false),
        primitive("doc", ParquetType::BYTE_ARRAY, ConvertedType::JSON, true),
        primitive("at", ParquetType::INT64, ConvertedType::TIME_MICROS, false),
        primitive("legacy_ts", ParquetType::INT96, ConvertedType::NONE, true),
    ]));
    let schema = bind_schema(&descr).expect("flat schema binds");

    assert_eq!(schema.num_columns(), 4);
    assert_eq!(
        schema.column(0).unwrap().logical_type(),
        LogicalKind::Other(Annotation::Date)
    );
    assert_eq!(
        schema.column(1).unwrap().logical_type(),
        LogicalKind::Other(Annotation::Json)
    );
    assert_eq!(
        schema.column(2).unwrap().logical_type(),
        LogicalKind::Other(Annotation::TimeMicros)
    );
    assert_eq!(schema.column(3).unwrap().physical_type(), PhysicalType::Int96);
    assert_eq!(
        schema.column(0).unwrap().to_string(),
        "required INT32/DATE day"
    );
}

#[test]
fn test_descriptor_display() {
    let descr = SchemaDescriptor::new(stock_schema());
    let schema = bind_schema(&descr).unwrap();
    assert_eq!(
        schema.column(0).unwrap().to_string(),
        "required BYTE_ARRAY/UTF8 string_field"
    );
    assert_eq!(
        schema.column(1).unwrap().to_string(),
        "required FIXED_LEN_BYTE_ARRAY/NONE[4] char_field"
    );
}
