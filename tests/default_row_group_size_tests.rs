//! Process-wide default row-group size
//!
//! Kept in its own test binary: the default is global to the process.

use pqstream::config::{default_max_row_group_size, DEFAULT_MAX_ROW_GROUP_SIZE};
use pqstream::{StreamWriter, WriterConfig};
use test_data_gen::*;

#[test]
fn test_default_applies_only_to_writers_constructed_afterwards() {
    assert_eq!(default_max_row_group_size(), DEFAULT_MAX_ROW_GROUP_SIZE);
    let mut before = memory_writer(stock_schema(), &WriterConfig::default());
    assert_eq!(before.max_row_group_size(), DEFAULT_MAX_ROW_GROUP_SIZE);

    StreamWriter::<Vec<u8>>::set_default_max_row_group_size(1);
    assert_eq!(default_max_row_group_size(), 1);

    let mut after = memory_writer(stock_schema(), &WriterConfig::default());
    assert_eq!(after.max_row_group_size(), 1);

    let explicit_config = WriterConfig::default().with_max_row_group_size(0);
    let mut explicit = memory_writer(stock_schema(), &explicit_config);
    assert_eq!(explicit.max_row_group_size(), 0);

    write_stock_rows(&mut before, 4);
    write_stock_rows(&mut after, 4);
    write_stock_rows(&mut explicit, 4);

    // Every row passes a 1-byte threshold
    assert_eq!(after.num_row_groups(), 4);
    assert_eq!(before.num_row_groups(), 0);
    assert_eq!(explicit.num_row_groups(), 0);

    let reader = memory_reader(after.into_inner().unwrap());
    assert_eq!(reader.num_row_groups(), 4);
    let reader = memory_reader(before.into_inner().unwrap());
    assert_eq!(reader.num_row_groups(), 1);

    // Per-instance override after construction
    explicit.set_max_row_group_size(1);
    write_stock_rows(&mut explicit, 2);
    assert_eq!(explicit.num_row_groups(), 2);
    let reader = memory_reader(explicit.into_inner().unwrap());
    assert_eq!(reader.num_row_groups(), 2);
    assert_eq!(reader.num_rows(), 6);

    StreamWriter::<Vec<u8>>::set_default_max_row_group_size(DEFAULT_MAX_ROW_GROUP_SIZE);
}
