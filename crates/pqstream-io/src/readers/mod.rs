pub mod column_cursor;
pub mod stream;
