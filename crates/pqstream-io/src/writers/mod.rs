pub mod column_buffer;
pub mod stream;
