//! Codec selection for Parquet writer properties.

use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use pqstream_core::config::{Codec, WriterConfig};

/// Convert to Parquet's Compression enum.
pub fn to_parquet_compression(codec: Codec) -> Compression {
    match codec {
        Codec::Uncompressed => Compression::UNCOMPRESSED,
        Codec::Snappy => Compression::SNAPPY,
        Codec::Gzip => Compression::GZIP(GzipLevel::default()),
        Codec::Zstd => Compression::ZSTD(ZstdLevel::default()),
        Codec::Lz4 => Compression::LZ4,
        Codec::Brotli => Compression::BROTLI(BrotliLevel::default()),
    }
}

/// Writer properties for a container created from `config`.
///
/// Row-group sizing is left to the stream writer, which rotates on its own
/// byte threshold rather than the engine's row-count limit.
pub fn writer_properties(config: &WriterConfig) -> WriterProperties {
    WriterProperties::builder()
        .set_compression(to_parquet_compression(config.compression))
        .build()
}
