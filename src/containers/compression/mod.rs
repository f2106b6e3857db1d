pub mod lz4;

pub use lz4::{decompress_vtr, DecompressOptions, Lz4Container};
