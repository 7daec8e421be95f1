//! Lossless byte-oriented compression with canonical Huffman codes.
//!
//! Containers use the HZIP format: a small header carrying the original size,
//! the original file extension and one code length per present byte value,
//! followed by the MSB-first packed bitstream. Code lengths are enough to
//! rebuild the canonical codes, so the tree shape is never stored.

pub mod codec;
pub mod config;
pub mod error;
pub mod file;

pub use codec::{compress, decompress, hzip_decode, hzip_encode, Compression, HuffmanCodec};
pub use config::CodecConfig;
pub use error::{Error, Result};
pub use file::{compress_file, decompress_file, FileReport};
