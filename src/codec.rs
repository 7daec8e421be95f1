//! Canonical Huffman codec and the HZIP container.
//!
//! Compression reads its input twice: once to count byte frequencies and,
//! after the code table is fixed, once more to pack the codes. Both passes
//! read in chunks of [`CodecConfig::chunk_size`] bytes. The header is written
//! before the payload, since the total bit count (and with it the padding) is
//! already known once the code lengths are.
//!
//! # Examples
//!
//! ```rust
//! use hzip::codec::{Compression, HuffmanCodec};
//!
//! let codec = HuffmanCodec::new(".txt");
//! let container = codec.compress(b"abracadabra").unwrap();
//! assert_eq!(&container[..4], b"HZIP");
//! assert_eq!(codec.decompress(&container).unwrap(), b"abracadabra");
//! ```

use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom, Write};

use log::debug;

use crate::config::CodecConfig;
use crate::error::{Error, Result};

pub mod bitio;
pub mod canonical;
pub mod container;
pub mod frequency;
pub mod trie;
pub mod tree;


pub use bitio::{BitReader, BitWriter, PackedBits};
pub use canonical::{CanonicalCode, CodeTable};
pub use container::ContainerHeader;
pub use frequency::FrequencyTable;
pub use tree::{build_huffman_tree, code_lengths, HuffmanNode, LengthTable};
pub use trie::DecodeTrie;

/// Trait for whole-buffer compression algorithms
pub trait Compression {
    /// Compress the input data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the compressed data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Outcome of a [`compress`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSummary {
    pub original_size: u64,
    /// Header plus payload bytes written
    pub compressed_size: u64,
    pub symbol_count: usize,
    pub pad_bits: u8,
}

/// Outcome of a [`decompress`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    /// Extension recorded at compression time
    pub extension: String,
    pub original_size: u64,
    /// Header plus payload bytes consumed
    pub compressed_size: u64,
}

/// Derives the canonical code table and per-byte lengths for a frequency table.
pub fn build_code_table(freq: &FrequencyTable) -> Result<(LengthTable, CodeTable)> {
    let tree = build_huffman_tree(freq);
    let lengths = code_lengths(tree.as_ref());
    let codes = canonical::from_lengths(&lengths)?;
    Ok((lengths, codes))
}

/// Number of padding bits needed after `freq` has been encoded with `lengths`.
fn padding_for(freq: &FrequencyTable, lengths: &LengthTable) -> u8 {
    let total_bits = freq.iter().fold(0u64, |acc, (symbol, count)| {
        acc.wrapping_add(count.wrapping_mul(lengths[symbol as usize] as u64))
    });
    ((8 - total_bits % 8) % 8) as u8
}

/// Compresses everything `input` yields into an HZIP container on `output`.
///
/// `input` is rewound after the counting pass; `extension` is stored verbatim
/// in the header.
pub fn compress<R, W>(
    config: &CodecConfig,
    input: &mut R,
    extension: &str,
    output: &mut W,
) -> Result<CompressionSummary>
where
    R: Read + Seek,
    W: Write,
{
    let start = input.stream_position()?;
    let freq = FrequencyTable::from_reader(input, config.chunk_size())?;
    let (lengths, codes) = build_code_table(&freq)?;
    let pad_bits = padding_for(&freq, &lengths);

    let header = ContainerHeader::new(&lengths, freq.total(), pad_bits, extension)?;
    header.write_to(output)?;
    debug!(
        "compressing {} bytes, {} distinct symbols, {} pad bits",
        freq.total(),
        header.entries.len(),
        pad_bits
    );

    input.seek(SeekFrom::Start(start))?;
    let mut writer = BitWriter::with_sink(&mut *output);
    let mut buf = vec![0u8; config.chunk_size()];
    let mut seen = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            let code = codes[byte as usize].ok_or(Error::UnencodableByte(byte))?;
            writer.write_bits(code.code, code.length)?;
        }
        seen += n as u64;
    }
    let packed = writer.finish()?;

    if seen != freq.total() || packed.pad_bits != pad_bits {
        return Err(Error::InvalidInput(format!(
            "input changed between passes: counted {} bytes, encoded {}",
            freq.total(),
            seen
        )));
    }

    let summary = CompressionSummary {
        original_size: freq.total(),
        compressed_size: header.encoded_len() as u64 + packed.byte_count,
        symbol_count: header.entries.len(),
        pad_bits,
    };
    debug!("compressed to {} bytes", summary.compressed_size);
    Ok(summary)
}

/// Decodes an HZIP container from `input`, writing the original bytes to `output`.
pub fn decompress<R, W>(input: &mut R, output: &mut W) -> Result<Decompressed>
where
    R: Read,
    W: Write,
{
    let header = ContainerHeader::read_from(input)?;
    let mut payload = Vec::new();
    input.read_to_end(&mut payload)?;
    debug!(
        "decompressing {} bytes from {} payload bytes, {} symbols",
        header.original_size,
        payload.len(),
        header.entries.len()
    );

    let codes = canonical::from_entries(&header.entries)?;
    let trie = DecodeTrie::build(&codes)?;
    let mut reader = BitReader::new(&payload, header.pad_bits);
    trie.decode_into(&mut reader, header.original_size, output)?;
    output.flush()?;

    Ok(Decompressed {
        compressed_size: (header.encoded_len() + payload.len()) as u64,
        extension: header.extension,
        original_size: header.original_size,
    })
}

/// In-memory HZIP codec.
#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
    extension: String,
}

impl HuffmanCodec {
    /// Creates a codec that records `extension` in every container it writes.
    pub fn new(extension: impl Into<String>) -> Self {
        HuffmanCodec {
            config: CodecConfig::default(),
            extension: extension.into(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Decompresses `data` and also returns the recorded extension.
    pub fn decompress_with_extension(&self, data: &[u8]) -> Result<(Vec<u8>, String)> {
        let mut out = Vec::new();
        let info = decompress(&mut Cursor::new(data), &mut out)?;
        Ok((out, info.extension))
    }
}

impl Compression for HuffmanCodec {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        compress(&self.config, &mut Cursor::new(data), &self.extension, &mut out)?;
        Ok(out)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decompress_with_extension(data).map(|(out, _)| out)
    }
}

/// Encodes `data` into an HZIP container with an empty extension.
pub fn hzip_encode(data: &[u8]) -> Result<Vec<u8>> {
    HuffmanCodec::default().compress(data)
}

/// Decodes an HZIP container produced by [`hzip_encode`] or [`compress`].
pub fn hzip_decode(data: &[u8]) -> Result<Vec<u8>> {
    HuffmanCodec::default().decompress(data)
}
