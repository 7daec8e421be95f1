//! HZIP container header.
//!
//! Layout, all integers little-endian:
//!
//! | Field           | Size                 |
//! |-----------------|----------------------|
//! | magic `"HZIP"`  | 4                    |
//! | version `0x01`  | 1                    |
//! | original size   | 8                    |
//! | extension len   | 1                    |
//! | extension UTF-8 | extension len        |
//! | symbol count    | 2 (at most 256)      |
//! | table           | count x (symbol, length) |
//! | pad bits        | 1 (0-7)              |
//!
//! The packed payload follows the header and runs to the end of the stream.

use std::io::{ErrorKind, Read, Write};

use crate::codec::canonical::MAX_CODE_LENGTH;
use crate::codec::tree::LengthTable;
use crate::error::{Error, Result};

/// File signature.
pub const MAGIC: [u8; 4] = *b"HZIP";

/// The only format version this crate reads and writes.
pub const VERSION: u8 = 0x01;

/// Parsed or to-be-written container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u8,
    /// Total number of bytes after decompression
    pub original_size: u64,
    /// Extension of the source file, including the leading dot
    pub extension: String,
    /// `(symbol, code length)` for every present symbol
    pub entries: Vec<(u8, u8)>,
    /// Filler bits at the end of the payload's last byte
    pub pad_bits: u8,
}

impl ContainerHeader {
    /// Builds a header from an encoder-side length table.
    ///
    /// Only present symbols are listed, in increasing symbol order.
    pub fn new(
        lengths: &LengthTable,
        original_size: u64,
        pad_bits: u8,
        extension: &str,
    ) -> Result<Self> {
        if extension.len() > u8::MAX as usize {
            return Err(Error::InvalidInput(format!(
                "extension is {} bytes long, at most 255 fit in the header",
                extension.len()
            )));
        }
        if let Some(problem) = extension_problem(extension) {
            return Err(Error::InvalidInput(format!(
                "extension {:?} {}",
                extension, problem
            )));
        }
        if pad_bits > 7 {
            return Err(Error::InvalidInput(format!(
                "pad bits must be in 0..=7, got {}",
                pad_bits
            )));
        }
        if let Some(len) = lengths.iter().find(|&&len| len > MAX_CODE_LENGTH) {
            return Err(Error::invalid_table(format!(
                "code length {} does not fit the container",
                len
            )));
        }

        let entries = lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len > 0)
            .map(|(symbol, &len)| (symbol as u8, len))
            .collect();

        Ok(ContainerHeader {
            version: VERSION,
            original_size,
            extension: extension.to_string(),
            entries,
            pad_bits,
        })
    }

    /// Size of the serialized header in bytes.
    pub fn encoded_len(&self) -> usize {
        4 + 1 + 8 + 1 + self.extension.len() + 2 + self.entries.len() * 2 + 1
    }

    /// Serializes the header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Serializes the header into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.extend_from_slice(&MAGIC);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.original_size.to_le_bytes());
        bytes.push(self.extension.len() as u8);
        bytes.extend_from_slice(self.extension.as_bytes());
        bytes.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for &(symbol, len) in &self.entries {
            bytes.push(symbol);
            bytes.push(len);
        }
        bytes.push(self.pad_bits);
        bytes
    }

    /// Parses and validates a header, leaving `reader` at the first payload byte.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_field(reader, &mut magic, "magic")?;
        if magic != MAGIC {
            return Err(Error::malformed(format!("bad magic {:02x?}", magic)));
        }

        let mut byte = [0u8; 1];
        read_field(reader, &mut byte, "version")?;
        let version = byte[0];
        if version != VERSION {
            return Err(Error::malformed(format!(
                "unsupported version 0x{:02x}",
                version
            )));
        }

        let mut size = [0u8; 8];
        read_field(reader, &mut size, "original size")?;
        let original_size = u64::from_le_bytes(size);

        read_field(reader, &mut byte, "extension length")?;
        let mut ext = vec![0u8; byte[0] as usize];
        read_field(reader, &mut ext, "extension")?;
        let extension = String::from_utf8(ext)
            .map_err(|_| Error::malformed("extension is not valid UTF-8"))?;
        if let Some(problem) = extension_problem(&extension) {
            return Err(Error::malformed(format!(
                "extension {:?} {}",
                extension, problem
            )));
        }

        let mut count = [0u8; 2];
        read_field(reader, &mut count, "symbol count")?;
        let symbol_count = u16::from_le_bytes(count) as usize;
        if symbol_count > 256 {
            return Err(Error::malformed(format!(
                "symbol count {} exceeds 256",
                symbol_count
            )));
        }

        let mut table = vec![0u8; symbol_count * 2];
        read_field(reader, &mut table, "code length table")?;
        let entries: Vec<(u8, u8)> = table.chunks_exact(2).map(|e| (e[0], e[1])).collect();
        if let Some(&(symbol, len)) = entries
            .iter()
            .find(|&&(_, len)| len == 0 || len > MAX_CODE_LENGTH)
        {
            return Err(Error::malformed(format!(
                "code length {} for symbol 0x{:02x} outside 1..={}",
                len, symbol, MAX_CODE_LENGTH
            )));
        }

        read_field(reader, &mut byte, "pad bits")?;
        let pad_bits = byte[0];
        if pad_bits > 7 {
            return Err(Error::malformed(format!(
                "pad bits must be in 0..=7, got {}",
                pad_bits
            )));
        }

        Ok(ContainerHeader {
            version,
            original_size,
            extension,
            entries,
            pad_bits,
        })
    }
}

/// Extensions are either empty or a dot followed by no path syntax.
fn extension_problem(extension: &str) -> Option<&'static str> {
    if extension.is_empty() {
        None
    } else if !extension.starts_with('.') {
        Some("must start with '.'")
    } else if extension.contains(['/', '\\', '\0']) {
        Some("contains a path separator or NUL")
    } else if extension.contains("..") {
        Some("contains '..'")
    } else {
        None
    }
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::malformed(format!("truncated {}", field)),
        _ => Error::Io(e),
    })
}
