//! MSB-first bit packing and unpacking.
//!
//! [`BitWriter`] stages bits in a `BitVec` and hands completed bytes to a
//! sink. [`BitReader`] walks a packed buffer and treats the
//! declared padding at the end of the last byte as end-of-stream.

use std::io::Write;

use bitvec::prelude::*;

use crate::error::Result;

// Completed bytes are buffered up to this size before reaching the sink.
const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Result of [`BitWriter::finish`].
#[derive(Debug)]
pub struct PackedBits<W> {
    /// The sink, holding every completed byte
    pub sink: W,
    /// Zero bits appended to complete the final byte (0-7)
    pub pad_bits: u8,
    /// Number of payload bytes written to the sink
    pub byte_count: u64,
}

/// Append-only MSB-first bit writer.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    sink: W,
    staged: BitVec<u8, Msb0>,
    flushed: u64,
}

impl BitWriter<Vec<u8>> {
    /// Creates a writer that collects the payload in memory.
    pub fn new() -> Self {
        Self::with_sink(Vec::new())
    }
}

impl Default for BitWriter<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> BitWriter<W> {
    /// Creates a writer that streams completed bytes into `sink`.
    pub fn with_sink(sink: W) -> Self {
        BitWriter {
            sink,
            staged: BitVec::with_capacity(FLUSH_THRESHOLD * 8 + 64),
            flushed: 0,
        }
    }

    /// Appends a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.staged.push(bit);
        self.maybe_flush()
    }

    /// Appends the low `length` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, length: u8) -> Result<()> {
        debug_assert!(length <= 64);
        let bits = value.view_bits::<Msb0>();
        self.staged
            .extend(bits[64 - length as usize..].iter().by_vals());
        self.maybe_flush()
    }

    /// Bits appended so far, padding excluded.
    pub fn bit_count(&self) -> u64 {
        self.flushed * 8 + self.staged.len() as u64
    }

    /// Pads the partial byte with zeros, flushes everything and returns the sink.
    pub fn finish(mut self) -> Result<PackedBits<W>> {
        let pad_bits = ((8 - self.staged.len() % 8) % 8) as u8;
        let padded = self.staged.len() + pad_bits as usize;
        self.staged.resize(padded, false);
        self.flush_bytes()?;
        self.sink.flush()?;
        Ok(PackedBits {
            sink: self.sink,
            pad_bits,
            byte_count: self.flushed,
        })
    }

    fn maybe_flush(&mut self) -> Result<()> {
        if self.staged.len() >= FLUSH_THRESHOLD * 8 {
            self.flush_bytes()?;
        }
        Ok(())
    }

    // Writes every complete staged byte and keeps the trailing partial byte.
    fn flush_bytes(&mut self) -> Result<()> {
        let whole = self.staged.len() / 8;
        self.sink.write_all(&self.staged.as_raw_slice()[..whole])?;
        self.flushed += whole as u64;
        let tail = self.staged[whole * 8..].to_bitvec();
        self.staged = tail;
        Ok(())
    }
}

/// MSB-first bit reader over a packed payload.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a reader whose last `pad_bits` bits (0-7) are filler.
    pub fn new(payload: &'a [u8], pad_bits: u8) -> Self {
        let all = payload.view_bits::<Msb0>();
        let valid = all.len().saturating_sub(pad_bits as usize);
        BitReader {
            bits: &all[..valid],
            pos: 0,
        }
    }

    /// Reads the next bit, `None` at end of stream.
    pub fn read_bit(&mut self) -> Option<bool> {
        let bit = *self.bits.get(self.pos)?;
        self.pos += 1;
        Some(bit)
    }

    /// Reads `n` bits (at most 64) into an unsigned value, MSB first.
    ///
    /// Returns `None` without consuming anything if fewer than `n` bits remain.
    pub fn read_bits(&mut self, n: u8) -> Option<u64> {
        debug_assert!(n <= 64);
        let n = n as usize;
        if self.remaining() < n {
            return None;
        }
        let value = self.bits[self.pos..self.pos + n]
            .iter()
            .by_vals()
            .fold(0u64, |acc, bit| (acc << 1) | bit as u64);
        self.pos += n;
        Some(value)
    }

    /// Number of valid bits not yet read
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    /// Current position as (byte index, bit mask within that byte).
    pub fn position(&self) -> (usize, u8) {
        (self.pos / 8, 0x80 >> (self.pos % 8))
    }
}
