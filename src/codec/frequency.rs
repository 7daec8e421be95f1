//! Order-0 byte frequency counting.

use std::io::{ErrorKind, Read};

use crate::error::Result;

/// Occurrence count of every byte value in an input, plus the total length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    /// Creates an all-zero table
    pub fn new() -> Self {
        FrequencyTable {
            counts: [0; 256],
            total: 0,
        }
    }

    /// Counts the bytes of an in-memory slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.update(data);
        table
    }

    /// Wraps precomputed counts.
    pub fn from_counts(counts: [u64; 256]) -> Self {
        let total = counts.iter().sum();
        FrequencyTable { counts, total }
    }

    /// Counts every byte of `reader`, reading at most `chunk_size` bytes at a time.
    pub fn from_reader<R: Read>(reader: &mut R, chunk_size: usize) -> Result<Self> {
        let mut table = Self::new();
        let mut buf = vec![0u8; chunk_size.max(1)];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.update(&buf[..n]);
        }
        Ok(table)
    }

    /// Adds the bytes of `chunk` to the tally.
    pub fn update(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.counts[byte as usize] += 1;
        }
        self.total += chunk.len() as u64;
    }

    /// Occurrence count of `symbol`
    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Total number of bytes counted
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of byte values that occur at least once
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Iterates `(symbol, count)` over present symbols in increasing symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }
}
