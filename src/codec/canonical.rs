//! Canonical Huffman code assignment.
//!
//! A canonical code is fully determined by the code length of each symbol:
//! symbols are ranked by (length, symbol value) and handed consecutive
//! integers, with the first code of each length derived from the previous
//! length class. Encoder and decoder both go through [`assign`], so equal
//! length tables always produce identical codes.

use crate::codec::tree::LengthTable;
use crate::error::{Error, Result};

/// Longest code length a table may declare.
pub const MAX_CODE_LENGTH: u8 = 64;

/// A code value and its bit length; the code occupies the low `length` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalCode {
    pub code: u64,
    pub length: u8,
}

impl CanonicalCode {
    // Bit `index` counted from the most significant bit of the code.
    fn bit(&self, index: u8) -> bool {
        debug_assert!(index < self.length);
        (self.code >> (self.length - 1 - index)) & 1 == 1
    }

    /// Iterates the code bits from most to least significant.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.length).map(move |i| self.bit(i))
    }
}

/// Canonical code for every byte value, `None` for absent symbols.
pub type CodeTable = [Option<CanonicalCode>; 256];

/// Assign canonical codes from a per-byte length table (encode path).
pub fn from_lengths(lengths: &LengthTable) -> Result<CodeTable> {
    let entries: Vec<(u8, u8)> = lengths
        .iter()
        .enumerate()
        .filter(|&(_, &len)| len > 0)
        .map(|(symbol, &len)| (symbol as u8, len))
        .collect();
    assign(entries)
}

/// Assign canonical codes from `(symbol, length)` pairs read out of a header
/// (decode path). The pairs may arrive in any order.
pub fn from_entries(entries: &[(u8, u8)]) -> Result<CodeTable> {
    let mut seen = [false; 256];
    for &(symbol, len) in entries {
        if len == 0 {
            return Err(Error::invalid_table(format!(
                "symbol 0x{:02x} has zero code length",
                symbol
            )));
        }
        if std::mem::replace(&mut seen[symbol as usize], true) {
            return Err(Error::invalid_table(format!(
                "symbol 0x{:02x} listed more than once",
                symbol
            )));
        }
    }
    assign(entries.to_vec())
}

fn assign(mut entries: Vec<(u8, u8)>) -> Result<CodeTable> {
    let mut codes: CodeTable = [None; 256];
    if entries.is_empty() {
        return Ok(codes);
    }

    if let Some(&(symbol, len)) = entries.iter().find(|&&(_, len)| len > MAX_CODE_LENGTH) {
        return Err(Error::invalid_table(format!(
            "code length {} for symbol 0x{:02x} exceeds {}",
            len, symbol, MAX_CODE_LENGTH
        )));
    }

    entries.sort_unstable_by_key(|&(symbol, len)| (len, symbol));

    let max_len = entries[entries.len() - 1].1 as usize;
    let mut count = vec![0u128; max_len + 1];
    for &(_, len) in &entries {
        count[len as usize] += 1;
    }

    // u128 so that oversubscribed tables are detected instead of wrapping.
    let mut next_code = vec![0u128; max_len + 1];
    let mut code = 0u128;
    for len in 2..=max_len {
        code = (code + count[len - 1]) << 1;
        next_code[len] = code;
    }

    for (symbol, len) in entries {
        let value = next_code[len as usize];
        if value >> len != 0 {
            return Err(Error::invalid_table(format!(
                "lengths are oversubscribed at {} bits",
                len
            )));
        }
        next_code[len as usize] += 1;
        codes[symbol as usize] = Some(CanonicalCode {
            code: value as u64,
            length: len,
        });
    }

    Ok(codes)
}
