//! Decode trie built from canonical codes, and the bit-by-bit symbol walker.

use std::io::Write;

use log::debug;

use crate::codec::bitio::BitReader;
use crate::codec::canonical::CodeTable;
use crate::error::{Error, Result};

// Decoded bytes are handed to the sink in batches of this size.
const OUTPUT_BATCH: usize = 64 * 1024;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Child index for bit 0 and bit 1
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

/// Binary trie whose root-to-leaf paths spell the canonical codes
/// (0 = left, 1 = right). Nodes live in an arena indexed by position.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

impl DecodeTrie {
    /// Builds the trie, failing if one code passes through or lands on another.
    pub fn build(codes: &CodeTable) -> Result<Self> {
        let mut nodes = vec![TrieNode::default()];

        for (symbol, code) in codes
            .iter()
            .enumerate()
            .filter_map(|(s, c)| c.map(|c| (s as u8, c)))
        {
            let mut node = ROOT;
            for bit in code.bits() {
                if nodes[node].symbol.is_some() {
                    return Err(Error::invalid_table(format!(
                        "code for symbol 0x{:02x} passes through a leaf",
                        symbol
                    )));
                }
                node = match nodes[node].children[bit as usize] {
                    Some(child) => child,
                    None => {
                        nodes.push(TrieNode::default());
                        let child = nodes.len() - 1;
                        nodes[node].children[bit as usize] = Some(child);
                        child
                    }
                };
            }

            let leaf = &mut nodes[node];
            if leaf.symbol.is_some() || leaf.children.iter().any(Option::is_some) {
                return Err(Error::invalid_table(format!(
                    "code for symbol 0x{:02x} collides with another code",
                    symbol
                )));
            }
            leaf.symbol = Some(symbol);
        }

        Ok(DecodeTrie { nodes })
    }

    /// True when the trie holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Looks up the symbol reached by following `bits` from the root.
    pub fn lookup<I: IntoIterator<Item = bool>>(&self, bits: I) -> Option<u8> {
        let mut node = ROOT;
        for bit in bits {
            node = self.nodes[node].children[bit as usize]?;
        }
        self.nodes[node].symbol
    }

    /// Decodes exactly `count` symbols from `reader` into `sink`.
    pub fn decode_into<W: Write>(
        &self,
        reader: &mut BitReader<'_>,
        count: u64,
        sink: &mut W,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if self.is_empty() {
            return Err(Error::invalid_table(format!(
                "{} bytes declared but the code table is empty",
                count
            )));
        }

        let mut batch = Vec::with_capacity(OUTPUT_BATCH.min(count as usize));
        let mut decoded = 0u64;
        let mut node = ROOT;

        while decoded < count {
            let bit = reader.read_bit().ok_or(Error::TruncatedBitstream {
                decoded,
                expected: count,
            })?;
            node = self.nodes[node].children[bit as usize].ok_or_else(|| {
                Error::invalid_table(format!(
                    "bitstream enters an unassigned code after {} bytes",
                    decoded
                ))
            })?;

            if let Some(symbol) = self.nodes[node].symbol {
                batch.push(symbol);
                decoded += 1;
                node = ROOT;
                if batch.len() == OUTPUT_BATCH {
                    sink.write_all(&batch)?;
                    batch.clear();
                }
            }
        }
        sink.write_all(&batch)?;

        debug!(
            "decoded {} bytes, {} payload bits left unread",
            decoded,
            reader.remaining()
        );
        Ok(())
    }

    /// Decodes exactly `count` symbols into a new buffer.
    pub fn decode(&self, reader: &mut BitReader<'_>, count: u64) -> Result<Vec<u8>> {
        // Every symbol costs at least one bit, so the payload bounds the allocation.
        let capacity = count.min(reader.remaining() as u64) as usize;
        let mut out = Vec::with_capacity(capacity);
        self.decode_into(reader, count, &mut out)?;
        Ok(out)
    }
}
