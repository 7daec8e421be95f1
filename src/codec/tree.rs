//! Huffman tree construction and code length extraction.
//!
//! The tree only exists long enough to read off the depth of every leaf. Those
//! depths are the code lengths; the actual bit patterns are reassigned
//! canonically afterwards, so the shape of the tree never leaves this module.
//!
//! Merging is deterministic: nodes are ordered by weight and, on equal weight,
//! by the smallest byte value reachable in the subtree. Two different subtrees
//! never share a minimum symbol, so the order is total and the resulting
//! lengths do not depend on input order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::codec::frequency::FrequencyTable;

/// Per-byte code length, `0` for bytes that do not occur.
pub type LengthTable = [u8; 256];

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node holds a byte value and its occurrence count.
    Leaf { symbol: u8, weight: u64 },
    /// An internal node owns both children and carries their combined weight.
    Internal {
        weight: u64,
        min_symbol: u8,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Returns the weight of the node.
    pub fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } => *weight,
            HuffmanNode::Internal { weight, .. } => *weight,
        }
    }

    /// Smallest byte value in this subtree, used only to break weight ties.
    pub fn min_symbol(&self) -> u8 {
        match self {
            HuffmanNode::Leaf { symbol, .. } => *symbol,
            HuffmanNode::Internal { min_symbol, .. } => *min_symbol,
        }
    }

    fn merge(left: HuffmanNode, right: HuffmanNode) -> HuffmanNode {
        HuffmanNode::Internal {
            weight: left.weight() + right.weight(),
            min_symbol: left.min_symbol().min(right.min_symbol()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// A helper wrapper for HuffmanNode for use in a BinaryHeap.
/// The lightest node, then the one with the smallest symbol, has highest priority.
#[derive(Debug, Eq, PartialEq)]
struct NodeWrapper(HuffmanNode);

impl Ord for NodeWrapper {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        (other.0.weight(), other.0.min_symbol()).cmp(&(self.0.weight(), self.0.min_symbol()))
    }
}

impl PartialOrd for NodeWrapper {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build the Huffman tree for a frequency table.
///
/// Returns `None` when every count is zero. With a single distinct byte the
/// returned root is that lone leaf.
pub fn build_huffman_tree(freq: &FrequencyTable) -> Option<HuffmanNode> {
    let mut heap: BinaryHeap<NodeWrapper> = freq
        .iter()
        .map(|(symbol, weight)| NodeWrapper(HuffmanNode::Leaf { symbol, weight }))
        .collect();

    // Combine nodes until only one tree remains. The first node popped becomes
    // the left (0) child.
    loop {
        let NodeWrapper(left) = heap.pop()?;
        let Some(NodeWrapper(right)) = heap.pop() else {
            return Some(left);
        };
        heap.push(NodeWrapper(HuffmanNode::merge(left, right)));
    }
}

/// Derive the code length of every leaf from its depth in the tree.
///
/// A root that is itself a leaf gets length 1 so that each occurrence still
/// costs one bit. An absent tree yields all zeros.
pub fn code_lengths(root: Option<&HuffmanNode>) -> LengthTable {
    let mut lengths = [0u8; 256];
    let Some(root) = root else {
        return lengths;
    };

    if let HuffmanNode::Leaf { symbol, .. } = root {
        lengths[*symbol as usize] = 1;
        return lengths;
    }

    // Explicit stack; skewed trees can be up to 255 levels deep.
    let mut stack: Vec<(&HuffmanNode, u8)> = vec![(root, 0)];
    while let Some((node, depth)) = stack.pop() {
        match node {
            HuffmanNode::Leaf { symbol, .. } => lengths[*symbol as usize] = depth,
            HuffmanNode::Internal { left, right, .. } => {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    trace!(
        "code lengths: {:?}",
        lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len > 0)
            .collect::<Vec<_>>()
    );
    lengths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(u8, u64)]) -> FrequencyTable {
        let mut data = Vec::new();
        for &(symbol, count) in pairs {
            data.extend(std::iter::repeat(symbol).take(count as usize));
        }
        FrequencyTable::from_bytes(&data)
    }

    #[test]
    fn test_empty_table_has_no_tree() {
        let freq = FrequencyTable::new();
        assert!(build_huffman_tree(&freq).is_none());
        assert_eq!(code_lengths(None), [0u8; 256]);
    }

    #[test]
    fn test_single_symbol_tree() {
        let freq = table(&[(b'a', 7)]);
        let tree = build_huffman_tree(&freq).expect("Tree should be built");
        assert_eq!(
            tree,
            HuffmanNode::Leaf {
                symbol: b'a',
                weight: 7
            }
        );
        let lengths = code_lengths(Some(&tree));
        assert_eq!(lengths[b'a' as usize], 1);
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 1);
    }

    #[test]
    fn test_two_symbols_lighter_goes_left() {
        // "AAAB": B (weight 1) is popped first and becomes the left child.
        let freq = FrequencyTable::from_bytes(b"AAAB");
        let tree = build_huffman_tree(&freq).unwrap();
        match tree {
            HuffmanNode::Internal {
                weight,
                min_symbol,
                left,
                right,
            } => {
                assert_eq!(weight, 4);
                assert_eq!(min_symbol, b'A');
                assert_eq!(left.min_symbol(), b'B');
                assert_eq!(right.min_symbol(), b'A');
            }
            other => panic!("expected internal root, got {:?}", other),
        }
        let lengths = code_lengths(Some(&build_huffman_tree(&freq).unwrap()));
        assert_eq!(lengths[b'A' as usize], 1);
        assert_eq!(lengths[b'B' as usize], 1);
    }

    #[test]
    fn test_tie_break_on_min_symbol() {
        // Four equal weights: (a,b) merge first, then (c,d), then the two pairs.
        let freq = table(&[(b'd', 1), (b'c', 1), (b'b', 1), (b'a', 1)]);
        let tree = build_huffman_tree(&freq).unwrap();
        if let HuffmanNode::Internal { left, right, .. } = &tree {
            assert_eq!(left.min_symbol(), b'a');
            assert_eq!(right.min_symbol(), b'c');
        } else {
            panic!("expected internal root");
        }
        let lengths = code_lengths(Some(&tree));
        for symbol in b'a'..=b'd' {
            assert_eq!(lengths[symbol as usize], 2);
        }
    }

    #[test]
    fn test_skewed_weights_give_increasing_lengths() {
        // Fibonacci-like weights produce a maximally skewed tree.
        let freq = table(&[(0, 1), (1, 1), (2, 2), (3, 3), (4, 5), (5, 8)]);
        let lengths = code_lengths(build_huffman_tree(&freq).as_ref());
        assert_eq!(&lengths[..6], &[5, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_kraft_equality() {
        let freq = FrequencyTable::from_bytes(b"this is an example for huffman encoding");
        let lengths = code_lengths(build_huffman_tree(&freq).as_ref());
        let kraft: f64 = lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 2f64.powi(-(l as i32)))
            .sum();
        assert!((kraft - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_deep_tree_from_fibonacci_weights() {
        let mut counts = [0u64; 256];
        let (mut a, mut b) = (1u64, 1u64);
        for count in counts.iter_mut().take(60) {
            *count = a;
            let next = a + b;
            a = b;
            b = next;
        }
        let freq = FrequencyTable::from_counts(counts);
        let lengths = code_lengths(build_huffman_tree(&freq).as_ref());
        assert_eq!(lengths[0], 59);
        assert_eq!(lengths[1], 59);
        assert_eq!(lengths[59], 1);
        assert_eq!(lengths.iter().filter(|&&l| l > 0).count(), 60);
    }
}
