//! Canonical Huffman coding over byte symbols.
//!
//! # Construction
//!
//! 1. One leaf per symbol with a nonzero count goes into a min-queue ordered
//!    by `(weight, kind, tiebreak)`: leaves sort before internal nodes of the
//!    same weight, leaves tie-break on symbol value, internal nodes on the
//!    order they were created. This makes the tree (and therefore the
//!    output) identical on every run.
//! 2. The two lowest entries are merged until one root remains.
//! 3. Code lengths are read off the tree and codes are reassigned
//!    canonically, so the decoder only needs the 256 code lengths.
//!
//! Trees live in flat arenas (`Vec` + indices) and are walked iteratively,
//! so heavily skewed distributions cannot exhaust the stack.
//!
//! A single distinct symbol gets the one-bit code `0`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{HuffmanError, Result};
use crate::model::{FrequencyTable, ALPHABET_SIZE};

/// Longest code the 64-bit code register can carry.
pub const MAX_CODE_LENGTH: usize = 64;

/// A node of the construction tree. Children are arena indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf { symbol: u8, weight: u64 },
    Internal { weight: u64, left: usize, right: usize },
}

impl HuffmanNode {
    pub fn weight(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => weight,
        }
    }
}

/// Queue entry carrying the full tie-break key.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    weight: u64,
    /// 0 for leaves, 1 for internal nodes
    kind: u8,
    /// Symbol value for leaves, creation sequence for internal nodes
    tiebreak: usize,
    node: usize,
}

impl QueueEntry {
    fn key(&self) -> (u64, u8, usize) {
        (self.weight, self.kind, self.tiebreak)
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest key first
        other.key().cmp(&self.key())
    }
}

/// Huffman tree stored in an arena. Never mutated after `build`.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree for every symbol with a nonzero count.
    ///
    /// # Errors
    /// `HuffmanError::EmptyFrequencyTable` if all counts are zero.
    pub fn build(freqs: &FrequencyTable) -> Result<Self> {
        let mut nodes = Vec::with_capacity(2 * ALPHABET_SIZE);
        let mut queue = BinaryHeap::with_capacity(ALPHABET_SIZE);

        for symbol in freqs.present_symbols() {
            let weight = freqs.count(symbol);
            queue.push(QueueEntry {
                weight,
                kind: 0,
                tiebreak: symbol as usize,
                node: nodes.len(),
            });
            nodes.push(HuffmanNode::Leaf { symbol, weight });
        }

        if queue.is_empty() {
            return Err(HuffmanError::EmptyFrequencyTable.into());
        }

        let mut sequence = 0;
        while queue.len() > 1 {
            let (Some(left), Some(right)) = (queue.pop(), queue.pop()) else {
                break;
            };
            let weight = left.weight + right.weight;
            queue.push(QueueEntry {
                weight,
                kind: 1,
                tiebreak: sequence,
                node: nodes.len(),
            });
            nodes.push(HuffmanNode::Internal {
                weight,
                left: left.node,
                right: right.node,
            });
            sequence += 1;
        }

        let root = queue
            .pop()
            .map(|entry| entry.node)
            .ok_or(HuffmanError::EmptyFrequencyTable)?;

        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> &HuffmanNode {
        &self.nodes[self.root]
    }

    pub fn nodes(&self) -> &[HuffmanNode] {
        &self.nodes
    }

    /// Depth of every leaf, indexed by symbol (0 for absent symbols).
    ///
    /// A lone leaf sits at depth 0; callers special-case it.
    pub fn leaf_depths(&self) -> [usize; ALPHABET_SIZE] {
        let mut depths = [0usize; ALPHABET_SIZE];
        let mut stack = vec![(self.root, 0usize)];

        while let Some((index, depth)) = stack.pop() {
            match self.nodes[index] {
                HuffmanNode::Leaf { symbol, .. } => depths[symbol as usize] = depth,
                HuffmanNode::Internal { left, right, .. } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }

        depths
    }
}

/// A prefix code word: the low `len` bits of `bits`, MSB-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: u64,
    pub len: u8,
}

impl Code {
    /// True if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

/// Canonical code table, indexed by symbol. `len == 0` means absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Code; ALPHABET_SIZE],
}

impl CodeTable {
    /// Build a Huffman tree from `freqs` and derive canonical codes.
    ///
    /// # Errors
    /// - `HuffmanError::EmptyFrequencyTable` if all counts are zero
    /// - `HuffmanError::CodeLengthTooLong` if the tree is deeper than
    ///   [`MAX_CODE_LENGTH`]
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        let mut lengths = [0u8; ALPHABET_SIZE];

        if let Some(symbol) = freqs.single_symbol() {
            lengths[symbol as usize] = 1;
        } else {
            let tree = HuffmanTree::build(freqs)?;
            for (symbol, &depth) in tree.leaf_depths().iter().enumerate() {
                if depth > MAX_CODE_LENGTH {
                    return Err(HuffmanError::CodeLengthTooLong {
                        symbol: symbol as u8,
                        length: depth,
                        max: MAX_CODE_LENGTH,
                    }
                    .into());
                }
                lengths[symbol] = depth as u8;
            }
        }

        Self::from_code_lengths(&lengths)
    }

    /// Rebuild the canonical table from per-symbol code lengths.
    ///
    /// Symbols are ordered by `(length, symbol)`; the first gets the all-zero
    /// code and each following one the previous code plus one, shifted left
    /// by the growth in length.
    ///
    /// # Errors
    /// - `HuffmanError::CodeLengthTooLong` if any length exceeds
    ///   [`MAX_CODE_LENGTH`]
    /// - `HuffmanError::OversubscribedLengths` if the lengths cannot form a
    ///   prefix code
    pub fn from_code_lengths(lengths: &[u8; ALPHABET_SIZE]) -> Result<Self> {
        let mut order: Vec<(u8, u8)> = Vec::with_capacity(ALPHABET_SIZE);
        for (symbol, &len) in lengths.iter().enumerate() {
            if len as usize > MAX_CODE_LENGTH {
                return Err(HuffmanError::CodeLengthTooLong {
                    symbol: symbol as u8,
                    length: len as usize,
                    max: MAX_CODE_LENGTH,
                }
                .into());
            }
            if len > 0 {
                order.push((len, symbol as u8));
            }
        }
        order.sort_unstable();

        let mut codes = [Code::default(); ALPHABET_SIZE];
        // u128 so the increment after a full 64-bit level cannot overflow
        let mut next: u128 = 0;
        let mut prev_len = order.first().map_or(0, |&(len, _)| len);

        for &(len, symbol) in &order {
            next <<= len - prev_len;
            if next >> len != 0 {
                return Err(HuffmanError::OversubscribedLengths.into());
            }
            codes[symbol as usize] = Code {
                bits: next as u64,
                len,
            };
            next += 1;
            prev_len = len;
        }

        trace!(
            "canonical table: {} symbols, max length {}",
            order.len(),
            prev_len
        );

        Ok(Self { codes })
    }

    /// Code for `symbol`, if it is present.
    pub fn code(&self, symbol: u8) -> Option<Code> {
        let code = self.codes[symbol as usize];
        (code.len > 0).then_some(code)
    }

    /// Code lengths indexed by symbol, as serialized in the container.
    pub fn code_lengths(&self) -> [u8; ALPHABET_SIZE] {
        let mut lengths = [0u8; ALPHABET_SIZE];
        for (slot, code) in lengths.iter_mut().zip(self.codes.iter()) {
            *slot = code.len;
        }
        lengths
    }

    pub fn max_code_length(&self) -> usize {
        self.codes.iter().map(|c| c.len as usize).max().unwrap_or(0)
    }

    /// Present symbols with their codes, ascending by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.len > 0)
            .map(|(s, &c)| (s as u8, c))
    }

    /// Encode `data` as concatenated codes, zero-padded to a byte.
    ///
    /// # Errors
    /// `HuffmanError::MissingSymbol` if `data` contains a symbol without a code.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity_bits(data.len());
        for &byte in data {
            let code = self
                .code(byte)
                .ok_or(HuffmanError::MissingSymbol { symbol: byte })?;
            writer.write_bits(code.bits, code.len as usize)?;
        }
        Ok(writer.finish())
    }

    /// Decode exactly `len` symbols from `payload`.
    ///
    /// # Errors
    /// - `HuffmanError::Truncated` if the payload ends first
    /// - `HuffmanError::InvalidCode` if a bit path leads to no symbol or runs
    ///   longer than the longest code
    /// - `HuffmanError::TrailingBits` if what is left after the last symbol is
    ///   not zero padding
    pub fn decode(&self, payload: &[u8], len: usize) -> Result<Vec<u8>> {
        let tree = DecodeTree::from_table(self);
        let max_len = self.max_code_length();
        let mut reader = BitReader::new(payload);
        // Every code is at least one bit; a corrupt length cannot over-allocate
        let mut output = Vec::with_capacity(len.min(payload.len().saturating_mul(8)));

        while output.len() < len {
            let start = reader.position();
            let mut node = DecodeTree::ROOT;

            let symbol = loop {
                if reader.is_empty() {
                    return Err(HuffmanError::Truncated {
                        decoded: output.len(),
                        expected: len,
                    }
                    .into());
                }
                if reader.position() - start >= max_len {
                    return Err(HuffmanError::InvalidCode { position: start }.into());
                }

                let bit = reader.read_bit()?;
                node = tree
                    .child(node, bit)
                    .ok_or(HuffmanError::InvalidCode { position: start })?;

                if let Some(symbol) = tree.symbol(node) {
                    break symbol;
                }
            };

            output.push(symbol);
        }

        let rest = reader.bits_remaining();
        if rest >= 8 || reader.read_bits(rest)? != 0 {
            return Err(HuffmanError::TrailingBits { bits: rest }.into());
        }

        Ok(output)
    }
}

/// Binary trie of the canonical codes, stored as an arena.
///
/// Index 0 is the root; since the root is never anyone's child, a child
/// slot of 0 means "no child".
struct DecodeTree {
    nodes: Vec<DecodeNode>,
}

#[derive(Clone, Copy, Default)]
struct DecodeNode {
    children: [usize; 2],
    symbol: Option<u8>,
}

impl DecodeTree {
    const ROOT: usize = 0;

    fn from_table(table: &CodeTable) -> Self {
        let mut nodes = vec![DecodeNode::default()];

        for (symbol, code) in table.iter() {
            let mut node = Self::ROOT;
            for depth in (0..code.len).rev() {
                let bit = ((code.bits >> depth) & 1) as usize;
                node = match nodes[node].children[bit] {
                    0 => {
                        nodes.push(DecodeNode::default());
                        let child = nodes.len() - 1;
                        nodes[node].children[bit] = child;
                        child
                    }
                    child => child,
                };
            }
            nodes[node].symbol = Some(symbol);
        }

        Self { nodes }
    }

    fn child(&self, node: usize, bit: bool) -> Option<usize> {
        match self.nodes[node].children[bit as usize] {
            0 => None,
            child => Some(child),
        }
    }

    fn symbol(&self, node: usize) -> Option<u8> {
        self.nodes[node].symbol
    }
}
