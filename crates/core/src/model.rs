//! Static per-symbol frequency model.
//!
//! A [`FrequencyTable`] is built fresh for every compress call and handed to
//! exactly one coder; nothing here is shared between calls.

/// Number of distinct symbols (one per byte value).
pub const ALPHABET_SIZE: usize = 256;

/// Occurrence count for each byte value.
///
/// # Invariants
/// - `total()` equals the length of the input the table was built from
/// - an all-zero table is valid and describes empty input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
}

impl FrequencyTable {
    /// Count the occurrences of every byte value in `bytes`.
    pub fn build(bytes: &[u8]) -> Self {
        let mut counts = [0u64; ALPHABET_SIZE];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Wrap raw counts, e.g. a model read back from a container.
    pub fn from_counts(counts: [u64; ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; ALPHABET_SIZE] {
        &self.counts
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Number of symbols with a nonzero count.
    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// The only symbol present, if exactly one symbol has a nonzero count.
    pub fn single_symbol(&self) -> Option<u8> {
        let mut present = self
            .counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, _)| s as u8);

        match (present.next(), present.next()) {
            (Some(symbol), None) => Some(symbol),
            _ => None,
        }
    }

    /// Symbols with a nonzero count, in ascending order.
    pub fn present_symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, _)| s as u8)
    }

    /// Prefix sums in ascending symbol order.
    pub fn to_cumulative(&self) -> CumulativeFrequencyTable {
        let mut cumulative = [0u64; ALPHABET_SIZE];
        let mut running = 0u64;
        for (slot, &count) in cumulative.iter_mut().zip(self.counts.iter()) {
            running += count;
            *slot = running;
        }
        CumulativeFrequencyTable { cumulative }
    }
}

/// Running totals of a [`FrequencyTable`], inclusive of each symbol.
///
/// Symbol `s` owns the half-open interval
/// `[cumulative[s - 1], cumulative[s])` (with `cumulative[-1] = 0`).
///
/// # Invariants
/// - entries are non-decreasing
/// - the last entry equals the table total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeFrequencyTable {
    cumulative: [u64; ALPHABET_SIZE],
}

impl CumulativeFrequencyTable {
    pub fn entries(&self) -> &[u64; ALPHABET_SIZE] {
        &self.cumulative
    }

    pub fn total(&self) -> u64 {
        self.cumulative[ALPHABET_SIZE - 1]
    }

    /// Half-open interval `[low, high)` owned by `symbol`.
    pub fn interval(&self, symbol: u8) -> (u64, u64) {
        let s = symbol as usize;
        let low = if s == 0 { 0 } else { self.cumulative[s - 1] };
        (low, self.cumulative[s])
    }

    /// Symbol whose interval contains `value`, or `None` if `value >= total`.
    ///
    /// Binary search for the first entry strictly greater than `value`; that
    /// symbol necessarily has a nonzero count.
    pub fn symbol_for(&self, value: u64) -> Option<u8> {
        if value >= self.total() {
            return None;
        }
        let index = self.cumulative.partition_point(|&c| c <= value);
        Some(index as u8)
    }
}
