//! Static arithmetic coding with 32-bit fixed-precision bounds.
//!
//! The whole message maps to a sub-interval of `[0, 2^32)`. For each symbol
//! the current `[low, high]` interval is narrowed to the symbol's share of the
//! cumulative table, then renormalized:
//!
//! - both bounds in the lower half: emit `0`, shift
//! - both bounds in the upper half: emit `1`, shift
//! - bounds straddle the midpoint inside the middle half: remember a pending
//!   bit, shift around the midpoint (the underflow step)
//!
//! Pending bits are emitted, inverted, after the next resolved bit. The
//! decoder mirrors the same state machine with a 32-bit code register.
//!
//! The model total must not exceed [`MAX_TOTAL`] so that every symbol keeps
//! a nonempty sub-interval; [`fit_to_precision`] rescales larger models.

use log::trace;

use crate::bitio::{BitReader, BitWriter};
use crate::error::{ArithmeticError, Result};
use crate::model::{CumulativeFrequencyTable, FrequencyTable, ALPHABET_SIZE};

pub const HALF: u32 = 1 << 31;
pub const QUARTER: u32 = 1 << 30;
const THREE_QUARTERS: u32 = HALF + QUARTER;

/// Largest model total the 32-bit interval can resolve.
pub const MAX_TOTAL: u64 = QUARTER as u64 - 1;

/// Zero bits the decoder may read past the end of the payload.
///
/// The encoder flushes only two disambiguating bits, while the decoder keeps
/// a 32-bit window, so a well-formed payload needs at most 30 implicit bits.
/// The limit is one full window so that zero padding in the last byte never
/// has to be accounted for.
pub const MAX_TAIL_BITS: usize = 32;

/// Working state of the range coder.
///
/// # Invariants
/// - `low <= high` at all times
/// - after renormalization, `high - low > QUARTER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeState {
    pub low: u32,
    pub high: u32,
    /// Underflow steps awaiting the next resolved bit
    pub pending: u64,
}

impl Default for RangeState {
    fn default() -> Self {
        Self {
            low: 0,
            high: u32::MAX,
            pending: 0,
        }
    }
}

/// A frequency model validated for range coding.
#[derive(Debug, Clone)]
pub struct ArithmeticModel {
    cumulative: CumulativeFrequencyTable,
    total: u64,
}

impl ArithmeticModel {
    /// # Errors
    /// - `ArithmeticError::EmptyAlphabet` if the total is zero
    /// - `ArithmeticError::TotalTooLarge` if the total exceeds [`MAX_TOTAL`]
    pub fn new(freqs: &FrequencyTable) -> Result<Self> {
        let cumulative = freqs.to_cumulative();
        let total = cumulative.total();

        if total == 0 {
            return Err(ArithmeticError::EmptyAlphabet.into());
        }
        if total > MAX_TOTAL {
            return Err(ArithmeticError::TotalTooLarge {
                total,
                max: MAX_TOTAL,
            }
            .into());
        }

        Ok(Self { cumulative, total })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    fn interval(&self, symbol: u8) -> (u64, u64) {
        self.cumulative.interval(symbol)
    }
}

/// Scale `freqs` down until its total fits [`MAX_TOTAL`].
///
/// Every symbol with a nonzero count keeps a count of at least 1, so the set
/// of encodable symbols is unchanged. Tables that already fit are returned
/// as-is.
pub fn fit_to_precision(freqs: &FrequencyTable) -> FrequencyTable {
    let total = freqs.total();
    if total <= MAX_TOTAL {
        return freqs.clone();
    }

    // Leave room for the rounding-up of up to 256 tiny counts
    let target = (MAX_TOTAL - ALPHABET_SIZE as u64) as u128;
    let mut scaled = [0u64; ALPHABET_SIZE];
    for (slot, &count) in scaled.iter_mut().zip(freqs.counts().iter()) {
        if count > 0 {
            let share = (count as u128 * target / total as u128) as u64;
            *slot = share.max(1);
        }
    }

    let rescaled = FrequencyTable::from_counts(scaled);
    trace!(
        "rescaled model total {} -> {}",
        total,
        rescaled.total()
    );
    rescaled
}

/// Narrow `[low, high]` to the share `[cum_low, cum_high)` of `total`.
fn narrow(low: u32, high: u32, cum_low: u64, cum_high: u64, total: u64) -> (u32, u32) {
    let range = high as u64 - low as u64 + 1;
    let new_low = low as u64 + range * cum_low / total;
    let new_high = low as u64 + range * cum_high / total - 1;
    (new_low as u32, new_high as u32)
}

/// Bit-emitting half of the coder.
#[derive(Debug, Clone, Default)]
pub struct RangeEncoder {
    state: RangeState,
    writer: BitWriter,
}

impl RangeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RangeState {
        self.state
    }

    /// Narrow the interval to `symbol` and renormalize.
    ///
    /// # Errors
    /// `ArithmeticError::ZeroFrequency` if `symbol` has no share of the model.
    pub fn encode_symbol(&mut self, model: &ArithmeticModel, symbol: u8) -> Result<()> {
        let (cum_low, cum_high) = model.interval(symbol);
        if cum_low == cum_high {
            return Err(ArithmeticError::ZeroFrequency { symbol }.into());
        }

        let (low, high) = narrow(
            self.state.low,
            self.state.high,
            cum_low,
            cum_high,
            model.total,
        );
        debug_assert!(low <= high);
        self.state.low = low;
        self.state.high = high;

        self.renormalize();
        Ok(())
    }

    fn renormalize(&mut self) {
        loop {
            if self.state.high < HALF {
                self.emit(false);
            } else if self.state.low >= HALF {
                self.emit(true);
                self.state.low -= HALF;
                self.state.high -= HALF;
            } else if self.state.low >= QUARTER && self.state.high < THREE_QUARTERS {
                self.state.pending += 1;
                self.state.low -= QUARTER;
                self.state.high -= QUARTER;
            } else {
                break;
            }
            self.state.low <<= 1;
            self.state.high = (self.state.high << 1) | 1;
            debug_assert!(self.state.low <= self.state.high);
        }
    }

    fn emit(&mut self, bit: bool) {
        self.writer.write_bit(bit);
        self.writer.write_run(!bit, self.state.pending);
        self.state.pending = 0;
    }

    /// Emit the two bits that pin a value inside the final interval, plus
    /// any pending bits, and return the padded payload.
    pub fn finish(mut self) -> Vec<u8> {
        self.state.pending += 1;
        let bit = self.state.low >= QUARTER;
        self.emit(bit);
        self.writer.finish()
    }
}

/// Bit-consuming half of the coder.
#[derive(Debug, Clone)]
pub struct RangeDecoder<'a> {
    low: u32,
    high: u32,
    code: u32,
    reader: BitReader<'a>,
    /// Implicit zero bits consumed past the payload end
    overrun: usize,
}

impl<'a> RangeDecoder<'a> {
    /// Prime the 32-bit code register from `payload`.
    pub fn new(payload: &'a [u8]) -> Result<Self> {
        let mut decoder = Self {
            low: 0,
            high: u32::MAX,
            code: 0,
            reader: BitReader::new(payload),
            overrun: 0,
        };
        for _ in 0..32 {
            decoder.code = (decoder.code << 1) | decoder.next_bit()? as u32;
        }
        Ok(decoder)
    }

    fn next_bit(&mut self) -> Result<bool> {
        if !self.reader.is_empty() {
            return self.reader.read_bit();
        }
        if self.overrun >= MAX_TAIL_BITS {
            return Err(ArithmeticError::PayloadExhausted {
                overrun: self.overrun,
            }
            .into());
        }
        self.overrun += 1;
        Ok(false)
    }

    /// Decode one symbol and advance the state.
    ///
    /// # Errors
    /// - `ArithmeticError::ValueOutOfRange` if the code register has left the
    ///   interval or maps outside `[0, total)`
    /// - `ArithmeticError::PayloadExhausted` if renormalization needs more
    ///   bits than the payload plus its implicit tail
    pub fn decode_symbol(&mut self, model: &ArithmeticModel) -> Result<u8> {
        let total = model.total;
        if self.code < self.low || self.code > self.high {
            return Err(ArithmeticError::ValueOutOfRange {
                value: self.code as u64,
                total,
            }
            .into());
        }

        let range = self.high as u64 - self.low as u64 + 1;
        let offset = (self.code - self.low) as u64 + 1;
        let value = (offset * total - 1) / range;

        let symbol = model
            .cumulative
            .symbol_for(value)
            .ok_or(ArithmeticError::ValueOutOfRange { value, total })?;

        let (cum_low, cum_high) = model.interval(symbol);
        let (low, high) = narrow(self.low, self.high, cum_low, cum_high, total);
        self.low = low;
        self.high = high;

        self.renormalize()?;
        Ok(symbol)
    }

    fn renormalize(&mut self) -> Result<()> {
        loop {
            if self.high < HALF {
                // nothing to subtract
            } else if self.low >= HALF {
                self.low -= HALF;
                self.high -= HALF;
                self.code = self.code.wrapping_sub(HALF);
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.low -= QUARTER;
                self.high -= QUARTER;
                self.code = self.code.wrapping_sub(QUARTER);
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.code = (self.code << 1) | self.next_bit()? as u32;
        }
        Ok(())
    }
}

/// Encode `data` against `freqs`.
///
/// A model with a single present symbol produces an empty payload; the
/// container's length field carries all the information.
///
/// # Errors
/// - `ArithmeticError::EmptyAlphabet` if `freqs` sums to zero
/// - `ArithmeticError::TotalTooLarge` if `freqs` was not fitted first
/// - `ArithmeticError::ZeroFrequency` if `data` has a symbol `freqs` lacks
pub fn encode(data: &[u8], freqs: &FrequencyTable) -> Result<Vec<u8>> {
    let model = ArithmeticModel::new(freqs)?;

    if let Some(symbol) = freqs.single_symbol() {
        if let Some(&other) = data.iter().find(|&&b| b != symbol) {
            return Err(ArithmeticError::ZeroFrequency { symbol: other }.into());
        }
        return Ok(Vec::new());
    }

    let mut encoder = RangeEncoder::new();
    for &byte in data {
        encoder.encode_symbol(&model, byte)?;
    }
    Ok(encoder.finish())
}

/// Decode `len` symbols from `payload` using `freqs`.
///
/// # Errors
/// See [`RangeDecoder::decode_symbol`]; also `ArithmeticError::EmptyAlphabet`
/// for a zero-total model.
pub fn decode(payload: &[u8], freqs: &FrequencyTable, len: usize) -> Result<Vec<u8>> {
    let model = ArithmeticModel::new(freqs)?;

    if let Some(symbol) = freqs.single_symbol() {
        return Ok(vec![symbol; len]);
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let mut decoder = RangeDecoder::new(payload)?;
    // Only an initial reservation; skewed models decode several symbols per
    // bit and the vector grows past it
    let reserve = payload.len().saturating_mul(8).saturating_add(MAX_TAIL_BITS);
    let mut output = Vec::with_capacity(len.min(reserve));
    for _ in 0..len {
        output.push(decoder.decode_symbol(&model)?);
    }
    Ok(output)
}
