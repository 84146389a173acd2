//! Bit-level I/O shared by both coders.
//!
//! [`BitWriter`] and [`BitReader`] operate MSB-first: the first bit written
//! lands in the most significant bit of the first byte.
//!
//! # Padding Rules
//! - `BitWriter::finish` pads the final partial byte with zero bits
//! - `BitReader` cannot tell padding from data; the logical length travels
//!   out-of-band (the container's original length)
//!
//! # Example
//! ```
//! use entropy_bench_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//! // 10111 -> padded to 10111000
//!
//! let bytes = writer.finish();
//! assert_eq!(bytes, vec![0b1011_1000]);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! ```

use crate::error::{BitIoError, Result};

/// Largest group accepted by `write_bits` / `read_bits`.
pub const MAX_BITS_PER_CALL: usize = 64;

/// Accumulates bits MSB-first into a growing byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8
/// - bits of `partial` below the current fill level are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    /// Current partial byte, filled from the MSB down
    partial: u8,
    /// Number of bits already placed in `partial` (0-7)
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose buffer can hold `bits` without reallocating.
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            partial: 0,
            bit_count: 0,
        }
    }

    /// Append the low `length` bits of `pattern`, most significant first.
    ///
    /// Bits of `pattern` above `length` are ignored.
    ///
    /// # Errors
    /// `BitIoError::InvalidBitCount` if `length > 64`.
    pub fn write_bits(&mut self, pattern: u64, length: usize) -> Result<()> {
        if length > MAX_BITS_PER_CALL {
            return Err(BitIoError::InvalidBitCount(length).into());
        }

        let mut remaining = length;
        while remaining > 0 {
            let free = 8 - self.bit_count as usize;
            let take = remaining.min(free);
            let shift = remaining - take;
            let chunk = ((pattern >> shift) & ((1u64 << take) - 1)) as u8;

            self.partial |= chunk << (free - take);
            self.bit_count += take as u8;
            remaining -= take;

            if self.bit_count == 8 {
                self.bytes.push(self.partial);
                self.partial = 0;
                self.bit_count = 0;
            }
        }

        Ok(())
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.partial |= (bit as u8) << (7 - self.bit_count);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.partial);
            self.partial = 0;
            self.bit_count = 0;
        }
    }

    /// Append `count` copies of `bit`.
    ///
    /// Used for the arithmetic coder's pending bits, whose count is not
    /// bounded by the 64-bit group size.
    pub fn write_run(&mut self, bit: bool, mut count: u64) {
        // Top up the partial byte so the bulk of the run is byte-aligned
        while count > 0 && self.bit_count != 0 {
            self.write_bit(bit);
            count -= 1;
        }

        let fill = if bit { 0xFF } else { 0x00 };
        let whole = (count / 8) as usize;
        self.bytes.resize(self.bytes.len() + whole, fill);

        for _ in 0..count % 8 {
            self.write_bit(bit);
        }
    }

    /// Pad the partial byte with zero bits and return the buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.partial);
        }
        self.bytes
    }

    /// Total number of bits written (including the partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }
}

/// Reads bits MSB-first from a borrowed byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Consume the next `length` bits and return them right-aligned.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if `length > 64`
    /// - `BitIoError::OutOfData` if fewer than `length` bits remain; the
    ///   cursor is left unchanged
    pub fn read_bits(&mut self, length: usize) -> Result<u64> {
        if length > MAX_BITS_PER_CALL {
            return Err(BitIoError::InvalidBitCount(length).into());
        }

        let available = self.bits_remaining();
        if length > available {
            return Err(BitIoError::OutOfData {
                requested: length,
                available,
            }
            .into());
        }

        let mut result = 0u64;
        let mut remaining = length;

        while remaining > 0 {
            let byte = self.data[self.bit_position / 8];
            let left_in_byte = 8 - self.bit_position % 8;
            let take = remaining.min(left_in_byte);

            let mask = ((1u16 << take) - 1) as u8;
            let chunk = (byte >> (left_in_byte - take)) & mask;

            // `take` can be 8 with result still 0, so widen before shifting
            result = (result << take) | chunk as u64;
            self.bit_position += take;
            remaining -= take;
        }

        Ok(result)
    }

    /// Consume a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        let available = self.bits_remaining();
        if available == 0 {
            return Err(BitIoError::OutOfData {
                requested: 1,
                available,
            }
            .into());
        }

        let byte = self.data[self.bit_position / 8];
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }

    /// Current bit position from the start of the buffer.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn test_msb_first_packing() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1).unwrap();
        writer.write_bits(0b0110, 4).unwrap();
        writer.write_bits(0b111, 3).unwrap();
        writer.write_bits(0b01, 2).unwrap();

        assert_eq!(writer.bit_len(), 10);
        assert_eq!(writer.finish(), vec![0b1011_0111, 0b0100_0000]);
    }

    #[test]
    fn test_high_bits_of_pattern_ignored() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFFFF_FFF0 | 0b0101, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b0101_0000]);
    }

    #[test]
    fn test_codes_straddling_bytes() {
        // Three 7-bit codes cross two byte boundaries
        let codes = [0b1010101u64, 0b0011001, 0b1111000];
        let mut writer = BitWriter::new();
        for &code in &codes {
            writer.write_bits(code, 7).unwrap();
        }
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 3);

        let mut reader = BitReader::new(&bytes);
        for &code in &codes {
            assert_eq!(reader.read_bits(7).unwrap(), code);
        }
        // Three padding bits remain
        assert_eq!(reader.bits_remaining(), 3);
        assert_eq!(reader.read_bits(3).unwrap(), 0);
    }

    #[test]
    fn test_full_width_group() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(u64::MAX - 1, 64).unwrap();

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(64).unwrap(), u64::MAX - 1);
    }

    #[test]
    fn test_write_run_spans_whole_bytes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b10, 2).unwrap();
        writer.write_run(true, 20);
        writer.write_run(false, 3);

        assert_eq!(writer.bit_len(), 25);
        assert_eq!(
            writer.finish(),
            vec![0b1011_1111, 0xFF, 0b1111_1100, 0b0000_0000]
        );
    }

    #[test]
    fn test_out_of_data_leaves_cursor() {
        let data = [0b1100_0000];
        let mut reader = BitReader::new(&data);
        reader.read_bits(6).unwrap();

        let err = reader.read_bits(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfData);
        assert!(matches!(
            err,
            Error::BitIo(BitIoError::OutOfData {
                requested: 3,
                available: 2
            })
        ));
        assert_eq!(reader.position(), 6);

        reader.read_bits(2).unwrap();
        assert!(reader.is_empty());
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new();
        assert!(matches!(
            writer.write_bits(0, 65),
            Err(Error::BitIo(BitIoError::InvalidBitCount(65)))
        ));

        let mut reader = BitReader::new(&[0u8; 16]);
        assert!(reader.read_bits(65).is_err());
    }

    #[test]
    fn test_zero_length_is_noop() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        assert!(writer.finish().is_empty());

        let mut reader = BitReader::new(&[]);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
    }
}
