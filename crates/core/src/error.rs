//! Error types for the entropy coders.
//!
//! All operations return structured errors rather than panicking. Every
//! failure is terminal for the compress/decompress call that raised it;
//! the harness decides whether to abort or record a per-file failure.
//!
//! Component errors are nested under [`Error`], and [`Error::kind`] folds
//! them onto the four kinds callers are expected to branch on.

use thiserror::Error;

use crate::container::Mode;

/// Top-level error type for all core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman table construction or decode failure
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Arithmetic coder failure
    #[error("arithmetic codec error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    /// Container header or model section could not be parsed
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
}

/// Coarse classification of every [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input ended before the expected number of bits or bytes.
    OutOfData,
    /// Decoded data is inconsistent with the declared length or model.
    CorruptStream,
    /// Arithmetic coder invoked with a zero-total model.
    EmptyAlphabet,
    /// Unknown or mismatched mode tag.
    UnsupportedMode,
}

impl Error {
    /// Map this error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BitIo(BitIoError::OutOfData { .. }) => ErrorKind::OutOfData,
            Error::BitIo(BitIoError::InvalidBitCount(_)) => ErrorKind::CorruptStream,
            Error::Huffman(HuffmanError::EmptyFrequencyTable) => ErrorKind::EmptyAlphabet,
            Error::Huffman(_) => ErrorKind::CorruptStream,
            Error::Arithmetic(ArithmeticError::EmptyAlphabet) => ErrorKind::EmptyAlphabet,
            Error::Arithmetic(ArithmeticError::PayloadExhausted { .. }) => ErrorKind::OutOfData,
            Error::Arithmetic(_) => ErrorKind::CorruptStream,
            Error::Container(ContainerError::Truncated { .. }) => ErrorKind::OutOfData,
            Error::Container(ContainerError::UnsupportedMode(_))
            | Error::Container(ContainerError::ModeMismatch { .. }) => ErrorKind::UnsupportedMode,
            Error::Container(_) => ErrorKind::CorruptStream,
        }
    }
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read more bits than remain in the buffer
    #[error("out of data: requested {requested} bits, {available} available")]
    OutOfData { requested: usize, available: usize },

    /// Bit count outside 0..=64
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbols with non-zero frequency (cannot build a tree)
    #[error("empty frequency table: cannot build code table")]
    EmptyFrequencyTable,

    /// A code would not fit the 64-bit code register
    #[error("code length {length} for symbol {symbol} exceeds maximum {max}")]
    CodeLengthTooLong { symbol: u8, length: usize, max: usize },

    /// Serialized code lengths describe more codes than the tree can hold
    #[error("code lengths are oversubscribed (kraft sum > 1)")]
    OversubscribedLengths,

    /// Input contains a symbol the table has no code for
    #[error("symbol {symbol} has no code in this table")]
    MissingSymbol { symbol: u8 },

    /// Bit path led to no symbol
    #[error("invalid huffman code at bit position {position}")]
    InvalidCode { position: usize },

    /// Payload bits ran out before the declared length was decoded
    #[error("payload truncated: decoded {decoded} of {expected} symbols")]
    Truncated { decoded: usize, expected: usize },

    /// Bits left over after the last symbol that are not zero padding
    #[error("{bits} trailing bits after final symbol are not padding")]
    TrailingBits { bits: usize },
}

/// Arithmetic coder errors.
#[derive(Debug, Error)]
pub enum ArithmeticError {
    /// Frequency model sums to zero
    #[error("empty alphabet: model total is zero")]
    EmptyAlphabet,

    /// Model total exceeds what the 32-bit range can resolve
    #[error("model total {total} exceeds maximum {max}")]
    TotalTooLarge { total: u64, max: u64 },

    /// Symbol to encode has a zero count in the model
    #[error("symbol {symbol} has zero frequency in the model")]
    ZeroFrequency { symbol: u8 },

    /// Stored counts disagree with the declared length
    #[error("model total {total} does not match declared length {declared}")]
    LengthMismatch { declared: u64, total: u64 },

    /// Decoder state fell outside the current interval
    #[error("decoded value {value} outside [0, {total})")]
    ValueOutOfRange { value: u64, total: u64 },

    /// Decoder read further past the payload end than the encoder's flush allows
    #[error("payload exhausted after {overrun} implicit padding bits")]
    PayloadExhausted { overrun: usize },
}

/// Container parsing errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Buffer ends inside the header or model section
    #[error("container truncated: need at least {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },

    /// Mode byte is not a known coder
    #[error("unsupported mode tag {0}")]
    UnsupportedMode(u8),

    /// Container was produced by the other coder
    #[error("mode mismatch: expected {expected:?}, got {actual:?}")]
    ModeMismatch { expected: Mode, actual: Mode },

    /// Model section does not belong to the declared mode
    #[error("model section does not match mode {0:?}")]
    ModelMismatch(Mode),

    /// Zero-length container carries extra bytes
    #[error("empty container has {0} unexpected trailing bytes")]
    TrailingBytes(usize),

    /// Declared length does not fit in memory on this platform
    #[error("declared length {0} does not fit in usize")]
    LengthOverflow(u64),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: Error = BitIoError::OutOfData {
            requested: 4,
            available: 1,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::OutOfData);

        let err: Error = HuffmanError::InvalidCode { position: 3 }.into();
        assert_eq!(err.kind(), ErrorKind::CorruptStream);

        let err: Error = ArithmeticError::EmptyAlphabet.into();
        assert_eq!(err.kind(), ErrorKind::EmptyAlphabet);

        let err: Error = ContainerError::UnsupportedMode(7).into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);

        let err: Error = ContainerError::Truncated {
            required: 9,
            actual: 3,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::OutOfData);
    }

    #[test]
    fn test_display() {
        let err: Error = ContainerError::UnsupportedMode(9).into();
        assert_eq!(err.to_string(), "container error: unsupported mode tag 9");
    }
}
