//! Compress/decompress entry points for both coders.
//!
//! Each call builds its own frequency model and coder state; nothing is
//! shared between calls, so independent inputs can be processed on separate
//! threads with no coordination.

use log::debug;

use crate::arithmetic::{self, MAX_TOTAL};
use crate::container::{CompressedContainer, Mode, ModelSection};
use crate::error::{ArithmeticError, ContainerError, Result};
use crate::huffman::CodeTable;
use crate::model::{FrequencyTable, ALPHABET_SIZE};

/// Compress `data` with canonical Huffman coding.
///
/// Empty input yields a header-only container.
pub fn compress_huffman(data: &[u8]) -> Result<CompressedContainer> {
    if data.is_empty() {
        return CompressedContainer::new(0, Mode::Huffman, ModelSection::Empty, Vec::new());
    }

    let freqs = FrequencyTable::build(data);
    let table = CodeTable::from_frequencies(&freqs)?;
    let payload = table.encode(data)?;

    debug!(
        "huffman: {} bytes, {} symbols, max code length {}, payload {} bytes",
        data.len(),
        freqs.distinct_symbols(),
        table.max_code_length(),
        payload.len()
    );

    CompressedContainer::new(
        data.len() as u64,
        Mode::Huffman,
        ModelSection::CodeLengths(table.code_lengths()),
        payload,
    )
}

/// Decompress a container produced by [`compress_huffman`].
///
/// # Errors
/// `ContainerError::ModeMismatch` for an arithmetic container, otherwise the
/// decode errors of [`CodeTable::decode`].
pub fn decompress_huffman(container: &CompressedContainer) -> Result<Vec<u8>> {
    expect_mode(container, Mode::Huffman)?;
    let len = container.original_len_usize()?;

    let lengths = match container.model() {
        ModelSection::Empty => return Ok(Vec::new()),
        ModelSection::CodeLengths(lengths) => lengths,
        ModelSection::Counts(_) => return Err(ContainerError::ModelMismatch(Mode::Huffman).into()),
    };

    let table = CodeTable::from_code_lengths(lengths)?;
    let output = table.decode(container.payload(), len)?;
    debug!(
        "huffman: decoded {} bytes from {} payload bytes",
        output.len(),
        container.payload().len()
    );
    Ok(output)
}

/// Compress `data` with static arithmetic coding.
///
/// Inputs longer than the coder's precision allows are coded against a
/// proportionally rescaled model; the rescaled counts are what the container
/// stores.
pub fn compress_arithmetic(data: &[u8]) -> Result<CompressedContainer> {
    if data.is_empty() {
        return CompressedContainer::new(0, Mode::Arithmetic, ModelSection::Empty, Vec::new());
    }

    let freqs = arithmetic::fit_to_precision(&FrequencyTable::build(data));
    let payload = arithmetic::encode(data, &freqs)?;

    let mut counts = [0u32; ALPHABET_SIZE];
    for (slot, &count) in counts.iter_mut().zip(freqs.counts().iter()) {
        // fitted totals are below 2^30
        *slot = count as u32;
    }

    debug!(
        "arithmetic: {} bytes, {} symbols, model total {}, payload {} bytes",
        data.len(),
        freqs.distinct_symbols(),
        freqs.total(),
        payload.len()
    );

    CompressedContainer::new(
        data.len() as u64,
        Mode::Arithmetic,
        ModelSection::Counts(counts),
        payload,
    )
}

/// Decompress a container produced by [`compress_arithmetic`].
///
/// # Errors
/// - `ContainerError::ModeMismatch` for a Huffman container
/// - `ArithmeticError::LengthMismatch` if the stored counts cannot describe
///   the declared length
/// - the decode errors of [`arithmetic::decode`]
pub fn decompress_arithmetic(container: &CompressedContainer) -> Result<Vec<u8>> {
    expect_mode(container, Mode::Arithmetic)?;
    let len = container.original_len_usize()?;

    let counts = match container.model() {
        ModelSection::Empty => return Ok(Vec::new()),
        ModelSection::Counts(counts) => counts,
        ModelSection::CodeLengths(_) => {
            return Err(ContainerError::ModelMismatch(Mode::Arithmetic).into())
        }
    };

    let mut wide = [0u64; ALPHABET_SIZE];
    for (slot, &count) in wide.iter_mut().zip(counts.iter()) {
        *slot = count as u64;
    }
    let freqs = FrequencyTable::from_counts(wide);

    // Unscaled models count every byte exactly once; rescaled ones lose at
    // most one unit per symbol to rounding below the rescale target
    let total = freqs.total();
    let declared = container.original_len();
    let consistent = if declared <= MAX_TOTAL {
        total == declared
    } else {
        total >= MAX_TOTAL - 2 * ALPHABET_SIZE as u64
    };
    if !consistent {
        return Err(ArithmeticError::LengthMismatch {
            declared,
            total,
        }
        .into());
    }

    let output = arithmetic::decode(container.payload(), &freqs, len)?;
    debug!(
        "arithmetic: decoded {} bytes from {} payload bytes",
        output.len(),
        container.payload().len()
    );
    Ok(output)
}

/// Compress with the coder selected by `mode`.
pub fn compress(mode: Mode, data: &[u8]) -> Result<CompressedContainer> {
    match mode {
        Mode::Huffman => compress_huffman(data),
        Mode::Arithmetic => compress_arithmetic(data),
    }
}

/// Decompress with the coder named in the container's mode tag.
pub fn decompress(container: &CompressedContainer) -> Result<Vec<u8>> {
    match container.mode() {
        Mode::Huffman => decompress_huffman(container),
        Mode::Arithmetic => decompress_arithmetic(container),
    }
}

fn expect_mode(container: &CompressedContainer, expected: Mode) -> Result<()> {
    if container.mode() != expected {
        return Err(ContainerError::ModeMismatch {
            expected,
            actual: container.mode(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HEADER_SIZE;
    use crate::error::{Error, ErrorKind};

    const MODES: [Mode; 2] = [Mode::Huffman, Mode::Arithmetic];

    #[test]
    fn test_round_trip_both_modes() {
        let data = b"hello world! this is a test of both coders: aaaaaaaaaa bbbbbbbbbb";
        for mode in MODES {
            let container = compress(mode, data).unwrap();
            assert_eq!(container.mode(), mode);
            assert_eq!(decompress(&container).unwrap(), data);
        }
    }

    #[test]
    fn test_empty_input() {
        for mode in MODES {
            let container = compress(mode, b"").unwrap();
            assert_eq!(container.encoded_len(), HEADER_SIZE);
            assert_eq!(container.to_bytes().len(), 9);
            assert!(decompress(&container).unwrap().is_empty());
        }
    }

    #[test]
    fn test_single_byte() {
        for mode in MODES {
            let container = compress(mode, b"A").unwrap();
            assert_eq!(decompress(&container).unwrap(), b"A");
        }
    }

    #[test]
    fn test_mode_mismatch() {
        let container = compress_huffman(b"abc").unwrap();
        let err = decompress_arithmetic(&container).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);

        let container = compress_arithmetic(b"abc").unwrap();
        let err = decompress_huffman(&container).unwrap_err();
        assert!(matches!(
            err,
            Error::Container(ContainerError::ModeMismatch {
                expected: Mode::Huffman,
                actual: Mode::Arithmetic
            })
        ));
    }

    #[test]
    fn test_arithmetic_length_mismatch() {
        let container = compress_arithmetic(b"abcabc").unwrap();
        let mut bytes = container.to_bytes();
        bytes[0] = 7;
        let tampered = CompressedContainer::from_bytes(&bytes).unwrap();

        let err = decompress_arithmetic(&tampered).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptStream);
    }

    fn oversized_model() -> FrequencyTable {
        let mut counts = [0u64; ALPHABET_SIZE];
        counts[b'a' as usize] = 3 << 29;
        counts[b'b' as usize] = 1 << 29;
        FrequencyTable::from_counts(counts)
    }

    fn narrow_counts(freqs: &FrequencyTable) -> [u32; ALPHABET_SIZE] {
        let mut counts = [0u32; ALPHABET_SIZE];
        for (slot, &count) in counts.iter_mut().zip(freqs.counts().iter()) {
            *slot = count as u32;
        }
        counts
    }

    #[test]
    fn test_rescaled_model_accepted_for_large_length() {
        let declared = 1u64 << 31;
        let fitted = arithmetic::fit_to_precision(&oversized_model());
        assert!(fitted.total() < declared);

        // The model check passes; decoding then runs out of payload long
        // before the declared length
        let container = CompressedContainer::new(
            declared,
            Mode::Arithmetic,
            ModelSection::Counts(narrow_counts(&fitted)),
            vec![0x5A; 4],
        )
        .unwrap();

        let err = decompress_arithmetic(&container).unwrap_err();
        assert!(matches!(
            err,
            Error::Arithmetic(ArithmeticError::PayloadExhausted { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::OutOfData);
    }

    #[test]
    fn test_small_model_rejected_for_large_length() {
        let mut counts = [0u32; ALPHABET_SIZE];
        counts[b'a' as usize] = 3;
        counts[b'b' as usize] = 1;

        let container = CompressedContainer::new(
            1 << 31,
            Mode::Arithmetic,
            ModelSection::Counts(counts),
            vec![0x5A; 4],
        )
        .unwrap();

        let err = decompress_arithmetic(&container).unwrap_err();
        assert!(matches!(
            err,
            Error::Arithmetic(ArithmeticError::LengthMismatch {
                declared: 2_147_483_648,
                total: 4
            })
        ));
        assert_eq!(err.kind(), ErrorKind::CorruptStream);
    }
}
