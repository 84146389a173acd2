//! Self-describing container shared by both coders.
//!
//! # Layout
//!
//! ```text
//! +----------------------+
//! | original_len (8)     |  u64 little-endian
//! +----------------------+
//! | mode (1)             |  0 = Huffman, 1 = Arithmetic
//! +----------------------+
//! | model section        |  Huffman:    256 x u8 code lengths
//! | (absent if len == 0) |  Arithmetic: 256 x u32 LE counts
//! +----------------------+
//! | payload              |  bit-packed, zero-padded, to end of buffer
//! +----------------------+
//! ```
//!
//! A container is built once per compress call and is immutable afterwards.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ContainerError, Result};
use crate::model::ALPHABET_SIZE;

/// Size of the fixed header (length + mode tag).
pub const HEADER_SIZE: usize = 9;

/// Which coder produced a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Huffman = 0,
    Arithmetic = 1,
}

impl Mode {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Huffman => "Huffman",
            Mode::Arithmetic => "Arithmetic",
        }
    }

    /// Size of this mode's model section for non-empty input.
    pub fn model_len(self) -> usize {
        match self {
            Mode::Huffman => ALPHABET_SIZE,
            Mode::Arithmetic => ALPHABET_SIZE * 4,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = ContainerError;

    fn try_from(tag: u8) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(Mode::Huffman),
            1 => Ok(Mode::Arithmetic),
            other => Err(ContainerError::UnsupportedMode(other)),
        }
    }
}

/// The model a decoder needs, as stored in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSection {
    /// Zero-length input carries no model
    Empty,
    /// Canonical Huffman code length per symbol (0 = absent)
    CodeLengths([u8; ALPHABET_SIZE]),
    /// Raw frequency count per symbol
    Counts([u32; ALPHABET_SIZE]),
}

impl ModelSection {
    fn matches(&self, mode: Mode, original_len: u64) -> bool {
        match self {
            ModelSection::Empty => original_len == 0,
            ModelSection::CodeLengths(_) => original_len > 0 && mode == Mode::Huffman,
            ModelSection::Counts(_) => original_len > 0 && mode == Mode::Arithmetic,
        }
    }
}

/// A parsed or freshly built container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedContainer {
    original_len: u64,
    mode: Mode,
    model: ModelSection,
    payload: Vec<u8>,
}

impl CompressedContainer {
    /// Assemble a container.
    ///
    /// # Errors
    /// `ContainerError::ModelMismatch` if `model` does not fit `mode`, or is
    /// `Empty` for non-empty input (and vice versa).
    pub fn new(
        original_len: u64,
        mode: Mode,
        model: ModelSection,
        payload: Vec<u8>,
    ) -> Result<Self> {
        if !model.matches(mode, original_len) {
            return Err(ContainerError::ModelMismatch(mode).into());
        }
        if original_len == 0 && !payload.is_empty() {
            return Err(ContainerError::TrailingBytes(payload.len()).into());
        }
        Ok(Self {
            original_len,
            mode,
            model,
            payload,
        })
    }

    pub fn original_len(&self) -> u64 {
        self.original_len
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn model(&self) -> &ModelSection {
        &self.model
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Length of `to_bytes()` without serializing.
    pub fn encoded_len(&self) -> usize {
        let model_len = match self.model {
            ModelSection::Empty => 0,
            _ => self.mode.model_len(),
        };
        HEADER_SIZE + model_len + self.payload.len()
    }

    /// Serialize to the binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE];
        LittleEndian::write_u64(&mut bytes[0..8], self.original_len);
        bytes[8] = self.mode.tag();
        bytes.reserve(self.encoded_len() - HEADER_SIZE);

        match &self.model {
            ModelSection::Empty => {}
            ModelSection::CodeLengths(lengths) => bytes.extend_from_slice(lengths),
            ModelSection::Counts(counts) => {
                let mut section = [0u8; ALPHABET_SIZE * 4];
                LittleEndian::write_u32_into(counts, &mut section);
                bytes.extend_from_slice(&section);
            }
        }

        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parse the binary layout.
    ///
    /// # Errors
    /// - `ContainerError::Truncated` if the header or model section is cut off
    /// - `ContainerError::UnsupportedMode` for an unknown mode tag
    /// - `ContainerError::TrailingBytes` if a zero-length container has a body
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ContainerError::Truncated {
                required: HEADER_SIZE,
                actual: bytes.len(),
            }
            .into());
        }

        let original_len = LittleEndian::read_u64(&bytes[0..8]);
        let mode = Mode::try_from(bytes[8])?;
        let body = &bytes[HEADER_SIZE..];

        if original_len == 0 {
            if !body.is_empty() {
                return Err(ContainerError::TrailingBytes(body.len()).into());
            }
            return Ok(Self {
                original_len,
                mode,
                model: ModelSection::Empty,
                payload: Vec::new(),
            });
        }

        let model_len = mode.model_len();
        if body.len() < model_len {
            return Err(ContainerError::Truncated {
                required: HEADER_SIZE + model_len,
                actual: bytes.len(),
            }
            .into());
        }
        let (section, payload) = body.split_at(model_len);

        let model = match mode {
            Mode::Huffman => {
                let mut lengths = [0u8; ALPHABET_SIZE];
                lengths.copy_from_slice(section);
                ModelSection::CodeLengths(lengths)
            }
            Mode::Arithmetic => {
                let mut counts = [0u32; ALPHABET_SIZE];
                LittleEndian::read_u32_into(section, &mut counts);
                ModelSection::Counts(counts)
            }
        };

        Ok(Self {
            original_len,
            mode,
            model,
            payload: payload.to_vec(),
        })
    }

    /// Declared length as `usize`.
    ///
    /// # Errors
    /// `ContainerError::LengthOverflow` on platforms where it does not fit.
    pub fn original_len_usize(&self) -> Result<usize> {
        usize::try_from(self.original_len)
            .map_err(|_| ContainerError::LengthOverflow(self.original_len).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    fn sample_lengths() -> [u8; ALPHABET_SIZE] {
        let mut lengths = [0u8; ALPHABET_SIZE];
        lengths[b'a' as usize] = 1;
        lengths[b'b' as usize] = 2;
        lengths[b'c' as usize] = 2;
        lengths
    }

    #[test]
    fn test_huffman_layout() {
        let container = CompressedContainer::new(
            5,
            Mode::Huffman,
            ModelSection::CodeLengths(sample_lengths()),
            vec![0b0101_1000],
        )
        .unwrap();

        let bytes = container.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 256 + 1);
        assert_eq!(bytes.len(), container.encoded_len());
        assert_eq!(&bytes[0..8], &[5, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[8], 0);
        assert_eq!(bytes[HEADER_SIZE + b'a' as usize], 1);
        assert_eq!(bytes[HEADER_SIZE + b'b' as usize], 2);
        assert_eq!(bytes[bytes.len() - 1], 0b0101_1000);

        assert_eq!(CompressedContainer::from_bytes(&bytes).unwrap(), container);
    }

    #[test]
    fn test_arithmetic_counts_little_endian() {
        let mut counts = [0u32; ALPHABET_SIZE];
        counts[1] = 0x0102_0304;
        counts[255] = 7;
        let container = CompressedContainer::new(
            0x0102_0304 + 7,
            Mode::Arithmetic,
            ModelSection::Counts(counts),
            vec![0xAB, 0xCD],
        )
        .unwrap();

        let bytes = container.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE + 1024 + 2);
        assert_eq!(bytes[8], 1);
        assert_eq!(&bytes[HEADER_SIZE + 4..HEADER_SIZE + 8], &[4, 3, 2, 1]);
        assert_eq!(bytes[HEADER_SIZE + 255 * 4], 7);

        assert_eq!(CompressedContainer::from_bytes(&bytes).unwrap(), container);
    }

    #[test]
    fn test_empty_container_is_header_only() {
        for mode in [Mode::Huffman, Mode::Arithmetic] {
            let container =
                CompressedContainer::new(0, mode, ModelSection::Empty, Vec::new()).unwrap();
            let bytes = container.to_bytes();
            assert_eq!(bytes.len(), HEADER_SIZE);
            assert_eq!(bytes[8], mode.tag());

            let parsed = CompressedContainer::from_bytes(&bytes).unwrap();
            assert_eq!(parsed.model(), &ModelSection::Empty);
            assert!(parsed.payload().is_empty());
        }
    }

    #[test]
    fn test_unsupported_mode() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[8] = 2;
        let err = CompressedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMode);
        assert!(matches!(
            err,
            Error::Container(ContainerError::UnsupportedMode(2))
        ));
    }

    #[test]
    fn test_truncated_header_and_model() {
        let err = CompressedContainer::from_bytes(&[1, 0, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfData);

        let mut bytes = vec![0u8; HEADER_SIZE + 100];
        bytes[0] = 3;
        bytes[8] = Mode::Huffman.tag();
        let err = CompressedContainer::from_bytes(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::Container(ContainerError::Truncated { required: 265, .. })
        ));
    }

    #[test]
    fn test_empty_container_with_body_rejected() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.push(0xFF);
        let err = CompressedContainer::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptStream);
    }

    #[test]
    fn test_model_must_match_mode() {
        let result = CompressedContainer::new(
            3,
            Mode::Arithmetic,
            ModelSection::CodeLengths(sample_lengths()),
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Container(ContainerError::ModelMismatch(Mode::Arithmetic)))
        ));

        let result = CompressedContainer::new(3, Mode::Huffman, ModelSection::Empty, Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_tags() {
        assert_eq!(Mode::try_from(0).unwrap(), Mode::Huffman);
        assert_eq!(Mode::try_from(1).unwrap(), Mode::Arithmetic);
        assert!(Mode::try_from(255).is_err());
        assert_eq!(Mode::Arithmetic.name(), "Arithmetic");
    }
}
