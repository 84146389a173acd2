//! entropy-bench-core: static Huffman and arithmetic coding for comparison
//!
//! Both coders compress a whole in-memory buffer against a static
//! per-buffer frequency model and share one container layout, so their
//! output sizes and speeds can be compared directly.
//!
//! # Architecture
//!
//! - `bitio`: MSB-first bit reading/writing
//! - `model`: frequency and cumulative-frequency tables
//! - `huffman`: canonical Huffman codec with deterministic tie-breaking
//! - `arithmetic`: 32-bit range coder with underflow handling
//! - `container`: self-describing binary layout
//! - `codec`: the compress/decompress entry points
//!
//! # Example
//! ```
//! use entropy_bench_core::{compress_arithmetic, decompress, CompressedContainer};
//!
//! let container = compress_arithmetic(b"abracadabra").unwrap();
//! let bytes = container.to_bytes();
//!
//! let parsed = CompressedContainer::from_bytes(&bytes).unwrap();
//! assert_eq!(decompress(&parsed).unwrap(), b"abracadabra");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: malformed containers produce structured errors
//! - **Deterministic**: identical input and mode give identical bytes
//! - **No shared state**: every call owns its model, tree and bit cursor

pub mod arithmetic;
pub mod bitio;
pub mod codec;
pub mod container;
pub mod error;
pub mod huffman;
pub mod model;

pub use codec::{
    compress, compress_arithmetic, compress_huffman, decompress, decompress_arithmetic,
    decompress_huffman,
};
pub use container::{CompressedContainer, Mode};
pub use error::{Error, ErrorKind, Result};
