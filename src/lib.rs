//! # canonical_huffman
//!
//! Canonical Huffman coding over a fixed, caller-declared alphabet of `u64`
//! symbols, with flat or multi-level (256-entry page) decode tables for codes
//! of up to 56 bits.
//!
//! ## Quick Start
//!
//! ```rust
//! use canonical_huffman::{BitVec, BitWrite, HuffCoder};
//!
//! let mut coder = HuffCoder::new(3)?;
//! coder.insert(b'a' as u64, 10)?.insert(b'b' as u64, 3)?.insert(b'c' as u64, 2)?;
//!
//! let mut stream = BitVec::new();
//! for &b in b"abacab" {
//!     coder.encode(b as u64, &mut stream)?;
//! }
//! let bits = stream.bit_len();
//!
//! let mut reader = stream.reader();
//! let decoded = coder.codebook()?.decode_n(6, &mut reader)?;
//! assert_eq!(decoded, b"abacab".iter().map(|&b| b as u64).collect::<Vec<_>>());
//! assert_eq!(bits, 9);
//! # Ok::<(), canonical_huffman::Error>(())
//! ```

pub mod bit_vec;
pub mod canonical;
pub mod config;
pub mod decode_table;
pub mod error;
pub mod huffman_codec;
pub mod hufftree;
pub mod min_heap;

// Re-export main types for convenience
pub use bit_vec::{BitRead, BitReader, BitVec, BitWrite};
pub use config::{CoderConfig, TableStrategy, MAX_CODE_LEN};
pub use error::{Error, Result};
pub use huffman_codec::{Codebook, HuffCoder, SymbolCode};
pub use hufftree::Vlc;
