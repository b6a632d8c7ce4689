//! Oxilzo: streaming LZO1X decompression in Rust.
//!
//! The crate provides:
//! - A pure-Rust pull-style LZO1X decoder (`lzo1x`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! The decoder consumes a raw LZO1X bitstream (no container framing) from any
//! [`std::io::Read`] source and produces the original bytes through a blocking
//! pull interface: the caller asks for up to N bytes and the decoder supplies
//! at most N, until the end-of-stream instruction is reached.
//!
//! # Quick Start
//!
//! ```
//! use oxilzo::lzo1x;
//!
//! // A 5-byte literal run ("Hello") followed by the end-of-stream instruction.
//! let compressed = [0x16, b'H', b'e', b'l', b'l', b'o', 0x11, 0x00, 0x00];
//!
//! let decoded = lzo1x::decompress_memory(&compressed).unwrap();
//! assert_eq!(decoded, b"Hello");
//! ```
//!
//! For incremental decoding, construct an [`lzo1x::Lzo1xDecoder`] over a
//! reader and pull from it with arbitrary buffer sizes:
//!
//! ```
//! use oxilzo::lzo1x::Lzo1xDecoder;
//!
//! let compressed = [0x16, b'H', b'e', b'l', b'l', b'o', 0x11, 0x00, 0x00];
//! let mut decoder = Lzo1xDecoder::new(&compressed[..]);
//!
//! let mut out = Vec::new();
//! let mut buf = [0u8; 2];
//! loop {
//!     let n = decoder.read(&mut buf).unwrap();
//!     if n == 0 {
//!         break;
//!     }
//!     out.extend_from_slice(&buf[..n]);
//! }
//! assert_eq!(out, b"Hello");
//! ```

pub mod io;
pub mod lzo1x;

#[cfg(feature = "cli")]
pub mod cli;
