// File-level I/O helpers for LZO1X decompression.
//
// Provides a `decompress_file()` convenience function that wraps the
// streaming decoder with proper buffered I/O. Optionally computes a
// streaming SHA-256 of the output (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::lzo1x::decoder::{DecodeError, Lzo1xDecoder};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Compressed input size in bytes.
    pub compressed_size: u64,
    /// Decompressed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the decompressed output (if `file-io` is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug)]
pub enum IoError {
    /// I/O error (file open, read, write).
    Io(io::Error),
    /// LZO1X decoding error.
    Decode(DecodeError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecodeError> for IoError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// decompress_file
// ---------------------------------------------------------------------------

/// Decompress a raw LZO1X file, writing the output to `output_path`.
///
/// The input is streamed through a `BufReader` and the output through a
/// `BufWriter`; memory use stays bounded regardless of file size.
///
/// When the `file-io` feature is enabled, a SHA-256 checksum of the output
/// is computed incrementally as data flows through.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<DecodeStats, IoError> {
    let input_file = File::open(input_path)?;
    let metadata = input_file.metadata()?;
    if !metadata.is_file() {
        return Err(IoError::Decode(DecodeError::InvalidArgument(format!(
            "{} is not a readable file",
            input_path.display()
        ))));
    }
    let compressed_size = metadata.len();
    let reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let output_file = File::create(output_path)?;
    let mut output_writer = BufWriter::with_capacity(BUF_SIZE, output_file);

    let mut decoder = Lzo1xDecoder::new(reader);

    #[cfg(feature = "file-io")]
    let mut output_hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let output_size = {
        let mut hashing_writer = HashingWriter {
            inner: &mut output_writer,
            hasher: &mut output_hasher,
        };
        decoder.decode_to(&mut hashing_writer)?
    };

    #[cfg(not(feature = "file-io"))]
    let output_size = decoder.decode_to(&mut output_writer)?;

    output_writer.flush()?;

    #[cfg(feature = "file-io")]
    let output_sha256 = Some(output_hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(DecodeStats {
        compressed_size,
        output_size,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
