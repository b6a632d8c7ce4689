// LZO1X instruction decoding: the streaming pull decoder.
//
// Follows the opcode semantics documented in Documentation/staging/lzo.rst:
// parse one instruction at a time, copy literals from the input, resolve
// matches against the history window, and carry the literal-run state that
// disambiguates opcodes 0..15.
//
// Performance notes:
//   - A fixed scratch buffer stages literal reads and match sub-copies, so
//     the steady-state path performs no heap allocation
//   - Output that does not fit the caller's buffer spills into a reusable
//     `pending` buffer drained by subsequent reads
//   - The window is written exactly once per produced byte, whether the
//     byte reaches the caller directly or through `pending`

use std::io::{self, Read, Write};

use super::opcode::{LzoState, M3_MARKER, M4_MARKER, MAX_EXTENDED_LENGTH};
use super::window::HistoryWindow;

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum DecodeError {
    Io(std::io::Error),
    /// Input ended in the middle of an instruction or literal run.
    UnexpectedEof,
    /// The bitstream violates the opcode grammar.
    CorruptStream(String),
    Unsupported(String),
    InvalidArgument(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnexpectedEof => write!(f, "unexpected end of compressed input"),
            Self::CorruptStream(msg) => write!(f, "corrupt stream: {msg}"),
            Self::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<std::io::Error> for DecodeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> io::Error {
        match e {
            DecodeError::Io(e) => e,
            DecodeError::UnexpectedEof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            DecodeError::CorruptStream(_) => io::Error::new(io::ErrorKind::InvalidData, e),
            DecodeError::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, e),
            DecodeError::InvalidArgument(_) => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}

// ---------------------------------------------------------------------------
// Output sink
// ---------------------------------------------------------------------------

/// Routes produced bytes into the caller's buffer while it has room and
/// spills the rest into the decoder's pending buffer.
struct OutputSink<'a> {
    dst: &'a mut [u8],
    written: usize,
    pending: &'a mut Vec<u8>,
}

impl OutputSink<'_> {
    fn push(&mut self, bytes: &[u8]) {
        let room = self.dst.len() - self.written;
        let direct = room.min(bytes.len());
        self.dst[self.written..self.written + direct].copy_from_slice(&bytes[..direct]);
        self.written += direct;
        self.pending.extend_from_slice(&bytes[direct..]);
    }
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Fill `buf` completely from `reader`, retrying short reads. A clean EOF
/// before `buf` is full is an `UnexpectedEof`; interruptions are retried.
fn fill_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(DecodeError::UnexpectedEof),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Scratch size for literal reads and match sub-copies.
const SCRATCH_SIZE: usize = 512;

/// Streaming LZO1X decoder over any byte source.
///
/// Construct with [`new`](Lzo1xDecoder::new) and pull decompressed bytes
/// with [`read`](Lzo1xDecoder::read); the decoder never reads ahead of what
/// the current instruction requires. The type also implements
/// [`std::io::Read`] for composition with standard I/O adapters.
pub struct Lzo1xDecoder<R: Read> {
    reader: R,
    window: HistoryWindow,
    state: LzoState,
    /// Opcode buffered ahead of its decode step: the stream's first
    /// opcode, which preamble handling fetches and validates early.
    instruction: Option<u8>,
    /// Produced bytes that did not fit the caller's buffer.
    pending: Vec<u8>,
    pending_pos: usize,
    scratch: [u8; SCRATCH_SIZE],
    started: bool,
    ended: bool,
    bytes_consumed: u64,
    bytes_produced: u64,
}

impl<R: Read> Lzo1xDecoder<R> {
    /// Create a decoder over `reader`, which must be positioned at the
    /// first byte of a raw LZO1X stream. No input is consumed until the
    /// first call to [`read`](Lzo1xDecoder::read).
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            window: HistoryWindow::new(),
            state: LzoState::ZeroCopy,
            instruction: None,
            pending: Vec::new(),
            pending_pos: 0,
            scratch: [0u8; SCRATCH_SIZE],
            started: false,
            ended: false,
            bytes_consumed: 0,
            bytes_produced: 0,
        }
    }

    /// Pull up to `dst.len()` decompressed bytes.
    ///
    /// Returns the number of bytes written into `dst`; `0` signals end of
    /// stream (and every call after that keeps returning `0`). May return
    /// fewer than `dst.len()` bytes before the end of the stream; callers
    /// that need an exact count loop. A zero-length `dst` is a no-op.
    ///
    /// Errors are fatal: after an `Err` the decoder is in an unspecified
    /// state and must be dropped.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, DecodeError> {
        if dst.is_empty() {
            return Ok(0);
        }

        let mut written = self.drain_pending(dst);
        while written < dst.len() && !self.ended {
            written += self.step(&mut dst[written..])?;
        }
        Ok(written)
    }

    /// Decode the remainder of the stream into `writer`, returning the
    /// number of bytes written.
    pub fn decode_to<W: Write>(&mut self, writer: &mut W) -> Result<u64, DecodeError> {
        let mut buf = vec![0u8; 8 * 1024];
        let mut total = 0u64;
        loop {
            let n = self.read(&mut buf)?;
            if n == 0 {
                return Ok(total);
            }
            writer.write_all(&buf[..n]).map_err(DecodeError::Io)?;
            total += n as u64;
        }
    }

    /// Total compressed bytes consumed so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Total decompressed bytes produced so far (including bytes still
    /// waiting in the pending buffer).
    pub fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }

    /// Whether the end-of-stream instruction has been observed.
    pub fn finished(&self) -> bool {
        self.ended
    }

    // -- pending ------------------------------------------------------------

    fn drain_pending(&mut self, dst: &mut [u8]) -> usize {
        let avail = self.pending.len() - self.pending_pos;
        let n = avail.min(dst.len());
        dst[..n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
        self.pending_pos += n;
        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }
        n
    }

    // -- input --------------------------------------------------------------

    fn read_byte(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        fill_exact(&mut self.reader, &mut buf)?;
        self.bytes_consumed += 1;
        Ok(buf[0])
    }

    /// Read the two-byte little-endian distance tail of the 16-bit match
    /// classes. The first byte is the low byte and carries the trailing
    /// literal count in its low two bits.
    fn read_le16(&mut self) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        fill_exact(&mut self.reader, &mut buf)?;
        self.bytes_consumed += 2;
        Ok(u16::from_le_bytes(buf))
    }

    /// Accumulate a zero-byte-extended length on top of `base`: each zero
    /// byte adds 255 and the first non-zero byte terminates the run.
    fn read_extended_length(&mut self, base: usize) -> Result<usize, DecodeError> {
        let mut total = base;
        loop {
            let b = self.read_byte()?;
            if b != 0 {
                return Ok(total + b as usize);
            }
            total += 255;
            if total > MAX_EXTENDED_LENGTH {
                return Err(DecodeError::CorruptStream("extended length overflow".into()));
            }
        }
    }

    // -- output -------------------------------------------------------------

    /// Copy `len` literal bytes from the input to the sink and the window.
    fn copy_literals(&mut self, len: usize, sink: &mut OutputSink<'_>) -> Result<(), DecodeError> {
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(SCRATCH_SIZE);
            fill_exact(&mut self.reader, &mut self.scratch[..n])?;
            self.bytes_consumed += n as u64;
            self.window.append(&self.scratch[..n]);
            self.bytes_produced += n as u64;
            sink.push(&self.scratch[..n]);
            remaining -= n;
        }
        Ok(())
    }

    /// Reproduce `len` bytes starting `distance` back in the window.
    ///
    /// Each sub-step copies at most `distance` bytes and appends them to
    /// the window before continuing, so a match longer than its distance
    /// self-replicates byte ranges instead of reading unwritten territory.
    fn copy_match(
        &mut self,
        distance: usize,
        len: usize,
        sink: &mut OutputSink<'_>,
    ) -> Result<(), DecodeError> {
        if distance as u64 > self.bytes_produced {
            return Err(DecodeError::CorruptStream(format!(
                "match distance {distance} exceeds {} produced bytes",
                self.bytes_produced
            )));
        }

        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(distance).min(SCRATCH_SIZE);
            self.window.seek(-(distance as isize));
            self.window.read_at_cursor(&mut self.scratch[..n]);
            self.window.seek(distance as isize);
            self.window.append(&self.scratch[..n]);
            self.bytes_produced += n as u64;
            sink.push(&self.scratch[..n]);
            remaining -= n;
        }
        Ok(())
    }

    // -- instruction decoding -----------------------------------------------

    /// Decode the stream preamble plus one instruction, or a single
    /// instruction once started. Returns the number of bytes written into
    /// `dst`; the overflow, if any, went into `pending`.
    fn step(&mut self, dst: &mut [u8]) -> Result<usize, DecodeError> {
        let mut pending = std::mem::take(&mut self.pending);
        let mut sink = OutputSink {
            dst,
            written: 0,
            pending: &mut pending,
        };

        let result = self.step_inner(&mut sink);
        let written = sink.written;
        self.pending = pending;
        result.map(|()| written)
    }

    fn step_inner(&mut self, sink: &mut OutputSink<'_>) -> Result<(), DecodeError> {
        if !self.started {
            self.started = true;
            if self.read_preamble(sink)? {
                // The preamble produced literals; its validated follow-up
                // opcode waits in `instruction` for the next step.
                return Ok(());
            }
        }

        let inst = match self.instruction.take() {
            Some(op) => op,
            None => self.read_byte()?,
        };
        self.execute(inst, sink)
    }

    /// Handle the first byte of the stream. Returns `true` if it was a
    /// literal preamble (leaving the validated follow-up opcode in
    /// `instruction`), `false` if the byte was an ordinary first opcode.
    fn read_preamble(&mut self, sink: &mut OutputSink<'_>) -> Result<bool, DecodeError> {
        let b0 = self.read_byte()?;
        match b0 {
            16 | 17 => Err(DecodeError::CorruptStream(format!(
                "invalid first byte {b0:#04x}"
            ))),
            b if b > 17 => {
                // Literal preamble: b - 17 bytes, then a match opcode.
                self.copy_literals(b as usize - 17, sink)?;
                self.state = LzoState::LargeCopy;
                let next = self.read_byte()?;
                if next < 16 {
                    return Err(DecodeError::CorruptStream(
                        "literal preamble must be followed by a match opcode".into(),
                    ));
                }
                self.instruction = Some(next);
                Ok(true)
            }
            b => {
                self.instruction = Some(b);
                Ok(false)
            }
        }
    }

    fn execute(&mut self, inst: u8, sink: &mut OutputSink<'_>) -> Result<(), DecodeError> {
        let (len, distance, trailing) = if inst & 0xC0 != 0 {
            // 1 L L D D D S S  (128..255)  length 5 + L, distance 1..2048
            // 0 1 L D D D S S  (64..127)   length 3 + L, distance 1..2048
            // Followed by one byte H: distance = (H << 3) + D + 1.
            let len = ((inst >> 5) + 1) as usize;
            let h = self.read_byte()? as usize;
            let distance = (h << 3) + ((inst as usize >> 2) & 0x7) + 1;
            (len, distance, inst & 0x3)
        } else if inst & M3_MARKER != 0 {
            // 0 0 1 L L L L L  (32..63)  distance 1..16384
            // length = 2 + (L, or 31 + extended if L == 0)
            // Followed by LE16 X: distance = (X >> 2) + 1, trailing = X & 3.
            let l = (inst & 0x1F) as usize;
            let len = if l == 0 {
                self.read_extended_length(2 + 31)?
            } else {
                2 + l
            };
            let x = self.read_le16()? as usize;
            (len, (x >> 2) + 1, (x & 0x3) as u8)
        } else if inst & M4_MARKER != 0 {
            // 0 0 0 1 H L L L  (16..31)  distance 16384..49151
            // length = 2 + (L, or 7 + extended if L == 0)
            // Followed by LE16 X: distance = 16384 + (H << 14) + (X >> 2).
            // Terminates the stream when the encoded distance is 16384.
            let l = (inst & 0x7) as usize;
            let len = if l == 0 {
                self.read_extended_length(2 + 7)?
            } else {
                2 + l
            };
            let x = self.read_le16()? as usize;
            let dist_base = ((inst as usize & 0x8) << 11) | (x >> 2);
            if dist_base == 0 {
                if len != 3 {
                    return Err(DecodeError::CorruptStream(format!(
                        "end-of-stream instruction with length {len}"
                    )));
                }
                self.ended = true;
                return Ok(());
            }
            (len, 16384 + dist_base, (x & 0x3) as u8)
        } else {
            // 0 0 0 0 x x x x  (0..15)  interpretation depends on how many
            // literals the previous instruction produced.
            match self.state {
                LzoState::ZeroCopy => {
                    // Long literal run: length = 3 + (L, or 15 + extended).
                    let len = if inst == 0 {
                        self.read_extended_length(3 + 15)?
                    } else {
                        3 + inst as usize
                    };
                    self.copy_literals(len, sink)?;
                    self.state = LzoState::LargeCopy;
                    return Ok(());
                }
                s if s.is_small_copy() => {
                    // 0 0 0 0 D D S S: two-byte match within 1 kB.
                    // Followed by one byte H: distance = (H << 2) + D + 1.
                    let h = self.read_byte()? as usize;
                    let distance = (h << 2) + ((inst as usize >> 2) & 0x3) + 1;
                    (2, distance, inst & 0x3)
                }
                _ => {
                    // 0 0 0 0 D D S S after a long literal run: three-byte
                    // match in the 2049..3072 range.
                    let h = self.read_byte()? as usize;
                    let distance = (h << 2) + ((inst as usize >> 2) & 0x3) + 2049;
                    (3, distance, inst & 0x3)
                }
            }
        };

        self.copy_match(distance, len, sink)?;
        self.copy_literals(trailing as usize, sink)?;
        self.state = LzoState::from_trailing(trailing);
        Ok(())
    }
}

impl<R: Read> Read for Lzo1xDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Lzo1xDecoder::read(self, buf).map_err(io::Error::from)
    }
}

// ---------------------------------------------------------------------------
// High-level convenience: decode in memory
// ---------------------------------------------------------------------------

/// Decompress a complete in-memory LZO1X stream.
pub fn decompress_memory(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = Lzo1xDecoder::new(input);
    let mut output = Vec::new();
    decoder.decode_to(&mut output)?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
