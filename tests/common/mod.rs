// Shared helpers for integration tests: a low-level LZO1X stream assembler
// and the reference output model it maintains.
//
// The assembler emits raw opcodes with hand-picked parameters; it is not a
// compressor (it never searches for matches). Each emit method asserts the
// state preconditions the bitstream grammar imposes, and mirrors the
// instruction's effect onto an `expected` buffer using straightforward
// byte-at-a-time semantics, so tests can compare decoder output against an
// independently computed result.

#![allow(dead_code)]

use oxilzo::lzo1x::decoder::{DecodeError, Lzo1xDecoder};

/// Carried literal-run state, tracked the way the decoder tracks it:
/// 0 = no literals, 1..3 = that many trailing literals, 4 = long run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AsmState {
    Zero,
    Small(u8),
    Large,
}

pub struct StreamAssembler {
    stream: Vec<u8>,
    expected: Vec<u8>,
    state: AsmState,
    started: bool,
    /// Set right after the literal preamble: the following opcode must be
    /// a match class (>= 16).
    require_match: bool,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self {
            stream: Vec::new(),
            expected: Vec::new(),
            state: AsmState::Zero,
            started: false,
            require_match: false,
        }
    }

    /// Bytes of uncompressed output the assembled stream produces so far.
    pub fn produced(&self) -> usize {
        self.expected.len()
    }

    pub fn state_is_zero(&self) -> bool {
        self.state == AsmState::Zero
    }

    pub fn state_is_small(&self) -> bool {
        matches!(self.state, AsmState::Small(_))
    }

    pub fn state_is_large(&self) -> bool {
        self.state == AsmState::Large
    }

    pub fn requires_match(&self) -> bool {
        self.require_match
    }

    /// Start the stream with the first-byte literal preamble
    /// (1..=238 bytes).
    pub fn literal_preamble(&mut self, bytes: &[u8]) {
        assert!(!self.started, "preamble must come first");
        assert!((1..=238).contains(&bytes.len()));
        self.stream.push(17 + bytes.len() as u8);
        self.stream.extend_from_slice(bytes);
        self.expected.extend_from_slice(bytes);
        self.state = AsmState::Large;
        self.started = true;
        self.require_match = true;
    }

    /// Emit a long literal run (opcode class 0..15 with zero-copy state).
    /// Valid lengths are 4..=18 or >= 19 via the extended encoding.
    pub fn long_literals(&mut self, bytes: &[u8]) {
        assert!(
            self.state == AsmState::Zero && !self.require_match,
            "long literal runs need zero-copy state"
        );
        let len = bytes.len();
        assert!(len >= 4, "long literal runs encode lengths >= 4");
        if len <= 18 {
            self.stream.push((len - 3) as u8);
        } else {
            self.stream.push(0);
            self.push_extended_tail(len - 18);
        }
        self.stream.extend_from_slice(bytes);
        self.expected.extend_from_slice(bytes);
        self.state = AsmState::Large;
        self.started = true;
        self.require_match = false;
    }

    /// Match with a one-byte distance tail: length 3..=8, distance
    /// 1..=2048 (opcode classes 64..127 and 128..255).
    pub fn match_short(&mut self, distance: usize, len: usize, trailing: &[u8]) {
        assert!((3..=8).contains(&len));
        assert!((1..=2048).contains(&distance));
        let d = distance - 1;
        self.stream.push((((len - 1) << 5) | ((d & 0x7) << 2)) as u8 | trailing.len() as u8);
        self.stream.push((d >> 3) as u8);
        self.apply_match(distance, len);
        self.apply_trailing(trailing);
    }

    /// Match with a two-byte distance tail, distance 1..=16384 (opcode
    /// class 32..63). Valid lengths are 3..=33 or >= 34 via the extended
    /// encoding.
    pub fn match_mid(&mut self, distance: usize, len: usize, trailing: &[u8]) {
        assert!(len >= 3);
        assert!((1..=16384).contains(&distance));
        if len <= 33 {
            self.stream.push(0x20 | (len - 2) as u8);
        } else {
            self.stream.push(0x20);
            self.push_extended_tail(len - 33);
        }
        self.push_le16_tail(distance - 1, trailing.len());
        self.apply_match(distance, len);
        self.apply_trailing(trailing);
    }

    /// Far match, distance 16385..=49151 (opcode class 16..31; the encoded
    /// distance 16384 is the end-of-stream sentinel and cannot be emitted
    /// here). Valid lengths are 3..=9 or >= 10 via the extended encoding.
    pub fn match_far(&mut self, distance: usize, len: usize, trailing: &[u8]) {
        assert!(len >= 3);
        assert!((16385..=49151).contains(&distance));
        let dist_base = distance - 16384;
        let h = (dist_base >> 14) as u8;
        if len <= 9 {
            self.stream.push(0x10 | (h << 3) | (len - 2) as u8);
        } else {
            self.stream.push(0x10 | (h << 3));
            self.push_extended_tail(len - 9);
        }
        self.push_le16_tail(dist_base & 0x3FFF, trailing.len());
        self.apply_match(distance, len);
        self.apply_trailing(trailing);
    }

    /// Two-byte match within 1 kB, valid only in a small-copy state
    /// (opcode class 0..15).
    pub fn match_small_state(&mut self, distance: usize, trailing: &[u8]) {
        assert!(self.state_is_small(), "needs a small-copy state");
        assert!((1..=1024).contains(&distance));
        let d = distance - 1;
        self.stream.push((((d & 0x3) << 2) as u8) | trailing.len() as u8);
        self.stream.push((d >> 2) as u8);
        self.apply_match(distance, 2);
        self.apply_trailing(trailing);
    }

    /// Three-byte match at distance 2049..=3072, valid only in the
    /// large-copy state (opcode class 0..15).
    pub fn match_large_state(&mut self, distance: usize, trailing: &[u8]) {
        assert!(
            self.state == AsmState::Large && !self.require_match,
            "needs the large-copy state"
        );
        assert!((2049..=3072).contains(&distance));
        let d = distance - 2049;
        self.stream.push((((d & 0x3) << 2) as u8) | trailing.len() as u8);
        self.stream.push((d >> 2) as u8);
        self.apply_match(distance, 3);
        self.apply_trailing(trailing);
    }

    /// Terminate the stream and return `(compressed, expected_output)`.
    pub fn finish(mut self) -> (Vec<u8>, Vec<u8>) {
        assert!(self.started, "a stream cannot consist of the terminator alone");
        self.stream.extend_from_slice(&[0x11, 0x00, 0x00]);
        (self.stream, self.expected)
    }

    // -- internals ----------------------------------------------------------

    /// Encode `rem >= 1` as the zero-byte extension: each zero contributes
    /// 255 and the final non-zero byte its own value.
    fn push_extended_tail(&mut self, rem: usize) {
        assert!(rem >= 1);
        let zeros = (rem - 1) / 255;
        let tail = rem - zeros * 255;
        self.stream.extend(std::iter::repeat_n(0u8, zeros));
        self.stream.push(tail as u8);
    }

    fn push_le16_tail(&mut self, dist_bits: usize, trailing: usize) {
        let x = ((dist_bits << 2) | trailing) as u16;
        self.stream.extend_from_slice(&x.to_le_bytes());
    }

    fn apply_match(&mut self, distance: usize, len: usize) {
        assert!(
            distance <= self.expected.len(),
            "match distance {distance} exceeds {} produced bytes",
            self.expected.len()
        );
        let start = self.expected.len() - distance;
        for i in 0..len {
            let b = self.expected[start + i];
            self.expected.push(b);
        }
        self.require_match = false;
    }

    fn apply_trailing(&mut self, trailing: &[u8]) {
        assert!(trailing.len() <= 3);
        self.stream.extend_from_slice(trailing);
        self.expected.extend_from_slice(trailing);
        self.state = match trailing.len() {
            0 => AsmState::Zero,
            n => AsmState::Small(n as u8),
        };
    }
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Decode helpers
// ---------------------------------------------------------------------------

/// Decode `stream` pulling `chunk` bytes at a time.
pub fn decode_chunked(stream: &[u8], chunk: usize) -> Result<Vec<u8>, DecodeError> {
    assert!(chunk > 0);
    let mut decoder = Lzo1xDecoder::new(stream);
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = decoder.read(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// Deterministic byte generator for test payloads.
pub fn gen_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}
