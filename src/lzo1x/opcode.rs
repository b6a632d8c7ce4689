// LZO1X opcode constants and carried decoder state.
//
// Opcodes are single bytes whose class is determined by the high bits:
//
//   1 L L D D D S S  (128..255)  match, 5-8 bytes, distance 1..2048
//   0 1 L D D D S S  (64..127)   match, 3-4 bytes, distance 1..2048
//   0 0 1 L L L L L  (32..63)    match, distance 1..16384
//   0 0 0 1 H L L L  (16..31)    match, distance 16384..49151 / terminator
//   0 0 0 0 x x x x  (0..15)     literal run or short match, depending on
//                                how many literals the previous instruction
//                                produced
//
// The `S` bits of a match opcode (or of its distance tail, for the 16-bit
// classes) give the number of literal bytes copied from the input right
// after the match, and that count is the state consulted by the next
// opcode in 0..15.

/// Opcode-class marker for matches within 16 kB distance ("M3").
pub const M3_MARKER: u8 = 0x20;

/// Opcode-class marker for far matches and the terminator ("M4").
pub const M4_MARKER: u8 = 0x10;

/// Largest back-reference distance the opcode set can express:
/// `16384 + (1 << 14) + 16383` from the M4 class.
pub const MAX_MATCH_DISTANCE: usize = 49151;

/// Upper bound accepted while accumulating a zero-byte extended length.
/// Lengths beyond this are rejected as corrupt rather than risking
/// overflow further down.
pub const MAX_EXTENDED_LENGTH: usize = (1 << 31) - 1000;

// ---------------------------------------------------------------------------
// Carried state
// ---------------------------------------------------------------------------

/// Literal-run-length class of the most recently executed instruction.
///
/// Opcodes in 0..15 are the only ones whose interpretation depends on this
/// state; every match opcode uniformly sets the next state from its `S`
/// bits, and a long literal run sets [`LzoState::LargeCopy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzoState {
    /// Previous instruction produced no literals.
    ZeroCopy,
    /// Previous instruction produced one trailing literal.
    SmallCopy1,
    /// Previous instruction produced two trailing literals.
    SmallCopy2,
    /// Previous instruction produced three trailing literals.
    SmallCopy3,
    /// Previous instruction produced a literal run of four or more bytes.
    LargeCopy,
}

impl LzoState {
    /// State carried after a match with trailing-literal field `s` (0..3).
    #[inline]
    pub fn from_trailing(s: u8) -> Self {
        match s & 0x3 {
            0 => Self::ZeroCopy,
            1 => Self::SmallCopy1,
            2 => Self::SmallCopy2,
            _ => Self::SmallCopy3,
        }
    }

    /// Whether the previous instruction ended in 1..3 trailing literals.
    #[inline]
    pub fn is_small_copy(self) -> bool {
        matches!(self, Self::SmallCopy1 | Self::SmallCopy2 | Self::SmallCopy3)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
