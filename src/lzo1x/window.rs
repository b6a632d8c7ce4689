// Circular history window for back-reference resolution.
//
// The decoder appends every produced byte here so that later instructions
// can copy from the most recent output. The capacity is rounded up from the
// largest representable match distance (49151) to a power of two so index
// arithmetic is a mask instead of a modulo.

use super::opcode::MAX_MATCH_DISTANCE;

/// Window capacity in bytes. Must stay a power of two and must exceed
/// [`MAX_MATCH_DISTANCE`].
pub const WINDOW_SIZE: usize = 1 << 16;

const WINDOW_MASK: usize = WINDOW_SIZE - 1;

// A match can never look farther back than the window holds.
const _: () = assert!(WINDOW_SIZE > MAX_MATCH_DISTANCE);
const _: () = assert!(WINDOW_SIZE.is_power_of_two());

/// Fixed-capacity circular byte buffer with a movable logical cursor.
///
/// The cursor marks where the next [`append`](HistoryWindow::append) writes.
/// After `T` total bytes have been appended, the byte at `cursor - k`
/// (mod capacity) is the `k`-th most recently appended byte for
/// `k <= min(T, WINDOW_SIZE)`. The window itself does not track `T`;
/// rejecting reads beyond the appended prefix is the caller's job.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    buf: Box<[u8]>,
    cursor: usize,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; WINDOW_SIZE].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Position at which the next append writes.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor by `delta` bytes (negative values rewind), wrapping
    /// at the capacity.
    #[inline]
    pub fn seek(&mut self, delta: isize) {
        self.cursor = self.cursor.wrapping_add(delta as usize) & WINDOW_MASK;
    }

    /// Write `bytes` at the cursor, wrapping at the capacity, and advance
    /// the cursor past them. Appending more than the capacity in one call
    /// keeps only the trailing `WINDOW_SIZE` bytes, which is all a match
    /// can reach anyway.
    pub fn append(&mut self, bytes: &[u8]) {
        let src = if bytes.len() > WINDOW_SIZE {
            &bytes[bytes.len() - WINDOW_SIZE..]
        } else {
            bytes
        };

        let first = src.len().min(WINDOW_SIZE - self.cursor);
        self.buf[self.cursor..self.cursor + first].copy_from_slice(&src[..first]);
        let rest = &src[first..];
        self.buf[..rest.len()].copy_from_slice(rest);
        self.cursor = (self.cursor + src.len()) & WINDOW_MASK;
    }

    /// Copy `dst.len()` bytes starting at the cursor into `dst`, wrapping
    /// at the capacity. Does not move the cursor.
    pub fn read_at_cursor(&self, dst: &mut [u8]) {
        debug_assert!(dst.len() <= WINDOW_SIZE);
        let first = dst.len().min(WINDOW_SIZE - self.cursor);
        dst[..first].copy_from_slice(&self.buf[self.cursor..self.cursor + first]);
        let rest_len = dst.len() - first;
        dst[first..].copy_from_slice(&self.buf[..rest_len]);
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
