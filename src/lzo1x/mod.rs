// LZO1X raw bitstream decoding.
//
// This module implements the LZO1X opcode set as documented at kernel.org
// (Documentation/staging/lzo.rst): variable-length single-byte opcodes,
// literal runs copied from the input, and back-references resolved against
// a sliding window of recent output.
//
// # Modules
//
// - `opcode`  — Opcode-class markers, the carried literal-run state, and
//               the zero-byte extended-length encoding
// - `window`  — Circular history window servicing back-references
// - `decoder` — The streaming pull decoder

pub mod decoder;
pub mod opcode;
pub mod window;

// Re-export key types for convenience.
pub use decoder::{DecodeError, Lzo1xDecoder, decompress_memory};
pub use opcode::LzoState;
pub use window::HistoryWindow;
