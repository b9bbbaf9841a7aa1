//! The dictionary codec.
//!
//! Both directions number chunks in discovery order, starting at zero, and both derive the width
//! of the pointer field of block `n` from `n` alone. The wire format is nothing but blocks:
//!
//! ```text
//! block n:  [pointer: minimal_width(n) bytes, big endian][new byte]
//! last:     [pointer: minimal_width(n) bytes, big endian]             (optional)
//! ```
//!
//! A pointer equal to `n` means "no prefix". The optional last block carries no new byte and has
//! no length marker; the decoder recognizes it by running out of input in the middle of a block.
//!
//! Dictionaries live exactly as long as the [`Encoder`] or [`Decoder`] that owns them.

mod decode;
mod dict;
mod encode;

pub use decode::*;
pub use dict::*;
pub use encode::*;
