//! Minimal-width big-endian integers.
//!
//! Block pointers are written with exactly as many bytes as the *current block id* needs,
//! so both sides of the codec must agree on the width function. Everything here works on
//! `u64` block ids; a pointer field can therefore carry at most eight significant bytes.

use byteorder::{BigEndian, ByteOrder};
use fehler::{throw, throws};
use thiserror::Error;

/// Errors when converting between integers and their byte representation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthError {
    #[error("{value} needs {needed} bytes but the field is only {width} bytes wide")]
    TooNarrow { value: u64, width: usize, needed: usize },
    #[error("{0} significant bytes do not fit into a 64-bit integer")]
    Overflow(usize),
}
type Error = WidthError;

/// The number of bytes needed to represent `n`, i.e. `ceil(ceil(log2(n + 1)) / 8)`.
///
/// Zero needs no bytes at all.
pub fn minimal_width(n: u64) -> usize {
    let bits = 64 - n.leading_zeros() as usize;
    (bits + 7) / 8
}

/// Big-endian encoding of `n`, zero-padded on the left to exactly `width` bytes.
#[throws]
pub fn to_bytes(n: u64, width: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(width);
    put_bytes(&mut out, n, width)?;
    out
}

/// Like [`to_bytes`], but appends to an existing buffer.
#[throws]
pub fn put_bytes(out: &mut Vec<u8>, n: u64, width: usize) {
    let needed = minimal_width(n);
    if width < needed {
        throw!(WidthError::TooNarrow { value: n, width, needed });
    }

    let start = out.len();
    out.resize(start + width, 0);
    if needed > 0 {
        BigEndian::write_uint(&mut out[start + width - needed..], n, needed);
    }
}

/// Big-endian decoding. The empty slice decodes to zero, and so does any run of zeros.
#[throws]
pub fn from_bytes(bytes: &[u8]) -> u64 {
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[leading_zeros..];
    match significant.len() {
        0 => 0,
        len if len > 8 => throw!(WidthError::Overflow(len)),
        len => BigEndian::read_uint(significant, len),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn width_boundaries() {
        assert_eq!(minimal_width(0), 0);
        assert_eq!(minimal_width(1), 1);
        assert_eq!(minimal_width(255), 1);
        assert_eq!(minimal_width(256), 2);
        assert_eq!(minimal_width(65535), 2);
        assert_eq!(minimal_width(65536), 3);
        assert_eq!(minimal_width(u64::MAX), 8);
    }

    #[test]
    fn width_is_monotonic_and_only_steps_at_byte_boundaries() {
        let mut prev = minimal_width(0);
        for n in 1..200_000u64 {
            let w = minimal_width(n);
            assert!(w >= prev);
            if w != prev {
                assert_eq!(w, prev + 1);
                assert!(n.is_power_of_two() && n.trailing_zeros() % 8 == 0, "stepped at {}", n);
            }
            prev = w;
        }
    }

    #[test]
    fn padding() {
        assert_eq!(to_bytes(0, 0).unwrap(), b"");
        assert_eq!(to_bytes(0, 2).unwrap(), [0, 0]);
        assert_eq!(to_bytes(5, 3).unwrap(), [0, 0, 5]);
        assert_eq!(to_bytes(0x0102, 2).unwrap(), [1, 2]);
        assert_eq!(to_bytes(1, 10).unwrap(), [0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn too_narrow() {
        assert_eq!(
            to_bytes(256, 1).unwrap_err(),
            WidthError::TooNarrow { value: 256, width: 1, needed: 2 }
        );
        to_bytes(1, 0).unwrap_err();
    }

    #[test]
    fn decoding() {
        assert_eq!(from_bytes(&[]).unwrap(), 0);
        assert_eq!(from_bytes(&[0, 0, 0]).unwrap(), 0);
        assert_eq!(from_bytes(&[1, 0]).unwrap(), 256);
        assert_eq!(from_bytes(&[0; 12]).unwrap(), 0);
        assert_eq!(from_bytes(&[0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap(), u64::MAX);
        assert_eq!(from_bytes(&[1; 9]).unwrap_err(), WidthError::Overflow(9));
    }

    #[test]
    fn minimal_roundtrip() {
        for &n in &[0, 1, 2, 127, 255, 256, 4097, 65535, 65536, 1 << 40, u64::MAX] {
            assert_eq!(from_bytes(&to_bytes(n, minimal_width(n)).unwrap()).unwrap(), n);
        }
    }
}
