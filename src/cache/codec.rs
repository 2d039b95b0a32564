//! Counter Codec Module
//!
//! Encodes and decodes `u64` counters as unsigned LEB128 varints, the format
//! expected by INCREMENT and DECREMENT.

use thiserror::Error;

/// Longest possible encoding of a `u64` (ceil(64 / 7) bytes).
pub const MAX_ENCODED_LEN: usize = 10;

// == Counter Error ==
/// Reasons a stored value cannot be read back as a counter.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterError {
    /// The value holds no bytes at all
    #[error("counter value is empty")]
    Empty,

    /// The last byte still has the continuation bit set
    #[error("counter value is truncated")]
    Truncated,

    /// The varint does not fit in 64 bits
    #[error("counter value overflows a 64-bit integer")]
    Overflow,
}

// == Encode ==
/// Encodes `n` into its shortest varint form.
pub fn encode_counter(mut n: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_ENCODED_LEN);
    while n >= 0x80 {
        buf.push((n as u8) | 0x80);
        n >>= 7;
    }
    buf.push(n as u8);
    buf
}

// == Decode ==
/// Decodes the leading varint of `bytes`.
///
/// Bytes after the terminating byte are ignored, so zero-padded fixed width
/// buffers decode to the same counter.
pub fn decode_counter(bytes: &[u8]) -> Result<u64, CounterError> {
    if bytes.is_empty() {
        return Err(CounterError::Empty);
    }

    let mut n: u64 = 0;
    for (i, &byte) in bytes.iter().take(MAX_ENCODED_LEN).enumerate() {
        let shift = 7 * i as u32;
        if byte < 0x80 {
            // the tenth byte may only carry the single remaining bit
            if i == MAX_ENCODED_LEN - 1 && byte > 1 {
                return Err(CounterError::Overflow);
            }
            return Ok(n | (u64::from(byte) << shift));
        }
        n |= u64::from(byte & 0x7f) << shift;
    }

    if bytes.len() >= MAX_ENCODED_LEN {
        Err(CounterError::Overflow)
    } else {
        Err(CounterError::Truncated)
    }
}
