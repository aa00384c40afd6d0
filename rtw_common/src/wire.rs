//! Network byte order codec for model datagrams.
//!
//! ## Datagram Layout
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 16   | `TransportHeader` (`!IIII`)            |
//! | 16     | N    | Message body (`!ffff` in, `!fff` out)  |
//!
//! Bodies longer than the message size are accepted and the excess ignored.

pub mod header;
pub mod message;

pub use header::TransportHeader;
pub use message::{TransportMessage, WireMessage};

use thiserror::Error;

/// Error types for datagram decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Datagram shorter than the transport header.
    #[error("Cannot unpack transport header: {len} bytes, need {need}")]
    ShortHeader {
        /// Bytes received.
        len: usize,
        /// Bytes required.
        need: usize,
    },

    /// Message body shorter than the expected message.
    #[error("Failed to convert {len} bytes to '{name}': need {need}")]
    ShortBody {
        /// Message name.
        name: &'static str,
        /// Bytes available.
        len: usize,
        /// Bytes required.
        need: usize,
    },

    /// Transport type does not match the expected message.
    #[error("{name}: Type mismatch: {actual} Must be: {expected}")]
    TypeMismatch {
        /// Message name.
        name: &'static str,
        /// Type found in the header.
        actual: u32,
        /// Type the message requires.
        expected: u32,
    },
}

/// Read a big-endian `u32` at `offset`. Caller guarantees bounds.
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(word)
}

/// Read a big-endian `f32` at `offset`. Caller guarantees bounds.
pub(crate) fn read_f32(bytes: &[u8], offset: usize) -> f32 {
    f32::from_bits(read_u32(bytes, offset))
}
