//! Transport header preceding every datagram body.

use crate::consts::TRANSPORT_HEADER_SIZE;
use crate::wire::{WireError, read_u32};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Transport header (`!IIII`, 16 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportHeader {
    /// Message type (1 = input, 2 = output).
    pub msg_type: u32,
    /// Sender sequence number.
    pub num: u32,
    /// Send time, seconds part.
    pub sec: u32,
    /// Send time, microseconds part.
    pub usec: u32,
}

impl TransportHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = TRANSPORT_HEADER_SIZE;

    /// Create a header stamped with the current wall-clock time.
    pub fn now(msg_type: u32, num: u32) -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            msg_type,
            num,
            sec: since_epoch.as_secs() as u32,
            usec: since_epoch.subsec_micros(),
        }
    }

    /// Encode in network byte order.
    pub fn encode(&self) -> [u8; TRANSPORT_HEADER_SIZE] {
        let mut buf = [0u8; TRANSPORT_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.msg_type.to_be_bytes());
        buf[4..8].copy_from_slice(&self.num.to_be_bytes());
        buf[8..12].copy_from_slice(&self.sec.to_be_bytes());
        buf[12..16].copy_from_slice(&self.usec.to_be_bytes());
        buf
    }

    /// Decode from the start of `bytes`.
    ///
    /// # Errors
    /// Returns `WireError::ShortHeader` if fewer than 16 bytes are given.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < Self::SIZE {
            return Err(WireError::ShortHeader {
                len: bytes.len(),
                need: Self::SIZE,
            });
        }
        Ok(Self {
            msg_type: read_u32(bytes, 0),
            num: read_u32(bytes, 4),
            sec: read_u32(bytes, 8),
            usec: read_u32(bytes, 12),
        })
    }
}

impl fmt::Display for TransportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {} num: {} sec: {} usec: {}",
            self.msg_type, self.num, self.sec, self.usec
        )
    }
}
