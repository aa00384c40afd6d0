//! Message bodies and transport framing.
//!
//! - `WireMessage` - Fixed-size big-endian body codec
//! - `TransportMessage` - Header plus raw body of one received datagram

use crate::consts::{TR_TYPE_INPUT, TR_TYPE_OUTPUT};
use crate::model::records::{InputRecord, OutputRecord};
use crate::wire::header::TransportHeader;
use crate::wire::{WireError, read_f32};

/// Fixed-size message body carried in a transport datagram.
pub trait WireMessage: Sized {
    /// Human-readable message name used in diagnostics.
    const NAME: &'static str;
    /// Transport type expected in the header.
    const TR_TYPE: u32;
    /// Encoded body size in bytes.
    const SIZE: usize;

    /// Encode the body in network byte order.
    fn encode(&self) -> Vec<u8>;

    /// Decode the body from the start of `bytes`; excess bytes are ignored.
    ///
    /// # Errors
    /// Returns `WireError::ShortBody` if `bytes` is shorter than `SIZE`.
    fn decode(bytes: &[u8]) -> Result<Self, WireError>;
}

fn check_body<M: WireMessage>(bytes: &[u8]) -> Result<(), WireError> {
    if bytes.len() < M::SIZE {
        return Err(WireError::ShortBody {
            name: M::NAME,
            len: bytes.len(),
            need: M::SIZE,
        });
    }
    Ok(())
}

impl WireMessage for InputRecord {
    const NAME: &'static str = "Input message";
    const TR_TYPE: u32 = TR_TYPE_INPUT;
    const SIZE: usize = 16;

    fn encode(&self) -> Vec<u8> {
        self.to_array()
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect()
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_body::<Self>(bytes)?;
        Ok(Self::new(
            read_f32(bytes, 0),
            read_f32(bytes, 4),
            read_f32(bytes, 8),
            read_f32(bytes, 12),
        ))
    }
}

impl WireMessage for OutputRecord {
    const NAME: &'static str = "Output message";
    const TR_TYPE: u32 = TR_TYPE_OUTPUT;
    const SIZE: usize = 12;

    fn encode(&self) -> Vec<u8> {
        self.to_array()
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect()
    }

    fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        check_body::<Self>(bytes)?;
        Ok(Self::new(
            read_f32(bytes, 0),
            read_f32(bytes, 4),
            read_f32(bytes, 8),
        ))
    }
}

/// One received datagram split into header and body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportMessage {
    /// Decoded transport header.
    pub header: TransportHeader,
    /// Raw body bytes following the header (may be empty).
    pub body: Vec<u8>,
}

impl TransportMessage {
    /// Split a datagram into header and body.
    ///
    /// # Errors
    /// Returns `WireError::ShortHeader` if the datagram cannot hold a header.
    pub fn parse(data: &[u8]) -> Result<Self, WireError> {
        let header = TransportHeader::decode(data)?;
        let body = data[TransportHeader::SIZE..].to_vec();
        Ok(Self { header, body })
    }

    /// Returns `true` if the header carries the transport type of `M`.
    pub fn is<M: WireMessage>(&self) -> bool {
        self.header.msg_type == M::TR_TYPE
    }

    /// Convert the body into a concrete message.
    ///
    /// # Errors
    /// - `WireError::TypeMismatch` if the header type is not `M::TR_TYPE`
    /// - `WireError::ShortBody` if the body is too short
    pub fn convert<M: WireMessage>(&self) -> Result<M, WireError> {
        if !self.is::<M>() {
            return Err(WireError::TypeMismatch {
                name: M::NAME,
                actual: self.header.msg_type,
                expected: M::TR_TYPE,
            });
        }
        M::decode(&self.body)
    }

    /// Build a framed datagram: header with `M::TR_TYPE` followed by the body.
    pub fn frame<M: WireMessage>(num: u32, message: &M) -> Vec<u8> {
        let header = TransportHeader::now(M::TR_TYPE, num);
        let mut out = Vec::with_capacity(TransportHeader::SIZE + M::SIZE);
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&message.encode());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_body_layout() {
        let bytes = InputRecord::new(1.0, 0.0, -2.0, 0.5).encode();
        assert_eq!(bytes.len(), InputRecord::SIZE);
        assert_eq!(&bytes[0..4], &1.0f32.to_be_bytes());
        assert_eq!(&bytes[8..12], &(-2.0f32).to_be_bytes());
    }

    #[test]
    fn output_decode_ignores_excess() {
        let mut bytes = OutputRecord::new(3.0, 2.0, 1.0).encode();
        bytes.extend_from_slice(&[0xAA; 8]);
        let out = OutputRecord::decode(&bytes).unwrap();
        assert_eq!(out, OutputRecord::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn short_body_rejected() {
        let err = InputRecord::decode(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, WireError::ShortBody { len: 12, need: 16, .. }));
    }

    #[test]
    fn parse_allows_empty_body() {
        let header = TransportHeader {
            msg_type: TR_TYPE_INPUT,
            num: 3,
            sec: 0,
            usec: 0,
        };
        let msg = TransportMessage::parse(&header.encode()).unwrap();
        assert!(msg.body.is_empty());
        assert!(matches!(
            msg.convert::<InputRecord>(),
            Err(WireError::ShortBody { len: 0, .. })
        ));
    }

    #[test]
    fn convert_checks_type() {
        let datagram = TransportMessage::frame(9, &OutputRecord::new(1.0, 2.0, 3.0));
        let msg = TransportMessage::parse(&datagram).unwrap();
        assert_eq!(msg.header.num, 9);
        assert!(msg.is::<OutputRecord>());

        let err = msg.convert::<InputRecord>().unwrap_err();
        assert_eq!(
            err,
            WireError::TypeMismatch {
                name: "Input message",
                actual: TR_TYPE_OUTPUT,
                expected: TR_TYPE_INPUT,
            }
        );
        assert_eq!(
            msg.convert::<OutputRecord>().unwrap(),
            OutputRecord::new(1.0, 2.0, 3.0)
        );
    }
}
