//! Datagram decoding tests.
//!
//! Builds datagrams the way an external sender does (header + body in
//! network byte order) and checks what the service would accept.

use rtw_common::consts::{MAX_DATAGRAM_SIZE, TR_TYPE_INPUT, TR_TYPE_OUTPUT};
use rtw_common::prelude::*;

fn sender_datagram(msg_type: u32, num: u32, values: &[f32]) -> Vec<u8> {
    let mut data = Vec::new();
    for word in [msg_type, num, 1_700_000_000, 250_000] {
        data.extend_from_slice(&word.to_be_bytes());
    }
    for v in values {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data
}

#[test]
fn test_input_datagram_accepted() {
    let data = sender_datagram(TR_TYPE_INPUT, 42, &[1.0, 2.0, 3.0, 4.0]);
    let msg = TransportMessage::parse(&data).expect("parse");

    assert_eq!(msg.header.num, 42);
    assert_eq!(msg.header.sec, 1_700_000_000);
    assert_eq!(msg.header.usec, 250_000);

    let input: InputRecord = msg.convert().expect("convert");
    assert_eq!(input, InputRecord::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_output_datagram_rejected_as_input() {
    let data = sender_datagram(TR_TYPE_OUTPUT, 1, &[1.0, 2.0, 3.0, 4.0]);
    let msg = TransportMessage::parse(&data).expect("parse");
    assert!(matches!(
        msg.convert::<InputRecord>(),
        Err(WireError::TypeMismatch { actual: 2, expected: 1, .. })
    ));
}

#[test]
fn test_truncated_datagrams() {
    assert!(matches!(
        TransportMessage::parse(&[0u8; 4]),
        Err(WireError::ShortHeader { .. })
    ));

    let data = sender_datagram(TR_TYPE_INPUT, 1, &[1.0, 2.0, 3.0]);
    let msg = TransportMessage::parse(&data).expect("parse");
    assert!(matches!(
        msg.convert::<InputRecord>(),
        Err(WireError::ShortBody { len: 12, need: 16, .. })
    ));
}

#[test]
fn test_framed_output_fits_datagram() {
    let datagram = TransportMessage::frame(5, &OutputRecord::new(0.1, 0.2, 0.3));
    assert_eq!(datagram.len(), TransportHeader::SIZE + OutputRecord::SIZE);
    assert!(datagram.len() <= MAX_DATAGRAM_SIZE);

    let msg = TransportMessage::parse(&datagram).expect("parse");
    assert_eq!(msg.header.msg_type, TR_TYPE_OUTPUT);
    assert_eq!(
        msg.convert::<OutputRecord>().expect("convert"),
        OutputRecord::new(0.1, 0.2, 0.3)
    );
}
