#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;

use hazelcast_core::protocol::{ClientMessageCodec, Direction, MessageHeader};

fuzz_target!(|data: &[u8]| {
    let mut codec = ClientMessageCodec::new();
    let mut buf = BytesMut::from(data);

    while let Ok(Some(frame)) = codec.decode_frame(&mut buf) {
        let _ = frame.is_final_frame();
        let _ = frame.is_null_frame();
        let _ = frame.fragment_id();
        let _ = frame.wire_size();
        let _ = MessageHeader::decode(&frame, Direction::Request);
        let _ = MessageHeader::decode(&frame, Direction::Response);
    }
});
