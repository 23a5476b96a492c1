#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;

use hazelcast_core::protocol::{ClientMessageCodec, FragmentAssembler};

// Feeds the input in two pieces so a header can straddle the split point.
fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| *b as usize).min(data.len());
    let mut codec = ClientMessageCodec::new();
    let mut assembler = FragmentAssembler::new();
    let mut buf = BytesMut::new();

    for chunk in [&data[..split], &data[split..]] {
        buf.extend_from_slice(chunk);
        loop {
            match codec.decode_message(&mut buf) {
                Ok(Some(unit)) => {
                    if let Some(msg) = assembler.accept(unit) {
                        let _ = msg.message_type();
                        let _ = msg.correlation_id();
                        let _ = msg.partition_id();
                        let _ = msg.frame_count();
                        let _ = msg.is_event();
                        let _ = msg.wire_size();
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }
    }
});
