//! Inbound and outbound throughput benchmarks.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hazelcast_core::protocol::{
    split_into_fragments, ClientMessage, ClientMessageCodec, FragmentAssembler,
};
use hazelcast_messaging::{
    handler_fn, ByteSink, MessageConnection, MessageWriter, MessagingConfig, Result,
};

struct DiscardSink;

#[async_trait]
impl ByteSink for DiscardSink {
    async fn send_bytes(&mut self, bytes: Bytes) -> Result<()> {
        black_box(bytes);
        Ok(())
    }
}

fn message(frames: usize, frame_size: usize) -> ClientMessage {
    let mut message = ClientMessage::create_for_encode(0x010100, 12);
    message.set_correlation_id(1);
    for _ in 0..frames {
        message.append_data(&vec![0xAB; frame_size]);
    }
    message.set_final();
    message
}

fn encode_all(messages: &[ClientMessage]) -> BytesMut {
    let codec = ClientMessageCodec::new();
    let mut wire = BytesMut::new();
    for message in messages {
        codec.encode_message(message, &mut wire).unwrap();
    }
    wire
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for frame_size in [16usize, 256, 4096] {
        let wire = encode_all(&vec![message(4, frame_size); 64]);
        group.throughput(Throughput::Bytes(wire.len() as u64));

        group.bench_with_input(BenchmarkId::new("whole", frame_size), &wire, |b, wire| {
            b.iter(|| {
                let mut codec = ClientMessageCodec::new();
                let mut buf = wire.clone();
                let mut count = 0;
                while let Some(message) = codec.decode_message(&mut buf).unwrap() {
                    black_box(&message);
                    count += 1;
                }
                count
            })
        });

        group.bench_with_input(
            BenchmarkId::new("chunked_512", frame_size),
            &wire,
            |b, wire| {
                b.iter(|| {
                    let mut codec = ClientMessageCodec::new();
                    let mut buf = BytesMut::new();
                    let mut count = 0;
                    for chunk in wire.chunks(512) {
                        buf.extend_from_slice(chunk);
                        while let Some(message) = codec.decode_message(&mut buf).unwrap() {
                            black_box(&message);
                            count += 1;
                        }
                    }
                    count
                })
            },
        );
    }

    group.finish();
}

fn bench_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembly");

    let units = split_into_fragments(message(64, 1024), 1, 8192);
    let wire = encode_all(&units);
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("64_frames_8k_units", |b| {
        b.iter(|| {
            let mut codec = ClientMessageCodec::new();
            let mut assembler = FragmentAssembler::new();
            let mut buf = wire.clone();
            let mut completed = None;
            while let Some(unit) = codec.decode_message(&mut buf).unwrap() {
                if let Some(message) = assembler.accept(unit) {
                    completed = Some(message);
                }
            }
            black_box(completed)
        })
    });

    group.finish();
}

fn bench_connection_receive(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("connection");

    let wire = encode_all(&vec![message(2, 64); 256]);
    group.throughput(Throughput::Elements(256));

    group.bench_function("receive_bytes", |b| {
        let _guard = runtime.enter();
        let mut connection = MessageConnection::new(DiscardSink, MessagingConfig::default());
        connection
            .set_message_handler(handler_fn(|_, message| async move {
                black_box(message);
            }))
            .unwrap();
        connection.activate().unwrap();

        b.iter(|| {
            let mut buf = wire.clone();
            connection.receive_bytes(&mut buf).unwrap()
        })
    });

    group.finish();
}

fn bench_send(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("send");

    for frames in [1usize, 8, 64] {
        let message = message(frames, 128);
        group.throughput(Throughput::Bytes(message.wire_size() as u64));

        group.bench_with_input(BenchmarkId::new("writer", frames), &message, |b, message| {
            let writer = MessageWriter::new(Default::default(), DiscardSink);
            let writer = &writer;
            b.to_async(&runtime)
                .iter(|| async move { writer.send(message).await.unwrap() })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_reassembly,
    bench_connection_receive,
    bench_send
);
criterion_main!(benches);
