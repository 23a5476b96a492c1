//! Two connections exchanging a fragmented message over an in-memory stream.
//!
//! Run with: `cargo run --example duplex_exchange`

use hazelcast_core::protocol::{next_fragment_id, split_into_fragments, ClientMessage};
use hazelcast_messaging::{handler_fn, MessageConnection, MessagingConfig};
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Hazelcast Messaging Duplex Example ===\n");

    let (client_side, member_side) = tokio::io::duplex(4096);
    let (client, _client_reader) = MessageConnection::from_stream(client_side, MessagingConfig::default());
    let (mut member, member_reader) = MessageConnection::from_stream(member_side, MessagingConfig::from_env()?);

    let (done_tx, done_rx) = oneshot::channel();
    let done_tx = std::sync::Mutex::new(Some(done_tx));
    member.set_message_handler(handler_fn(move |connection_id, message: ClientMessage| {
        let done_tx = done_tx.lock().ok().and_then(|mut slot| slot.take());
        async move {
            println!(
                "{} received message type {:#x} with {} frames ({} bytes)",
                connection_id,
                message.message_type().unwrap_or_default(),
                message.frame_count(),
                message.wire_size()
            );
            if let Some(tx) = done_tx {
                let _ = tx.send(());
            }
        }
    }))?;
    member.activate()?;

    let reader = tokio::spawn(async move { member.run(member_reader).await });

    let mut request = ClientMessage::create_for_encode(0x010100, 42);
    request.set_correlation_id(1);
    for chunk in 0..32u8 {
        request.append_data(&[chunk; 256]);
    }

    let units = split_into_fragments(request, next_fragment_id(), 2048);
    println!("Sending request as {} fragments...", units.len());
    for unit in &units {
        client.send(unit).await?;
    }

    done_rx.await?;
    reader.abort();
    println!("\nDone.");
    Ok(())
}
