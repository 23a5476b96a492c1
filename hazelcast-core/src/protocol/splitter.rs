//! Splitting outbound messages into fragments.

use std::sync::atomic::{AtomicI64, Ordering};

use super::flags::FrameFlags;
use super::frame::Frame;
use super::ClientMessage;

/// Global fragment ID counter.
static FRAGMENT_ID_COUNTER: AtomicI64 = AtomicI64::new(1);

/// Generates a fragment ID unique within this process.
pub fn next_fragment_id() -> i64 {
    FRAGMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Splits `message` into send units of roughly `max_frame_bytes` on the wire.
///
/// A message that already fits, or that has a single frame, comes back as the
/// only element. Otherwise frames are grouped greedily behind fragment header
/// frames flagged begin, continuation and end; a frame is never cut, so a
/// unit holding one oversized frame may exceed the budget. Every unit ends
/// with a `FINAL` frame.
pub fn split_into_fragments(
    mut message: ClientMessage,
    fragment_id: i64,
    max_frame_bytes: usize,
) -> Vec<ClientMessage> {
    message.set_final();
    if message.frame_count() <= 1 || message.wire_size() <= max_frame_bytes {
        return vec![message];
    }

    let mut fragments = Vec::new();
    let mut current = ClientMessage::with_initial_frame(Frame::new_fragment_header(
        fragment_id,
        FrameFlags::BEGIN_FRAGMENT,
    ));

    for mut frame in message.into_frames() {
        frame.flags.remove(FrameFlags::FINAL);
        if current.frame_count() > 1 && current.wire_size() + frame.wire_size() > max_frame_bytes {
            current.set_final();
            fragments.push(current);
            current = ClientMessage::with_initial_frame(Frame::new_fragment_header(
                fragment_id,
                FrameFlags::empty(),
            ));
        }
        current.append(frame);
    }

    if let Some(header) = current.frames_mut().first_mut() {
        header.flags = FrameFlags::END_FRAGMENT;
    }
    current.set_final();
    fragments.push(current);

    tracing::trace!(fragment_id, fragments = fragments.len(), "split message");
    fragments
}
