//! Reassembly of fragmented messages.
//!
//! A member may split a large message into several send units. Each unit
//! starts with a header frame carrying the fragment ID and one of
//! `BEGIN_FRAGMENT`, `END_FRAGMENT` or neither (a continuation). Units of
//! different messages may interleave on one connection.
//!
//! Anomalies (duplicate begin, continuation or end for an unknown ID) are
//! dropped and logged, never raised: a misbehaving peer must not be able to
//! tear down the client through them.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::header::{Direction, MessageHeader};
use super::ClientMessage;

#[derive(Debug)]
struct PendingMessage {
    message: ClientMessage,
    last_touched: Instant,
}

/// Table of in-progress fragmented messages, keyed by fragment ID.
///
/// An ID is present exactly while its begin fragment has been seen and its
/// end fragment has not. The table belongs to a single inbound stream and is
/// not meant to be shared.
#[derive(Debug, Default)]
pub struct FragmentAssembler {
    pending: HashMap<i64, PendingMessage>,
    idle_timeout: Option<Duration>,
}

impl FragmentAssembler {
    /// Creates an assembler that keeps incomplete messages indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler whose [`evict_idle`](Self::evict_idle) drops
    /// messages that received no fragment for `idle_timeout`.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            idle_timeout: Some(idle_timeout),
        }
    }

    /// Feeds one completed send unit, returning a message ready for dispatch.
    pub fn accept(&mut self, fragment: ClientMessage) -> Option<ClientMessage> {
        self.accept_at(fragment, Instant::now())
    }

    /// Same as [`accept`](Self::accept) with an explicit clock reading.
    pub fn accept_at(&mut self, fragment: ClientMessage, now: Instant) -> Option<ClientMessage> {
        let flags = fragment.flags();
        if flags.is_unfragmented() {
            return Some(fragment);
        }

        let Some(MessageHeader::Fragment { fragment_id }) = fragment.header(Direction::Response)
        else {
            tracing::debug!(
                flags = flags.bits(),
                "dropping fragment without a fragment id"
            );
            return None;
        };

        if flags.is_begin_fragment() {
            match self.pending.entry(fragment_id) {
                Entry::Occupied(_) => {
                    tracing::debug!(fragment_id, "dropping duplicate begin fragment");
                }
                Entry::Vacant(slot) => {
                    tracing::trace!(fragment_id, "begin fragment");
                    slot.insert(PendingMessage {
                        message: ClientMessage::from_fragment_begin(fragment),
                        last_touched: now,
                    });
                }
            }
            return None;
        }

        if flags.is_end_fragment() {
            let Some(mut pending) = self.pending.remove(&fragment_id) else {
                tracing::debug!(fragment_id, "dropping end fragment for unknown id");
                return None;
            };
            pending.message.append_fragment(fragment);
            if pending.message.is_empty() {
                tracing::debug!(fragment_id, "dropping reassembled message without frames");
                return None;
            }
            tracing::trace!(
                fragment_id,
                frames = pending.message.frame_count(),
                "end fragment"
            );
            return Some(pending.message);
        }

        match self.pending.get_mut(&fragment_id) {
            Some(pending) => {
                pending.message.append_fragment(fragment);
                pending.last_touched = now;
            }
            None => {
                tracing::debug!(fragment_id, "dropping continuation fragment for unknown id");
            }
        }
        None
    }

    /// Drops incomplete messages idle for longer than the configured timeout.
    ///
    /// Returns how many were dropped. Does nothing without a timeout.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let Some(idle_timeout) = self.idle_timeout else {
            return 0;
        };

        let before = self.pending.len();
        self.pending.retain(|fragment_id, pending| {
            let idle = now.saturating_duration_since(pending.last_touched);
            let keep = idle <= idle_timeout;
            if !keep {
                tracing::warn!(
                    fragment_id = *fragment_id,
                    idle_ms = idle.as_millis() as u64,
                    "evicting idle fragmented message"
                );
            }
            keep
        });
        before - self.pending.len()
    }

    /// Returns true if a message with this fragment ID is being assembled.
    pub fn contains(&self, fragment_id: i64) -> bool {
        self.pending.contains_key(&fragment_id)
    }

    /// Returns the number of messages being assembled.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no message is being assembled.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every incomplete message.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Frame, FrameFlags};

    fn fragment(fragment_id: i64, flags: FrameFlags, payload: &[u8]) -> ClientMessage {
        let mut msg =
            ClientMessage::with_initial_frame(Frame::new_fragment_header(fragment_id, flags));
        msg.append_data(payload);
        msg.set_final();
        msg
    }

    fn begin(id: i64, payload: &[u8]) -> ClientMessage {
        fragment(id, FrameFlags::BEGIN_FRAGMENT, payload)
    }

    fn middle(id: i64, payload: &[u8]) -> ClientMessage {
        fragment(id, FrameFlags::empty(), payload)
    }

    fn end(id: i64, payload: &[u8]) -> ClientMessage {
        fragment(id, FrameFlags::END_FRAGMENT, payload)
    }

    #[test]
    fn test_unfragmented_passes_through() {
        let mut assembler = FragmentAssembler::new();
        let mut msg = ClientMessage::create_for_encode(1, 0);
        msg.set_final();

        assert_eq!(assembler.accept(msg.clone()), Some(msg));
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_reassembles_in_order() {
        let mut assembler = FragmentAssembler::new();

        assert!(assembler.accept(begin(99, b"AB")).is_none());
        assert!(assembler.contains(99));
        assert!(assembler.accept(middle(99, b"CD")).is_none());
        let message = assembler.accept(end(99, b"EF")).unwrap();

        assert_eq!(&message.payload()[..], b"ABCDEF");
        assert_eq!(message.frame_count(), 3);
        assert!(!assembler.contains(99));
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_interleaved_ids() {
        let mut assembler = FragmentAssembler::new();

        assert!(assembler.accept(begin(1, b"a1")).is_none());
        assert!(assembler.accept(begin(2, b"b1")).is_none());
        assert!(assembler.accept(middle(1, b"a2")).is_none());
        assert!(assembler.accept(middle(2, b"b2")).is_none());
        assert_eq!(assembler.len(), 2);

        let second = assembler.accept(end(2, b"b3")).unwrap();
        let first = assembler.accept(end(1, b"a3")).unwrap();

        assert_eq!(&first.payload()[..], b"a1a2a3");
        assert_eq!(&second.payload()[..], b"b1b2b3");
    }

    #[test]
    fn test_unknown_end_and_continuation_are_dropped() {
        let mut assembler = FragmentAssembler::new();

        assert!(assembler.accept(middle(5, b"x")).is_none());
        assert!(assembler.accept(end(5, b"y")).is_none());
        assert!(assembler.is_empty());

        assert!(assembler.accept(begin(6, b"ok")).is_none());
        let message = assembler.accept(end(6, b"!")).unwrap();
        assert_eq!(&message.payload()[..], b"ok!");
    }

    #[test]
    fn test_duplicate_begin_is_dropped() {
        let mut assembler = FragmentAssembler::new();

        assert!(assembler.accept(begin(7, b"first")).is_none());
        assert!(assembler.accept(begin(7, b"second")).is_none());
        assert_eq!(assembler.len(), 1);

        let message = assembler.accept(end(7, b"-end")).unwrap();
        assert_eq!(&message.payload()[..], b"first-end");
    }

    #[test]
    fn test_fragment_without_id_is_dropped() {
        let mut assembler = FragmentAssembler::new();
        let short = ClientMessage::with_initial_frame(Frame::from_slice(
            &[1, 2],
            FrameFlags::BEGIN_FRAGMENT | FrameFlags::FINAL,
        ));

        assert!(assembler.accept(short).is_none());
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_empty_reassembly_is_dropped() {
        let mut assembler = FragmentAssembler::new();
        let header_only = |flags| {
            ClientMessage::with_initial_frame(Frame::new_fragment_header(3, flags | FrameFlags::FINAL))
        };

        assert!(assembler.accept(header_only(FrameFlags::BEGIN_FRAGMENT)).is_none());
        assert!(assembler.accept(header_only(FrameFlags::END_FRAGMENT)).is_none());
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_evict_idle() {
        let start = Instant::now();
        let mut assembler = FragmentAssembler::with_idle_timeout(Duration::from_secs(10));

        assembler.accept_at(begin(1, b"old"), start);
        assembler.accept_at(begin(2, b"fresh"), start);
        assembler.accept_at(middle(2, b"+"), start + Duration::from_secs(8));

        assert_eq!(assembler.evict_idle(start + Duration::from_secs(12)), 1);
        assert!(!assembler.contains(1));
        assert!(assembler.contains(2));
    }

    #[test]
    fn test_evict_idle_without_timeout() {
        let start = Instant::now();
        let mut assembler = FragmentAssembler::new();
        assembler.accept_at(begin(1, b"old"), start);

        assert_eq!(assembler.evict_idle(start + Duration::from_secs(3600)), 0);
        assert!(assembler.contains(1));
    }
}
