//! ClientMessage type for multi-frame Hazelcast protocol messages.

use bytes::{BufMut, BytesMut};

use super::constants::*;
use super::flags::FrameFlags;
use super::frame::Frame;
use super::frame_codec;
use super::header::{Direction, MessageHeader};

/// A client message composed of one or more frames.
///
/// The first frame is the "initial frame" containing the message header
/// (type, correlation ID, partition ID for requests), or the fragment ID when
/// the message is one fragment of a larger one. Additional frames contain the
/// message payload. Frames are kept in wire order and owned by the message
/// until it is handed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMessage {
    frames: Vec<Frame>,
}

impl ClientMessage {
    /// Creates a new empty client message.
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Creates a message whose first frame is `frame`.
    pub fn with_initial_frame(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Creates a request message with the given type and partition ID.
    ///
    /// The correlation ID starts at zero; the invocation layer assigns it
    /// with [`set_correlation_id`](Self::set_correlation_id) before sending.
    pub fn create_for_encode(message_type: i32, partition_id: i32) -> Self {
        let header = MessageHeader::Request {
            message_type,
            correlation_id: 0,
            partition_id,
        };
        Self::with_initial_frame(header.to_frame(FrameFlags::empty()))
    }

    /// Creates a request message targeting any partition.
    pub fn create_for_encode_any_partition(message_type: i32) -> Self {
        Self::create_for_encode(message_type, PARTITION_ID_ANY)
    }

    /// Creates a client message from received frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Starts an in-progress message from a begin fragment.
    ///
    /// The fragment's own header frame is dropped; the frames after it are
    /// the start of the reassembled message.
    pub fn from_fragment_begin(fragment: ClientMessage) -> Self {
        Self {
            frames: fragment.frames.into_iter().skip(1).collect(),
        }
    }

    /// Consumes the message, returning its frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Returns the decoded first-frame header.
    pub fn header(&self, direction: Direction) -> Option<MessageHeader> {
        self.frames
            .first()
            .and_then(|f| MessageHeader::decode(f, direction))
    }

    /// Returns the flags of the initial frame, or empty flags for an empty message.
    pub fn flags(&self) -> FrameFlags {
        self.frames
            .first()
            .map(|f| f.flags)
            .unwrap_or_default()
    }

    /// Returns the message type of a request or response.
    ///
    /// Returns `None` for an empty message, for a fragment send unit, and when
    /// the initial frame is too short to hold a header.
    pub fn message_type(&self) -> Option<i32> {
        self.header(Direction::Response)
            .and_then(|header| header.message_type())
    }

    /// Sets the message type in the initial frame.
    ///
    /// A short initial frame is zero-padded to a full request header first.
    pub fn set_message_type(&mut self, message_type: i32) {
        if let Some(frame) = self.frames.first_mut() {
            if frame.content.len() < REQUEST_HEADER_SIZE {
                frame.content.resize(REQUEST_HEADER_SIZE, 0);
            }
            frame_codec::write_message_type(&mut frame.content, message_type);
        }
    }

    /// Returns the correlation ID of a request or response.
    ///
    /// `None` under the same conditions as [`message_type`](Self::message_type).
    pub fn correlation_id(&self) -> Option<i64> {
        self.header(Direction::Response)
            .and_then(|header| header.correlation_id())
    }

    /// Sets the correlation ID in the initial frame.
    ///
    /// No-op when the initial frame is too short.
    pub fn set_correlation_id(&mut self, correlation_id: i64) {
        if let Some(frame) = self.frames.first_mut() {
            frame_codec::write_correlation_id(&mut frame.content, correlation_id);
        }
    }

    /// Returns the partition ID, reading the initial frame as a request header.
    pub fn partition_id(&self) -> Option<i32> {
        match self.header(Direction::Request)? {
            MessageHeader::Request { partition_id, .. } => Some(partition_id),
            _ => None,
        }
    }

    /// Sets the partition ID in the initial frame.
    ///
    /// No-op when the initial frame is too short.
    pub fn set_partition_id(&mut self, partition_id: i32) {
        if let Some(frame) = self.frames.first_mut() {
            frame_codec::write_partition_id(&mut frame.content, partition_id);
        }
    }

    /// Returns the backup acknowledgement count, reading the initial frame as
    /// a response header.
    ///
    /// The byte shares its offset with a request's partition ID; only call
    /// this on messages received from a member.
    pub fn backup_acks(&self) -> Option<u8> {
        match self.header(Direction::Response)? {
            MessageHeader::Response { backup_acks, .. } => Some(backup_acks),
            _ => None,
        }
    }

    /// Returns the fragment ID when this message is one fragment send unit.
    ///
    /// `None` for whole messages, whose first bytes hold the message type.
    pub fn fragment_id(&self) -> Option<i64> {
        match self.header(Direction::Response)? {
            MessageHeader::Fragment { fragment_id } => Some(fragment_id),
            _ => None,
        }
    }

    /// Adds a frame to the message.
    pub fn append(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Adds a frame containing a copy of `data`.
    pub fn append_data(&mut self, data: &[u8]) {
        self.frames.push(Frame::from_slice(data, FrameFlags::empty()));
    }

    /// Splices the payload frames of `fragment` onto the end of this message.
    ///
    /// The fragment's header frame is skipped. The frame that was last before
    /// the splice loses [`FrameFlags::FINAL`], which stays on the last frame only.
    pub fn append_fragment(&mut self, fragment: ClientMessage) {
        let mut payload = fragment.frames.into_iter().skip(1).peekable();
        if payload.peek().is_none() {
            return;
        }
        if let Some(last) = self.frames.last_mut() {
            last.flags.remove(FrameFlags::FINAL);
        }
        self.frames.extend(payload);
    }

    /// Marks the last frame as the final frame of the message.
    pub fn set_final(&mut self) {
        if let Some(last) = self.frames.last_mut() {
            last.flags |= FrameFlags::FINAL;
        }
    }

    /// Returns a reference to the initial (first) frame, if present.
    pub fn first_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Returns a reference to the last frame, if present.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Returns a reference to all frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns a mutable reference to all frames.
    pub fn frames_mut(&mut self) -> &mut Vec<Frame> {
        &mut self.frames
    }

    /// Returns the number of frames in the message.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the message has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Calculates the total size of the message on the wire.
    pub fn wire_size(&self) -> usize {
        self.frames.iter().map(Frame::wire_size).sum()
    }

    /// Returns the concatenated content of every frame.
    pub fn payload(&self) -> BytesMut {
        let mut payload = BytesMut::with_capacity(self.frames.iter().map(|f| f.content.len()).sum());
        for frame in &self.frames {
            payload.put_slice(&frame.content);
        }
        payload
    }

    /// Yields every frame together with the flags it is sent with.
    ///
    /// Only the last frame carries [`FrameFlags::FINAL`] on the wire. A
    /// `FINAL` left on an earlier frame would end the send unit early, so it
    /// is cleared there.
    pub fn wire_frames(&self) -> impl Iterator<Item = (&Frame, FrameFlags)> + '_ {
        let last = self.frames.len().saturating_sub(1);
        self.frames.iter().enumerate().map(move |(index, frame)| {
            let flags = if index == last {
                frame.flags | FrameFlags::FINAL
            } else {
                frame.flags.difference(FrameFlags::FINAL)
            };
            (frame, flags)
        })
    }

    /// Writes all frames to the destination buffer with their
    /// [`wire_frames`](Self::wire_frames) flags.
    pub fn write_to(&self, dst: &mut BytesMut) {
        for (frame, flags) in self.wire_frames() {
            frame.write_with_flags(dst, flags);
        }
    }

    /// Returns true if this message is flagged as an event.
    pub fn is_event(&self) -> bool {
        self.flags().contains(FrameFlags::EVENT)
    }

    /// Returns true if this message is a backup acknowledgement event.
    pub fn is_backup_event(&self) -> bool {
        self.flags().contains(FrameFlags::BACKUP_EVENT)
    }
}
