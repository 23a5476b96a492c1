//! Frame type for the Hazelcast Open Binary Protocol.

use bytes::{BufMut, BytesMut};

use super::constants::*;
use super::flags::FrameFlags;
use super::frame_codec;
use super::header::{Direction, MessageHeader};

/// A single frame in the Hazelcast protocol.
///
/// On the wire each frame is:
/// - A 4-byte length field (little-endian), counting the whole frame
/// - A 2-byte flags field (little-endian)
/// - Variable-length content
///
/// A `Frame` only holds the content; the header is produced when writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame content (payload after flags).
    pub content: BytesMut,
    /// Frame flags indicating frame type and properties.
    pub flags: FrameFlags,
}

impl Frame {
    /// Creates a new frame with the given content and flags.
    pub fn new(content: BytesMut, flags: FrameFlags) -> Self {
        Self { content, flags }
    }

    /// Creates a new frame with content and default flags.
    pub fn with_content(content: BytesMut) -> Self {
        Self::new(content, FrameFlags::empty())
    }

    /// Creates a new frame copying `data`.
    pub fn from_slice(data: &[u8], flags: FrameFlags) -> Self {
        Self::new(BytesMut::from(data), flags)
    }

    /// Creates a new empty frame with the given flags.
    pub fn with_flags(flags: FrameFlags) -> Self {
        Self::new(BytesMut::new(), flags)
    }

    /// Creates a new frame with the given capacity and flags.
    pub fn with_capacity(capacity: usize, flags: FrameFlags) -> Self {
        Self::new(BytesMut::with_capacity(capacity), flags)
    }

    /// Creates the header frame that leads every fragment of a fragmented message.
    pub fn new_fragment_header(fragment_id: i64, flags: FrameFlags) -> Self {
        let mut frame = Self::with_capacity(FRAGMENT_HEADER_SIZE, flags);
        frame.content.put_i64_le(fragment_id);
        frame
    }

    /// Creates a null frame (represents a null value).
    pub fn new_null_frame() -> Self {
        Self::with_flags(FrameFlags::NULL)
    }

    /// Returns true if this frame has the FINAL flag set.
    pub fn is_final_frame(&self) -> bool {
        self.flags.contains(FrameFlags::FINAL)
    }

    /// Returns true if this frame has the NULL flag set.
    pub fn is_null_frame(&self) -> bool {
        self.flags.contains(FrameFlags::NULL)
    }

    /// Returns true if this frame has the EVENT flag set.
    pub fn is_event_frame(&self) -> bool {
        self.flags.contains(FrameFlags::EVENT)
    }

    /// Returns true if this frame has the BACKUP_EVENT flag set.
    pub fn is_backup_event_frame(&self) -> bool {
        self.flags.contains(FrameFlags::BACKUP_EVENT)
    }

    /// Returns the fragment ID if this frame leads a fragment.
    ///
    /// `None` for an unfragmented frame, whose first bytes hold a message
    /// type, and for content shorter than a fragment header.
    pub fn fragment_id(&self) -> Option<i64> {
        match MessageHeader::decode(self, Direction::Response)? {
            MessageHeader::Fragment { fragment_id } => Some(fragment_id),
            _ => None,
        }
    }

    /// Returns the size of this frame on the wire.
    ///
    /// This is also the value written in the length field.
    pub fn wire_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.content.len()
    }

    /// Writes this frame, header and content, to the given buffer.
    pub fn write_to(&self, dst: &mut BytesMut) {
        self.write_with_flags(dst, self.flags);
    }

    /// Writes this frame with `flags` in place of its own.
    pub(crate) fn write_with_flags(&self, dst: &mut BytesMut, flags: FrameFlags) {
        dst.reserve(self.wire_size());
        frame_codec::write_header(dst, self.content.len(), flags);
        dst.put_slice(&self.content);
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::with_flags(FrameFlags::empty())
    }
}
