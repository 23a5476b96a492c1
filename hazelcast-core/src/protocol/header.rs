//! Typed view over the leading bytes of a message's first frame.
//!
//! The first frame of a send unit reuses the same offsets for different
//! fields depending on its flags and on which way the message travels:
//!
//! | offset | request | response | fragment |
//! |--------|---------|----------|----------|
//! | 0 | message type (i32) | message type (i32) | fragment id (i64) |
//! | 4 | correlation id (i64) | correlation id (i64) | |
//! | 12 | partition id (i32) | backup acks (u8) | |
//!
//! [`MessageHeader`] picks the layout once so callers never read a field
//! through the wrong one.

use bytes::BufMut;

use super::constants::*;
use super::flags::FrameFlags;
use super::frame::Frame;
use super::frame_codec;

/// Which way a message travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to member.
    Request,
    /// Member to client.
    Response,
}

/// Decoded first-frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHeader {
    /// Header of a request message.
    Request {
        /// Operation being invoked.
        message_type: i32,
        /// Pairs the request with its response.
        correlation_id: i64,
        /// Target partition, or [`PARTITION_ID_ANY`].
        partition_id: i32,
    },
    /// Header of a response or event message.
    Response {
        /// Response or event type.
        message_type: i32,
        /// Correlation ID of the originating request.
        correlation_id: i64,
        /// Number of backup acknowledgements the caller should wait for.
        backup_acks: u8,
    },
    /// Header frame of one fragment of a fragmented message.
    Fragment {
        /// Shared by every fragment of the same message.
        fragment_id: i64,
    },
}

impl MessageHeader {
    /// Decodes the header carried by `frame`.
    ///
    /// A frame without both fragment bits leads a fragment and only carries a
    /// fragment ID; otherwise `direction` selects the layout. Returns `None`
    /// when the frame is too short for the selected layout.
    pub fn decode(frame: &Frame, direction: Direction) -> Option<Self> {
        let content = &frame.content[..];
        if !frame.flags.is_unfragmented() {
            return frame_codec::read_fragment_id(content)
                .map(|fragment_id| Self::Fragment { fragment_id });
        }

        let message_type = frame_codec::read_message_type(content)?;
        let correlation_id = frame_codec::read_correlation_id(content)?;
        match direction {
            Direction::Request => Some(Self::Request {
                message_type,
                correlation_id,
                partition_id: frame_codec::read_partition_id(content)?,
            }),
            Direction::Response => Some(Self::Response {
                message_type,
                correlation_id,
                backup_acks: frame_codec::read_backup_acks(content)?,
            }),
        }
    }

    /// Builds the first frame carrying this header.
    ///
    /// Request and response headers get [`FrameFlags::UNFRAGMENTED`] merged
    /// into `flags`; fragment headers keep `flags` as given.
    pub fn to_frame(&self, flags: FrameFlags) -> Frame {
        match *self {
            Self::Request {
                message_type,
                correlation_id,
                partition_id,
            } => {
                let mut frame =
                    Frame::with_capacity(REQUEST_HEADER_SIZE, flags | FrameFlags::UNFRAGMENTED);
                frame.content.put_i32_le(message_type);
                frame.content.put_i64_le(correlation_id);
                frame.content.put_i32_le(partition_id);
                frame
            }
            Self::Response {
                message_type,
                correlation_id,
                backup_acks,
            } => {
                let mut frame =
                    Frame::with_capacity(RESPONSE_HEADER_SIZE, flags | FrameFlags::UNFRAGMENTED);
                frame.content.put_i32_le(message_type);
                frame.content.put_i64_le(correlation_id);
                frame.content.put_u8(backup_acks);
                frame
            }
            Self::Fragment { fragment_id } => Frame::new_fragment_header(fragment_id, flags),
        }
    }

    /// Returns the message type, if this header carries one.
    pub fn message_type(&self) -> Option<i32> {
        match *self {
            Self::Request { message_type, .. } | Self::Response { message_type, .. } => {
                Some(message_type)
            }
            Self::Fragment { .. } => None,
        }
    }

    /// Returns the correlation ID, if this header carries one.
    pub fn correlation_id(&self) -> Option<i64> {
        match *self {
            Self::Request { correlation_id, .. } | Self::Response { correlation_id, .. } => {
                Some(correlation_id)
            }
            Self::Fragment { .. } => None,
        }
    }
}
