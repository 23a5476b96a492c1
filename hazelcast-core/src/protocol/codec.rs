//! Codec implementation for encoding/decoding Hazelcast protocol messages.
//!
//! Decoding is incremental: the codec remembers a consumed header across
//! calls, so bytes may arrive split at any boundary, including inside the
//! 6-byte header. A message is complete when a frame carrying
//! [`FrameFlags::FINAL`] has been read; what comes out is one send unit,
//! which is either a whole message or one fragment of a larger one.

use std::mem;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use super::constants::*;
use super::flags::FrameFlags;
use super::frame::Frame;
use super::frame_codec;
use super::ClientMessage;
use crate::error::{HazelcastError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the next 6-byte header.
    AwaitingHeader,
    /// Header consumed, waiting for `remaining` payload bytes.
    AwaitingPayload { flags: FrameFlags, remaining: usize },
}

/// Codec for encoding and decoding Hazelcast client messages.
///
/// Implements the `tokio_util::codec::{Encoder, Decoder}` traits for use
/// with tokio's framed I/O. The parse cursor is private; one codec belongs to
/// exactly one inbound stream.
#[derive(Debug)]
pub struct ClientMessageCodec {
    state: DecodeState,
    /// Frames accumulated for the message under construction.
    current: ClientMessage,
    max_frame_length: Option<u32>,
    frames_decoded: u64,
}

impl ClientMessageCodec {
    /// Creates a new codec instance.
    pub fn new() -> Self {
        Self {
            state: DecodeState::AwaitingHeader,
            current: ClientMessage::new(),
            max_frame_length: None,
            frames_decoded: 0,
        }
    }

    /// Creates a codec that rejects frames longer than `max_frame_length` bytes.
    pub fn with_max_frame_length(max_frame_length: u32) -> Self {
        Self {
            max_frame_length: Some(max_frame_length),
            ..Self::new()
        }
    }

    /// Returns true when no header has been consumed and no message is partially built.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::AwaitingHeader && self.current.is_empty()
    }

    /// Returns how many whole frames this codec has decoded.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Reads at most one frame from the front of `src`.
    ///
    /// Returns `Ok(None)` when more bytes are needed. A consumed header is
    /// remembered, so the next call continues with its payload.
    pub fn decode_frame(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if self.state == DecodeState::AwaitingHeader {
            if src.len() < FRAME_HEADER_SIZE {
                return Ok(None);
            }

            let header = frame_codec::read_header(src);
            let remaining = header.payload_length().ok_or_else(|| {
                HazelcastError::Protocol(format!(
                    "frame length {} is shorter than the {}-byte frame header",
                    header.total_length, FRAME_HEADER_SIZE
                ))
            })?;
            if let Some(max) = self.max_frame_length {
                if header.total_length > max {
                    return Err(HazelcastError::Protocol(format!(
                        "frame length {} exceeds the maximum of {}",
                        header.total_length, max
                    )));
                }
            }

            tracing::trace!(
                length = header.total_length,
                flags = header.flags.bits(),
                "read frame header"
            );
            self.state = DecodeState::AwaitingPayload {
                flags: header.flags,
                remaining,
            };
        }

        let DecodeState::AwaitingPayload { flags, remaining } = self.state else {
            return Ok(None);
        };
        if src.len() < remaining {
            return Ok(None);
        }

        let content = src.split_to(remaining);
        self.state = DecodeState::AwaitingHeader;
        self.frames_decoded += 1;
        Ok(Some(Frame::new(content, flags)))
    }

    /// Reads frames from `src` until a message completes.
    ///
    /// Returns `Ok(None)` when more bytes are needed; frames read so far are
    /// kept for the next call.
    pub fn decode_message(&mut self, src: &mut BytesMut) -> Result<Option<ClientMessage>> {
        while let Some(frame) = self.decode_frame(src)? {
            let is_final = frame.is_final_frame();
            self.current.append(frame);
            if is_final {
                return Ok(Some(mem::take(&mut self.current)));
            }
        }
        Ok(None)
    }

    /// Writes `item` to `dst`, header then content for every frame.
    pub fn encode_message(&self, item: &ClientMessage, dst: &mut BytesMut) -> Result<()> {
        if item.is_empty() {
            return Err(HazelcastError::Protocol(
                "cannot encode empty message".to_string(),
            ));
        }

        dst.reserve(item.wire_size());
        item.write_to(dst);
        Ok(())
    }
}

impl Default for ClientMessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<ClientMessage> for ClientMessageCodec {
    type Error = HazelcastError;

    fn encode(&mut self, item: ClientMessage, dst: &mut BytesMut) -> Result<()> {
        self.encode_message(&item, dst)
    }
}

impl Encoder<&ClientMessage> for ClientMessageCodec {
    type Error = HazelcastError;

    fn encode(&mut self, item: &ClientMessage, dst: &mut BytesMut) -> Result<()> {
        self.encode_message(item, dst)
    }
}

impl Decoder for ClientMessageCodec {
    type Item = ClientMessage;
    type Error = HazelcastError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        self.decode_message(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode_message(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() && self.is_idle() => Ok(None),
            None => Err(HazelcastError::Connection(
                "stream ended inside a frame or message".to_string(),
            )),
        }
    }
}
