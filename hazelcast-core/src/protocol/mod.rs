//! Hazelcast Open Binary Protocol implementation.
//!
//! This module provides the core protocol types for communicating with
//! Hazelcast clusters using the Open Binary Protocol: frames and their flags,
//! multi-frame messages, the incremental wire codec, and fragmentation.

mod client_message;
mod codec;
pub mod constants;
mod flags;
mod fragment;
mod frame;
pub mod frame_codec;
mod header;
mod splitter;

pub use client_message::ClientMessage;
pub use codec::ClientMessageCodec;
pub use constants::*;
pub use flags::FrameFlags;
pub use fragment::FragmentAssembler;
pub use frame::Frame;
pub use frame_codec::FrameHeader;
pub use header::{Direction, MessageHeader};
pub use splitter::{next_fragment_id, split_into_fragments};
