//! Core protocol types for the Hazelcast client messaging engine.
//!
//! Everything here is pure: frames, messages, the wire codec and fragment
//! reassembly operate on byte buffers and never touch a socket.

#![warn(missing_docs)]

pub mod error;
pub mod protocol;

pub use error::{HazelcastError, Result};
