//! Frame flag bits.

use bitflags::bitflags;

bitflags! {
    /// Flags carried in the 2-byte flags field of every frame header.
    ///
    /// Bits this crate does not know about are kept as-is, so a frame read
    /// from the wire is written back with exactly the flags it arrived with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameFlags: u16 {
        /// First fragment of a fragmented message.
        const BEGIN_FRAGMENT = 1 << 15;
        /// Last fragment of a fragmented message.
        const END_FRAGMENT = 1 << 14;
        /// Last frame of a message send unit.
        const FINAL = 1 << 13;
        /// Opens a nested codec structure.
        const BEGIN_STRUCT = 1 << 12;
        /// Closes a nested codec structure.
        const END_STRUCT = 1 << 11;
        /// Stands in for a null value.
        const NULL = 1 << 10;
        /// Message is an event pushed by the member.
        const EVENT = 1 << 9;
        /// Request expects backup acknowledgements.
        const BACKUP_AWARE = 1 << 8;
        /// Message is a backup acknowledgement event.
        const BACKUP_EVENT = 1 << 7;
        /// A message carried whole by a single send unit.
        const UNFRAGMENTED = Self::BEGIN_FRAGMENT.bits() | Self::END_FRAGMENT.bits();
    }
}

impl FrameFlags {
    /// Returns true if both fragment bits are set.
    pub fn is_unfragmented(self) -> bool {
        self.contains(Self::UNFRAGMENTED)
    }

    /// Returns true if this is a begin fragment (and not an unfragmented message).
    pub fn is_begin_fragment(self) -> bool {
        self.contains(Self::BEGIN_FRAGMENT) && !self.contains(Self::END_FRAGMENT)
    }

    /// Returns true if this is an end fragment (and not an unfragmented message).
    pub fn is_end_fragment(self) -> bool {
        self.contains(Self::END_FRAGMENT) && !self.contains(Self::BEGIN_FRAGMENT)
    }
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_values() {
        assert_eq!(FrameFlags::BEGIN_FRAGMENT.bits(), 0x8000);
        assert_eq!(FrameFlags::END_FRAGMENT.bits(), 0x4000);
        assert_eq!(FrameFlags::UNFRAGMENTED.bits(), 0xC000);
        assert_eq!(FrameFlags::FINAL.bits(), 0x2000);
        assert_eq!(FrameFlags::BACKUP_EVENT.bits(), 0x0080);
    }

    #[test]
    fn test_fragment_predicates() {
        assert!(FrameFlags::UNFRAGMENTED.is_unfragmented());
        assert!(!FrameFlags::UNFRAGMENTED.is_begin_fragment());
        assert!(!FrameFlags::UNFRAGMENTED.is_end_fragment());

        assert!(FrameFlags::BEGIN_FRAGMENT.is_begin_fragment());
        assert!(FrameFlags::END_FRAGMENT.is_end_fragment());

        let continuation = FrameFlags::FINAL;
        assert!(!continuation.is_begin_fragment());
        assert!(!continuation.is_end_fragment());
        assert!(!continuation.is_unfragmented());
    }

    #[test]
    fn test_unknown_bits_are_retained() {
        let flags = FrameFlags::from_bits_retain(0x0001 | FrameFlags::FINAL.bits());
        assert!(flags.contains(FrameFlags::FINAL));
        assert_eq!(flags.bits(), 0x2001);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(FrameFlags::default().is_empty());
    }
}
