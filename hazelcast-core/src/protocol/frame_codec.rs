//! Fixed-offset field access and the 6-byte frame header.
//!
//! Every multi-byte integer in the protocol is little-endian. All reads and
//! writes of header fields go through this module so the byte order is
//! decided in exactly one place.
//!
//! Reads return `None` and writes return `false` when the buffer is too short
//! for the field; nothing here panics on short input.

use bytes::{Buf, BufMut};

use super::constants::*;
use super::flags::FrameFlags;

/// The 6-byte header that precedes every frame on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Length of the whole frame, header included.
    pub total_length: u32,
    /// Flags of the frame.
    pub flags: FrameFlags,
}

impl FrameHeader {
    /// Returns the payload length announced by this header.
    ///
    /// Returns `None` when the announced length is shorter than the header
    /// itself, which only a corrupt stream produces.
    pub fn payload_length(&self) -> Option<usize> {
        (self.total_length as usize).checked_sub(FRAME_HEADER_SIZE)
    }
}

/// Reads a frame header from the front of `src`, consuming exactly 6 bytes.
///
/// The caller guarantees at least [`FRAME_HEADER_SIZE`] bytes are available.
pub fn read_header<B: Buf>(src: &mut B) -> FrameHeader {
    let total_length = src.get_u32_le();
    let flags = FrameFlags::from_bits_retain(src.get_u16_le());
    FrameHeader {
        total_length,
        flags,
    }
}

/// Writes the header for a frame whose payload is `payload_length` bytes.
pub fn write_header<B: BufMut>(dst: &mut B, payload_length: usize, flags: FrameFlags) {
    dst.put_u32_le((payload_length + FRAME_HEADER_SIZE) as u32);
    dst.put_u16_le(flags.bits());
}

fn field<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    buf.get(offset..offset.checked_add(N)?)
        .and_then(|bytes| bytes.try_into().ok())
}

fn put_field(buf: &mut [u8], offset: usize, bytes: &[u8]) -> bool {
    let Some(end) = offset.checked_add(bytes.len()) else {
        return false;
    };
    match buf.get_mut(offset..end) {
        Some(slot) => {
            slot.copy_from_slice(bytes);
            true
        }
        None => false,
    }
}

/// Reads a little-endian `u8` at `offset`.
pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Reads a little-endian `i32` at `offset`.
pub fn read_i32(buf: &[u8], offset: usize) -> Option<i32> {
    field(buf, offset).map(i32::from_le_bytes)
}

/// Reads a little-endian `i64` at `offset`.
pub fn read_i64(buf: &[u8], offset: usize) -> Option<i64> {
    field(buf, offset).map(i64::from_le_bytes)
}

/// Writes a `u8` at `offset`.
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> bool {
    put_field(buf, offset, &[value])
}

/// Writes a little-endian `i32` at `offset`.
pub fn write_i32(buf: &mut [u8], offset: usize, value: i32) -> bool {
    put_field(buf, offset, &value.to_le_bytes())
}

/// Writes a little-endian `i64` at `offset`.
pub fn write_i64(buf: &mut [u8], offset: usize, value: i64) -> bool {
    put_field(buf, offset, &value.to_le_bytes())
}

/// Reads the message type of an initial frame.
pub fn read_message_type(buf: &[u8]) -> Option<i32> {
    read_i32(buf, TYPE_FIELD_OFFSET)
}

/// Reads the correlation ID of an initial frame.
pub fn read_correlation_id(buf: &[u8]) -> Option<i64> {
    read_i64(buf, CORRELATION_ID_OFFSET)
}

/// Reads the partition ID of a request initial frame.
pub fn read_partition_id(buf: &[u8]) -> Option<i32> {
    read_i32(buf, PARTITION_ID_OFFSET)
}

/// Reads the backup acknowledgement count of a response initial frame.
pub fn read_backup_acks(buf: &[u8]) -> Option<u8> {
    read_u8(buf, RESPONSE_BACKUP_ACKS_OFFSET)
}

/// Reads the fragment ID of a fragment header frame.
pub fn read_fragment_id(buf: &[u8]) -> Option<i64> {
    read_i64(buf, FRAGMENT_ID_OFFSET)
}

/// Writes the message type of an initial frame.
pub fn write_message_type(buf: &mut [u8], message_type: i32) -> bool {
    write_i32(buf, TYPE_FIELD_OFFSET, message_type)
}

/// Writes the correlation ID of an initial frame.
pub fn write_correlation_id(buf: &mut [u8], correlation_id: i64) -> bool {
    write_i64(buf, CORRELATION_ID_OFFSET, correlation_id)
}

/// Writes the partition ID of a request initial frame.
pub fn write_partition_id(buf: &mut [u8], partition_id: i32) -> bool {
    write_i32(buf, PARTITION_ID_OFFSET, partition_id)
}

/// Writes the backup acknowledgement count of a response initial frame.
pub fn write_backup_acks(buf: &mut [u8], backup_acks: u8) -> bool {
    write_u8(buf, RESPONSE_BACKUP_ACKS_OFFSET, backup_acks)
}

/// Writes the fragment ID of a fragment header frame.
pub fn write_fragment_id(buf: &mut [u8], fragment_id: i64) -> bool {
    write_i64(buf, FRAGMENT_ID_OFFSET, fragment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_write_header_counts_itself() {
        let mut buf = BytesMut::new();
        write_header(&mut buf, 10, FrameFlags::UNFRAGMENTED);

        assert_eq!(&buf[..], &[0x10, 0x00, 0x00, 0x00, 0x00, 0xC0]);
    }

    #[test]
    fn test_read_header_consumes_six_bytes() {
        let mut buf = BytesMut::from(&[0x16, 0x00, 0x00, 0x00, 0x00, 0xE0, 0xAA][..]);
        let header = read_header(&mut buf);

        assert_eq!(header.total_length, 22);
        assert_eq!(header.flags, FrameFlags::UNFRAGMENTED | FrameFlags::FINAL);
        assert_eq!(header.payload_length(), Some(16));
        assert_eq!(&buf[..], &[0xAA]);
    }

    #[test]
    fn test_header_shorter_than_itself() {
        let header = FrameHeader {
            total_length: 5,
            flags: FrameFlags::empty(),
        };
        assert_eq!(header.payload_length(), None);

        let empty = FrameHeader {
            total_length: 6,
            flags: FrameFlags::empty(),
        };
        assert_eq!(empty.payload_length(), Some(0));
    }

    #[test]
    fn test_fields_are_little_endian() {
        let mut buf = [0u8; REQUEST_HEADER_SIZE];
        assert!(write_message_type(&mut buf, 0x0102_0304));
        assert!(write_correlation_id(&mut buf, 42));
        assert!(write_partition_id(&mut buf, -1));

        assert_eq!(&buf[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[4..12], &[42, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&buf[12..16], &[0xFF, 0xFF, 0xFF, 0xFF]);

        assert_eq!(read_message_type(&buf), Some(0x0102_0304));
        assert_eq!(read_correlation_id(&buf), Some(42));
        assert_eq!(read_partition_id(&buf), Some(-1));
    }

    #[test]
    fn test_backup_acks_alias_partition_id() {
        let mut buf = [0u8; REQUEST_HEADER_SIZE];
        assert!(write_partition_id(&mut buf, 3));
        assert_eq!(read_backup_acks(&buf), Some(3));

        assert!(write_backup_acks(&mut buf, 2));
        assert_eq!(read_partition_id(&buf), Some(2));
    }

    #[test]
    fn test_fragment_id_aliases_message_type() {
        let mut buf = [0u8; FRAGMENT_HEADER_SIZE];
        assert!(write_fragment_id(&mut buf, 99));
        assert_eq!(read_fragment_id(&buf), Some(99));
        assert_eq!(read_message_type(&buf), Some(99));
    }

    #[test]
    fn test_short_buffers() {
        let mut buf = [0u8; 6];
        assert_eq!(read_correlation_id(&buf), None);
        assert_eq!(read_partition_id(&buf), None);
        assert_eq!(read_backup_acks(&buf), None);
        assert!(!write_correlation_id(&mut buf, 1));
        assert!(!write_i32(&mut buf, usize::MAX, 1));
        assert_eq!(read_i64(&buf, usize::MAX), None);
        assert_eq!(buf, [0u8; 6]);
    }
}
