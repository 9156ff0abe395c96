//! Little-endian integer codec and incremental CRC-32.
//!
//! The byte layouts here are dictated by the nRF5 bootloader's wire format and
//! must match it exactly: `uint16_encode`/`uint32_decode`/`crc32_compute` in
//! the reference `libnrfu` implementation.

use byteorder::{ByteOrder, LittleEndian};

/// Encode `v` as little-endian into `out`, returning the number of bytes written.
pub fn u16_encode(v: u16, out: &mut [u8; 2]) -> usize {
    LittleEndian::write_u16(out, v);
    2
}

/// Encode `v` as little-endian into `out`, returning the number of bytes written.
pub fn u32_encode(v: u32, out: &mut [u8; 4]) -> usize {
    LittleEndian::write_u32(out, v);
    4
}

/// Decode a little-endian `u16` from the first two bytes of `data`.
pub fn u16_decode(data: &[u8; 2]) -> u16 {
    LittleEndian::read_u16(data)
}

/// Decode a little-endian `u32` from the first four bytes of `data`.
pub fn u32_decode(data: &[u8; 4]) -> u32 {
    LittleEndian::read_u32(data)
}

/// Decode a little-endian `u16` from a byte slice (panics if shorter than 2 bytes).
pub fn u16_decode_slice(data: &[u8]) -> u16 {
    LittleEndian::read_u16(data)
}

/// Decode a little-endian `u32` from a byte slice (panics if shorter than 4 bytes).
pub fn u32_decode_slice(data: &[u8]) -> u32 {
    LittleEndian::read_u32(data)
}

/// Reflected CRC-32 (poly 0xEDB88320) with continuation support.
///
/// `prev` is the CRC of the bytes already processed (0 for the first call).
/// Feeding the previous return value back in as `prev` yields the CRC of the
/// concatenation of all bytes seen so far, which is exactly what's needed to
/// carry the running CRC across object boundaries (§4.4's CRC seed law).
pub fn crc32(bytes: &[u8], prev: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(prev);
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_roundtrip() {
        for v in [0u16, 1, 0x00FF, 0xFF00, 0xFFFF, 0x1234] {
            let mut buf = [0u8; 2];
            u16_encode(v, &mut buf);
            assert_eq!(u16_decode(&buf), v);
        }
    }

    #[test]
    fn u32_roundtrip() {
        for v in [0u32, 1, 0x0000_00FF, 0xFF00_0000, 0xFFFF_FFFF, 0xDEAD_BEEF] {
            let mut buf = [0u8; 4];
            u32_encode(v, &mut buf);
            assert_eq!(u32_decode(&buf), v);
        }
    }

    #[test]
    fn u16_little_endian_byte_order() {
        let mut buf = [0u8; 2];
        u16_encode(0x0102, &mut buf);
        assert_eq!(buf, [0x02, 0x01]);
    }

    #[test]
    fn u32_little_endian_byte_order() {
        let mut buf = [0u8; 4];
        u32_encode(0x0102_0304, &mut buf);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn crc32_of_empty_is_zero() {
        assert_eq!(crc32(&[], 0), 0);
    }

    #[test]
    fn crc32_known_vector() {
        // Standard CRC-32/ISO-HDLC check value for ASCII "123456789".
        assert_eq!(crc32(b"123456789", 0), 0xCBF4_3926);
    }

    #[test]
    fn crc32_continuation_matches_whole_buffer() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for split in 0..=data.len() {
            let (a, b) = data.split_at(split);
            let whole = crc32(data, 0);
            let incremental = crc32(b, crc32(a, 0));
            assert_eq!(incremental, whole, "split at {split} failed");
        }
    }

    #[test]
    fn crc32_empty_first_chunk_is_identity() {
        let data = b"payload bytes";
        let seeded = crc32(data, crc32(&[], 0));
        assert_eq!(seeded, crc32(data, 0));
    }
}
