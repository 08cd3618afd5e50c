//! Framing and fragment-header parsing.
//!
//! Grounded in the teacher crate's `packet.rs` (`MessageHeader`,
//! `is_payload_split`, `goldsource_multi_packet`, `source_multi_packet`),
//! generalized to carry the legacy-title size-field omission and corrected
//! against the wiki so the GoldSource packet-id/packet-total split matches
//! §4.3 exactly (upper nibble is the fragment id, lower nibble is the
//! fragment total — the teacher's version reused one shifted variable for
//! both, which collapses them to the same value).

use crate::codec::cursor::Cursor;
use crate::error::{Error, Result};

pub const SINGLE_PACKET: i32 = -1;
pub const MULTI_PACKET: i32 = -2;

/// Response type byte, after framing has been stripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    InfoSource,
    InfoGoldSource,
    Challenge,
    Player,
    Rules,
    Ping,
    Unknown(u8),
}

impl From<u8> for ResponseType {
    fn from(b: u8) -> Self {
        match b {
            0x49 => ResponseType::InfoSource,
            0x6D => ResponseType::InfoGoldSource,
            0x41 => ResponseType::Challenge,
            0x44 => ResponseType::Player,
            0x45 => ResponseType::Rules,
            0x6A => ResponseType::Ping,
            other => ResponseType::Unknown(other),
        }
    }
}

impl ResponseType {
    pub fn byte(self) -> u8 {
        match self {
            ResponseType::InfoSource => 0x49,
            ResponseType::InfoGoldSource => 0x6D,
            ResponseType::Challenge => 0x41,
            ResponseType::Player => 0x44,
            ResponseType::Rules => 0x45,
            ResponseType::Ping => 0x6A,
            ResponseType::Unknown(b) => b,
        }
    }
}

/// Read the 4-byte little-endian framing prefix and classify it.
/// Returns `Ok(true)` for multi-packet (-2), `Ok(false)` for single-packet
/// (-1), and [`Error::BadFraming`] for anything else.
pub fn read_framing(input: &[u8]) -> Result<(bool, &[u8])> {
    let mut c = Cursor::new(input);
    let prefix = c.read_i32()?;
    match prefix {
        SINGLE_PACKET => Ok((false, c.remaining())),
        MULTI_PACKET => Ok((true, c.remaining())),
        _ => Err(Error::BadFraming),
    }
}

pub fn read_response_type(input: &[u8]) -> Result<(ResponseType, &[u8])> {
    let mut c = Cursor::new(input);
    let b = c.read_u8()?;
    Ok((b.into(), c.remaining()))
}

/// GoldSource (`appId < 200`) multi-packet fragment header: int32 request
/// id, then one byte whose upper nibble is the fragment's id within the
/// response and whose lower nibble is the total fragment count (1..15).
pub struct GoldSourceFragmentHeader {
    pub request_id: i32,
    pub packet_id: u8,
    pub packet_total: u8,
}

pub fn read_goldsource_fragment_header(input: &[u8]) -> Result<(GoldSourceFragmentHeader, &[u8])> {
    let mut c = Cursor::new(input);
    let request_id = c.read_i32()?;
    let packed = c.read_u8()?;
    let packet_id = packed >> 4;
    let packet_total = packed & 0x0F;
    Ok((
        GoldSourceFragmentHeader {
            request_id,
            packet_id,
            packet_total,
        },
        c.remaining(),
    ))
}

/// Source (`appId >= 200` or unknown) multi-packet fragment header: int32
/// request id (its high bit signals compression), one byte total, one byte
/// id, and — unless the endpoint is one of the legacy titles that omit it —
/// an int16 packet size. On fragment 0, if the compression bit is set,
/// int32 `uncompressed_size` and int32 `crc32` follow.
pub struct SourceFragmentHeader {
    pub request_id: i32,
    pub packet_total: u8,
    pub packet_id: u8,
    pub packet_size: Option<i16>,
    pub compressed: bool,
    pub uncompressed_size: Option<i32>,
    pub crc32: Option<i32>,
}

/// Legacy titles whose Source multi-packet fragment header omits the int16
/// packet-size field, when running protocol version 7.
pub const LEGACY_NO_SIZE_APP_IDS: [i16; 4] = [215, 17550, 17700, 240];

pub fn source_includes_size_field(protocol: u8, app_id: i16) -> bool {
    !(protocol == 7 && LEGACY_NO_SIZE_APP_IDS.contains(&app_id))
}

pub fn read_source_fragment_header(
    input: &[u8],
    size_included: bool,
) -> Result<(SourceFragmentHeader, &[u8])> {
    let mut c = Cursor::new(input);
    let request_id = c.read_i32()?;
    let packet_total = c.read_u8()?;
    let packet_id = c.read_u8()?;
    let packet_size = if size_included {
        Some(c.read_i16()?)
    } else {
        None
    };

    // Compression is signalled by the high bit of the request id, and only
    // meaningful on fragment 0.
    let compressed = packet_id == 0 && (request_id as u32) & 0x8000_0000 != 0;

    let (uncompressed_size, crc32) = if compressed {
        let size = c.read_i32()?;
        let crc = c.read_i32()?;
        (Some(size), Some(crc))
    } else {
        (None, None)
    };

    Ok((
        SourceFragmentHeader {
            request_id,
            packet_total,
            packet_id,
            packet_size,
            compressed,
            uncompressed_size,
            crc32,
        },
        c.remaining(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_single() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x49];
        let (split, rest) = read_framing(&data).unwrap();
        assert!(!split);
        assert_eq!(rest, &[0x49]);
    }

    #[test]
    fn framing_multi() {
        let data = [0xFE, 0xFF, 0xFF, 0xFF];
        let (split, _) = read_framing(&data).unwrap();
        assert!(split);
    }

    #[test]
    fn framing_bad() {
        let data = [0x01, 0x00, 0x00, 0x00];
        assert!(matches!(read_framing(&data), Err(Error::BadFraming)));
    }

    #[test]
    fn goldsource_fragment_header_splits_nibbles() {
        // packet_id = 2, packet_total = 4 -> byte 0x24
        let data = [0x01, 0x00, 0x00, 0x00, 0x24];
        let (hdr, rest) = read_goldsource_fragment_header(&data).unwrap();
        assert_eq!(hdr.request_id, 1);
        assert_eq!(hdr.packet_id, 2);
        assert_eq!(hdr.packet_total, 4);
        assert!(rest.is_empty());
    }

    #[test]
    fn source_fragment_header_uncompressed() {
        let mut data = vec![];
        data.extend_from_slice(&1i32.to_le_bytes());
        data.push(3); // total
        data.push(0); // id
        data.extend_from_slice(&1248i16.to_le_bytes());
        let (hdr, _) = read_source_fragment_header(&data, true).unwrap();
        assert_eq!(hdr.packet_total, 3);
        assert_eq!(hdr.packet_size, Some(1248));
        assert!(!hdr.compressed);
    }

    #[test]
    fn source_fragment_header_compressed_fragment_zero() {
        let mut data = vec![];
        data.extend_from_slice(&(-1i32).to_le_bytes()); // high bit set
        data.push(2);
        data.push(0);
        data.extend_from_slice(&1248i16.to_le_bytes());
        data.extend_from_slice(&120i32.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        let (hdr, _) = read_source_fragment_header(&data, true).unwrap();
        assert!(hdr.compressed);
        assert_eq!(hdr.uncompressed_size, Some(120));
        assert_eq!(hdr.crc32, Some(0xDEADBEEFu32 as i32));
    }

    #[test]
    fn legacy_titles_omit_size() {
        assert!(!source_includes_size_field(7, 215));
        assert!(source_includes_size_field(7, 10));
        assert!(source_includes_size_field(17, 215));
    }
}
