//! Plaintext packet layout.
//!
//! Everything here describes the frame *before* the keyed transform is
//! applied (encode) or *after* it is reversed (decode):
//!
//! ```text
//! ┌───────┬────────┬────────┬───────────┬──────────┬─────────┬──────┬──────┬───────┐
//! │ Magic │ Entity │ DevIP  │ DeviceId  │ Seconds  │ Millis  │ Kind │ Body │ CRC16 │
//! │ "ZW"  │ (1B)   │ (1B)   │ (6B)      │ (4B LE)  │ (2B LE) │ (1B) │      │ (LE)  │
//! └───────┴────────┴────────┴───────────┴──────────┴─────────┴──────┴──────┴───────┘
//! ```
//!
//! A Command body is `len u8 | cmd`; a Collect body is
//! `source_len u8 | source | data_len u8 | data`. The checksum covers every
//! byte before it.

use bytes::{BufMut, Bytes, BytesMut};

use crate::packet::{DecodedPacket, HeaderFields, Payload, PayloadKind, Timestamp};
use crate::transform::crc16;

/// Fixed device id width, sized for a MAC address.
pub const DEVICE_ID_LEN: usize = 6;

/// Magic bytes: "ZW" (0x5A 0x57).
pub const MAGIC: [u8; 2] = [0x5A, 0x57];

/// Header: magic (2) + entity (1) + ip (1) + device id (6) + seconds (4) +
/// millis (2) + kind (1) = 17 bytes.
pub const HEADER_SIZE: usize = 11 + DEVICE_ID_LEN;

/// Checksum trailer width.
pub const CHECKSUM_SIZE: usize = 2;

/// Maximum total frame length.
pub const TRAN_MAX: usize = 128;

/// Maximum command payload length.
pub const CMD_MAX: usize = 32;

/// Maximum collect source length.
pub const SOURCE_MAX: usize = 32;

/// Maximum collect data length.
pub const DATA_MAX: usize = 64;

/// Smallest structurally possible packet: header, a one-byte body field with
/// its length prefix, and the checksum.
pub(crate) const MIN_PACKET: usize = HEADER_SIZE + 2 + CHECKSUM_SIZE;

/// Serialize header and body fields, then append the checksum.
///
/// Payload bounds are the caller's contract; this layer only lays out bytes.
pub(crate) fn serialize_packet(
    header: &HeaderFields,
    kind: PayloadKind,
    fields: &[&[u8]],
) -> BytesMut {
    let body_len: usize = fields.iter().map(|field| 1 + field.len()).sum();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len + CHECKSUM_SIZE);

    buf.put_slice(&MAGIC);
    buf.put_u8(header.entity_id);
    buf.put_u8(header.device_ip);
    buf.put_slice(&header.device_id);
    buf.put_u32_le(header.stamp.seconds);
    buf.put_u16_le(header.stamp.millis);
    buf.put_u8(kind as u8);
    for field in fields {
        buf.put_u8(field.len() as u8);
        buf.put_slice(field);
    }

    let crc = crc16(&buf);
    buf.put_u16_le(crc);
    buf
}

/// Parse a detransformed packet.
///
/// Returns `None` on any structural or integrity mismatch; a wrong key and a
/// corrupted frame are indistinguishable here and to every caller above.
pub(crate) fn parse_packet(plain: &[u8]) -> Option<DecodedPacket> {
    if plain.len() < MIN_PACKET {
        return None;
    }
    if plain[0..2] != MAGIC {
        return None;
    }

    let (checked, trailer) = plain.split_at(plain.len() - CHECKSUM_SIZE);
    let expected = u16::from_le_bytes([trailer[0], trailer[1]]);
    if crc16(checked) != expected {
        return None;
    }

    let mut device_id = [0u8; DEVICE_ID_LEN];
    device_id.copy_from_slice(&checked[4..4 + DEVICE_ID_LEN]);
    let seconds = u32::from_le_bytes(checked[10..14].try_into().ok()?);
    let millis = u16::from_le_bytes(checked[14..16].try_into().ok()?);
    let kind = PayloadKind::from_wire(checked[16])?;

    let mut cursor = &checked[HEADER_SIZE..];
    let payload = match kind {
        PayloadKind::Command => Payload::Command {
            cmd: read_field(&mut cursor, CMD_MAX)?,
        },
        PayloadKind::Collect => {
            let source = read_field(&mut cursor, SOURCE_MAX)?;
            let data = read_field(&mut cursor, DATA_MAX)?;
            Payload::Collect { source, data }
        }
    };
    if !cursor.is_empty() {
        return None;
    }

    Some(DecodedPacket {
        header: HeaderFields {
            entity_id: checked[2],
            device_ip: checked[3],
            device_id,
            stamp: Timestamp::new(seconds, millis),
        },
        payload,
    })
}

fn read_field(cursor: &mut &[u8], max: usize) -> Option<Bytes> {
    let (&len, rest) = cursor.split_first()?;
    let len = usize::from(len);
    if len < 1 || len > max || rest.len() < len {
        return None;
    }
    let (field, rest) = rest.split_at(len);
    *cursor = rest;
    Some(trim_at_nul(field))
}

/// Payload fields are logically C strings: anything at or past the first NUL
/// is terminator, not payload.
fn trim_at_nul(field: &[u8]) -> Bytes {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    Bytes::copy_from_slice(&field[..end])
}
