use bytes::Bytes;

use crate::error::{CodecError, Result};
use crate::wire::DEVICE_ID_LEN;

/// Identity material bound to one encode context.
///
/// Immutable for the lifetime of the context that owns it. The crypt key is
/// shared with the decoding peer out of band; the remaining fields ride in
/// every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub(crate) crypt_key: u8,
    pub(crate) entity_id: u8,
    pub(crate) device_id: [u8; DEVICE_ID_LEN],
    pub(crate) device_ip: u8,
}

impl DeviceIdentity {
    /// Build an identity from its raw parts.
    ///
    /// The device id must be exactly [`DEVICE_ID_LEN`] bytes; anything
    /// shorter or longer is rejected here, not at encode time.
    pub fn new(crypt_key: u8, entity_id: u8, device_id: &[u8], device_ip: u8) -> Result<Self> {
        if device_id.len() != DEVICE_ID_LEN {
            return Err(CodecError::InvalidIdentity {
                expected: DEVICE_ID_LEN,
                actual: device_id.len(),
            });
        }

        let mut id = [0u8; DEVICE_ID_LEN];
        id.copy_from_slice(device_id);

        Ok(Self {
            crypt_key,
            entity_id,
            device_id: id,
            device_ip,
        })
    }

    pub fn crypt_key(&self) -> u8 {
        self.crypt_key
    }

    pub fn entity_id(&self) -> u8 {
        self.entity_id
    }

    pub fn device_id(&self) -> &[u8; DEVICE_ID_LEN] {
        &self.device_id
    }

    /// Compact subnet-local identifier, not a full IPv4 address.
    pub fn device_ip(&self) -> u8 {
        self.device_ip
    }
}

/// Wall-clock stamp carried in every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: u32,
    pub millis: u16,
}

impl Timestamp {
    pub fn new(seconds: u32, millis: u16) -> Self {
        Self { seconds, millis }
    }

    /// Read the system clock as seconds-since-epoch plus a millisecond part.
    pub fn now() -> Self {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        Self {
            seconds: elapsed.as_secs() as u32,
            millis: elapsed.subsec_millis() as u16,
        }
    }
}

/// Discriminator selecting what a frame's body carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadKind {
    /// A short command string.
    Command = 1,
    /// A source/data collection pair.
    Collect = 2,
}

impl PayloadKind {
    pub(crate) fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(PayloadKind::Command),
            2 => Some(PayloadKind::Collect),
            _ => None,
        }
    }
}

/// Decoded frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Command { cmd: Bytes },
    Collect { source: Bytes, data: Bytes },
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Command { .. } => PayloadKind::Command,
            Payload::Collect { .. } => PayloadKind::Collect,
        }
    }
}

/// Header fields shared by every frame, as unpacked on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct HeaderFields {
    pub entity_id: u8,
    pub device_ip: u8,
    pub device_id: [u8; DEVICE_ID_LEN],
    pub stamp: Timestamp,
}

/// A fully validated, unpacked frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub(crate) header: HeaderFields,
    pub(crate) payload: Payload,
}

impl DecodedPacket {
    pub fn entity_id(&self) -> u8 {
        self.header.entity_id
    }

    pub fn device_ip(&self) -> u8 {
        self.header.device_ip
    }

    pub fn device_id(&self) -> &[u8; DEVICE_ID_LEN] {
        &self.header.device_id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.header.stamp
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// An encoded frame ready for transmission.
///
/// Opaque bytes, at most [`crate::wire::TRAN_MAX`] long. Hosts must treat
/// the contents as binary data, never text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmissionFrame {
    bytes: Bytes,
}

impl TransmissionFrame {
    pub(crate) fn from_bytes(bytes: Bytes) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for TransmissionFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Snapshot of the field values a context or packet currently holds.
///
/// `device_ip` and `entity_id` project as exactly one byte each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inspection {
    pub timestamp_seconds: u32,
    pub timestamp_millis: u16,
    pub device_ip: u8,
    pub entity_id: u8,
    pub device_id: [u8; DEVICE_ID_LEN],
}

/// Read-only projection of current field values, for diagnostics and tests.
///
/// Pure: inspecting twice without mutating the target yields identical
/// results.
pub trait Inspect {
    fn inspect(&self) -> Inspection;
}

impl Inspect for DecodedPacket {
    fn inspect(&self) -> Inspection {
        Inspection {
            timestamp_seconds: self.header.stamp.seconds,
            timestamp_millis: self.header.stamp.millis,
            device_ip: self.header.device_ip,
            entity_id: self.header.entity_id,
            device_id: self.header.device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_requires_exact_device_id_length() {
        for bad_len in [0, DEVICE_ID_LEN - 1, DEVICE_ID_LEN + 1, 16] {
            let id = vec![0xAB; bad_len];
            let err = DeviceIdentity::new(0x01, 0x02, &id, 0x03).unwrap_err();
            assert!(matches!(
                err,
                CodecError::InvalidIdentity { expected, actual }
                    if expected == DEVICE_ID_LEN && actual == bad_len
            ));
        }

        let id = [0xAB; DEVICE_ID_LEN];
        assert!(DeviceIdentity::new(0x01, 0x02, &id, 0x03).is_ok());
    }

    #[test]
    fn payload_kind_wire_values() {
        assert_eq!(PayloadKind::from_wire(1), Some(PayloadKind::Command));
        assert_eq!(PayloadKind::from_wire(2), Some(PayloadKind::Collect));
        assert_eq!(PayloadKind::from_wire(0), None);
        assert_eq!(PayloadKind::from_wire(3), None);
        assert_eq!(PayloadKind::from_wire(0xFF), None);
    }

    #[test]
    fn system_clock_is_populated() {
        let stamp = Timestamp::now();
        assert!(stamp.seconds > 0);
        assert!(stamp.millis < 1000);
    }
}
