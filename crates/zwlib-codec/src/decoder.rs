use crate::error::{CodecError, Result};
use crate::packet::{DecodedPacket, HeaderFields, Inspect, Inspection};
use crate::transform::apply_keystream;
use crate::wire::{self, TRAN_MAX};

/// Decode context bound to a shared crypt key.
///
/// Decoding behavior depends only on the key. The context additionally
/// retains the header fields of its most recent successful decode so
/// [`Inspect`] can project them; they start zeroed and are untouched by
/// rejected frames.
pub struct Decoder {
    crypt_key: u8,
    last: HeaderFields,
}

impl Decoder {
    /// Create a decoder. Never fails.
    pub fn new(crypt_key: u8) -> Self {
        Self {
            crypt_key,
            last: HeaderFields::default(),
        }
    }

    pub fn crypt_key(&self) -> u8 {
        self.crypt_key
    }

    /// Validate and unpack a received frame.
    ///
    /// The raw frame length must satisfy `1 <= len < TRAN_MAX`; a violation
    /// is a contract error. Everything data-dependent — wrong key, corrupted
    /// or truncated contents, unknown discriminator, inconsistent embedded
    /// lengths — comes back as `Ok(None)`, with no indication of which it
    /// was. Decoding is all-or-nothing: no partial packet is ever returned.
    pub fn decode(&mut self, frame: &[u8]) -> Result<Option<DecodedPacket>> {
        if frame.is_empty() {
            return Err(CodecError::LengthOutOfRange {
                field: "frame",
                len: frame.len(),
                min: 1,
                max: TRAN_MAX - 1,
            });
        }
        if frame.len() >= TRAN_MAX {
            return Err(CodecError::LengthOutOfRange {
                field: "frame",
                len: frame.len(),
                min: 1,
                max: TRAN_MAX - 1,
            });
        }

        let mut plain = frame.to_vec();
        apply_keystream(self.crypt_key, &mut plain);

        match wire::parse_packet(&plain) {
            Some(packet) => {
                self.last = packet.header;
                Ok(Some(packet))
            }
            None => {
                tracing::trace!(len = frame.len(), "frame rejected");
                Ok(None)
            }
        }
    }
}

impl Inspect for Decoder {
    fn inspect(&self) -> Inspection {
        Inspection {
            timestamp_seconds: self.last.stamp.seconds,
            timestamp_millis: self.last.stamp.millis,
            device_ip: self.last.device_ip,
            entity_id: self.last.entity_id,
            device_id: self.last.device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::packet::{DeviceIdentity, Payload, PayloadKind, Timestamp};

    fn encoder(key: u8) -> Encoder {
        let identity = DeviceIdentity::new(key, 0x01, &[1, 2, 3, 4, 5, 6], 0x0A).unwrap();
        Encoder::new(identity, || Timestamp::new(1000, 500))
    }

    #[test]
    fn frame_length_bounds_are_contract_errors() {
        let mut dec = Decoder::new(0x07);

        let err = dec.decode(&[]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "frame", len: 0, .. }
        ));

        let err = dec.decode(&vec![0u8; TRAN_MAX]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "frame", len, .. } if len == TRAN_MAX
        ));

        // One byte under the limit is inside the contract; the garbage
        // contents are a data-dependent rejection, not an error.
        assert!(dec.decode(&vec![0u8; TRAN_MAX - 1]).unwrap().is_none());
        assert!(dec.decode(&[0x5A]).unwrap().is_none());
    }

    #[test]
    fn decodes_own_encoders_frames() {
        let mut enc = encoder(0x42);
        let mut dec = Decoder::new(0x42);

        let frame = enc.encode_command(b"STATUS").unwrap().unwrap();
        let packet = dec.decode(frame.as_bytes()).unwrap().unwrap();

        assert_eq!(packet.kind(), PayloadKind::Command);
        assert!(matches!(
            packet.payload(),
            Payload::Command { cmd } if cmd.as_ref() == b"STATUS"
        ));
    }

    #[test]
    fn wrong_key_yields_no_packet() {
        let mut enc = encoder(0x07);
        let frame = enc.encode_command(b"ON").unwrap().unwrap();

        for wrong in [0x00, 0x06, 0x08, 0x70, 0xFF] {
            let mut dec = Decoder::new(wrong);
            assert!(
                dec.decode(frame.as_bytes()).unwrap().is_none(),
                "key {wrong:#04x} decoded a foreign frame"
            );
        }
    }

    #[test]
    fn corrupted_frame_yields_no_packet() {
        let mut enc = encoder(0x07);
        let mut dec = Decoder::new(0x07);
        let frame = enc.encode_collect(b"adc0", b"512").unwrap().unwrap();

        for pos in 0..frame.len() {
            let mut bytes = frame.as_bytes().to_vec();
            bytes[pos] ^= 0x80;
            assert!(
                dec.decode(&bytes).unwrap().is_none(),
                "corruption at byte {pos} accepted"
            );
        }
    }

    #[test]
    fn truncated_frame_yields_no_packet() {
        let mut enc = encoder(0x07);
        let mut dec = Decoder::new(0x07);
        let frame = enc.encode_command(b"LONG-ENOUGH-CMD").unwrap().unwrap();

        for keep in 1..frame.len() {
            assert!(dec.decode(&frame.as_bytes()[..keep]).unwrap().is_none());
        }
    }

    #[test]
    fn inspect_tracks_last_successful_decode_only() {
        let mut enc = encoder(0x07);
        let mut dec = Decoder::new(0x07);

        // Zeroed before anything decodes.
        assert_eq!(dec.inspect(), Inspection::default());

        let frame = enc.encode_command(b"ON").unwrap().unwrap();
        dec.decode(frame.as_bytes()).unwrap().unwrap();

        let view = dec.inspect();
        assert_eq!(view.timestamp_seconds, 1000);
        assert_eq!(view.timestamp_millis, 500);
        assert_eq!(view.entity_id, 0x01);
        assert_eq!(view.device_ip, 0x0A);
        assert_eq!(view.device_id, [1, 2, 3, 4, 5, 6]);
        assert_eq!(dec.inspect(), view);

        // A rejected frame leaves the projection alone.
        let mut garbled = frame.as_bytes().to_vec();
        garbled[3] ^= 0xFF;
        assert!(dec.decode(&garbled).unwrap().is_none());
        assert_eq!(dec.inspect(), view);
    }
}
