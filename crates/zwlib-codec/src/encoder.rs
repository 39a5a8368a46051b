use crate::error::{CodecError, Result};
use crate::packet::{
    DeviceIdentity, HeaderFields, Inspect, Inspection, PayloadKind, Timestamp, TransmissionFrame,
};
use crate::transform::apply_keystream;
use crate::wire::{self, CMD_MAX, DATA_MAX, SOURCE_MAX, TRAN_MAX};

/// Clock supplying the timestamp embedded in each outbound frame.
pub type Clock = Box<dyn Fn() -> Timestamp + Send>;

/// Encode context bound to one device's identity and key material.
///
/// Create one per device. The identity is immutable for the encoder's
/// lifetime; only the timestamp fields change, refreshed from the clock at
/// every encode call, so frames produced seconds apart carry different
/// stamps. Concurrent use of a single encoder is not supported, which
/// `&mut self` on the encode operations enforces; distinct encoders are
/// fully independent.
pub struct Encoder {
    identity: DeviceIdentity,
    clock: Clock,
    stamp: Timestamp,
}

impl Encoder {
    /// Create an encoder over a caller-supplied clock.
    pub fn new(identity: DeviceIdentity, clock: impl Fn() -> Timestamp + Send + 'static) -> Self {
        Self {
            identity,
            clock: Box::new(clock),
            stamp: Timestamp::default(),
        }
    }

    /// Create an encoder that stamps frames from the system clock.
    pub fn with_system_clock(identity: DeviceIdentity) -> Self {
        Self::new(identity, Timestamp::now)
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Encode a command frame.
    ///
    /// `cmd` must be 1..=[`CMD_MAX`] bytes; a violation is a contract error.
    /// `Ok(None)` means encoding legitimately produced no frame (the sealed
    /// frame would not fit [`TRAN_MAX`]), never success.
    pub fn encode_command(&mut self, cmd: &[u8]) -> Result<Option<TransmissionFrame>> {
        check_bounds("cmd", cmd.len(), CMD_MAX)?;
        Ok(self.seal(PayloadKind::Command, &[cmd]))
    }

    /// Encode a collection frame carrying a source tag and a data reading.
    ///
    /// `source` is bounded by [`SOURCE_MAX`] and `data` by [`DATA_MAX`],
    /// checked independently before anything is serialized.
    pub fn encode_collect(
        &mut self,
        source: &[u8],
        data: &[u8],
    ) -> Result<Option<TransmissionFrame>> {
        check_bounds("source", source.len(), SOURCE_MAX)?;
        check_bounds("data", data.len(), DATA_MAX)?;
        Ok(self.seal(PayloadKind::Collect, &[source, data]))
    }

    fn seal(&mut self, kind: PayloadKind, fields: &[&[u8]]) -> Option<TransmissionFrame> {
        self.stamp = (self.clock)();
        let header = HeaderFields {
            entity_id: self.identity.entity_id,
            device_ip: self.identity.device_ip,
            device_id: self.identity.device_id,
            stamp: self.stamp,
        };

        let mut buf = wire::serialize_packet(&header, kind, fields);
        if buf.len() > TRAN_MAX {
            tracing::debug!(len = buf.len(), max = TRAN_MAX, "sealed frame over budget");
            return None;
        }

        apply_keystream(self.identity.crypt_key, &mut buf);
        Some(TransmissionFrame::from_bytes(buf.freeze()))
    }
}

fn check_bounds(field: &'static str, len: usize, max: usize) -> Result<()> {
    if len < 1 {
        return Err(CodecError::LengthOutOfRange {
            field,
            len,
            min: 1,
            max,
        });
    }
    if len > max {
        return Err(CodecError::LengthOutOfRange {
            field,
            len,
            min: 1,
            max,
        });
    }
    Ok(())
}

impl Inspect for Encoder {
    fn inspect(&self) -> Inspection {
        Inspection {
            timestamp_seconds: self.stamp.seconds,
            timestamp_millis: self.stamp.millis,
            device_ip: self.identity.device_ip,
            entity_id: self.identity.entity_id,
            device_id: self.identity.device_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new(0x07, 0x01, &[1, 2, 3, 4, 5, 6], 0x0A).unwrap()
    }

    fn fixed_clock() -> impl Fn() -> Timestamp + Send {
        || Timestamp::new(1000, 500)
    }

    #[test]
    fn command_bounds_are_two_distinct_checks() {
        let mut enc = Encoder::new(identity(), fixed_clock());

        let err = enc.encode_command(b"").unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "cmd", len: 0, .. }
        ));

        let err = enc.encode_command(&vec![b'x'; CMD_MAX + 1]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "cmd", len, .. } if len == CMD_MAX + 1
        ));

        assert!(enc.encode_command(&vec![b'x'; CMD_MAX]).unwrap().is_some());
        assert!(enc.encode_command(b"x").unwrap().is_some());
    }

    #[test]
    fn collect_bounds_checked_per_field() {
        let mut enc = Encoder::new(identity(), fixed_clock());

        let err = enc.encode_collect(b"", b"data").unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "source", len: 0, .. }
        ));

        let err = enc
            .encode_collect(&vec![b's'; SOURCE_MAX + 1], b"data")
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "source", .. }
        ));

        let err = enc.encode_collect(b"src", b"").unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "data", len: 0, .. }
        ));

        let err = enc
            .encode_collect(b"src", &vec![b'd'; DATA_MAX + 1])
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthOutOfRange { field: "data", .. }
        ));

        let frame = enc
            .encode_collect(&vec![b's'; SOURCE_MAX], &vec![b'd'; DATA_MAX])
            .unwrap();
        assert!(frame.is_some());
    }

    #[test]
    fn frames_never_exceed_tran_max() {
        let mut enc = Encoder::new(identity(), fixed_clock());

        let frame = enc
            .encode_collect(&vec![b's'; SOURCE_MAX], &vec![b'd'; DATA_MAX])
            .unwrap()
            .unwrap();
        assert!(frame.len() <= TRAN_MAX);
    }

    #[test]
    fn timestamp_refreshes_per_call() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let tick = Arc::new(AtomicU32::new(0));
        let clock_tick = Arc::clone(&tick);
        let mut enc = Encoder::new(identity(), move || {
            Timestamp::new(clock_tick.fetch_add(1, Ordering::SeqCst), 0)
        });

        enc.encode_command(b"A").unwrap();
        let first = enc.inspect().timestamp_seconds;
        enc.encode_command(b"B").unwrap();
        let second = enc.inspect().timestamp_seconds;

        assert_eq!(first, 0);
        assert_eq!(second, 1);
    }

    #[test]
    fn inspect_is_idempotent_and_matches_identity() {
        let mut enc = Encoder::new(identity(), fixed_clock());
        enc.encode_command(b"ON").unwrap();

        let first = enc.inspect();
        let second = enc.inspect();
        assert_eq!(first, second);

        assert_eq!(first.timestamp_seconds, 1000);
        assert_eq!(first.timestamp_millis, 500);
        assert_eq!(first.entity_id, 0x01);
        assert_eq!(first.device_ip, 0x0A);
        assert_eq!(first.device_id, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn inspect_before_first_encode_reports_zero_stamp() {
        let enc = Encoder::new(identity(), fixed_clock());
        let view = enc.inspect();
        assert_eq!(view.timestamp_seconds, 0);
        assert_eq!(view.timestamp_millis, 0);
    }
}
