//! Bounded binary telemetry/command frame codec.
//!
//! Packs device identity, a timestamp, and either a command string or a
//! source/data collection pair into a single transmission frame of at most
//! [`TRAN_MAX`] bytes, obscured by a keyed byte transform and guarded by a
//! checksum. Decoding reverses the packing and rejects anything malformed,
//! truncated, or keyed differently.
//!
//! Failures come in two tiers, deliberately distinct:
//! - contract violations (bad identity length, payload or frame length out
//!   of bounds) fail loudly with [`CodecError`];
//! - data-dependent outcomes (a frame that wasn't for us, a key mismatch,
//!   line corruption) come back as an absent result — legitimate "no
//!   output", never an error and never success.
//!
//! Contexts are plain owned values: create an [`Encoder`] per device and a
//! [`Decoder`] per key, and drop them when done. The codec is synchronous,
//! performs no I/O, and holds no global state.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod packet;
mod transform;
pub mod wire;

pub use decoder::Decoder;
pub use encoder::{Clock, Encoder};
pub use error::{CodecError, Result};
pub use packet::{
    DecodedPacket, DeviceIdentity, Inspect, Inspection, Payload, PayloadKind, Timestamp,
    TransmissionFrame,
};
pub use wire::{CMD_MAX, DATA_MAX, DEVICE_ID_LEN, SOURCE_MAX, TRAN_MAX};
