use std::ffi::c_void;

use zwlib_codec::{Decoder, Encoder};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZwResult {
    Ok = 0,
    InvalidArgument = 1,
    InvalidIdentity = 2,
    LengthOutOfRange = 3,
    /// The operation legitimately produced no output: encode overflow, or a
    /// frame that failed the keyed transform / integrity checks. Not an
    /// error and not success.
    Empty = 4,
    Internal = 99,
}

#[allow(dead_code)]
pub const ZW_OK: ZwResult = ZwResult::Ok;
#[allow(dead_code)]
pub const ZW_ERR_INVALID_ARGUMENT: ZwResult = ZwResult::InvalidArgument;
#[allow(dead_code)]
pub const ZW_ERR_INVALID_IDENTITY: ZwResult = ZwResult::InvalidIdentity;
#[allow(dead_code)]
pub const ZW_ERR_LENGTH_OUT_OF_RANGE: ZwResult = ZwResult::LengthOutOfRange;
#[allow(dead_code)]
pub const ZW_EMPTY: ZwResult = ZwResult::Empty;
#[allow(dead_code)]
pub const ZW_ERR_INTERNAL: ZwResult = ZwResult::Internal;

/// Payload-kind discriminators as seen by the host.
#[allow(dead_code)]
pub const ZW_KIND_COMMAND: u8 = 1;
#[allow(dead_code)]
pub const ZW_KIND_COLLECT: u8 = 2;

/// Size constants mirrored across the ABI.
#[allow(dead_code)]
pub const ZW_TRAN_MAX: usize = zwlib_codec::TRAN_MAX;
#[allow(dead_code)]
pub const ZW_CMD_MAX: usize = zwlib_codec::CMD_MAX;
#[allow(dead_code)]
pub const ZW_SOURCE_MAX: usize = zwlib_codec::SOURCE_MAX;
#[allow(dead_code)]
pub const ZW_DATA_MAX: usize = zwlib_codec::DATA_MAX;
pub const ZW_DEVICE_ID_LEN: usize = zwlib_codec::DEVICE_ID_LEN;

/// An encoded frame handed to the host. Opaque binary data.
#[repr(C)]
#[derive(Debug)]
pub struct ZwFrame {
    pub data: *mut u8,
    pub len: usize,
}

impl Default for ZwFrame {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
        }
    }
}

/// A decoded packet handed to the host.
///
/// `payload` carries the command string of a Command frame or the source tag
/// of a Collect frame; `data` carries a Collect frame's reading and stays
/// null for Command frames.
#[repr(C)]
#[derive(Debug)]
pub struct ZwPacket {
    pub seconds: u32,
    pub millis: u16,
    pub device_ip: u8,
    pub entity_id: u8,
    pub kind: u8,
    pub device_id: [u8; ZW_DEVICE_ID_LEN],
    pub payload: *mut u8,
    pub payload_len: usize,
    pub data: *mut u8,
    pub data_len: usize,
}

impl Default for ZwPacket {
    fn default() -> Self {
        Self {
            seconds: 0,
            millis: 0,
            device_ip: 0,
            entity_id: 0,
            kind: 0,
            device_id: [0; ZW_DEVICE_ID_LEN],
            payload: std::ptr::null_mut(),
            payload_len: 0,
            data: std::ptr::null_mut(),
            data_len: 0,
        }
    }
}

/// Field projection of a context, for diagnostics.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZwInspection {
    pub seconds: u32,
    pub millis: u16,
    pub device_ip: u8,
    pub entity_id: u8,
    pub device_id: [u8; ZW_DEVICE_ID_LEN],
}

pub type ZwEncoderHandle = *mut c_void;
pub type ZwDecoderHandle = *mut c_void;

pub(crate) struct EncoderHandle {
    pub(crate) encoder: Encoder,
}

pub(crate) struct DecoderHandle {
    pub(crate) decoder: Decoder,
}
