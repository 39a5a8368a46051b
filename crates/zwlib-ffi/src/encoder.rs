use zwlib_codec::{DeviceIdentity, Encoder, Inspect};

use crate::args;
use crate::error;
use crate::frame::{clear_frame_out, write_frame_out};
use crate::types::{EncoderHandle, ZwEncoderHandle, ZwFrame, ZwInspection, ZwResult};

fn with_encoder_mut<T>(
    handle: ZwEncoderHandle,
    on_error: T,
    f: impl FnOnce(&mut EncoderHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("encoder handle cannot be null");
        return on_error;
    }

    let encoder_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut EncoderHandle) }
    };

    f(encoder_handle)
}

/// Create an encode context bound to one device's identity.
///
/// The context stamps frames from the system clock. Returns null on invalid
/// arguments (including a device id that is not exactly
/// `ZW_DEVICE_ID_LEN` bytes); the reason is readable via `zw_last_error`.
///
/// # Safety
/// `device_id` must be non-null and readable for `device_id_len` bytes.
#[no_mangle]
pub unsafe extern "C" fn zw_encoder_new(
    crypt_key: u8,
    entity_id: u8,
    device_id: *const u8,
    device_id_len: usize,
    device_ip: u8,
) -> ZwEncoderHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let device_id = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(device_id, device_id_len, "device_id") } {
                Some(v) => v,
                None => return std::ptr::null_mut(),
            }
        };

        match DeviceIdentity::new(crypt_key, entity_id, device_id, device_ip) {
            Ok(identity) => {
                let handle = EncoderHandle {
                    encoder: Encoder::with_system_clock(identity),
                };
                Box::into_raw(Box::new(handle)) as ZwEncoderHandle
            }
            Err(err) => {
                let _ = error::map_codec_error(&err);
                std::ptr::null_mut()
            }
        }
    })
}

/// Free an encoder handle.
///
/// # Safety
/// `handle` must be null or a handle previously returned by `zw_encoder_new`.
#[no_mangle]
pub unsafe extern "C" fn zw_encoder_free(handle: ZwEncoderHandle) {
    crate::ffi_boundary((), || {
        if handle.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by zw_encoder_new.
        unsafe {
            drop(Box::from_raw(handle as *mut EncoderHandle));
        }
    });
}

/// Encode a command frame into `out_frame`.
///
/// Returns `Empty` (with `out_frame` cleared) when encoding legitimately
/// produced no frame; `LengthOutOfRange` when `cmd_len` violates the
/// contract.
///
/// # Safety
/// `handle` must be a valid encoder handle, `cmd` readable for `cmd_len`
/// bytes, and `out_frame` a valid writable pointer. If `out_frame->data`
/// already holds a prior frame from this library, it is freed first.
#[no_mangle]
pub unsafe extern "C" fn zw_encode_command(
    handle: ZwEncoderHandle,
    cmd: *const u8,
    cmd_len: usize,
    out_frame: *mut ZwFrame,
) -> ZwResult {
    crate::ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();

        let cmd = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(cmd, cmd_len, "cmd") } {
                Some(v) => v,
                None => return ZwResult::InvalidArgument,
            }
        };

        with_encoder_mut(handle, ZwResult::InvalidArgument, |encoder_handle| {
            match encoder_handle.encoder.encode_command(cmd) {
                Ok(Some(frame)) => write_frame_out(out_frame, frame.as_bytes()),
                Ok(None) => {
                    let status = clear_frame_out(out_frame);
                    if status == ZwResult::Ok {
                        ZwResult::Empty
                    } else {
                        status
                    }
                }
                Err(err) => error::map_codec_error(&err),
            }
        })
    })
}

/// Encode a collection frame into `out_frame`.
///
/// # Safety
/// Same requirements as `zw_encode_command`, for both the `source` and
/// `data` pointer/length pairs.
#[no_mangle]
pub unsafe extern "C" fn zw_encode_collect(
    handle: ZwEncoderHandle,
    source: *const u8,
    source_len: usize,
    data: *const u8,
    data_len: usize,
    out_frame: *mut ZwFrame,
) -> ZwResult {
    crate::ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();

        let source = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(source, source_len, "source") } {
                Some(v) => v,
                None => return ZwResult::InvalidArgument,
            }
        };
        let data = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(data, data_len, "data") } {
                Some(v) => v,
                None => return ZwResult::InvalidArgument,
            }
        };

        with_encoder_mut(handle, ZwResult::InvalidArgument, |encoder_handle| {
            match encoder_handle.encoder.encode_collect(source, data) {
                Ok(Some(frame)) => write_frame_out(out_frame, frame.as_bytes()),
                Ok(None) => {
                    let status = clear_frame_out(out_frame);
                    if status == ZwResult::Ok {
                        ZwResult::Empty
                    } else {
                        status
                    }
                }
                Err(err) => error::map_codec_error(&err),
            }
        })
    })
}

/// Project an encoder's current field values into `out`.
///
/// # Safety
/// `handle` must be a valid encoder handle and `out` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn zw_encoder_inspect(
    handle: ZwEncoderHandle,
    out: *mut ZwInspection,
) -> ZwResult {
    crate::ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();

        if out.is_null() {
            return error::set_invalid_argument("out cannot be null");
        }

        with_encoder_mut(handle, ZwResult::InvalidArgument, |encoder_handle| {
            let view = encoder_handle.encoder.inspect();
            // SAFETY: Pointer was checked for null above.
            unsafe {
                *out = ZwInspection {
                    seconds: view.timestamp_seconds,
                    millis: view.timestamp_millis,
                    device_ip: view.device_ip,
                    entity_id: view.entity_id,
                    device_id: view.device_id,
                };
            }
            ZwResult::Ok
        })
    })
}
