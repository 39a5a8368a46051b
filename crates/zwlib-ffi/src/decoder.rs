use zwlib_codec::{Decoder, Inspect};

use crate::args;
use crate::error;
use crate::frame::{clear_packet_out, write_packet_out};
use crate::types::{DecoderHandle, ZwDecoderHandle, ZwInspection, ZwPacket, ZwResult};

fn with_decoder_mut<T>(
    handle: ZwDecoderHandle,
    on_error: T,
    f: impl FnOnce(&mut DecoderHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("decoder handle cannot be null");
        return on_error;
    }

    let decoder_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *(handle as *mut DecoderHandle) }
    };

    f(decoder_handle)
}

/// Create a decode context bound to a shared crypt key. Never fails except
/// on allocation.
#[no_mangle]
pub extern "C" fn zw_decoder_new(crypt_key: u8) -> ZwDecoderHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        let handle = DecoderHandle {
            decoder: Decoder::new(crypt_key),
        };
        Box::into_raw(Box::new(handle)) as ZwDecoderHandle
    })
}

/// Free a decoder handle.
///
/// # Safety
/// `handle` must be null or a handle previously returned by `zw_decoder_new`.
#[no_mangle]
pub unsafe extern "C" fn zw_decoder_free(handle: ZwDecoderHandle) {
    crate::ffi_boundary((), || {
        if handle.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by zw_decoder_new.
        unsafe {
            drop(Box::from_raw(handle as *mut DecoderHandle));
        }
    });
}

/// Validate and unpack a received frame into `out_packet`.
///
/// Returns `Empty` (with `out_packet` cleared) for every data-dependent
/// rejection — wrong key and corruption are indistinguishable here;
/// `LengthOutOfRange` when the raw frame length violates the contract.
///
/// # Safety
/// `handle` must be a valid decoder handle, `frame` readable for `frame_len`
/// bytes, and `out_packet` a valid writable pointer. If `out_packet` already
/// holds prior payloads from this library, they are freed first.
#[no_mangle]
pub unsafe extern "C" fn zw_decode(
    handle: ZwDecoderHandle,
    frame: *const u8,
    frame_len: usize,
    out_packet: *mut ZwPacket,
) -> ZwResult {
    crate::ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();

        let frame = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(frame, frame_len, "frame") } {
                Some(v) => v,
                None => return ZwResult::InvalidArgument,
            }
        };

        with_decoder_mut(handle, ZwResult::InvalidArgument, |decoder_handle| {
            match decoder_handle.decoder.decode(frame) {
                Ok(Some(packet)) => write_packet_out(out_packet, &packet),
                Ok(None) => {
                    let status = clear_packet_out(out_packet);
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

/// Project a decoder's retained field values (from its most recent
/// successful decode) into `out`.
///
/// # Safety
/// `handle` must be a valid decoder handle and `out` a non-null writable
/// pointer.
#[no_mangle]
pub unsafe extern "C" fn zw_decoder_inspect(
    handle: ZwDecoderHandle,
    out: *mut ZwInspection,
) -> ZwResult {
    crate::ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();

        if out.is_null() {
            return error::set_invalid_argument("out cannot be null");
        }

        with_decoder_mut(handle, ZwResult::InvalidArgument, |decoder_handle| {
            let view = decoder_handle.decoder.inspect();
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
