//! zwlib-ffi: C-ABI exports for the zwlib codec.
//!
//! Contexts cross the boundary as opaque handles with an explicit
//! create/free lifecycle; frames and decoded payloads cross as
//! library-allocated buffers the host returns via the matching free
//! functions. Panics never unwind into the host.

mod args;
mod decoder;
mod encoder;
mod error;
mod frame;
mod types;

use std::panic::AssertUnwindSafe;

pub use decoder::{zw_decode, zw_decoder_free, zw_decoder_inspect, zw_decoder_new};
pub use encoder::{
    zw_encode_collect, zw_encode_command, zw_encoder_free, zw_encoder_inspect, zw_encoder_new,
};
pub use frame::{zw_frame_free, zw_packet_free};
pub use types::{
    ZwDecoderHandle, ZwEncoderHandle, ZwFrame, ZwInspection, ZwPacket, ZwResult, ZW_CMD_MAX,
    ZW_DATA_MAX, ZW_DEVICE_ID_LEN, ZW_EMPTY, ZW_ERR_INTERNAL, ZW_ERR_INVALID_ARGUMENT,
    ZW_ERR_INVALID_IDENTITY, ZW_ERR_LENGTH_OUT_OF_RANGE, ZW_KIND_COLLECT, ZW_KIND_COMMAND, ZW_OK,
    ZW_SOURCE_MAX, ZW_TRAN_MAX,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn zw_init() -> ZwResult {
    ffi_boundary(ZwResult::Internal, || {
        error::clear_error_state();
        ZwResult::Ok
    })
}

#[no_mangle]
pub extern "C" fn zw_cleanup() {
    ffi_boundary((), || {
        error::clear_error_state();
    });
}

#[no_mangle]
pub extern "C" fn zw_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
