use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use zwlib_codec::CodecError;

use crate::types::ZwResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::new("").expect("empty CString should be valid"));
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new("").expect("empty CString should be valid");
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized)
            .unwrap_or_else(|_| CString::new("internal error").expect("literal is valid"));
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> ZwResult {
    set_error_message(message);
    ZwResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_codec_error(err: &CodecError) -> ZwResult {
    set_error_message(err.to_string());
    match err {
        CodecError::InvalidIdentity { .. } => ZwResult::InvalidIdentity,
        CodecError::LengthOutOfRange { .. } => ZwResult::LengthOutOfRange,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
