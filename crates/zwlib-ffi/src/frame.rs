use std::ptr;

use zwlib_codec::{DecodedPacket, Payload};

use crate::error;
use crate::types::{ZwFrame, ZwPacket, ZwResult};

fn box_bytes(bytes: &[u8]) -> (*mut u8, usize) {
    let len = bytes.len();
    if len == 0 {
        return (ptr::null_mut(), 0);
    }
    let boxed: Box<[u8]> = bytes.to_vec().into_boxed_slice();
    (Box::into_raw(boxed) as *mut u8, len)
}

/// # Safety
/// `(data, len)` must be null/0 or a pair previously produced by `box_bytes`.
unsafe fn free_bytes(data: *mut u8, len: usize) {
    if data.is_null() {
        return;
    }
    let slice_ptr = ptr::slice_from_raw_parts_mut(data, len);
    // SAFETY: The pair originated from a `Box<[u8]>` in this library.
    unsafe {
        drop(Box::from_raw(slice_ptr));
    }
}

pub(crate) fn write_frame_out(out_frame: *mut ZwFrame, bytes: &[u8]) -> ZwResult {
    if out_frame.is_null() {
        return error::set_invalid_argument("out_frame cannot be null");
    }

    let frame_ref = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *out_frame }
    };

    // SAFETY: Any existing payload pointer was allocated by this library.
    unsafe { free_bytes(frame_ref.data, frame_ref.len) };

    let (data, len) = box_bytes(bytes);
    frame_ref.data = data;
    frame_ref.len = len;

    ZwResult::Ok
}

pub(crate) fn clear_frame_out(out_frame: *mut ZwFrame) -> ZwResult {
    write_frame_out(out_frame, &[])
}

pub(crate) fn write_packet_out(out_packet: *mut ZwPacket, packet: &DecodedPacket) -> ZwResult {
    if out_packet.is_null() {
        return error::set_invalid_argument("out_packet cannot be null");
    }

    let packet_ref = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *out_packet }
    };

    // SAFETY: Any existing payload pointers were allocated by this library.
    unsafe {
        free_bytes(packet_ref.payload, packet_ref.payload_len);
        free_bytes(packet_ref.data, packet_ref.data_len);
    }
    *packet_ref = ZwPacket::default();

    let stamp = packet.timestamp();
    packet_ref.seconds = stamp.seconds;
    packet_ref.millis = stamp.millis;
    packet_ref.device_ip = packet.device_ip();
    packet_ref.entity_id = packet.entity_id();
    packet_ref.kind = packet.kind() as u8;
    packet_ref.device_id = *packet.device_id();

    match packet.payload() {
        Payload::Command { cmd } => {
            let (data, len) = box_bytes(cmd);
            packet_ref.payload = data;
            packet_ref.payload_len = len;
        }
        Payload::Collect { source, data } => {
            let (ptr, len) = box_bytes(source);
            packet_ref.payload = ptr;
            packet_ref.payload_len = len;
            let (ptr, len) = box_bytes(data);
            packet_ref.data = ptr;
            packet_ref.data_len = len;
        }
    }

    ZwResult::Ok
}

pub(crate) fn clear_packet_out(out_packet: *mut ZwPacket) -> ZwResult {
    if out_packet.is_null() {
        return error::set_invalid_argument("out_packet cannot be null");
    }

    let packet_ref = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &mut *out_packet }
    };

    // SAFETY: Any existing payload pointers were allocated by this library.
    unsafe {
        free_bytes(packet_ref.payload, packet_ref.payload_len);
        free_bytes(packet_ref.data, packet_ref.data_len);
    }
    *packet_ref = ZwPacket::default();

    ZwResult::Ok
}

/// Free frame memory held by a [`ZwFrame`] populated by the encode APIs.
///
/// # Safety
/// `frame` must be either null or a valid pointer to a `ZwFrame` created by
/// caller code. If `frame->data` is non-null, it must have originated from
/// this library.
#[no_mangle]
pub unsafe extern "C" fn zw_frame_free(frame: *mut ZwFrame) {
    crate::ffi_boundary((), || {
        if frame.is_null() {
            return;
        }

        let frame_ref = {
            // SAFETY: Pointer validity is guaranteed by the caller.
            unsafe { &mut *frame }
        };

        // SAFETY: `data` was allocated by `Box<[u8]>` in the encode APIs.
        unsafe { free_bytes(frame_ref.data, frame_ref.len) };
        *frame_ref = ZwFrame::default();
    });
}

/// Free payload memory held by a [`ZwPacket`] populated by `zw_decode`.
///
/// # Safety
/// `packet` must be either null or a valid pointer to a `ZwPacket` created
/// by caller code. Non-null payload pointers must have originated from this
/// library.
#[no_mangle]
pub unsafe extern "C" fn zw_packet_free(packet: *mut ZwPacket) {
    crate::ffi_boundary((), || {
        if packet.is_null() {
            return;
        }
        let _ = clear_packet_out(packet);
    });
}
