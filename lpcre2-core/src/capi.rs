// C ABI wrappers for embedding hosts that are not Lua.
//
// Handles are boxed and handed out as raw pointers; every `*_free` accepts
// null. Failing calls return null (or SIZE_MAX) and, when `errmsg` is
// non-null, store a message that must be released with `lpcre2_error_free`.
// A message already in the slot is released before the new one is stored, so
// the slot must hold null or a message from an earlier call.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;
use std::sync::Arc;

use crate::error::Error;
use crate::match_result::MatchResult;
use crate::pattern::Pattern;

pub struct Lpcre2Code(Arc<Pattern>);

pub struct Lpcre2MatchData(MatchResult);

fn set_error(errmsg: *mut *mut c_char, err: &Error) {
    if errmsg.is_null() {
        return;
    }
    let msg = CString::new(err.to_string().replace('\0', " ")).unwrap_or_default();
    unsafe {
        lpcre2_error_free(*errmsg);
        *errmsg = msg.into_raw();
    }
}

unsafe fn bytes<'a>(ptr: *const c_char, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr as *const u8, len)
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_init() -> bool {
    crate::init().is_ok()
}

#[no_mangle]
pub extern "C" fn lpcre2_compile(
    pattern: *const c_char,
    length: usize,
    options: u32,
    errmsg: *mut *mut c_char,
) -> *mut Lpcre2Code {
    if let Err(e) = crate::init() {
        set_error(errmsg, &e);
        return ptr::null_mut();
    }
    let pattern = unsafe { bytes(pattern, length) };
    match Pattern::compile(pattern, options) {
        Ok(p) => Box::into_raw(Box::new(Lpcre2Code(Arc::new(p)))),
        Err(e) => {
            set_error(errmsg, &e);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_code_free(code: *mut Lpcre2Code) {
    if code.is_null() {
        return;
    }
    unsafe { drop(Box::from_raw(code)) };
}

/// Returns null both on no match and on error; only an error sets `errmsg`.
/// A null `code` is an error.
#[no_mangle]
pub extern "C" fn lpcre2_match(
    code: *const Lpcre2Code,
    subject: *const c_char,
    length: usize,
    offset: usize,
    options: u32,
    errmsg: *mut *mut c_char,
) -> *mut Lpcre2MatchData {
    if code.is_null() {
        set_error(errmsg, &Error::NullHandle("pattern"));
        return ptr::null_mut();
    }
    let code = unsafe { &*code };
    let subject = unsafe { bytes(subject, length) };
    match code.0.match_at(subject, offset, options) {
        Ok(Some(m)) => Box::into_raw(Box::new(Lpcre2MatchData(m))),
        Ok(None) => ptr::null_mut(),
        Err(e) => {
            set_error(errmsg, &e);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_match_data_rc(match_data: *const Lpcre2MatchData) -> c_int {
    if match_data.is_null() {
        return crate::NO_MATCH;
    }
    unsafe { (*match_data).0.rc() }
}

/// Start offset of group `idx` and its length in `*len`. Returns SIZE_MAX
/// for an out-of-range index or an unset group.
#[no_mangle]
pub extern "C" fn lpcre2_match_data_ovector(
    match_data: *const Lpcre2MatchData,
    idx: usize,
    len: *mut usize,
) -> usize {
    if match_data.is_null() {
        return usize::MAX;
    }
    let m = unsafe { &(*match_data).0 };
    match m.group_offset_and_length(idx.min(i64::MAX as usize) as i64) {
        Ok(Some((offset, length))) => {
            if !len.is_null() {
                unsafe { *len = length };
            }
            offset
        }
        _ => usize::MAX,
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_match_data_free(match_data: *mut Lpcre2MatchData) {
    if match_data.is_null() {
        return;
    }
    unsafe { drop(Box::from_raw(match_data)) };
}

/// Returns a buffer of `*len` bytes followed by a zero byte; release it with
/// `lpcre2_buffer_free(ptr, *len)`.
#[no_mangle]
pub extern "C" fn lpcre2_substitute(
    code: *const Lpcre2Code,
    subject: *const c_char,
    length: usize,
    replacement: *const c_char,
    rlength: usize,
    options: u32,
    len: *mut usize,
    errmsg: *mut *mut c_char,
) -> *mut c_char {
    if code.is_null() {
        set_error(errmsg, &Error::NullHandle("pattern"));
        return ptr::null_mut();
    }
    let code = unsafe { &*code };
    let subject = unsafe { bytes(subject, length) };
    let replacement = unsafe { bytes(replacement, rlength) };
    match code.0.substitute(subject, replacement, options) {
        Ok(mut out) => {
            if !len.is_null() {
                unsafe { *len = out.len() };
            }
            out.push(0);
            Box::into_raw(out.into_boxed_slice()) as *mut c_char
        }
        Err(e) => {
            set_error(errmsg, &e);
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_buffer_free(buf: *mut c_char, len: usize) {
    if buf.is_null() {
        return;
    }
    unsafe {
        let raw = ptr::slice_from_raw_parts_mut(buf as *mut u8, len + 1);
        drop(Box::from_raw(raw));
    }
}

#[no_mangle]
pub extern "C" fn lpcre2_error_free(msg: *mut c_char) {
    if msg.is_null() {
        return;
    }
    unsafe { drop(CString::from_raw(msg)) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn compile_error_sets_message() {
        let pat = "(x";
        let mut err: *mut c_char = ptr::null_mut();
        let code = lpcre2_compile(pat.as_ptr() as *const c_char, pat.len(), 0, &mut err);
        assert!(code.is_null());
        assert!(!err.is_null());
        let msg = unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned();
        assert!(msg.starts_with("compile pattern `(x` error at 2"), "{}", msg);
        lpcre2_error_free(err);
    }

    #[test]
    fn earlier_message_in_slot_is_replaced() {
        let mut err: *mut c_char = ptr::null_mut();
        set_error(&mut err, &Error::OutOfMemory);
        assert!(!err.is_null());
        set_error(&mut err, &Error::NullHandle("pattern"));
        let msg = unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned();
        assert_eq!(msg, "null pattern handle");
        lpcre2_error_free(err);
    }

    #[test]
    fn null_handles_are_tolerated() {
        lpcre2_code_free(ptr::null_mut());
        lpcre2_match_data_free(ptr::null_mut());
        lpcre2_buffer_free(ptr::null_mut(), 0);
        lpcre2_error_free(ptr::null_mut());
        assert_eq!(lpcre2_match_data_rc(ptr::null()), -1);
        assert_eq!(lpcre2_match_data_ovector(ptr::null(), 0, ptr::null_mut()), usize::MAX);
    }
}
