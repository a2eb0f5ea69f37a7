//! Owners for the raw PCRE2 resources.
//!
//! Everything unsafe in the crate lives here. `Code` and `MatchData` free
//! their engine allocation on drop; callers above this module never see a
//! raw pointer.

use std::ffi::c_void;
use std::os::raw::c_int;
use std::ptr::{self, NonNull};
use std::slice;

use pcre2_sys::{
    pcre2_code_8, pcre2_code_free_8, pcre2_compile_8, pcre2_get_error_message_8,
    pcre2_get_ovector_count_8, pcre2_get_ovector_pointer_8, pcre2_match_8,
    pcre2_match_data_8, pcre2_match_data_create_from_pattern_8, pcre2_match_data_free_8,
    pcre2_pattern_info_8, pcre2_substitute_8, PCRE2_INFO_CAPTURECOUNT,
};

use crate::error::{Error, Result};

pub const ERROR_NOMATCH: c_int = pcre2_sys::PCRE2_ERROR_NOMATCH;
pub const ERROR_NOMEMORY: c_int = pcre2_sys::PCRE2_ERROR_NOMEMORY;

/// Offset the engine stores for a group that did not participate.
pub const UNSET: usize = usize::MAX;

/// Size of the buffer engine messages are rendered into.
const MESSAGE_BUF_LEN: usize = 256;

/// Render the engine's message for `code`.
pub fn error_message(code: c_int) -> String {
    let mut buf = [0u8; MESSAGE_BUF_LEN];
    let len = unsafe { pcre2_get_error_message_8(code, buf.as_mut_ptr(), buf.len()) };
    if len < 0 {
        format!("unknown PCRE2 error {}", code)
    } else {
        String::from_utf8_lossy(&buf[..len as usize]).into_owned()
    }
}

/// A compiled pattern.
pub struct Code(NonNull<pcre2_code_8>);

// Compiled code is immutable after pcre2_compile and may be matched from
// several threads at once, each with its own match data.
unsafe impl Send for Code {}
unsafe impl Sync for Code {}

impl Drop for Code {
    fn drop(&mut self) {
        unsafe { pcre2_code_free_8(self.0.as_ptr()) }
    }
}

impl Code {
    pub fn compile(pattern: &[u8], options: u32) -> Result<Code> {
        let mut error_code: c_int = 0;
        let mut error_offset: usize = 0;
        let raw = unsafe {
            pcre2_compile_8(
                pattern.as_ptr(),
                pattern.len(),
                options,
                &mut error_code,
                &mut error_offset,
                ptr::null_mut(),
            )
        };
        match NonNull::new(raw) {
            Some(code) => Ok(Code(code)),
            None => Err(Error::Compile {
                pattern: String::from_utf8_lossy(pattern).into_owned(),
                offset: error_offset,
                message: error_message(error_code),
            }),
        }
    }

    pub fn capture_count(&self) -> Result<u32> {
        let mut count: u32 = 0;
        let rc = unsafe {
            pcre2_pattern_info_8(
                self.0.as_ptr(),
                PCRE2_INFO_CAPTURECOUNT,
                &mut count as *mut u32 as *mut c_void,
            )
        };
        if rc < 0 {
            return Err(Error::Match { code: rc, message: error_message(rc) });
        }
        Ok(count)
    }

    /// Run the matcher, returning the engine's raw return code.
    pub fn match_into(
        &self,
        data: &mut MatchData,
        subject: &[u8],
        offset: usize,
        options: u32,
    ) -> c_int {
        unsafe {
            pcre2_match_8(
                self.0.as_ptr(),
                subject.as_ptr(),
                subject.len(),
                offset,
                options,
                data.ptr.as_ptr(),
                ptr::null_mut(),
            )
        }
    }

    /// Run the substituter into `out`, returning the raw return code and the
    /// length the engine reported. With the overflow-length option set and a
    /// too-small `out`, the reported length is the capacity needed including
    /// the terminating zero.
    pub fn substitute_into(
        &self,
        subject: &[u8],
        replacement: &[u8],
        options: u32,
        out: &mut [u8],
    ) -> (c_int, usize) {
        let mut outlen = out.len();
        let rc = unsafe {
            pcre2_substitute_8(
                self.0.as_ptr(),
                subject.as_ptr(),
                subject.len(),
                0,
                options,
                ptr::null_mut(),
                ptr::null_mut(),
                replacement.as_ptr(),
                replacement.len(),
                out.as_mut_ptr(),
                &mut outlen,
            )
        };
        (rc, outlen)
    }
}

/// A match-data block: the engine's ovector plus bookkeeping.
pub struct MatchData {
    ptr: NonNull<pcre2_match_data_8>,
    pairs: usize,
}

// Only ever touched through &mut during a match, then read-only.
unsafe impl Send for MatchData {}

impl Drop for MatchData {
    fn drop(&mut self) {
        unsafe { pcre2_match_data_free_8(self.ptr.as_ptr()) }
    }
}

impl MatchData {
    /// Allocate a block sized for `code`'s capture groups.
    pub fn for_code(code: &Code) -> Result<MatchData> {
        let raw =
            unsafe { pcre2_match_data_create_from_pattern_8(code.0.as_ptr(), ptr::null_mut()) };
        let ptr = NonNull::new(raw).ok_or(Error::OutOfMemory)?;
        let pairs = unsafe { pcre2_get_ovector_count_8(ptr.as_ptr()) } as usize;
        Ok(MatchData { ptr, pairs })
    }

    /// Flat (start, end) offset pairs, one per group including group 0.
    pub fn ovector(&self) -> &[usize] {
        unsafe {
            let ov = pcre2_get_ovector_pointer_8(self.ptr.as_ptr());
            slice::from_raw_parts(ov, self.pairs * 2)
        }
    }

    pub fn pair(&self, index: usize) -> Option<(usize, usize)> {
        let ov = self.ovector();
        let start = *ov.get(index * 2)?;
        let end = *ov.get(index * 2 + 1)?;
        if start == UNSET || end == UNSET {
            return None;
        }
        Some((start, end))
    }
}
