//! The exported C surface.
//!
//! Entry points present a synchronous, blocking contract: each call either
//! completes with a status code or blocks until the configured deadline
//! fails it. Panics never cross the boundary.

#![allow(non_snake_case)]

use crate::context::{self, LogCallback};
use crate::record::{self, TrackMetaRecord};
use chime_client::DEFAULT_SEARCH_LIMIT;
use chime_core::status;
use std::ffi::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Upper bound for a caller-supplied keyword, in UTF-16 units. A missing
/// terminator within this window is treated as an invalid argument instead
/// of walking arbitrary memory.
const MAX_KEYWORD_UNITS: usize = 1024;

/// Build the process-wide bridge context. Idempotent: a second call while
/// initialized returns `OK` without rebuilding anything.
#[no_mangle]
pub extern "C" fn BridgeInitialize(log_callback: Option<LogCallback>) -> i32 {
    guarded(|| match context::initialize(log_callback) {
        Ok(()) => status::OK,
        Err(err) => err.status_code(),
    })
}

/// Tear down the bridge context. Further calls (other than a fresh
/// `BridgeInitialize`) report the not-initialized status.
#[no_mangle]
pub extern "C" fn BridgeShutdown() {
    let _ = catch_unwind(AssertUnwindSafe(context::shutdown));
}

/// Keyword search. On success the bridge allocates a record array the
/// caller owns until it passes the same pointer and count to
/// `ReleaseRecords`; on failure the out-parameters are left untouched.
#[no_mangle]
pub unsafe extern "C" fn SearchMusic(
    keyword: *const u16,
    out_records: *mut *mut TrackMetaRecord,
    out_count: *mut i32,
) -> i32 {
    guarded(|| {
        if keyword.is_null() || out_records.is_null() || out_count.is_null() {
            return status::INVALID_ARGUMENT;
        }
        let keyword = match unsafe { read_wide_string(keyword) } {
            Some(keyword) => keyword,
            None => return status::INVALID_ARGUMENT,
        };

        let outcome = match context::with_context(|ctx| {
            ctx.runtime
                .block_on(ctx.client.search(&keyword, DEFAULT_SEARCH_LIMIT))
        }) {
            None => return status::NOT_INITIALIZED,
            Some(Err(err)) => return err.status_code(),
            Some(Ok(outcome)) => outcome,
        };

        let (ptr, count) = record::allocate_records(&outcome.tracks);
        unsafe {
            *out_records = ptr;
            *out_count = count;
        }
        status::OK
    })
}

/// Free a record array returned by a prior successful `SearchMusic`.
/// Null pointer or zero count is a no-op; releasing the same allocation
/// twice is the caller's bug, exactly like any other double free.
#[no_mangle]
pub unsafe extern "C" fn ReleaseRecords(records: *mut TrackMetaRecord, count: i32) {
    let _ = catch_unwind(AssertUnwindSafe(|| unsafe {
        record::release_records(records, count);
    }));
}

/// Begin a QR login and write its payload, a NUL-terminated UTF-8 JSON
/// blob `{"key", "url", "ttlSeconds"}`, into the caller-provided buffer. Any
/// pending attempt is superseded.
#[no_mangle]
pub unsafe extern "C" fn QRGetLoginKey(out_payload: *mut c_char, capacity: i32) -> i32 {
    guarded(|| {
        if out_payload.is_null() || capacity <= 0 {
            return status::INVALID_ARGUMENT;
        }
        let attempt =
            match context::with_context(|ctx| ctx.runtime.block_on(ctx.client.begin_login())) {
                None => return status::NOT_INITIALIZED,
                Some(Err(err)) => return err.status_code(),
                Some(Ok(attempt)) => attempt,
            };

        let payload = serde_json::json!({
            "key": attempt.key,
            "url": attempt.qr_url,
            "ttlSeconds": attempt.ttl.map(|t| t.as_secs()),
        });
        unsafe { write_utf8(out_payload, capacity as usize, &payload.to_string()) };
        status::OK
    })
}

/// Poll the active login attempt. `out_state` receives the QR state code
/// (0 Pending, 1 Scanned, 2 Confirmed, 3 Expired, 4 Cancelled, 5 Failed);
/// `out_detail` (optional) receives the remote message text.
#[no_mangle]
pub unsafe extern "C" fn QRCheckLoginStatus(
    out_state: *mut i32,
    out_detail: *mut c_char,
    detail_capacity: i32,
) -> i32 {
    guarded(|| {
        if out_state.is_null() {
            return status::INVALID_ARGUMENT;
        }
        let result =
            match context::with_context(|ctx| ctx.runtime.block_on(ctx.client.poll_login_status()))
            {
                None => return status::NOT_INITIALIZED,
                Some(result) => result,
            };

        match result {
            Ok((qr_status, detail)) => {
                unsafe {
                    *out_state = qr_status.state_code();
                    if !out_detail.is_null() && detail_capacity > 0 {
                        write_utf8(out_detail, detail_capacity as usize, &detail);
                    }
                }
                status::OK
            }
            Err(err) => err.status_code(),
        }
    })
}

/// Cancel the active login attempt. The attempt is marked cancelled before
/// the service is notified, so a concurrent poll can never resurrect it.
#[no_mangle]
pub extern "C" fn QRCancelLogin() {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let _ = context::with_context(|ctx| ctx.runtime.block_on(ctx.client.cancel_login()));
    }));
}

/// Invalidate the session remotely (best effort) and clear all local
/// credential state.
#[no_mangle]
pub extern "C" fn BridgeLogout() -> i32 {
    guarded(
        || match context::with_context(|ctx| ctx.runtime.block_on(ctx.client.logout())) {
            Some(()) => status::OK,
            None => status::NOT_INITIALIZED,
        },
    )
}

fn guarded(f: impl FnOnce() -> i32) -> i32 {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(status::INTERNAL)
}

/// Read a caller-owned NUL-terminated UTF-16 string, bounded by
/// [`MAX_KEYWORD_UNITS`].
unsafe fn read_wide_string(ptr: *const u16) -> Option<String> {
    let mut units = Vec::new();
    for i in 0..MAX_KEYWORD_UNITS {
        let unit = *ptr.add(i);
        if unit == 0 {
            return Some(String::from_utf16_lossy(&units));
        }
        units.push(unit);
    }
    None
}

/// Copy into a caller-provided buffer, truncating at a char boundary and
/// always NUL-terminating. Truncation of the same input at the same
/// capacity yields the same bytes.
unsafe fn write_utf8(dst: *mut c_char, capacity: usize, value: &str) {
    let mut end = value.len().min(capacity - 1);
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    for (i, &byte) in value.as_bytes()[..end].iter().enumerate() {
        *dst.add(i) = byte as c_char;
    }
    *dst.add(end) = 0;
}
