//! C FFI bridge for the Chime client.
//!
//! # Safety
//!
//! All `extern "C"` functions in this crate follow the same contract:
//! pointer arguments must be valid (non-null and properly aligned) for the
//! duration of the call, out-pointers must point to writable memory, and
//! input strings are caller-owned and NUL-terminated. Each entry point
//! validates its inputs and reports failure through a status code rather
//! than unwinding across the boundary.
//!
//! Record arrays returned by `SearchMusic` are owned by this library until
//! the caller passes them back to `ReleaseRecords`, exactly once.

mod context;
mod exports;
mod host_log;
pub mod record;

pub use context::LogCallback;
pub use exports::*;
pub use record::{TrackMetaRecord, TEXT_CAPACITY};
