//! Raw C ABI of the vendor profiling module.
//!
//! Every entry point returns an integer status; `STATUS_OK` is the single
//! success value, anything else is a failure the wrapper reports verbatim.

use std::os::raw::{c_char, c_void};

/// Status code returned by every backend entry point.
pub type RawStatus = i32;

/// The single success status.
pub const STATUS_OK: RawStatus = 0;

pub type InitializeFn = unsafe extern "C" fn() -> RawStatus;
pub type DestroyFn = unsafe extern "C" fn() -> RawStatus;

pub type OpenContextFn = unsafe extern "C" fn(*mut c_void) -> RawStatus;
pub type SelectContextFn = unsafe extern "C" fn(*mut c_void) -> RawStatus;
pub type CloseContextFn = unsafe extern "C" fn() -> RawStatus;

pub type GetNumCountersFn = unsafe extern "C" fn(*mut u32) -> RawStatus;
pub type GetCounterNameFn = unsafe extern "C" fn(u32, *mut *const c_char) -> RawStatus;
pub type GetCounterDataTypeFn = unsafe extern "C" fn(u32, *mut u32) -> RawStatus;
pub type GetCounterUsageTypeFn = unsafe extern "C" fn(u32, *mut u32) -> RawStatus;

pub type EnableCounterFn = unsafe extern "C" fn(u32) -> RawStatus;
pub type DisableCounterFn = unsafe extern "C" fn(u32) -> RawStatus;

pub type GetPassCountFn = unsafe extern "C" fn(*mut u32) -> RawStatus;

pub type BeginSessionFn = unsafe extern "C" fn(*mut u32) -> RawStatus;
pub type EndSessionFn = unsafe extern "C" fn() -> RawStatus;

pub type BeginPassFn = unsafe extern "C" fn() -> RawStatus;
pub type EndPassFn = unsafe extern "C" fn() -> RawStatus;

pub type BeginSampleFn = unsafe extern "C" fn(u32) -> RawStatus;
pub type EndSampleFn = unsafe extern "C" fn() -> RawStatus;

pub type IsSessionReadyFn = unsafe extern "C" fn(*mut bool, u32) -> RawStatus;

// Sample fetches take (session, sample, counter index, out value).
pub type GetSampleUInt32Fn = unsafe extern "C" fn(u32, u32, u32, *mut u32) -> RawStatus;
pub type GetSampleUInt64Fn = unsafe extern "C" fn(u32, u32, u32, *mut u64) -> RawStatus;
pub type GetSampleFloat32Fn = unsafe extern "C" fn(u32, u32, u32, *mut f32) -> RawStatus;
pub type GetSampleFloat64Fn = unsafe extern "C" fn(u32, u32, u32, *mut f64) -> RawStatus;

pub type GetEnabledCountFn = unsafe extern "C" fn(*mut u32) -> RawStatus;
pub type GetEnabledIndexFn = unsafe extern "C" fn(u32, *mut u32) -> RawStatus;
