//! Backend capability interface.

use std::ffi::c_void;

use perfscope_core::Result;

/// Native rendering-API context handle, passed through to the backend opaquely.
pub type NativeContext = *mut c_void;

/// Capability interface of a profiling backend.
///
/// One method per backend entry point, with status codes already converted to
/// [`Result`]. Counter data-type and usage-type queries return the backend's
/// raw codes; decoding them is the caller's job so that an unrecognized code
/// from a newer backend surfaces as a wrapper decode error.
///
/// The backend is assumed non-reentrant and is driven single-threaded; see the
/// crate docs for the ordering contract callers must uphold.
pub trait Backend {
    /// Initialize the backend. Must be the first call after loading.
    fn initialize(&self) -> Result<()>;

    /// Shut the backend down. No call is valid afterwards.
    fn destroy(&self) -> Result<()>;

    /// Open a rendering-API context for profiling.
    ///
    /// # Safety
    /// `context` must be a valid native context handle for the rendering API
    /// this backend was loaded for, and must stay valid until the matching
    /// [`close_context`](Self::close_context).
    unsafe fn open_context(&self, context: NativeContext) -> Result<()>;

    /// Re-assert which open context subsequent operations target.
    ///
    /// # Safety
    /// `context` must be a handle previously opened via
    /// [`open_context`](Self::open_context) and not yet closed.
    unsafe fn select_context(&self, context: NativeContext) -> Result<()>;

    /// Close the currently open context.
    fn close_context(&self) -> Result<()>;

    /// Number of counters the backend exposes.
    fn counter_count(&self) -> Result<u32>;

    /// Name of the counter at `index`.
    fn counter_name(&self, index: u32) -> Result<String>;

    /// Raw data-type code of the counter at `index`.
    fn counter_data_type(&self, index: u32) -> Result<u32>;

    /// Raw usage-type code of the counter at `index`.
    fn counter_usage_type(&self, index: u32) -> Result<u32>;

    /// Enable the counter at `index` for the next session.
    fn enable_counter(&self, index: u32) -> Result<()>;

    /// Disable the counter at `index`.
    fn disable_counter(&self, index: u32) -> Result<()>;

    /// Number of passes required to resolve the currently enabled counters.
    fn pass_count(&self) -> Result<u32>;

    /// Begin a measurement session, returning the backend-issued session id.
    fn begin_session(&self) -> Result<u32>;

    /// End the current session.
    fn end_session(&self) -> Result<()>;

    /// Begin a pass inside the current session.
    fn begin_pass(&self) -> Result<()>;

    /// End the current pass.
    fn end_pass(&self) -> Result<()>;

    /// Begin a sample with the given caller-chosen id inside the current pass.
    fn begin_sample(&self, id: u32) -> Result<()>;

    /// End the current sample.
    fn end_sample(&self) -> Result<()>;

    /// Whether the given session's results are ready to read.
    fn session_ready(&self, session: u32) -> Result<bool>;

    /// Fetch a counter value as an unsigned 32-bit integer.
    fn sample_u32(&self, session: u32, sample: u32, counter: u32) -> Result<u32>;

    /// Fetch a counter value as an unsigned 64-bit integer.
    fn sample_u64(&self, session: u32, sample: u32, counter: u32) -> Result<u64>;

    /// Fetch a counter value as a 32-bit float.
    fn sample_f32(&self, session: u32, sample: u32, counter: u32) -> Result<f32>;

    /// Fetch a counter value as a 64-bit float.
    fn sample_f64(&self, session: u32, sample: u32, counter: u32) -> Result<f64>;

    /// Number of currently enabled counters.
    fn enabled_count(&self) -> Result<u32>;

    /// Counter index of the enabled counter at `position` in enabled order.
    fn enabled_index(&self, position: u32) -> Result<u32>;
}
