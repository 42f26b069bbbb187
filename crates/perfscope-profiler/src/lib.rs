//! Multi-pass GPU counter profiling sessions.
//!
//! This crate provides the high-level profiling API on top of a runtime-loaded
//! vendor backend:
//! - [`PerformanceLibrary`]: loads and initializes the backend
//! - [`Context`]: one profiled rendering-API context
//! - [`CounterSet`]: counter enumeration and selection
//! - [`Session`], [`Pass`], [`Sample`]: the nested measurement lifecycle
//! - [`SessionResult`]: decoded counter values by name
//!
//! The backend records strictly nested, single-threaded work: one session per
//! context, one pass per session, one sample per pass at a time, with every
//! level ended before its parent. The wrapper's types enforce single ownership
//! (none of them are cloneable) and end themselves on drop; the nesting order
//! itself is the caller's contract with the backend.
//!
//! A counter set may need more than one pass to be fully measured, so the
//! profiled workload must be repeated once per pass:
//!
//! ```ignore
//! let library = PerformanceLibrary::new(ProfileApi::OpenGl)?;
//! let context = unsafe { library.open_context(native_gl_context) }?;
//!
//! let mut counters = context.available_counters()?;
//! counters.keep(&["GPUBusy", "MemUnitBusy"]);
//! counters.enable()?;
//!
//! let mut session = context.begin_session()?;
//! for _ in 0..counters.required_pass_count()? {
//!     let mut pass = session.begin_pass()?;
//!     let mut sample = pass.begin_sample()?;
//!     render_frame();
//!     sample.end()?;
//!     pass.end()?;
//! }
//! session.end()?;
//!
//! let results = session.results(true)?;
//! ```

pub mod context;
pub mod counters;
pub mod library;
pub mod result;
pub mod session;

pub use context::Context;
pub use counters::CounterSet;
pub use library::PerformanceLibrary;
pub use perfscope_core::{Counter, CounterValue, DataType, Error, ProfileApi, Result, UsageType};
pub use result::SessionResult;
pub use session::{Pass, Sample, Session, DEFAULT_POLL_INTERVAL};
