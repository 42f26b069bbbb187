//! Test harness for the perfscope profiler.
//!
//! Provides a fully scripted in-memory backend so the session state machine
//! and result decoding can be exercised without a vendor driver.

pub mod mock;

pub use mock::{CallLog, MockBackend, MockCounter, MockOp, MOCK_FAILURE};
