//! Profiled rendering-API context.

use std::ptr;
use std::sync::Arc;

use hashbrown::HashMap;

use perfscope_backend::{Backend, NativeContext};
use perfscope_core::{Counter, DataType, Result, UsageType};

use crate::counters::CounterSet;
use crate::session::Session;

/// One rendering-API context opened for profiling.
///
/// Holds the native context handle it was opened with; after [`close`] (or a
/// move, since the type is not cloneable) the handle is cleared and only the
/// backend sees further misuse. Dropping an open context closes it.
///
/// [`close`]: Context::close
pub struct Context {
    backend: Arc<dyn Backend>,
    handle: NativeContext,
}

impl Context {
    /// Open `context` against the backend.
    ///
    /// # Safety
    /// See [`PerformanceLibrary::open_context`](crate::PerformanceLibrary::open_context).
    pub(crate) unsafe fn open(backend: Arc<dyn Backend>, context: NativeContext) -> Result<Self> {
        unsafe { backend.open_context(context) }?;
        Ok(Self {
            backend,
            handle: context,
        })
    }

    /// Whether this context still holds its handle.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.handle.is_null()
    }

    /// Re-assert to the backend that subsequent operations target this
    /// context. Needed whenever more than one context is open.
    pub fn select(&self) -> Result<()> {
        unsafe { self.backend.select_context(self.handle) }
    }

    /// Enumerate every counter the backend exposes for this context.
    ///
    /// Issues one count query and three describe queries per counter; a
    /// data-type or usage-type code this wrapper does not recognize fails the
    /// whole enumeration.
    pub fn available_counters(&self) -> Result<CounterSet> {
        let count = self.backend.counter_count()?;
        let mut counters = HashMap::with_capacity(count as usize);

        for index in 0..count {
            let name = self.backend.counter_name(index)?;
            let data_type = DataType::from_raw(self.backend.counter_data_type(index)?)?;
            let usage = UsageType::from_raw(self.backend.counter_usage_type(index)?)?;
            counters.insert(
                name,
                Counter {
                    index,
                    data_type,
                    usage,
                },
            );
        }

        Ok(CounterSet::new(Arc::clone(&self.backend), counters))
    }

    /// Begin a measurement session on this context.
    pub fn begin_session(&self) -> Result<Session> {
        Session::begin(Arc::clone(&self.backend))
    }

    /// Close the context. A second close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.handle.is_null() {
            return Ok(());
        }
        self.handle = ptr::null_mut();
        self.backend.close_context()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            self.handle = ptr::null_mut();
            if let Err(e) = self.backend.close_context() {
                tracing::warn!("failed to close profiled context: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use perfscope_core::{CounterValue, Error};
    use perfscope_test::{MockBackend, MockCounter};

    use super::*;

    fn catalog() -> Vec<MockCounter> {
        vec![
            MockCounter::new(
                "A",
                DataType::Uint32,
                UsageType::Cycles,
                CounterValue::Uint32(42),
            ),
            MockCounter::new(
                "B",
                DataType::Float32,
                UsageType::Percentage,
                CounterValue::Float32(87.5),
            ),
            MockCounter::new(
                "C",
                DataType::Uint64,
                UsageType::Bytes,
                CounterValue::Uint64(1 << 40),
            ),
        ]
    }

    fn open(backend: &Arc<MockBackend>) -> Context {
        // A non-null dummy handle: the backend never dereferences it, and the
        // Context uses a null handle as its "closed" sentinel, so a live
        // context must be opened with a non-null handle.
        let handle = ptr::NonNull::<std::ffi::c_void>::dangling().as_ptr();
        unsafe { Context::open(backend.clone(), handle) }.unwrap()
    }

    #[test]
    fn enumeration_builds_the_catalog() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        let context = open(&backend);

        let counters = context.available_counters().unwrap();
        assert_eq!(counters.len(), 3);

        let a = counters.get("A").unwrap();
        assert_eq!(a.index, 0);
        assert_eq!(a.data_type, DataType::Uint32);
        assert_eq!(a.usage, UsageType::Cycles);

        let c = counters.get("C").unwrap();
        assert_eq!(c.data_type, DataType::Uint64);
        assert_eq!(c.usage, UsageType::Bytes);
    }

    #[test]
    fn unknown_usage_code_fails_enumeration() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        backend.report_usage_type_code(1, 42);
        let context = open(&backend);

        match context.available_counters() {
            Err(Error::UnknownUsageType(42)) => {}
            other => panic!("expected UnknownUsageType, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent() {
        let backend = Arc::new(MockBackend::new());
        let mut context = open(&backend);

        context.close().unwrap();
        assert!(!context.is_open());
        context.close().unwrap();
        drop(context);

        assert_eq!(backend.calls().close_context, 1);
    }

    #[test]
    fn drop_closes_an_open_context() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);
        drop(context);
        assert_eq!(backend.calls().close_context, 1);
    }

    #[test]
    fn moved_context_closes_once() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);
        let moved = context;
        drop(moved);
        assert_eq!(backend.calls().close_context, 1);
    }

    #[test]
    fn select_targets_this_context() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);
        context.select().unwrap();
        assert_eq!(backend.calls().select_context, 1);
    }
}
