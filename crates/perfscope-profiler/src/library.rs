//! Library façade owning the backend.

use std::sync::Arc;

use perfscope_backend::{Backend, DynamicBackend, NativeContext};
use perfscope_core::{ProfileApi, Result};

use crate::context::Context;

/// Entry point of the profiler.
///
/// Loads the vendor backend for the requested rendering API, initializes it,
/// and hands out [`Context`]s. Dropping the library shuts the backend down;
/// contexts keep the backend module mapped until they are gone themselves, so
/// drop order mistakes cannot leave dangling entry points.
pub struct PerformanceLibrary {
    backend: Arc<dyn Backend>,
}

impl PerformanceLibrary {
    /// Load and initialize the backend for the given rendering API.
    pub fn new(api: ProfileApi) -> Result<Self> {
        let backend = Arc::new(DynamicBackend::load(api)?);
        Self::with_backend(backend)
    }

    /// Initialize an already-constructed backend implementation.
    ///
    /// This is how tests substitute a scripted backend for the vendor module.
    pub fn with_backend(backend: Arc<dyn Backend>) -> Result<Self> {
        backend.initialize()?;
        tracing::info!("profiling backend initialized");
        Ok(Self { backend })
    }

    /// Open the given native rendering-API context for profiling.
    ///
    /// # Safety
    /// `context` must be a valid native context handle for the rendering API
    /// the backend was loaded for, and must outlive the returned [`Context`].
    pub unsafe fn open_context(&self, context: NativeContext) -> Result<Context> {
        unsafe { Context::open(Arc::clone(&self.backend), context) }
    }
}

impl Drop for PerformanceLibrary {
    fn drop(&mut self) {
        // No caller to report to on the drop path.
        if let Err(e) = self.backend.destroy() {
            tracing::warn!("failed to shut down profiling backend: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use perfscope_test::{MockBackend, MockOp, MOCK_FAILURE};

    use super::*;

    #[test]
    fn initializes_backend_on_construction() {
        let backend = Arc::new(MockBackend::new());
        let library = PerformanceLibrary::with_backend(backend.clone()).unwrap();
        assert_eq!(backend.calls().initialize, 1);
        drop(library);
    }

    #[test]
    fn drop_destroys_backend_exactly_once() {
        let backend = Arc::new(MockBackend::new());
        let library = PerformanceLibrary::with_backend(backend.clone()).unwrap();
        drop(library);
        assert_eq!(backend.calls().destroy, 1);
    }

    #[test]
    fn failed_initialization_never_destroys() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_on(MockOp::Initialize, MOCK_FAILURE);
        assert!(PerformanceLibrary::with_backend(backend.clone()).is_err());
        assert_eq!(backend.calls().destroy, 0);
    }
}
