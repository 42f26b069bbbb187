//! Session, pass, and sample lifecycles.
//!
//! All three levels follow the same scoped-resource pattern: the begin call
//! happens in the constructor and only a successful begin yields an object;
//! the end call happens exactly once, either explicitly through `end` or at
//! drop. The active flag is cleared before the end call is issued, so neither
//! an explicit end followed by drop nor a double end can reach the backend
//! twice.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hashbrown::HashMap;

use perfscope_backend::Backend;
use perfscope_core::{CounterValue, DataType, Result};

use crate::result::SessionResult;

/// Default interval between readiness polls in a blocking result fetch.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Sample id the decoder reads values from. Per-sample readback of
/// multi-sample passes is not exposed.
const RESULT_SAMPLE: u32 = 0;

/// One measurement session, identified by a backend-issued id.
///
/// Produces [`Pass`]es; results become available asynchronously after the
/// session ends and the backend reports it ready.
pub struct Session {
    backend: Arc<dyn Backend>,
    id: u32,
    active: bool,
    poll_interval: Duration,
}

impl Session {
    pub(crate) fn begin(backend: Arc<dyn Backend>) -> Result<Self> {
        let id = backend.begin_session()?;
        Ok(Self {
            backend,
            id,
            active: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// The backend-issued session id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Change the readiness poll interval used by blocking result fetches.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Begin the next pass of the profiled workload.
    pub fn begin_pass(&self) -> Result<Pass> {
        Pass::begin(Arc::clone(&self.backend))
    }

    /// End the session. A second end is a no-op.
    pub fn end(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.backend.end_session()
    }

    /// Whether the backend has finished resolving this session's results.
    pub fn is_ready(&self) -> Result<bool> {
        self.backend.session_ready(self.id)
    }

    /// Fetch the session's results.
    ///
    /// With `block` false this is a poll: if the session is not ready yet the
    /// returned result is empty. With `block` true the call sleeps between
    /// readiness probes (see [`with_poll_interval`](Session::with_poll_interval))
    /// until the backend reports ready, then decodes.
    ///
    /// Decoding covers exactly the enabled counters, each fetched through the
    /// accessor matching its reported width. Signed counters travel through
    /// the unsigned accessor of the same width and are reinterpreted. A data
    /// type this wrapper does not recognize fails the whole fetch.
    pub fn results(&self, block: bool) -> Result<SessionResult> {
        if !self.is_ready()? {
            if !block {
                return Ok(SessionResult::default());
            }
            while !self.is_ready()? {
                thread::sleep(self.poll_interval);
            }
        }
        self.decode_results()
    }

    fn decode_results(&self) -> Result<SessionResult> {
        let enabled = self.backend.enabled_count()?;
        let mut values = HashMap::with_capacity(enabled as usize);

        for position in 0..enabled {
            let index = self.backend.enabled_index(position)?;
            let name = self.backend.counter_name(index)?;
            let data_type = DataType::from_raw(self.backend.counter_data_type(index)?)?;

            let value = match data_type {
                DataType::Uint32 => {
                    CounterValue::Uint32(self.backend.sample_u32(self.id, RESULT_SAMPLE, index)?)
                }
                DataType::Uint64 => {
                    CounterValue::Uint64(self.backend.sample_u64(self.id, RESULT_SAMPLE, index)?)
                }
                DataType::Int32 => CounterValue::Int32(self.backend.sample_u32(
                    self.id,
                    RESULT_SAMPLE,
                    index,
                )? as i32),
                DataType::Int64 => CounterValue::Int64(self.backend.sample_u64(
                    self.id,
                    RESULT_SAMPLE,
                    index,
                )? as i64),
                DataType::Float32 => {
                    CounterValue::Float32(self.backend.sample_f32(self.id, RESULT_SAMPLE, index)?)
                }
                DataType::Float64 => {
                    CounterValue::Float64(self.backend.sample_f64(self.id, RESULT_SAMPLE, index)?)
                }
            };

            values.insert(name, value);
        }

        Ok(SessionResult::new(values))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = self.backend.end_session() {
                tracing::warn!(session = self.id, "failed to end profiling session: {e}");
            }
        }
    }
}

/// One hardware pass over the profiled workload.
///
/// A counter selection may need several passes to be fully measured; the
/// caller repeats the workload once per pass.
pub struct Pass {
    backend: Arc<dyn Backend>,
    active: bool,
}

impl Pass {
    fn begin(backend: Arc<dyn Backend>) -> Result<Self> {
        backend.begin_pass()?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    /// Begin a sample with the default id 0.
    pub fn begin_sample(&self) -> Result<Sample> {
        self.begin_sample_with_id(0)
    }

    /// Begin a sample with a caller-chosen id.
    pub fn begin_sample_with_id(&self, id: u32) -> Result<Sample> {
        Sample::begin(Arc::clone(&self.backend), id)
    }

    /// End the pass. A second end is a no-op.
    pub fn end(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.backend.end_pass()
    }
}

impl Drop for Pass {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = self.backend.end_pass() {
                tracing::warn!("failed to end profiling pass: {e}");
            }
        }
    }
}

/// The finest-grained measurement region, scoping counter attribution to a
/// span of work within a pass.
pub struct Sample {
    backend: Arc<dyn Backend>,
    active: bool,
}

impl Sample {
    fn begin(backend: Arc<dyn Backend>, id: u32) -> Result<Self> {
        backend.begin_sample(id)?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    /// End the sample. A second end is a no-op.
    pub fn end(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.backend.end_sample()
    }
}

impl Drop for Sample {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(e) = self.backend.end_sample() {
                tracing::warn!("failed to end profiling sample: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use perfscope_core::{Error, UsageType};
    use perfscope_test::{MockBackend, MockCounter, MockOp, MOCK_FAILURE};

    use crate::context::Context;

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
        unsafe { Context::open(backend.clone(), ptr::null_mut()) }.unwrap()
    }

    #[test]
    fn end_is_idempotent() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);

        let mut session = context.begin_session().unwrap();
        session.end().unwrap();
        session.end().unwrap();
        drop(session);

        assert_eq!(backend.calls().begin_session, 1);
        assert_eq!(backend.calls().end_session, 1);
    }

    #[test]
    fn drop_ends_an_active_session() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);

        let session = context.begin_session().unwrap();
        drop(session);

        assert_eq!(backend.calls().end_session, 1);
    }

    #[test]
    fn failed_begin_never_ends() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_on(MockOp::BeginSession, MOCK_FAILURE);
        let context = open(&backend);

        assert!(context.begin_session().is_err());
        assert_eq!(backend.calls().end_session, 0);
    }

    #[test]
    fn moved_session_ends_once() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);

        let session = context.begin_session().unwrap();
        let moved = session;
        drop(moved);

        assert_eq!(backend.calls().end_session, 1);
    }

    #[test]
    fn pass_and_sample_end_once_each() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);
        let session = context.begin_session().unwrap();

        let mut pass = session.begin_pass().unwrap();
        let mut sample = pass.begin_sample().unwrap();
        sample.end().unwrap();
        sample.end().unwrap();
        drop(sample);
        pass.end().unwrap();
        drop(pass);

        let calls = backend.calls();
        assert_eq!(calls.begin_pass, 1);
        assert_eq!(calls.end_pass, 1);
        assert_eq!(calls.begin_sample, 1);
        assert_eq!(calls.end_sample, 1);
    }

    #[test]
    fn dropped_pass_and_sample_end_implicitly() {
        let backend = Arc::new(MockBackend::new());
        let context = open(&backend);
        let session = context.begin_session().unwrap();

        {
            let pass = session.begin_pass().unwrap();
            let _sample = pass.begin_sample_with_id(3).unwrap();
        }

        let calls = backend.calls();
        assert_eq!(calls.end_sample, 1);
        assert_eq!(calls.end_pass, 1);
    }

    #[test]
    fn non_blocking_fetch_before_readiness_is_empty() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        backend.set_ready_after(10);
        let context = open(&backend);

        let mut session = context.begin_session().unwrap();
        session.end().unwrap();

        let results = session.results(false).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn blocking_fetch_waits_for_readiness() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        backend.set_ready_after(3);
        let context = open(&backend);

        let counters = context.available_counters().unwrap();
        counters.enable().unwrap();

        let mut session = context
            .begin_session()
            .unwrap()
            .with_poll_interval(Duration::from_micros(10));
        session.end().unwrap();

        let results = session.results(true).unwrap();
        assert_eq!(results.len(), 3);
        // The first probe and at least three retries must have happened.
        assert!(backend.calls().ready_polls >= 4);
    }

    #[test]
    fn result_keys_are_the_enabled_counter_names() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        let context = open(&backend);

        let mut counters = context.available_counters().unwrap();
        counters.keep(&["A", "C"]);
        counters.enable().unwrap();

        let mut session = context.begin_session().unwrap();
        session.end().unwrap();

        let results = session.results(true).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get("A"), Some(CounterValue::Uint32(42)));
        assert_eq!(results.get("C"), Some(CounterValue::Uint64(1 << 40)));
        assert_eq!(results.get("B"), None);
    }

    #[test]
    fn signed_counters_keep_width_and_sign() {
        let backend = Arc::new(MockBackend::with_counters(vec![
            MockCounter::new(
                "Delta32",
                DataType::Int32,
                UsageType::Items,
                CounterValue::Int32(-5),
            ),
            MockCounter::new(
                "Delta64",
                DataType::Int64,
                UsageType::Items,
                CounterValue::Int64(-(1i64 << 40)),
            ),
        ]));
        let context = open(&backend);

        let counters = context.available_counters().unwrap();
        counters.enable().unwrap();

        let mut session = context.begin_session().unwrap();
        session.end().unwrap();

        let results = session.results(true).unwrap();
        assert_eq!(results.get("Delta32"), Some(CounterValue::Int32(-5)));
        assert_eq!(results.get("Delta64"), Some(CounterValue::Int64(-(1i64 << 40))));
    }

    #[test]
    fn unknown_data_type_fails_the_whole_fetch() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        let context = open(&backend);

        let counters = context.available_counters().unwrap();
        counters.enable().unwrap();
        backend.report_data_type_code(1, 9);

        let mut session = context.begin_session().unwrap();
        session.end().unwrap();

        match session.results(true) {
            Err(Error::UnknownDataType(9)) => {}
            other => panic!("expected UnknownDataType, got {other:?}"),
        }
    }

    #[test]
    fn multi_pass_profile_round_trip() {
        let backend = Arc::new(MockBackend::with_counters(catalog()));
        backend.set_pass_count(2);
        let context = open(&backend);

        let mut counters = context.available_counters().unwrap();
        counters.keep(&["A", "C"]);
        counters.enable().unwrap();
        assert_eq!(backend.calls().enable_counter, 2);

        let passes = counters.required_pass_count().unwrap();
        assert_eq!(passes, 2);

        let mut session = context.begin_session().unwrap();
        for _ in 0..passes {
            let mut pass = session.begin_pass().unwrap();
            let mut sample = pass.begin_sample().unwrap();
            // The profiled workload would run here.
            sample.end().unwrap();
            pass.end().unwrap();
        }
        session.end().unwrap();

        let results = session.results(true).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get("A"), Some(CounterValue::Uint32(42)));
        assert_eq!(results.get("C"), Some(CounterValue::Uint64(1 << 40)));
        assert_eq!(results.get("B"), None);

        let calls = backend.calls();
        assert_eq!(calls.begin_session, 1);
        assert_eq!(calls.end_session, 1);
        assert_eq!(calls.begin_pass, 2);
        assert_eq!(calls.end_pass, 2);
        assert_eq!(calls.begin_sample, 2);
        assert_eq!(calls.end_sample, 2);
    }
}
