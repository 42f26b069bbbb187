//! Scripted in-memory backend.
//!
//! Records every call it receives and serves a configurable counter catalog,
//! pass count, readiness schedule, and injected failures. Interior mutability
//! keeps the `&self` trait surface identical to the dynamic backend's.

use hashbrown::HashMap;
use parking_lot::Mutex;

use perfscope_backend::{Backend, NativeContext};
use perfscope_core::{CounterValue, DataType, Error, Result, UsageType};

/// Status code the mock returns for injected and internal failures.
pub const MOCK_FAILURE: i32 = -7;

/// One scripted counter: descriptor plus the value the backend will report.
#[derive(Debug, Clone, Copy)]
pub struct MockCounter {
    /// Counter name.
    pub name: &'static str,
    /// Data type reported during enumeration and result decoding.
    pub data_type: DataType,
    /// Usage type reported during enumeration.
    pub usage: UsageType,
    /// Value served by the typed sample fetches.
    pub value: CounterValue,
}

impl MockCounter {
    /// Create a scripted counter.
    #[must_use]
    pub const fn new(
        name: &'static str,
        data_type: DataType,
        usage: UsageType,
        value: CounterValue,
    ) -> Self {
        Self {
            name,
            data_type,
            usage,
            value,
        }
    }
}

/// Backend operations a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    Initialize,
    Destroy,
    OpenContext,
    SelectContext,
    CloseContext,
    EnableCounter,
    DisableCounter,
    PassCount,
    BeginSession,
    EndSession,
    BeginPass,
    EndPass,
    BeginSample,
    EndSample,
}

/// Counts of every backend call the mock has received.
#[derive(Debug, Default, Clone)]
pub struct CallLog {
    pub initialize: u32,
    pub destroy: u32,
    pub open_context: u32,
    pub select_context: u32,
    pub close_context: u32,
    pub counter_count: u32,
    pub counter_name: u32,
    pub counter_data_type: u32,
    pub counter_usage_type: u32,
    pub enable_counter: u32,
    pub disable_counter: u32,
    pub pass_count: u32,
    pub begin_session: u32,
    pub end_session: u32,
    pub begin_pass: u32,
    pub end_pass: u32,
    pub begin_sample: u32,
    pub end_sample: u32,
    pub ready_polls: u32,
    pub sample_fetches: u32,
    pub enabled_count: u32,
    pub enabled_index: u32,
}

struct FailureRule {
    op: MockOp,
    successes_left: u32,
    status: i32,
}

#[derive(Default)]
struct State {
    counters: Vec<MockCounter>,
    // Raw-code overrides let tests feed unrecognized wire codes.
    type_code_overrides: HashMap<u32, u32>,
    usage_code_overrides: HashMap<u32, u32>,
    enabled: Vec<u32>,
    pass_count: u32,
    ready_after: u32,
    next_session_id: u32,
    fail: Option<FailureRule>,
    calls: CallLog,
}

/// A fully scripted backend for driving the profiler in tests.
pub struct MockBackend {
    state: Mutex<State>,
}

impl MockBackend {
    /// Create an empty mock with no counters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_counters(Vec::new())
    }

    /// Create a mock serving the given counter catalog.
    #[must_use]
    pub fn with_counters(counters: Vec<MockCounter>) -> Self {
        Self {
            state: Mutex::new(State {
                counters,
                pass_count: 1,
                next_session_id: 1,
                ..State::default()
            }),
        }
    }

    /// Set the pass count the backend reports for the enabled set.
    pub fn set_pass_count(&self, passes: u32) {
        self.state.lock().pass_count = passes;
    }

    /// Report "not ready" for the first `polls` readiness queries.
    pub fn set_ready_after(&self, polls: u32) {
        self.state.lock().ready_after = polls;
    }

    /// Override the raw data-type code reported for the counter at `index`.
    pub fn report_data_type_code(&self, index: u32, code: u32) {
        self.state.lock().type_code_overrides.insert(index, code);
    }

    /// Override the raw usage-type code reported for the counter at `index`.
    pub fn report_usage_type_code(&self, index: u32, code: u32) {
        self.state.lock().usage_code_overrides.insert(index, code);
    }

    /// Make every call to `op` fail with `status`.
    pub fn fail_on(&self, op: MockOp, status: i32) {
        self.fail_after(op, 0, status);
    }

    /// Make `op` succeed `successes` times, then fail with `status`.
    pub fn fail_after(&self, op: MockOp, successes: u32, status: i32) {
        self.state.lock().fail = Some(FailureRule {
            op,
            successes_left: successes,
            status,
        });
    }

    /// Snapshot of all recorded call counts.
    #[must_use]
    pub fn calls(&self) -> CallLog {
        self.state.lock().calls.clone()
    }

    /// Currently enabled counter indices, in enabling order.
    #[must_use]
    pub fn enabled(&self) -> Vec<u32> {
        self.state.lock().enabled.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn injected_failure(state: &mut State, op: MockOp) -> Result<()> {
    if let Some(rule) = state.fail.as_mut() {
        if rule.op == op {
            if rule.successes_left == 0 {
                return Err(Error::Status(rule.status));
            }
            rule.successes_left -= 1;
        }
    }
    Ok(())
}

fn counter_at(state: &State, index: u32) -> Result<MockCounter> {
    state
        .counters
        .get(index as usize)
        .copied()
        .ok_or(Error::Status(MOCK_FAILURE))
}

impl Backend for MockBackend {
    fn initialize(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.initialize += 1;
        injected_failure(&mut state, MockOp::Initialize)
    }

    fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.destroy += 1;
        injected_failure(&mut state, MockOp::Destroy)
    }

    unsafe fn open_context(&self, _context: NativeContext) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.open_context += 1;
        injected_failure(&mut state, MockOp::OpenContext)
    }

    unsafe fn select_context(&self, _context: NativeContext) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.select_context += 1;
        injected_failure(&mut state, MockOp::SelectContext)
    }

    fn close_context(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.close_context += 1;
        injected_failure(&mut state, MockOp::CloseContext)
    }

    fn counter_count(&self) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.counter_count += 1;
        Ok(state.counters.len() as u32)
    }

    fn counter_name(&self, index: u32) -> Result<String> {
        let mut state = self.state.lock();
        state.calls.counter_name += 1;
        counter_at(&state, index).map(|c| c.name.to_string())
    }

    fn counter_data_type(&self, index: u32) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.counter_data_type += 1;
        if let Some(code) = state.type_code_overrides.get(&index) {
            return Ok(*code);
        }
        counter_at(&state, index).map(|c| c.data_type.as_raw())
    }

    fn counter_usage_type(&self, index: u32) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.counter_usage_type += 1;
        if let Some(code) = state.usage_code_overrides.get(&index) {
            return Ok(*code);
        }
        counter_at(&state, index).map(|c| c.usage.as_raw())
    }

    fn enable_counter(&self, index: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.enable_counter += 1;
        injected_failure(&mut state, MockOp::EnableCounter)?;
        counter_at(&state, index)?;
        if !state.enabled.contains(&index) {
            state.enabled.push(index);
        }
        Ok(())
    }

    fn disable_counter(&self, index: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.disable_counter += 1;
        injected_failure(&mut state, MockOp::DisableCounter)?;
        state.enabled.retain(|&i| i != index);
        Ok(())
    }

    fn pass_count(&self) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.pass_count += 1;
        injected_failure(&mut state, MockOp::PassCount)?;
        Ok(state.pass_count)
    }

    fn begin_session(&self) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.begin_session += 1;
        injected_failure(&mut state, MockOp::BeginSession)?;
        let id = state.next_session_id;
        state.next_session_id += 1;
        Ok(id)
    }

    fn end_session(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.end_session += 1;
        injected_failure(&mut state, MockOp::EndSession)
    }

    fn begin_pass(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.begin_pass += 1;
        injected_failure(&mut state, MockOp::BeginPass)
    }

    fn end_pass(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.end_pass += 1;
        injected_failure(&mut state, MockOp::EndPass)
    }

    fn begin_sample(&self, _id: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.begin_sample += 1;
        injected_failure(&mut state, MockOp::BeginSample)
    }

    fn end_sample(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.end_sample += 1;
        injected_failure(&mut state, MockOp::EndSample)
    }

    fn session_ready(&self, _session: u32) -> Result<bool> {
        let mut state = self.state.lock();
        state.calls.ready_polls += 1;
        Ok(state.calls.ready_polls > state.ready_after)
    }

    fn sample_u32(&self, _session: u32, _sample: u32, counter: u32) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.sample_fetches += 1;
        match counter_at(&state, counter)?.value {
            CounterValue::Uint32(v) => Ok(v),
            // Signed counters travel through the unsigned accessor.
            CounterValue::Int32(v) => Ok(v as u32),
            _ => Err(Error::Status(MOCK_FAILURE)),
        }
    }

    fn sample_u64(&self, _session: u32, _sample: u32, counter: u32) -> Result<u64> {
        let mut state = self.state.lock();
        state.calls.sample_fetches += 1;
        match counter_at(&state, counter)?.value {
            CounterValue::Uint64(v) => Ok(v),
            CounterValue::Int64(v) => Ok(v as u64),
            _ => Err(Error::Status(MOCK_FAILURE)),
        }
    }

    fn sample_f32(&self, _session: u32, _sample: u32, counter: u32) -> Result<f32> {
        let mut state = self.state.lock();
        state.calls.sample_fetches += 1;
        match counter_at(&state, counter)?.value {
            CounterValue::Float32(v) => Ok(v),
            _ => Err(Error::Status(MOCK_FAILURE)),
        }
    }

    fn sample_f64(&self, _session: u32, _sample: u32, counter: u32) -> Result<f64> {
        let mut state = self.state.lock();
        state.calls.sample_fetches += 1;
        match counter_at(&state, counter)?.value {
            CounterValue::Float64(v) => Ok(v),
            _ => Err(Error::Status(MOCK_FAILURE)),
        }
    }

    fn enabled_count(&self) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.enabled_count += 1;
        Ok(state.enabled.len() as u32)
    }

    fn enabled_index(&self, position: u32) -> Result<u32> {
        let mut state = self.state.lock();
        state.calls.enabled_index += 1;
        state
            .enabled
            .get(position as usize)
            .copied()
            .ok_or(Error::Status(MOCK_FAILURE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<MockCounter> {
        vec![
            MockCounter::new(
                "Cycles",
                DataType::Uint32,
                UsageType::Cycles,
                CounterValue::Uint32(100),
            ),
            MockCounter::new(
                "Busy",
                DataType::Float32,
                UsageType::Percentage,
                CounterValue::Float32(55.0),
            ),
        ]
    }

    #[test]
    fn records_enable_order() {
        let mock = MockBackend::with_counters(catalog());
        mock.enable_counter(1).unwrap();
        mock.enable_counter(0).unwrap();
        assert_eq!(mock.enabled(), vec![1, 0]);
        assert_eq!(mock.calls().enable_counter, 2);
    }

    #[test]
    fn readiness_schedule() {
        let mock = MockBackend::new();
        mock.set_ready_after(2);
        assert!(!mock.session_ready(1).unwrap());
        assert!(!mock.session_ready(1).unwrap());
        assert!(mock.session_ready(1).unwrap());
    }

    #[test]
    fn injected_failure_fires_after_successes() {
        let mock = MockBackend::with_counters(catalog());
        mock.fail_after(MockOp::EnableCounter, 1, MOCK_FAILURE);
        assert!(mock.enable_counter(0).is_ok());
        match mock.enable_counter(1) {
            Err(Error::Status(MOCK_FAILURE)) => {}
            other => panic!("expected injected failure, got {other:?}"),
        }
    }

    #[test]
    fn typed_fetch_rejects_mismatched_width() {
        let mock = MockBackend::with_counters(catalog());
        assert_eq!(mock.sample_u32(1, 0, 0).unwrap(), 100);
        assert!(mock.sample_u64(1, 0, 0).is_err());
        assert!((mock.sample_f32(1, 0, 1).unwrap() - 55.0).abs() < f32::EPSILON);
    }
}
