//! End-to-end profiling flow against the scripted backend.
//!
//! Demonstrates the full lifecycle without a vendor driver: enumerate the
//! counter catalog, narrow and enable a selection, repeat the workload once
//! per required pass, then block for the decoded results.
//!
//! ```bash
//! cargo run -p perfscope-profiler --example frame_profile
//! ```

use std::ptr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use perfscope_profiler::{CounterValue, DataType, PerformanceLibrary, Result, UsageType};
use perfscope_test::{MockBackend, MockCounter};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let backend = Arc::new(MockBackend::with_counters(vec![
        MockCounter::new(
            "GPUBusy",
            DataType::Float32,
            UsageType::Percentage,
            CounterValue::Float32(93.4),
        ),
        MockCounter::new(
            "GPUTime",
            DataType::Float64,
            UsageType::Milliseconds,
            CounterValue::Float64(16.6),
        ),
        MockCounter::new(
            "FetchSize",
            DataType::Uint64,
            UsageType::Bytes,
            CounterValue::Uint64(4 << 20),
        ),
        MockCounter::new(
            "PrimitivesIn",
            DataType::Uint32,
            UsageType::Items,
            CounterValue::Uint32(250_000),
        ),
    ]));
    backend.set_pass_count(2);

    let library = PerformanceLibrary::with_backend(backend)?;
    // A real application passes its native GL/CL context handle here.
    let context = unsafe { library.open_context(ptr::null_mut()) }?;
    context.select()?;

    let mut counters = context.available_counters()?;
    tracing::info!(available = counters.len(), "enumerated counters");

    counters.keep(&["GPUBusy", "GPUTime", "FetchSize"]);
    counters.enable()?;

    let passes = counters.required_pass_count()?;
    tracing::info!(passes, "profiling workload");

    let mut session = context.begin_session()?;
    for _ in 0..passes {
        let mut pass = session.begin_pass()?;
        let mut sample = pass.begin_sample()?;
        render_frame();
        sample.end()?;
        pass.end()?;
    }
    session.end()?;

    let results = session.results(true)?;
    for (name, value) in results.iter() {
        tracing::info!("{name} = {value}");
    }

    counters.disable()?;
    Ok(())
}

/// Stand-in for the profiled workload.
fn render_frame() {}
