//! Timed operation traces
//!
//! A trace reports to its driver when it is dropped, so the timing is
//! recorded even if the traced work panics.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use keeper_common::observability::{LoggingTracerDriver, OperationTrace};
//!
//! let trace = OperationTrace::start("GetAclBuilder.background", Arc::new(LoggingTracerDriver));
//! // ... perform the operation ...
//! trace.commit();
//! ```

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

/// Sink for committed operation traces
pub trait TracerDriver: Send + Sync + Debug {
    /// Record that the named operation completed after `elapsed`
    fn add_trace(&self, name: &str, elapsed: Duration);
}

/// Tracer driver that emits each trace as a `tracing` debug event
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTracerDriver;

impl TracerDriver for LoggingTracerDriver {
    fn add_trace(&self, name: &str, elapsed: Duration) {
        debug!(trace = name, elapsed_ms = elapsed.as_millis(), "Operation trace committed");
    }
}

/// Tracer driver that discards every trace
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpTracerDriver;

impl TracerDriver for NoOpTracerDriver {
    fn add_trace(&self, _name: &str, _elapsed: Duration) {
        // No-op
    }
}

/// An in-flight trace started by [`OperationTrace::start`]
#[derive(Debug)]
#[must_use = "an unbound trace is committed immediately"]
pub struct OperationTrace {
    name: String,
    start: Instant,
    driver: Arc<dyn TracerDriver>,
}

impl OperationTrace {
    /// Start timing the named operation
    pub fn start(name: impl Into<String>, driver: Arc<dyn TracerDriver>) -> Self {
        Self { name: name.into(), start: Instant::now(), driver }
    }

    /// Name the trace was started with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time since the trace was started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Report the trace to its driver now rather than at end of scope
    pub fn commit(self) {
        drop(self);
    }
}

impl Drop for OperationTrace {
    fn drop(&mut self) {
        self.driver.add_trace(&self.name, self.start.elapsed());
    }
}
