//! Observability primitives for Keeper operations
//!
//! Operation traces report a label and elapsed time to a pluggable
//! [`TracerDriver`]. The default driver forwards them to `tracing`; tests plug
//! in a recording driver to assert that traces were committed.

pub mod trace;

pub use trace::{LoggingTracerDriver, NoOpTracerDriver, OperationTrace, TracerDriver};
