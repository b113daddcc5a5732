//! Tracer driver that records committed trace labels.

use std::time::Duration;

use keeper_common::TracerDriver;
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct RecordingTracer {
    labels: Mutex<Vec<String>>,
}

impl RecordingTracer {
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }
}

impl TracerDriver for RecordingTracer {
    fn add_trace(&self, name: &str, _elapsed: Duration) {
        self.labels.lock().push(name.to_string());
    }
}
