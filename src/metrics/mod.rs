use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Running counters for a [`LayoutTree`](crate::layout::LayoutTree).
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    passes: u64,
    measure_calls: u64,
    arranged_nodes: u64,
    invalidations: u64,
    pass_time: Duration,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, arranged: usize, elapsed: Duration) {
        self.passes = self.passes.saturating_add(1);
        self.arranged_nodes = self.arranged_nodes.saturating_add(arranged as u64);
        self.pass_time = self.pass_time.saturating_add(elapsed);
    }

    pub fn record_measures(&mut self, count: usize) {
        self.measure_calls = self.measure_calls.saturating_add(count as u64);
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations = self.invalidations.saturating_add(1);
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn measure_calls(&self) -> u64 {
        self.measure_calls
    }

    pub fn arranged_nodes(&self) -> u64 {
        self.arranged_nodes
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            passes: self.passes,
            measure_calls: self.measure_calls,
            arranged_nodes: self.arranged_nodes,
            invalidations: self.invalidations,
            pass_time_us: self.pass_time.as_micros() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub passes: u64,
    pub measure_calls: u64,
    pub arranged_nodes: u64,
    pub invalidations: u64,
    pub pass_time_us: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("measure_calls".to_string(), json!(self.measure_calls));
        map.insert("arranged_nodes".to_string(), json!(self.arranged_nodes));
        map.insert("invalidations".to_string(), json!(self.invalidations));
        map.insert("pass_time_us".to_string(), json!(self.pass_time_us));
        map
    }
}
