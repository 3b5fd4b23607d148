use std::sync::{Arc, Mutex};

use crate::logging::Logger;
use crate::metrics::LayoutMetrics;

/// Ambient settings for a [`LayoutTree`](crate::layout::LayoutTree).
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Optional structured logger for pass and edit events.
    pub logger: Option<Logger>,
    /// Shared counters; hosts may read them between passes.
    pub metrics: Option<Arc<Mutex<LayoutMetrics>>>,
    /// Passes between metrics snapshot emissions. Zero disables snapshots.
    pub metrics_every: u64,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_every: 64,
            metrics_target: "stackbox::tree.metrics".to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(LayoutMetrics::new())));
        }
    }

    /// Disable metrics collection and prevent further snapshots.
    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_metrics_is_idempotent() {
        let mut config = LayoutConfig::default();
        assert!(config.metrics_handle().is_none());

        config.enable_metrics();
        let first = config.metrics_handle().unwrap();
        config.enable_metrics();
        let second = config.metrics_handle().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        config.disable_metrics();
        assert!(config.metrics_handle().is_none());
    }
}
