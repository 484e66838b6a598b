use crate::interface::Label;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters for predictions and failures since startup.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub processed: usize,
    pub rejected: usize,
    pub failed: usize,
    pub per_label: [usize; 4],
}

impl MetricsSnapshot {
    pub fn count_for(&self, label: Label) -> usize {
        self.per_label[label.index()]
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_prediction(&self, label: Label) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            metrics.per_label[label.index()] += 1;
        }
    }

    /// Uploads refused by validation.
    pub fn record_rejection(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| metrics.clone())
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_predictions_per_label() {
        let metrics = MetricsRecorder::new();
        metrics.record_prediction(Label::Cnv);
        metrics.record_prediction(Label::Cnv);
        metrics.record_prediction(Label::Normal);
        metrics.record_rejection();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.processed, 3);
        assert_eq!(snapshot.count_for(Label::Cnv), 2);
        assert_eq!(snapshot.count_for(Label::Dme), 0);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.failed, 0);
    }
}
