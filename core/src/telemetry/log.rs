use crate::interface::HistoryEntry;
use crate::prelude::RetinaError;
use log::{info, warn};

/// Structured log lines for the prediction lifecycle.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn prediction(&self, entry: &HistoryEntry) {
        info!(
            "prediction id={} file={} label={} confidence={:.4}",
            entry.id,
            entry.name,
            entry.label,
            entry.confidences.get(entry.label)
        );
    }

    pub fn rejection(&self, file_name: &str, err: &RetinaError) {
        warn!("rejected upload {}: {}", file_name, err);
    }

    pub fn degraded(&self, context: &str, reason: &str) {
        warn!("{} degraded to empty history: {}", context, reason);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
