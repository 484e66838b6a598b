use retinacore::interface::{ConfidenceDistribution, HistoryEntry, Label};
use retinacore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictReply {
    pub id: String,
    pub label: Label,
    pub confidences: ConfidenceDistribution,
}

impl From<&HistoryEntry> for PredictReply {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label,
            confidences: entry.confidences,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReply {
    pub busy: bool,
    pub history_len: usize,
    pub metrics: MetricsSnapshot,
}
