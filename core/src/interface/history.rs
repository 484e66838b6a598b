use crate::interface::label::Label;
use crate::interface::prediction::{ConfidenceDistribution, PredictionResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A persisted prediction. Field names match the browser storage layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub name: String,
    pub timestamp: String,
    pub label: Label,
    pub confidences: ConfidenceDistribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        id: String,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        result: &PredictionResult,
        image_data_url: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            timestamp: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            label: result.label,
            confidences: result.confidences,
            image_data_url,
        }
    }

    pub fn result(&self) -> PredictionResult {
        PredictionResult {
            label: self.label,
            confidences: self.confidences,
        }
    }

    /// Numeric form of the id, when it is one.
    pub fn id_millis(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}
