use crate::interface::label::Label;
use crate::math::rounding::SUM_TOLERANCE;
use crate::prelude::{RetinaError, RetinaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One confidence value per label. Every label is present exactly once, so a
/// fixed field per label stands in for a map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidenceDistribution {
    #[serde(rename = "CNV")]
    pub cnv: f64,
    #[serde(rename = "DME")]
    pub dme: f64,
    #[serde(rename = "Drusen")]
    pub drusen: f64,
    #[serde(rename = "Normal")]
    pub normal: f64,
}

impl ConfidenceDistribution {
    pub fn get(&self, label: Label) -> f64 {
        match label {
            Label::Cnv => self.cnv,
            Label::Dme => self.dme,
            Label::Drusen => self.drusen,
            Label::Normal => self.normal,
        }
    }

    pub fn set(&mut self, label: Label, value: f64) {
        match label {
            Label::Cnv => self.cnv = value,
            Label::Dme => self.dme = value,
            Label::Drusen => self.drusen = value,
            Label::Normal => self.normal = value,
        }
    }

    /// Pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, f64)> + '_ {
        Label::ALL.into_iter().map(move |label| (label, self.get(label)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, value)| value).sum()
    }

    /// Label holding the largest value; ties go to the earlier label.
    pub fn argmax(&self) -> Label {
        self.iter()
            .fold((Label::Cnv, f64::NEG_INFINITY), |best, (label, value)| {
                if value > best.1 {
                    (label, value)
                } else {
                    best
                }
            })
            .0
    }

    /// Every value in `[0, 1]` and the total within tolerance of one.
    pub fn is_normalized(&self) -> bool {
        self.iter().all(|(_, value)| (0.0..=1.0).contains(&value))
            && (self.sum() - 1.0).abs() <= SUM_TOLERANCE
    }
}

/// A label together with the distribution it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    pub confidences: ConfidenceDistribution,
}

impl PredictionResult {
    /// Rejects results whose label is not the top of its distribution.
    pub fn new(label: Label, confidences: ConfidenceDistribution) -> RetinaResult<Self> {
        let top = confidences.iter().map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max);
        if confidences.get(label) < top {
            return Err(RetinaError::InconsistentPrediction(format!(
                "{} reported at {:.4} but the maximum is {:.4}",
                label,
                confidences.get(label),
                top
            )));
        }
        Ok(Self { label, confidences })
    }

    /// Confidence of the reported label.
    pub fn confidence(&self) -> f64 {
        self.confidences.get(self.label)
    }
}

/// Response body of a prediction backend. Confidences may arrive either as
/// fractions or as percentages, and labels may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePrediction {
    pub label: Label,
    #[serde(default)]
    pub confidences: BTreeMap<Label, f64>,
}

impl RemotePrediction {
    /// Converts the response into a [`PredictionResult`]. A response is in
    /// one scale throughout: if any value exceeds 1 every value is read as a
    /// percentage and divided by 100. Absent labels count as 0.
    pub fn normalize(self) -> RetinaResult<PredictionResult> {
        let mut raw = [0.0; 4];
        for label in Label::ALL {
            let value = match self.confidences.get(&label) {
                Some(value) => *value,
                None => {
                    log::warn!("backend omitted confidence for {}", label);
                    0.0
                }
            };
            if !value.is_finite() || value < 0.0 || value > 100.0 {
                return Err(RetinaError::InvalidResponse(format!(
                    "confidence for {} out of range: {}",
                    label, value
                )));
            }
            raw[label.index()] = value;
        }

        let scale = if raw.iter().any(|value| *value > 1.0) {
            100.0
        } else {
            1.0
        };
        let mut confidences = ConfidenceDistribution::default();
        for label in Label::ALL {
            confidences.set(label, raw[label.index()] / scale);
        }
        PredictionResult::new(self.label, confidences)
    }
}
