//! Core of the retina analyzer: label resolution, synthetic confidence
//! distributions, upload validation and the persisted prediction history.
//!
//! None of this performs real inference. The predictor derives its label from
//! the uploaded file name (or a random draw) and fabricates a plausible
//! distribution around it; every random draw goes through [`RandomSource`]
//! so results replay under a fixed seed.

pub mod inference;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod report;
pub mod storage;
pub mod telemetry;

pub use inference::{ConfidenceSynthesizer, LabelResolver, ResolveMode, RulePredictor};
pub use interface::{
    ConfidenceDistribution, HistoryEntry, Label, PredictionResult, Upload, UploadMeta,
};
pub use prelude::{Predictor, RandomSource, RetinaError, RetinaResult};
pub use storage::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
