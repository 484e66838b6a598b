pub mod history;
pub mod label;
pub mod prediction;
pub mod upload;

pub use history::HistoryEntry;
pub use label::Label;
pub use prediction::{ConfidenceDistribution, PredictionResult, RemotePrediction};
pub use upload::{Upload, UploadMeta};
