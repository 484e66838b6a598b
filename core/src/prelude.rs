use crate::interface::{PredictionResult, Upload};
use rand::Rng;

/// Common error type for every analyzer operation.
#[derive(thiserror::Error, Debug)]
pub enum RetinaError {
    #[error("Unsupported file type. Use JPG or PNG.")]
    UnsupportedFileType { media_type: String },
    #[error("File too large. Max 5MB.")]
    FileTooLarge { size: u64 },
    #[error("Filename must contain a number (e.g. retina_12.jpg)")]
    MissingNumber { file_name: String },
    #[error("Please select an image.")]
    NoFileSelected,
    #[error("server error (status {status})")]
    Server { status: u16 },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("prediction already in progress")]
    Busy,
    #[error("inconsistent prediction: {0}")]
    InconsistentPrediction(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl RetinaError {
    /// Errors caused by the chosen file; picking another file resolves them.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RetinaError::UnsupportedFileType { .. }
                | RetinaError::FileTooLarge { .. }
                | RetinaError::MissingNumber { .. }
                | RetinaError::NoFileSelected
        )
    }

    /// Errors the user may simply trigger again. Nothing retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RetinaError::Server { .. }
                | RetinaError::Transport(_)
                | RetinaError::InvalidResponse(_)
                | RetinaError::Busy
        )
    }
}

impl From<std::io::Error> for RetinaError {
    fn from(err: std::io::Error) -> Self {
        RetinaError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for RetinaError {
    fn from(err: serde_json::Error) -> Self {
        RetinaError::Storage(err.to_string())
    }
}

pub type RetinaResult<T> = Result<T, RetinaError>;

/// Uniform random draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: rand::RngCore + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Anything that turns an upload into a prediction.
pub trait Predictor {
    fn predict(&mut self, upload: &Upload) -> RetinaResult<PredictionResult>;
}
