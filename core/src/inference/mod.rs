pub mod predictor;
pub mod resolver;
pub mod synthesizer;
pub mod validator;

pub use predictor::RulePredictor;
pub use resolver::{LabelResolver, ResolveMode};
pub use synthesizer::{ConfidenceSynthesizer, SynthesizerConfig};
pub use validator::{UploadValidator, ACCEPTED_MEDIA_TYPES, MAX_UPLOAD_BYTES};
