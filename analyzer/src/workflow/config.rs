use anyhow::Context;
use retinacore::inference::{ResolveMode, SynthesizerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Where predictions come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    /// Label from the number in the file name.
    #[default]
    Filename,
    /// Uniformly random label.
    Random,
    /// Ask a prediction backend over HTTP.
    Remote,
}

impl PredictionMode {
    /// Resolver mode for the local modes, `None` for the backend.
    pub fn resolve_mode(self) -> Option<ResolveMode> {
        match self {
            PredictionMode::Filename => Some(ResolveMode::Filename),
            PredictionMode::Random => Some(ResolveMode::Random),
            PredictionMode::Remote => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub history_dir: PathBuf,
    pub mode: PredictionMode,
    pub base_min: f64,
    pub base_max: f64,
    /// Pause before a local result is shown, in milliseconds.
    pub delay_ms: u64,
    pub backend_url: String,
    pub bind: SocketAddr,
    pub seed: Option<u64>,
    pub embed_image: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let synth = SynthesizerConfig::default();
        Self {
            history_dir: PathBuf::from(".retina"),
            mode: PredictionMode::Filename,
            base_min: synth.base_min,
            base_max: synth.base_max,
            delay_ms: 1200,
            backend_url: "http://127.0.0.1:5000/predict".into(),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            seed: None,
            embed_image: false,
        }
    }
}

impl AnalyzerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading analyzer config {}", path_ref.display()))?;
        let config: AnalyzerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing analyzer config {}", path_ref.display()))?;
        config
            .synthesizer_config()
            .validate()
            .with_context(|| format!("validating analyzer config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn synthesizer_config(&self) -> SynthesizerConfig {
        SynthesizerConfig {
            base_min: self.base_min,
            base_max: self.base_max,
        }
    }
}
