use crate::interface::Label;
use crate::prelude::{RandomSource, RetinaError, RetinaResult};
use serde::{Deserialize, Serialize};

/// How the dominant label is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Number embedded in the file name decides the label.
    #[default]
    Filename,
    /// Uniform draw over all labels.
    Random,
}

/// Picks the dominant label for an upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver {
    mode: ResolveMode,
}

impl LabelResolver {
    pub fn new(mode: ResolveMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        file_name: &str,
        random: &mut R,
    ) -> RetinaResult<Label> {
        match self.mode {
            ResolveMode::Filename => {
                let code = extract_code(file_name).ok_or_else(|| RetinaError::MissingNumber {
                    file_name: file_name.to_string(),
                })?;
                // Digit runs beyond u64 are far above every mapped range.
                Ok(code.parse::<u64>().map_or(Label::Normal, Label::from_code))
            }
            ResolveMode::Random => {
                let slot = (random.next_unit() * Label::ALL.len() as f64) as usize;
                Ok(Label::ALL[slot.min(Label::ALL.len() - 1)])
            }
        }
    }
}

/// First maximal run of ASCII digits in `file_name`.
pub fn extract_code(file_name: &str) -> Option<&str> {
    let start = file_name.find(|c: char| c.is_ascii_digit())?;
    let rest = &file_name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}
