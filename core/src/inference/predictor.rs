use crate::inference::resolver::{LabelResolver, ResolveMode};
use crate::inference::synthesizer::ConfidenceSynthesizer;
use crate::interface::{PredictionResult, Upload};
use crate::prelude::{Predictor, RandomSource, RetinaResult};

/// Local stand-in for a model: resolves the label from the upload's name and
/// fabricates a distribution around it. Uploads are expected to have passed
/// [`UploadValidator`](crate::inference::UploadValidator) already.
pub struct RulePredictor<R> {
    resolver: LabelResolver,
    synthesizer: ConfidenceSynthesizer,
    random: R,
}

impl<R: RandomSource> RulePredictor<R> {
    pub fn new(mode: ResolveMode, synthesizer: ConfidenceSynthesizer, random: R) -> Self {
        Self {
            resolver: LabelResolver::new(mode),
            synthesizer,
            random,
        }
    }

    pub fn mode(&self) -> ResolveMode {
        self.resolver.mode()
    }
}

impl<R: RandomSource> Predictor for RulePredictor<R> {
    fn predict(&mut self, upload: &Upload) -> RetinaResult<PredictionResult> {
        let label = self.resolver.resolve(&upload.name, &mut self.random)?;
        let confidences = self.synthesizer.synthesize(label, &mut self.random);
        PredictionResult::new(label, confidences)
    }
}
