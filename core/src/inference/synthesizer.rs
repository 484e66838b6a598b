use crate::interface::{ConfidenceDistribution, Label};
use crate::math::round4;
use crate::prelude::{RandomSource, RetinaError, RetinaResult};
use serde::{Deserialize, Serialize};

/// Range the dominant label's confidence is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    pub base_min: f64,
    pub base_max: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            base_min: 0.6,
            base_max: 0.9,
        }
    }
}

impl SynthesizerConfig {
    /// The dominant label must stay the maximum: a base above one half
    /// guarantees it, since the others share what is left.
    pub fn validate(&self) -> RetinaResult<()> {
        if !(self.base_min > 0.5 && self.base_min <= self.base_max && self.base_max <= 1.0) {
            return Err(RetinaError::InvalidConfig(format!(
                "base confidence range [{}, {}] must lie within (0.5, 1.0]",
                self.base_min, self.base_max
            )));
        }
        Ok(())
    }
}

/// Builds a plausible-looking distribution around a chosen label.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceSynthesizer {
    config: SynthesizerConfig,
}

impl Default for ConfidenceSynthesizer {
    fn default() -> Self {
        Self {
            config: SynthesizerConfig::default(),
        }
    }
}

impl ConfidenceSynthesizer {
    pub fn new(config: SynthesizerConfig) -> RetinaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> SynthesizerConfig {
        self.config
    }

    /// Draws the dominant confidence, then splits the remainder across the
    /// other labels in declaration order. The last of them takes whatever is
    /// left, so it absorbs the rounding slack.
    pub fn synthesize<R: RandomSource + ?Sized>(
        &self,
        dominant: Label,
        random: &mut R,
    ) -> ConfidenceDistribution {
        let SynthesizerConfig { base_min, base_max } = self.config;
        let base = round4(base_min + random.next_unit() * (base_max - base_min));

        let mut confidences = ConfidenceDistribution::default();
        confidences.set(dominant, base);
        let mut remaining = 1.0 - base;

        let others: Vec<Label> = Label::ALL
            .into_iter()
            .filter(|label| *label != dominant)
            .collect();
        if let Some((last, sampled)) = others.split_last() {
            for label in sampled {
                let value = round4(random.next_unit() * remaining).clamp(0.0, remaining.max(0.0));
                confidences.set(*label, value);
                remaining -= value;
            }
            confidences.set(*last, round4(remaining).max(0.0));
        }

        confidences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    struct Scripted(Vec<f64>);

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn distributions_sum_to_one_with_dominant_maximum() {
        let synthesizer = ConfidenceSynthesizer::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..250 {
            for label in Label::ALL {
                let dist = synthesizer.synthesize(label, &mut rng);
                assert!((dist.sum() - 1.0).abs() <= 0.002, "sum {}", dist.sum());
                assert!(dist.get(label) >= 0.6);
                assert!(dist.get(label) <= 0.9);
                assert_eq!(dist.argmax(), label);
                assert!(dist.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
            }
        }
    }

    #[test]
    fn same_seed_replays_same_distribution() {
        let synthesizer = ConfidenceSynthesizer::default();
        let first = synthesizer.synthesize(Label::Dme, &mut StdRng::seed_from_u64(7));
        let second = synthesizer.synthesize(Label::Dme, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn remainder_is_split_in_declaration_order() {
        let synthesizer = ConfidenceSynthesizer::default();
        // base = 0.6 + 0.5 * 0.3 = 0.75, then CNV gets half of 0.25, DME half of the rest.
        let mut source = Scripted(vec![0.5, 0.5, 0.5]);
        let dist = synthesizer.synthesize(Label::Drusen, &mut source);
        assert_eq!(dist.drusen, 0.75);
        assert_eq!(dist.cnv, 0.125);
        assert_eq!(dist.dme, 0.0625);
        assert_eq!(dist.normal, 0.0625);
    }

    #[test]
    fn last_label_absorbs_everything_when_draws_are_zero() {
        let synthesizer = ConfidenceSynthesizer::default();
        let mut source = Scripted(vec![0.0, 0.0, 0.0]);
        let dist = synthesizer.synthesize(Label::Normal, &mut source);
        assert_eq!(dist.normal, 0.6);
        assert_eq!(dist.cnv, 0.0);
        assert_eq!(dist.dme, 0.0);
        assert_eq!(dist.drusen, 0.4);
    }

    #[test]
    fn alternate_range_is_honoured() {
        let synthesizer = ConfidenceSynthesizer::new(SynthesizerConfig {
            base_min: 0.7,
            base_max: 0.95,
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let dist = synthesizer.synthesize(Label::Cnv, &mut rng);
            assert!(dist.cnv >= 0.7 && dist.cnv <= 0.95);
        }
    }

    #[test]
    fn ranges_that_break_the_maximum_are_rejected() {
        let bad = SynthesizerConfig {
            base_min: 0.3,
            base_max: 0.9,
        };
        assert!(matches!(
            ConfidenceSynthesizer::new(bad),
            Err(RetinaError::InvalidConfig(_))
        ));
        let inverted = SynthesizerConfig {
            base_min: 0.9,
            base_max: 0.6,
        };
        assert!(ConfidenceSynthesizer::new(inverted).is_err());
    }
}
