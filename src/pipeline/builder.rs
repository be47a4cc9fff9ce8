use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{
    ArabicSkeletonNormalizer, EnsembleLineScorer, HirschbergSequenceAligner,
};
use crate::pipeline::runtime::{WitnessAligner, WitnessAlignerParts};
use crate::pipeline::traits::{LineScorer, Normalizer, SequenceAligner};

pub struct EngineBuilder {
    config: EngineConfig,
    normalizer: Option<Box<dyn Normalizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    line_scorer: Option<Box<dyn LineScorer>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            normalizer: None,
            sequence_aligner: None,
            line_scorer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_line_scorer(mut self, line_scorer: Box<dyn LineScorer>) -> Self {
        self.line_scorer = Some(line_scorer);
        self
    }

    pub fn build(self) -> Result<WitnessAligner, AlignmentError> {
        self.config.validate()?;
        let line_scorer = self
            .line_scorer
            .unwrap_or_else(|| Box::new(EnsembleLineScorer::from_config(&self.config)));

        Ok(WitnessAligner::from_parts(WitnessAlignerParts {
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(ArabicSkeletonNormalizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(HirschbergSequenceAligner)),
            line_scorer,
            config: self.config,
        }))
    }
}
