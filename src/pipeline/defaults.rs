use crate::alignment::edit_ops::{levenshtein_opcodes, Opcode};
use crate::alignment::normalize::normalize_token;
use crate::alignment::scoring::{score_line, ScoreParams};
use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::{LineScorer, Normalizer, SequenceAligner};

pub struct ArabicSkeletonNormalizer;

impl Normalizer for ArabicSkeletonNormalizer {
    fn normalize(&self, raw: &str) -> String {
        normalize_token(raw)
    }
}

pub struct HirschbergSequenceAligner;

impl SequenceAligner for HirschbergSequenceAligner {
    fn opcodes(&self, source: &[u32], target: &[u32]) -> Result<Vec<Opcode>, AlignmentError> {
        Ok(levenshtein_opcodes(source, target))
    }
}

pub struct EnsembleLineScorer {
    params: ScoreParams,
}

impl EnsembleLineScorer {
    pub fn new(params: ScoreParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(ScoreParams::from(config))
    }
}

impl Default for EnsembleLineScorer {
    fn default() -> Self {
        Self::new(ScoreParams::default())
    }
}

impl LineScorer for EnsembleLineScorer {
    fn score(
        &self,
        ocr_text: &str,
        segment_raw: &str,
        normalizer: &dyn Normalizer,
    ) -> Option<i32> {
        score_line(ocr_text, segment_raw, normalizer, &self.params)
    }
}
