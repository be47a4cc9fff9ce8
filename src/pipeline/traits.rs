use crate::alignment::edit_ops::Opcode;
use crate::error::AlignmentError;

pub trait Normalizer: Send + Sync {
    /// Skeleton of one whitespace-free token; empty when nothing comparable
    /// remains.
    fn normalize(&self, raw: &str) -> String;
}

pub trait SequenceAligner: Send + Sync {
    /// Global edit operations turning `source` into `target`, covering both
    /// sequences completely and deterministic for identical inputs.
    fn opcodes(&self, source: &[u32], target: &[u32]) -> Result<Vec<Opcode>, AlignmentError>;
}

pub trait LineScorer: Send + Sync {
    /// Quality of an OCR line against its canonical segment, or `None` when
    /// no finite score could be computed. `normalizer` is the one the engine
    /// aligned with, so the score sees the same skeletons as the anchors.
    fn score(
        &self,
        ocr_text: &str,
        segment_raw: &str,
        normalizer: &dyn Normalizer,
    ) -> Option<i32>;
}
