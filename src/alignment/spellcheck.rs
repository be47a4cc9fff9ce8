use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::AlignmentError;
use crate::pipeline::traits::Normalizer;
use crate::types::{CanonicalTokens, ErrorHit, SpellcheckPayload, SpellcheckRecord, WordSpan};

impl SpellcheckPayload {
    /// Read `{ "errors_merged": [...] }`. Missing `wrong_norm`s stay empty
    /// until a run fills them with the engine's normalizer.
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read spellcheck payload", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse spellcheck payload", e))
    }

    pub fn fill_missing_norms(&mut self, normalizer: &dyn Normalizer) {
        for record in &mut self.errors_merged {
            if record.wrong_norm.is_none() {
                record.wrong_norm = Some(normalizer.normalize(&record.wrong));
            }
        }
    }
}

/// Spellcheck records keyed by skeleton. The first record seen for a
/// skeleton wins; records with an empty skeleton are never attached.
#[derive(Debug, Clone, Default)]
pub struct SpellcheckIndex {
    by_norm: HashMap<String, SpellcheckRecord>,
}

impl SpellcheckIndex {
    pub fn new(payload: &SpellcheckPayload, normalizer: &dyn Normalizer) -> Self {
        let mut by_norm = HashMap::new();
        for record in &payload.errors_merged {
            let source = record.wrong_norm.as_deref().unwrap_or(&record.wrong);
            let norm = normalizer.normalize(source);
            if norm.is_empty() {
                continue;
            }
            by_norm.entry(norm).or_insert_with(|| record.clone());
        }
        Self { by_norm }
    }

    pub fn len(&self) -> usize {
        self.by_norm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_norm.is_empty()
    }

    /// One hit per canonical token inside `span` whose skeleton is a known
    /// wrong form, plus the number of distinct wrong forms hit.
    pub fn attach(&self, canonical: &CanonicalTokens, span: WordSpan) -> (Vec<ErrorHit>, usize) {
        if self.by_norm.is_empty() {
            return (Vec::new(), 0);
        }
        let end = span.end.min(canonical.len());
        let start = span.start.min(end);

        let mut hits = Vec::new();
        let mut distinct = BTreeSet::new();
        for word_index in start..end {
            let norm = &canonical.normalized[word_index];
            let Some(record) = self.by_norm.get(norm) else {
                continue;
            };
            distinct.insert(norm.as_str());
            hits.push(ErrorHit {
                wrong: record.wrong.clone(),
                wrong_norm: norm.clone(),
                suggestion: record.suggestion.clone(),
                reason: record.reason.clone(),
                word_index,
                token: canonical.raw[word_index].clone(),
            });
        }
        (hits, distinct.len())
    }
}
