use std::collections::HashMap;

use crate::alignment::edit_ops::{distance, OpTag, Opcode};
use crate::error::AlignmentError;
use crate::pipeline::traits::SequenceAligner;
use crate::types::Anchor;

/// Maps every distinct skeleton to one code unit. Codes are handed out in
/// first-seen order starting at `base`; the empty skeleton always maps to
/// `sentinel`, and `sentinel` is never handed out to a real token.
#[derive(Debug, Clone)]
pub struct TokenCodebook {
    codes: HashMap<String, u32>,
    next: u32,
    sentinel: u32,
}

impl TokenCodebook {
    pub fn new(base: u32, sentinel: u32) -> Self {
        Self {
            codes: HashMap::new(),
            next: base,
            sentinel,
        }
    }

    pub fn sentinel(&self) -> u32 {
        self.sentinel
    }

    pub fn distinct(&self) -> usize {
        self.codes.len()
    }

    pub fn code(&mut self, token: &str) -> Result<u32, AlignmentError> {
        if token.is_empty() {
            return Ok(self.sentinel);
        }
        if let Some(&code) = self.codes.get(token) {
            return Ok(code);
        }
        if self.next == self.sentinel {
            self.next = self.bump(self.next)?;
        }
        let code = self.next;
        self.next = self.bump(code)?;
        self.codes.insert(token.to_string(), code);
        Ok(code)
    }

    pub fn encode(&mut self, tokens: &[String]) -> Result<Vec<u32>, AlignmentError> {
        tokens.iter().map(|token| self.code(token)).collect()
    }

    fn bump(&self, code: u32) -> Result<u32, AlignmentError> {
        code.checked_add(1).ok_or_else(|| {
            AlignmentError::alignment_unavailable("encode tokens", "token code space exhausted")
        })
    }
}

/// Result of globally aligning a source token stream against a target one.
#[derive(Debug, Clone)]
pub struct StreamAlignment {
    pub opcodes: Vec<Opcode>,
    pub source_codes: Vec<u32>,
    pub target_codes: Vec<u32>,
    pub sentinel: u32,
}

impl StreamAlignment {
    /// Index pairs of `equal` opcodes whose source token is a real word.
    pub fn anchors(&self) -> Vec<Anchor> {
        self.opcodes
            .iter()
            .flat_map(Opcode::equal_pairs)
            .filter(|&(k, _)| self.source_codes[k] != self.sentinel)
            .map(|(ocr, canonical)| Anchor { ocr, canonical })
            .collect()
    }

    /// Unit-cost edits the opcodes imply.
    pub fn edit_distance(&self) -> usize {
        distance(&self.opcodes)
    }

    /// Per source token: whether it takes part in an `equal` opcode.
    pub fn matched_source(&self) -> Vec<bool> {
        let mut matched = vec![false; self.source_codes.len()];
        for op in self.opcodes.iter().filter(|op| op.tag == OpTag::Equal) {
            matched[op.a_start..op.a_end].fill(true);
        }
        matched
    }
}

/// Encode both streams with a shared codebook and run the sequence aligner.
pub fn align_streams(
    source: &[String],
    target: &[String],
    aligner: &dyn SequenceAligner,
    code_base: u32,
    sentinel: u32,
) -> Result<StreamAlignment, AlignmentError> {
    let mut codebook = TokenCodebook::new(code_base, sentinel);
    let target_codes = codebook.encode(target)?;
    let source_codes = codebook.encode(source)?;
    let opcodes = aligner.opcodes(&source_codes, &target_codes)?;
    tracing::debug!(
        source_len = source_codes.len(),
        target_len = target_codes.len(),
        distinct_tokens = codebook.distinct(),
        opcode_count = opcodes.len(),
        edit_distance = distance(&opcodes),
        "global alignment finished"
    );
    Ok(StreamAlignment {
        opcodes,
        source_codes,
        target_codes,
        sentinel,
    })
}
