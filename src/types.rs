use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One manuscript witness. At most four copies take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CopyId {
    First,
    Second,
    Third,
    Fourth,
}

impl CopyId {
    pub const ALL: [CopyId; 4] = [Self::First, Self::Second, Self::Third, Self::Fourth];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based copy number as used by editors and in artifact field names.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for CopyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.number())
    }
}

/// Ordered pair of copies: `source` is the side that receives pointers or
/// whose lines are inspected, `target` the side being pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CopyPair {
    pub source: CopyId,
    pub target: CopyId,
}

impl CopyPair {
    pub fn new(source: CopyId, target: CopyId) -> Self {
        Self { source, target }
    }

    pub fn reversed(self) -> Self {
        Self::new(self.target, self.source)
    }
}

impl fmt::Display for CopyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Provenance fields carried verbatim from the segmentation/OCR collaborators.
/// The engine never inspects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default)]
    pub line_image: Option<String>,
    #[serde(default)]
    pub page_image: Option<String>,
    #[serde(default)]
    pub page_name: Option<String>,
    #[serde(default)]
    pub line_index: Option<serde_json::Value>,
    #[serde(default)]
    pub bbox: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// 1-based, contiguous within one copy.
    pub line_no: usize,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl OcrLine {
    pub fn new(line_no: usize, ocr_text: impl Into<String>) -> Self {
        Self {
            line_no,
            ocr_text: ocr_text.into(),
            provenance: Provenance::default(),
        }
    }
}

/// Canonical (editor-typed) token stream: raw tokens for display, skeletons
/// for comparison. Both vectors have the same length `M`.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTokens {
    pub raw: Vec<String>,
    pub normalized: Vec<String>,
}

impl CanonicalTokens {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Raw tokens `[span.start, span.end)` joined by single spaces.
    pub fn slice_raw(&self, span: WordSpan) -> String {
        let end = span.end.min(self.raw.len());
        let start = span.start.min(end);
        self.raw[start..end].join(" ")
    }
}

/// One copy's OCR tokens flattened into a single stream.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatOcr {
    /// Normalized token per flat index `[0..K)`.
    pub tokens: Vec<String>,
    /// Owning line index (0-based) per flat index.
    pub owner: Vec<usize>,
    /// Half-open flat range owned by each line; ranges partition `[0..K)`.
    pub line_ranges: Vec<(usize, usize)>,
    /// Raw OCR text of each line.
    pub line_texts: Vec<String>,
}

impl FlatOcr {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_ranges.len()
    }

    pub fn word_count(&self, line: usize) -> usize {
        self.line_ranges
            .get(line)
            .map(|&(start, end)| end - start)
            .unwrap_or(0)
    }
}

/// `(flat_ocr_index, canonical_index)` pair of identical skeletons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub ocr: usize,
    pub canonical: usize,
}

/// Half-open canonical span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

impl WordSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Token midpoint, `(start + end) / 2` rounded down.
    pub fn midpoint(self) -> usize {
        (self.start + self.end) / 2
    }

    pub fn overlap(self, other: WordSpan) -> usize {
        self.end
            .min(other.end)
            .saturating_sub(self.start.max(other.start))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSpan {
    pub start_word: usize,
    pub end_word: usize,
    pub raw: String,
    pub score: i32,
}

impl BestSpan {
    pub fn span(&self) -> WordSpan {
        WordSpan::new(self.start_word, self.end_word)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellcheckRecord {
    pub wrong: String,
    #[serde(default)]
    pub wrong_norm: Option<String>,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellcheckPayload {
    #[serde(default)]
    pub errors_merged: Vec<SpellcheckRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorHit {
    pub wrong: String,
    pub wrong_norm: String,
    pub suggestion: String,
    pub reason: String,
    /// Canonical token index the hit was found at.
    pub word_index: usize,
    pub token: String,
}

/// Compact descriptor of the single best counterpart line in another copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltRef {
    pub line_no: usize,
    pub line_image: Option<String>,
    pub ocr_text: String,
    pub best: BestSpan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltOverlap {
    pub line_no: usize,
    pub line_image: Option<String>,
    pub ocr_text: String,
    pub start_word: usize,
    pub end_word: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrAltEntry {
    pub line_no: usize,
    pub line_image: Option<String>,
    pub ocr_text: String,
    /// Number of OCR tokens aligned `equal` between the two lines.
    pub shared_tokens: usize,
}

/// Pointers from one line towards one other copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLinks {
    pub alt: Option<AltRef>,
    pub alt_list: Vec<AltOverlap>,
    pub ocr_alt_list: Vec<OcrAltEntry>,
    pub ocr_alt_best: Option<OcrAltEntry>,
}

impl LineLinks {
    pub fn is_empty(&self) -> bool {
        self.alt.is_none()
            && self.alt_list.is_empty()
            && self.ocr_alt_list.is_empty()
            && self.ocr_alt_best.is_none()
    }
}

/// The engine's primary output element. Cross-witness pointers are kept
/// keyed by target copy and only renamed when the artifact is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedLine {
    pub line_no: usize,
    pub ocr_text: String,
    pub provenance: Provenance,
    pub best: BestSpan,
    pub error_hits: Vec<ErrorHit>,
    pub error_count: usize,
    pub is_empty_ocr: bool,
    pub ocr_wc: usize,
    pub seg_wc: usize,
    pub links: BTreeMap<CopyId, LineLinks>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipEntry {
    pub line_no: usize,
    pub ocr_text: String,
    pub max_consecutive_miss: usize,
}

/// Everything one run consumes.
#[derive(Debug, Clone, Default)]
pub struct EngineInput {
    /// Path of the canonical document, echoed into the artifact.
    pub canonical_path: String,
    pub canonical_text: String,
    /// OCR lines per copy, copy 1 first. At most four copies.
    pub copies: Vec<Vec<OcrLine>>,
    pub spellcheck: Option<SpellcheckPayload>,
}

/// Phase boundaries reported to the status callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    TokenizingCanonical,
    AligningCopy(CopyId),
    LinkingPair(CopyPair),
    /// Linking the pair failed; its pointers are left out.
    LinkFailed(CopyPair),
    DetectingSkips(CopyPair),
    /// Skip detection for the pair failed; its report is left out.
    SkipsFailed(CopyPair),
    Assembling,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenizingCanonical => write!(f, "tokenizing canonical text"),
            Self::AligningCopy(copy) => write!(f, "aligning copy {copy}"),
            Self::LinkingPair(pair) => write!(f, "linking {pair}"),
            Self::LinkFailed(pair) => write!(f, "linking {pair} failed"),
            Self::DetectingSkips(pair) => write!(f, "detecting skips {pair}"),
            Self::SkipsFailed(pair) => write!(f, "detecting skips {pair} failed"),
            Self::Assembling => write!(f, "assembling artifact"),
        }
    }
}
