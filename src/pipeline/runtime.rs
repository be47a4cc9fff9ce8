use serde_json::json;

use crate::alignment::artifact::{
    skip_key, AlignmentArtifact, CopyRecords, DebugEntry, ALGO_VERSION, SKIP_PAIRS,
};
use crate::alignment::crosslink::{link_pair, LinkSide, PairLinks};
use crate::alignment::global_align::align_streams;
use crate::alignment::skips::detect_skips;
use crate::alignment::spans::resolve_line_spans;
use crate::alignment::spellcheck::SpellcheckIndex;
use crate::alignment::tokenization::{build_canonical_tokens, build_flat_ocr};
use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::{LineScorer, Normalizer, SequenceAligner};
use crate::types::{
    AlignedLine, BestSpan, CanonicalTokens, CopyId, CopyPair, EngineInput, FlatOcr, OcrLine,
    RunPhase,
};

/// Multi-witness alignment engine. Built by
/// [`EngineBuilder`](crate::pipeline::builder::EngineBuilder).
pub struct WitnessAligner {
    config: EngineConfig,
    normalizer: Box<dyn Normalizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
    line_scorer: Box<dyn LineScorer>,
}

pub(crate) struct WitnessAlignerParts {
    pub config: EngineConfig,
    pub normalizer: Box<dyn Normalizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub line_scorer: Box<dyn LineScorer>,
}

/// One copy aligned against the canonical text.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyAlignment {
    pub lines: Vec<AlignedLine>,
    pub flat: FlatOcr,
    pub anchor_count: usize,
    /// Edits between the copy's flat stream and the canonical tokens.
    pub edit_distance: usize,
    pub anchored_lines: usize,
    pub pushed_lines: usize,
}

impl CopyAlignment {
    fn link_side(&self) -> LinkSide<'_> {
        LinkSide {
            lines: &self.lines,
            flat: &self.flat,
        }
    }
}

impl WitnessAligner {
    pub(crate) fn from_parts(parts: WitnessAlignerParts) -> Self {
        Self {
            config: parts.config,
            normalizer: parts.normalizer,
            sequence_aligner: parts.sequence_aligner,
            line_scorer: parts.line_scorer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokenize_canonical(&self, text: &str) -> Result<CanonicalTokens, AlignmentError> {
        build_canonical_tokens(text, self.normalizer.as_ref())
    }

    /// Align one copy's lines against the canonical tokens, then score each
    /// line and attach spellcheck hits.
    pub fn align_copy(
        &self,
        canonical: &CanonicalTokens,
        lines: &[OcrLine],
        spellcheck: Option<&SpellcheckIndex>,
    ) -> Result<CopyAlignment, AlignmentError> {
        let flat = build_flat_ocr(lines, self.normalizer.as_ref())?;
        let alignment = align_streams(
            &flat.tokens,
            &canonical.normalized,
            self.sequence_aligner.as_ref(),
            self.config.token_code_base,
            self.config.empty_sentinel,
        )?;
        let anchors = alignment.anchors();
        let resolution = resolve_line_spans(&flat, &anchors, canonical.len());

        let aligned = lines
            .iter()
            .zip(&resolution.spans)
            .map(|(line, &span)| {
                let raw = canonical.slice_raw(span);
                let score = self
                    .line_scorer
                    .score(&line.ocr_text, &raw, self.normalizer.as_ref())
                    .unwrap_or_else(|| {
                        tracing::warn!(line_no = line.line_no, "line score is not finite; using 0");
                        0
                    });
                let (error_hits, error_count) = spellcheck
                    .map(|index| index.attach(canonical, span))
                    .unwrap_or_default();
                AlignedLine {
                    line_no: line.line_no,
                    ocr_text: line.ocr_text.clone(),
                    provenance: line.provenance.clone(),
                    best: BestSpan {
                        start_word: span.start,
                        end_word: span.end,
                        raw,
                        score,
                    },
                    error_hits,
                    error_count,
                    is_empty_ocr: line.ocr_text.trim().is_empty(),
                    ocr_wc: line.ocr_text.split_whitespace().count(),
                    seg_wc: span.len(),
                    links: Default::default(),
                }
            })
            .collect();

        tracing::debug!(
            lines = lines.len(),
            flat_tokens = flat.len(),
            anchors = anchors.len(),
            anchored_lines = resolution.anchored_lines,
            pushed_lines = resolution.pushed_lines,
            "copy aligned"
        );

        Ok(CopyAlignment {
            lines: aligned,
            flat,
            anchor_count: anchors.len(),
            edit_distance: alignment.edit_distance(),
            anchored_lines: resolution.anchored_lines,
            pushed_lines: resolution.pushed_lines,
        })
    }

    pub fn run(&self, input: &EngineInput) -> Result<AlignmentArtifact, AlignmentError> {
        self.run_with_status(input, |_| Ok(()))
    }

    /// Full multi-copy run. `status` is called at every phase boundary; an
    /// error returned from it stops the run and is passed back unchanged.
    pub fn run_with_status<F>(
        &self,
        input: &EngineInput,
        mut status: F,
    ) -> Result<AlignmentArtifact, AlignmentError>
    where
        F: FnMut(RunPhase) -> Result<(), AlignmentError>,
    {
        if input.copies.is_empty() {
            return Err(AlignmentError::invalid_input("no OCR copies supplied"));
        }
        if input.copies.len() > CopyId::ALL.len() {
            return Err(AlignmentError::invalid_input(format!(
                "at most {} copies are supported, got {}",
                CopyId::ALL.len(),
                input.copies.len()
            )));
        }

        status(RunPhase::TokenizingCanonical)?;
        let canonical = self.tokenize_canonical(&input.canonical_text)?;
        let punctuation_only = canonical.normalized.iter().filter(|t| t.is_empty()).count();
        tracing::info!(
            tokens = canonical.len(),
            copies = input.copies.len(),
            "canonical text tokenized"
        );
        let mut debug_log = vec![DebugEntry::new(
            "tokenize_canonical",
            "whitespace tokenization of the canonical text",
            format!("{} tokens", canonical.len()),
            json!({ "tokens": canonical.len(), "empty_skeletons": punctuation_only }),
        )];

        let spellcheck = input.spellcheck.clone().map(|mut payload| {
            payload.fill_missing_norms(self.normalizer.as_ref());
            payload
        });
        let index = spellcheck
            .as_ref()
            .map(|payload| SpellcheckIndex::new(payload, self.normalizer.as_ref()));

        let mut copies: Vec<(CopyId, CopyAlignment)> = Vec::with_capacity(input.copies.len());
        for (copy, lines) in CopyId::ALL.into_iter().zip(&input.copies) {
            status(RunPhase::AligningCopy(copy))?;
            let aligned = self.align_copy(&canonical, lines, index.as_ref())?;
            tracing::info!(
                copy = copy.number(),
                lines = aligned.lines.len(),
                anchors = aligned.anchor_count,
                "copy aligned against canonical text"
            );
            debug_log.push(DebugEntry::new(
                format!("align_{copy}"),
                format!("global alignment of copy {} against the canonical text", copy.number()),
                format!(
                    "{} anchors, {}/{} lines anchored",
                    aligned.anchor_count,
                    aligned.anchored_lines,
                    aligned.lines.len()
                ),
                json!({
                    "copy": copy.number(),
                    "lines": aligned.lines.len(),
                    "flat_tokens": aligned.flat.len(),
                    "anchors": aligned.anchor_count,
                    "edit_distance": aligned.edit_distance,
                    "anchored_lines": aligned.anchored_lines,
                    "pushed_lines": aligned.pushed_lines,
                }),
            ));
            copies.push((copy, aligned));
        }

        for i in 0..copies.len() {
            for j in i + 1..copies.len() {
                let pair = CopyPair::new(copies[i].0, copies[j].0);
                status(RunPhase::LinkingPair(pair))?;
                let linked = link_pair(
                    copies[i].1.link_side(),
                    copies[j].1.link_side(),
                    self.sequence_aligner.as_ref(),
                    &self.config,
                )
                .map_err(|e| AlignmentError::cross_link(pair, e));
                match linked {
                    Ok(links) => {
                        let (forward, backward) = links.linked_lines();
                        debug_log.push(DebugEntry::new(
                            format!("link_{}_{}", pair.source, pair.target),
                            "cross-witness pointers in both directions",
                            format!("{forward} and {backward} lines linked"),
                            json!({ "pair": pair.to_string(), "forward": forward, "backward": backward }),
                        ));
                        attach_links(&mut copies, i, j, links);
                    }
                    Err(err) => {
                        tracing::warn!(pair = %pair, error = %err, "cross-witness linking skipped");
                        debug_log.push(DebugEntry::new(
                            format!("link_{}_{}", pair.source, pair.target),
                            "cross-witness pointers in both directions",
                            format!("failed: {err}"),
                            json!({ "pair": pair.to_string(), "failed": true }),
                        ));
                        status(RunPhase::LinkFailed(pair))?;
                    }
                }
            }
        }

        let mut skips = Vec::new();
        for (source, target) in SKIP_PAIRS {
            let (Some(source_lines), Some(target_lines)) = (
                input.copies.get(source.index()),
                input.copies.get(target.index()),
            ) else {
                continue;
            };
            let pair = CopyPair::new(source, target);
            status(RunPhase::DetectingSkips(pair))?;
            let detected = detect_skips(
                source_lines,
                target_lines,
                self.normalizer.as_ref(),
                self.sequence_aligner.as_ref(),
                &self.config,
            )
            .map_err(|e| AlignmentError::skip_detection(pair, e));
            match detected {
                Ok(entries) => {
                    debug_log.push(DebugEntry::new(
                        skip_key(pair),
                        format!(
                            "lines of copy {} with at least {} consecutive tokens missing from copy {}",
                            source.number(),
                            self.config.skip_min_run,
                            target.number()
                        ),
                        format!("{} lines flagged", entries.len()),
                        json!({ "flagged": entries.len(), "min_run": self.config.skip_min_run }),
                    ));
                    skips.push((pair, entries));
                }
                Err(err) => {
                    tracing::warn!(pair = %pair, error = %err, "skip report omitted");
                    debug_log.push(DebugEntry::new(
                        skip_key(pair),
                        format!(
                            "lines of copy {} with tokens missing from copy {}",
                            source.number(),
                            target.number()
                        ),
                        format!("failed: {err}"),
                        json!({ "failed": true }),
                    ));
                    status(RunPhase::SkipsFailed(pair))?;
                }
            }
        }

        status(RunPhase::Assembling)?;
        Ok(AlignmentArtifact {
            algo_version: ALGO_VERSION.to_string(),
            docx_path: input.canonical_path.clone(),
            tahkik_tokens: canonical.raw,
            copies: copies
                .into_iter()
                .map(|(copy, aligned)| CopyRecords {
                    copy,
                    lines: aligned.lines,
                })
                .collect(),
            skips,
            spellcheck: spellcheck.map(|p| p.errors_merged).unwrap_or_default(),
            debug_log,
        })
    }
}

fn attach_links(copies: &mut [(CopyId, CopyAlignment)], i: usize, j: usize, links: PairLinks) {
    let (copy_i, copy_j) = (copies[i].0, copies[j].0);
    for (line, line_links) in copies[i].1.lines.iter_mut().zip(links.forward) {
        line.links.insert(copy_j, line_links);
    }
    for (line, line_links) in copies[j].1.lines.iter_mut().zip(links.backward) {
        line.links.insert(copy_i, line_links);
    }
}
