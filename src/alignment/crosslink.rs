//! Cross-witness pointers between two aligned copies.
//!
//! Canonical-span pointers (`alt`, `alt_list`) compare spans that already
//! live in the shared canonical coordinate system. OCR pointers
//! (`ocr_alt_list`, `ocr_alt_best`) come from aligning the two OCR streams
//! directly and stay useful when the canonical spans drift.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::alignment::global_align::align_streams;
use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::SequenceAligner;
use crate::types::{AlignedLine, AltOverlap, AltRef, FlatOcr, LineLinks, OcrAltEntry};

/// One copy as seen by the linker.
#[derive(Debug, Clone, Copy)]
pub struct LinkSide<'a> {
    pub lines: &'a [AlignedLine],
    pub flat: &'a FlatOcr,
}

/// Pointers for both directions of one copy pair, indexed by line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairLinks {
    pub forward: Vec<LineLinks>,
    pub backward: Vec<LineLinks>,
}

impl PairLinks {
    pub fn linked_lines(&self) -> (usize, usize) {
        let count = |links: &[LineLinks]| links.iter().filter(|l| !l.is_empty()).count();
        (count(&self.forward), count(&self.backward))
    }
}

pub fn link_pair(
    a: LinkSide<'_>,
    b: LinkSide<'_>,
    aligner: &dyn SequenceAligner,
    config: &EngineConfig,
) -> Result<PairLinks, AlignmentError> {
    let (ocr_forward, ocr_backward) = ocr_token_links(a, b, aligner, config)?;

    let assemble = |source: &[AlignedLine], target: &[AlignedLine], ocr: Vec<Vec<OcrAltEntry>>| {
        midpoint_links(source, target)
            .into_iter()
            .zip(overlap_links(source, target, config.overlap_max_keep))
            .zip(ocr)
            .map(|((alt, alt_list), ocr_alt_list)| LineLinks {
                alt,
                alt_list,
                ocr_alt_best: ocr_alt_list.first().cloned(),
                ocr_alt_list,
            })
            .collect::<Vec<_>>()
    };

    Ok(PairLinks {
        forward: assemble(a.lines, b.lines, ocr_forward),
        backward: assemble(b.lines, a.lines, ocr_backward),
    })
}

/// For every source line, the target line whose span midpoint is nearest.
/// Ties go to the earliest target line.
pub fn midpoint_links(source: &[AlignedLine], target: &[AlignedLine]) -> Vec<Option<AltRef>> {
    source
        .iter()
        .map(|line| {
            let mid = line.best.span().midpoint();
            target
                .iter()
                .min_by_key(|other| (mid.abs_diff(other.best.span().midpoint()), other.line_no))
                .map(|other| AltRef {
                    line_no: other.line_no,
                    line_image: other.provenance.line_image.clone(),
                    ocr_text: other.ocr_text.clone(),
                    best: other.best.clone(),
                })
        })
        .collect()
}

/// For every source line with a non-empty span, the target lines sharing
/// canonical tokens with it, by overlap descending then line number.
pub fn overlap_links(
    source: &[AlignedLine],
    target: &[AlignedLine],
    max_keep: usize,
) -> Vec<Vec<AltOverlap>> {
    source
        .iter()
        .map(|line| {
            let span = line.best.span();
            if span.is_empty() {
                return Vec::new();
            }
            let mut ranked: Vec<AltOverlap> = target
                .iter()
                .filter(|other| !other.best.span().is_empty())
                .filter_map(|other| {
                    let overlap = span.overlap(other.best.span());
                    (overlap > 0).then(|| AltOverlap {
                        line_no: other.line_no,
                        line_image: other.provenance.line_image.clone(),
                        ocr_text: other.ocr_text.clone(),
                        start_word: other.best.start_word,
                        end_word: other.best.end_word,
                        overlap,
                    })
                })
                .collect();
            ranked.sort_by_key(|entry| (Reverse(entry.overlap), entry.line_no));
            ranked.truncate(max_keep);
            ranked
        })
        .collect()
}

/// Align the two OCR streams against each other and count `equal` token
/// pairs per line pair. Returns the ranked lists for both directions.
pub fn ocr_token_links(
    a: LinkSide<'_>,
    b: LinkSide<'_>,
    aligner: &dyn SequenceAligner,
    config: &EngineConfig,
) -> Result<(Vec<Vec<OcrAltEntry>>, Vec<Vec<OcrAltEntry>>), AlignmentError> {
    let alignment = align_streams(
        &a.flat.tokens,
        &b.flat.tokens,
        aligner,
        config.token_code_base,
        config.empty_sentinel,
    )?;

    let mut counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for anchor in alignment.anchors() {
        let line_a = a.flat.owner[anchor.ocr];
        let line_b = b.flat.owner[anchor.canonical];
        *counts.entry((line_a, line_b)).or_default() += 1;
    }

    let mut forward: Vec<Vec<(usize, usize)>> = vec![Vec::new(); a.lines.len()];
    let mut backward: Vec<Vec<(usize, usize)>> = vec![Vec::new(); b.lines.len()];
    for (&(line_a, line_b), &count) in &counts {
        if let Some(slot) = forward.get_mut(line_a) {
            slot.push((line_b, count));
        }
        if let Some(slot) = backward.get_mut(line_b) {
            slot.push((line_a, count));
        }
    }

    let rank = |lists: Vec<Vec<(usize, usize)>>, target: &[AlignedLine]| {
        lists
            .into_iter()
            .map(|mut list| {
                list.sort_by_key(|&(line, count)| (Reverse(count), line));
                list.truncate(config.overlap_max_keep);
                list.into_iter()
                    .filter_map(|(line, shared_tokens)| {
                        target.get(line).map(|other| OcrAltEntry {
                            line_no: other.line_no,
                            line_image: other.provenance.line_image.clone(),
                            ocr_text: other.ocr_text.clone(),
                            shared_tokens,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };

    Ok((rank(forward, b.lines), rank(backward, a.lines)))
}
