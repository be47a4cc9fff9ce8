use crate::alignment::global_align::align_streams;
use crate::alignment::tokenization::build_letter_stream;
use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::{Normalizer, SequenceAligner};
use crate::types::{FlatOcr, OcrLine, SkipEntry};

/// Lines of `source` holding a run of at least `skip_min_run` consecutive
/// letter tokens that have no `equal` counterpart in `target`.
pub fn detect_skips(
    source: &[OcrLine],
    target: &[OcrLine],
    normalizer: &dyn Normalizer,
    aligner: &dyn SequenceAligner,
    config: &EngineConfig,
) -> Result<Vec<SkipEntry>, AlignmentError> {
    let source_stream = build_letter_stream(source, normalizer)?;
    let target_stream = build_letter_stream(target, normalizer)?;
    let alignment = align_streams(
        &source_stream.tokens,
        &target_stream.tokens,
        aligner,
        config.token_code_base,
        config.empty_sentinel,
    )?;
    let matched = alignment.matched_source();
    Ok(flag_runs(&source_stream, &matched, config.skip_min_run))
}

/// Longest run of unmatched tokens inside each line; runs never continue
/// across a line boundary.
pub fn max_miss_runs(stream: &FlatOcr, matched: &[bool]) -> Vec<usize> {
    stream
        .line_ranges
        .iter()
        .map(|&(start, end)| {
            let mut run = 0usize;
            let mut longest = 0usize;
            for &hit in &matched[start..end] {
                if hit {
                    run = 0;
                } else {
                    run += 1;
                    longest = longest.max(run);
                }
            }
            longest
        })
        .collect()
}

fn flag_runs(stream: &FlatOcr, matched: &[bool], min_run: usize) -> Vec<SkipEntry> {
    max_miss_runs(stream, matched)
        .into_iter()
        .enumerate()
        .filter(|&(_, run)| run >= min_run)
        .map(|(line, max_consecutive_miss)| SkipEntry {
            line_no: line + 1,
            ocr_text: stream.line_texts[line].clone(),
            max_consecutive_miss,
        })
        .collect()
}
