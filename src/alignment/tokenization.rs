use crate::error::AlignmentError;
use crate::pipeline::traits::Normalizer;
use crate::types::{CanonicalTokens, FlatOcr, OcrLine};

/// Whitespace-tokenize the canonical text. Punctuation stays glued to its
/// word; only the skeleton drops it.
pub fn build_canonical_tokens(
    text: &str,
    normalizer: &dyn Normalizer,
) -> Result<CanonicalTokens, AlignmentError> {
    let raw: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if raw.is_empty() {
        return Err(AlignmentError::invalid_input("canonical text is empty"));
    }
    let normalized = raw.iter().map(|token| normalizer.normalize(token)).collect();
    Ok(CanonicalTokens { raw, normalized })
}

/// Flatten one copy's lines into a single normalized stream with per-line
/// half-open ranges.
pub fn build_flat_ocr(
    lines: &[OcrLine],
    normalizer: &dyn Normalizer,
) -> Result<FlatOcr, AlignmentError> {
    if lines.is_empty() {
        return Err(AlignmentError::invalid_input("no OCR lines supplied"));
    }
    let flat = flatten_lines(lines, normalizer, false)?;
    if flat.is_empty() {
        return Err(AlignmentError::invalid_input(
            "OCR tokenization produced zero tokens",
        ));
    }
    Ok(flat)
}

/// Like [`build_flat_ocr`] but tokens with an empty skeleton are left out of
/// the stream. Used where only letters may take part in matching.
pub fn build_letter_stream(
    lines: &[OcrLine],
    normalizer: &dyn Normalizer,
) -> Result<FlatOcr, AlignmentError> {
    if lines.is_empty() {
        return Err(AlignmentError::invalid_input("no OCR lines supplied"));
    }
    flatten_lines(lines, normalizer, true)
}

fn flatten_lines(
    lines: &[OcrLine],
    normalizer: &dyn Normalizer,
    letters_only: bool,
) -> Result<FlatOcr, AlignmentError> {
    let mut tokens = Vec::new();
    let mut owner = Vec::new();
    let mut line_ranges = Vec::with_capacity(lines.len());
    let mut line_texts = Vec::with_capacity(lines.len());

    for (line_idx, line) in lines.iter().enumerate() {
        if line.line_no != line_idx + 1 {
            return Err(AlignmentError::invalid_input(format!(
                "OCR line numbers must be contiguous from 1: found {} at position {}",
                line.line_no,
                line_idx + 1
            )));
        }
        let start = tokens.len();
        for raw in line.ocr_text.split_whitespace() {
            let skeleton = normalizer.normalize(raw);
            if letters_only && skeleton.is_empty() {
                continue;
            }
            tokens.push(skeleton);
            owner.push(line_idx);
        }
        line_ranges.push((start, tokens.len()));
        line_texts.push(line.ocr_text.clone());
    }

    debug_assert!(
        line_ranges.windows(2).all(|w| w[0].1 == w[1].0),
        "flat line ranges must partition the stream"
    );

    Ok(FlatOcr {
        tokens,
        owner,
        line_ranges,
        line_texts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::defaults::ArabicSkeletonNormalizer;

    fn lines(texts: &[&str]) -> Vec<OcrLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| OcrLine::new(i + 1, *t))
            .collect()
    }

    #[test]
    fn empty_canonical_is_rejected() {
        let err = build_canonical_tokens(" \n\t ", &ArabicSkeletonNormalizer).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }

    #[test]
    fn canonical_keeps_raw_and_normalized_in_parallel() {
        let tokens = build_canonical_tokens("قالَ: الشيخُ ،", &ArabicSkeletonNormalizer).unwrap();
        assert_eq!(tokens.raw, ["قالَ:", "الشيخُ", "،"]);
        assert_eq!(tokens.normalized, ["قال", "الشيخ", ""]);
    }

    #[test]
    fn flat_ranges_partition_stream_with_empty_lines() {
        let flat = build_flat_ocr(&lines(&["قال الشيخ", "", "رحمه الله تعالى"]), &ArabicSkeletonNormalizer)
            .unwrap();
        assert_eq!(flat.len(), 5);
        assert_eq!(flat.line_ranges, vec![(0, 2), (2, 2), (2, 5)]);
        assert_eq!(flat.owner, vec![0, 0, 2, 2, 2]);
        assert_eq!(flat.word_count(1), 0);
        assert_eq!(flat.word_count(2), 3);
    }

    #[test]
    fn no_lines_or_no_tokens_is_invalid() {
        assert!(build_flat_ocr(&[], &ArabicSkeletonNormalizer).is_err());
        assert!(build_flat_ocr(&lines(&["", "  "]), &ArabicSkeletonNormalizer).is_err());
    }

    #[test]
    fn non_contiguous_line_numbers_are_invalid() {
        let mut input = lines(&["قال", "الشيخ"]);
        input[1].line_no = 5;
        let err = build_flat_ocr(&input, &ArabicSkeletonNormalizer).unwrap_err();
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn letter_stream_skips_empty_skeletons() {
        let flat =
            build_letter_stream(&lines(&["قال ، 12 الشيخ", "xyz"]), &ArabicSkeletonNormalizer).unwrap();
        assert_eq!(flat.tokens, ["قال", "الشيخ"]);
        assert_eq!(flat.line_ranges, vec![(0, 2), (2, 2)]);
    }
}
