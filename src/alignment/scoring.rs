//! Per-line alignment quality score.
//!
//! Five independent components, each a pure function over the skeleton
//! text of the OCR line and of its canonical segment, combined with tunable
//! weights into one integer.

use std::collections::HashMap;

use strsim::normalized_levenshtein;

use crate::alignment::normalize::normalize_text;
use crate::alignment::similarity::{
    ngram_jaccard, partial_ratio, ratio, token_set_ratio, token_sort_ratio, weighted_ratio,
    word_jaccard,
};
use crate::config::EngineConfig;
use crate::pipeline::traits::Normalizer;

const NEUTRAL_ORDER_SCORE: f64 = 50.0;

/// Weights and knobs the combined score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParams {
    pub prefix_words: usize,
    pub w_main: f64,
    pub w_prefix: f64,
    pub length_band: [f64; 2],
    pub length_penalty_slope: f64,
    pub length_penalty_cap: f64,
}

impl From<&EngineConfig> for ScoreParams {
    fn from(config: &EngineConfig) -> Self {
        Self {
            prefix_words: config.prefix_words,
            w_main: config.w_main,
            w_prefix: config.w_prefix,
            length_band: config.length_band,
            length_penalty_slope: config.length_penalty_slope,
            length_penalty_cap: config.length_penalty_cap,
        }
    }
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// Component breakdown, kept for debugging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub char_level: f64,
    pub token_level: f64,
    pub boundary: f64,
    pub weighted: f64,
    pub prefix: f64,
    pub length_penalty: f64,
    pub total: f64,
}

/// Score an OCR line against the raw canonical text assigned to it.
/// Returns `None` when the combination is not a finite number. Halves
/// round to even.
pub fn score_line(
    ocr_text: &str,
    segment_raw: &str,
    normalizer: &dyn Normalizer,
    params: &ScoreParams,
) -> Option<i32> {
    let total = score_breakdown(ocr_text, segment_raw, normalizer, params).total;
    total
        .is_finite()
        .then(|| total.round_ties_even().max(0.0) as i32)
}

pub fn score_breakdown(
    ocr_text: &str,
    segment_raw: &str,
    normalizer: &dyn Normalizer,
    params: &ScoreParams,
) -> ScoreBreakdown {
    let ocr = normalize_text(ocr_text, normalizer);
    let seg = normalize_text(segment_raw, normalizer);
    if ocr.is_empty() || seg.is_empty() {
        return ScoreBreakdown::default();
    }

    let char_level = char_ensemble(&ocr, &seg);
    let token_level = token_ensemble(&ocr, &seg);
    let boundary = boundary_score(&ocr, &seg);
    let weighted = weighted_ratio(&ocr, &seg);
    let prefix = prefix_ensemble(&ocr, &seg, params.prefix_words);
    let length_penalty = length_penalty(
        segment_raw.split_whitespace().count(),
        ocr_text.split_whitespace().count(),
        params,
    );

    let main = 0.28 * char_level + 0.27 * token_level + 0.20 * boundary + 0.25 * weighted;
    let total = params.w_main * main + params.w_prefix * prefix + length_penalty;

    ScoreBreakdown {
        char_level,
        token_level,
        boundary,
        weighted,
        prefix,
        length_penalty,
        total,
    }
}

/// Component 1: normalized Levenshtein, mean character n-gram Jaccard for
/// n in {2, 3, 4}, and partial substring ratio.
pub fn char_ensemble(a: &str, b: &str) -> f64 {
    let levenshtein = normalized_levenshtein(a, b) * 100.0;
    let ngrams = [2, 3, 4]
        .iter()
        .map(|&n| ngram_jaccard(a, b, n))
        .sum::<f64>()
        / 3.0
        * 100.0;
    let partial = partial_ratio(a, b);
    0.40 * levenshtein + 0.35 * ngrams + 0.25 * partial
}

/// Component 2: token-set, token-sort, word Jaccard and word order.
pub fn token_ensemble(a: &str, b: &str) -> f64 {
    let set = token_set_ratio(a, b);
    let sort = token_sort_ratio(a, b);
    let jaccard = word_jaccard(a, b) * 100.0;
    let order = word_order_score(a, b);
    0.30 * set + 0.25 * sort + 0.25 * jaccard + 0.20 * order
}

/// Share of shared-token pairs whose relative order agrees in both texts.
/// Neutral (50) with fewer than two shared tokens.
pub fn word_order_score(a: &str, b: &str) -> f64 {
    let first_positions = |text: &str| {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, token) in text.split_whitespace().enumerate() {
            positions.entry(token.to_string()).or_insert(idx);
        }
        positions
    };
    let pos_a = first_positions(a);
    let pos_b = first_positions(b);

    let mut shared: Vec<(usize, usize)> = pos_a
        .iter()
        .filter_map(|(token, &ia)| pos_b.get(token).map(|&ib| (ia, ib)))
        .collect();
    if shared.len() < 2 {
        return NEUTRAL_ORDER_SCORE;
    }
    shared.sort_unstable();

    let mut agree = 0usize;
    let mut total = 0usize;
    for x in 0..shared.len() {
        for y in x + 1..shared.len() {
            total += 1;
            if shared[x].1 < shared[y].1 {
                agree += 1;
            }
        }
    }
    100.0 * agree as f64 / total as f64
}

/// Component 3: first word against first word, last against last.
pub fn boundary_score(a: &str, b: &str) -> f64 {
    let first = |text: &str| text.split_whitespace().next().unwrap_or("").to_string();
    let last = |text: &str| text.split_whitespace().last().unwrap_or("").to_string();
    0.45 * ratio(&first(a), &first(b)) + 0.55 * ratio(&last(a), &last(b))
}

/// Char and token ensembles averaged over the first `words` words only.
pub fn prefix_ensemble(a: &str, b: &str, words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    let take = |text: &str| {
        text.split_whitespace()
            .take(words)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let (a, b) = (take(a), take(b));
    0.5 * char_ensemble(&a, &b) + 0.5 * token_ensemble(&a, &b)
}

/// Component 5: zero inside the band of `seg_wc / ocr_wc`, linear outside,
/// never below `-length_penalty_cap`.
pub fn length_penalty(seg_wc: usize, ocr_wc: usize, params: &ScoreParams) -> f64 {
    if ocr_wc == 0 {
        return 0.0;
    }
    let ratio = seg_wc as f64 / ocr_wc as f64;
    let [low, high] = params.length_band;
    let distance = if ratio < low {
        low - ratio
    } else if ratio > high {
        ratio - high
    } else {
        0.0
    };
    -(distance * params.length_penalty_slope).min(params.length_penalty_cap)
}
