//! Fuzzy string similarity primitives, all on a 0..=100 scale.
//!
//! `ratio` is the matching-blocks ratio `2 * M / T` over characters; the
//! token and partial variants build on it the way common fuzzy matchers do.

use std::collections::{BTreeSet, HashMap, HashSet};

pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best `ratio` of the shorter string against equally long windows of the
/// longer one, windows anchored on the matching blocks.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let mut best = 0.0f64;
    for (short_start, long_start, _) in matching_blocks(&short, &long) {
        let window_start = long_start.saturating_sub(short_start);
        let window_end = (window_start + short.len()).min(long.len());
        let window_start = window_end.saturating_sub(short.len());
        let score = ratio_chars(&short, &long[window_start..window_end]);
        if score > 99.5 {
            return 100.0;
        }
        best = best.max(score);
    }
    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, ratio)
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, partial_ratio)
}

/// General-purpose weighted ratio: plain ratio when lengths are similar,
/// scaled partial variants when one string is much longer.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }
    const UNBASE_SCALE: f64 = 0.95;

    let base = ratio(a, b);
    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    if len_ratio < 1.5 {
        let sort = token_sort_ratio(a, b) * UNBASE_SCALE;
        let set = token_set_ratio(a, b) * UNBASE_SCALE;
        return base.max(sort).max(set);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let partial = partial_ratio(a, b) * partial_scale;
    let sort = partial_token_sort_ratio(a, b) * UNBASE_SCALE * partial_scale;
    let set = partial_token_set_ratio(a, b) * UNBASE_SCALE * partial_scale;
    base.max(partial).max(sort).max(set)
}

/// Jaccard index (0..=1) of the character n-gram sets.
pub fn ngram_jaccard(a: &str, b: &str, n: usize) -> f64 {
    let grams_a = char_ngrams(a, n);
    let grams_b = char_ngrams(b, n);
    if grams_a.is_empty() && grams_b.is_empty() {
        return if a == b && !a.is_empty() { 1.0 } else { 0.0 };
    }
    let shared = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    shared as f64 / union as f64
}

/// Jaccard index (0..=1) of the whitespace token sets.
pub fn word_jaccard(a: &str, b: &str) -> f64 {
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let shared = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    shared as f64 / union as f64
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let matches: usize = matching_blocks(a, b).iter().map(|&(_, _, size)| size).sum();
    200.0 * matches as f64 / total as f64
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_with(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let join = |tokens: Vec<&str>| tokens.join(" ");
    let shared = join(set_a.intersection(&set_b).copied().collect());
    let only_a = join(set_a.difference(&set_b).copied().collect());
    let only_b = join(set_b.difference(&set_a).copied().collect());

    let combined_a = format!("{shared} {only_a}").trim().to_string();
    let combined_b = format!("{shared} {only_b}").trim().to_string();

    scorer(&shared, &combined_a)
        .max(scorer(&shared, &combined_b))
        .max(scorer(&combined_a, &combined_b))
}

fn char_ngrams(text: &str, n: usize) -> HashSet<Vec<char>> {
    let chars: Vec<char> = text.chars().collect();
    if n == 0 || chars.len() < n {
        return HashSet::new();
    }
    chars.windows(n).map(<[char]>::to_vec).collect()
}

/// Non-overlapping matching blocks `(a_start, b_start, size)` in order,
/// found by recursively taking the longest common run.
fn matching_blocks(a: &[char], b: &[char]) -> Vec<(usize, usize, usize)> {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b_positions.entry(c).or_default().push(j);
    }
    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let Some((i, j, size)) = longest_match(a, a_lo, a_hi, b_lo, b_hi, &b_positions) else {
            continue;
        };
        blocks.push((i, j, size));
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }
    blocks.sort_unstable();
    blocks
}

fn longest_match(
    a: &[char],
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
    b_positions: &HashMap<char, Vec<usize>>,
) -> Option<(usize, usize, usize)> {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0usize);
    let mut run_len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_run: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(c) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_len = next_run;
    }
    (best_size > 0).then_some((best_i, best_j, best_size))
}
