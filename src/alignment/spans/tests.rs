use super::closure::close_gaps;
use super::interpolation::fill_run;
use super::raw_bounds::{collect, enforce_monotone};
use super::{resolve_from_bounds, resolve_line_spans};
use crate::types::{Anchor, FlatOcr, WordSpan};

fn flat_with_counts(counts: &[usize]) -> FlatOcr {
    let mut tokens = Vec::new();
    let mut owner = Vec::new();
    let mut line_ranges = Vec::new();
    for (line, &count) in counts.iter().enumerate() {
        let start = tokens.len();
        for _ in 0..count {
            tokens.push("ك".to_string());
            owner.push(line);
        }
        line_ranges.push((start, tokens.len()));
    }
    FlatOcr {
        tokens,
        owner,
        line_texts: vec![String::new(); counts.len()],
        line_ranges,
    }
}

fn span(start: usize, end: usize) -> WordSpan {
    WordSpan::new(start, end)
}

fn anchors(pairs: &[(usize, usize)]) -> Vec<Anchor> {
    pairs
        .iter()
        .map(|&(ocr, canonical)| Anchor { ocr, canonical })
        .collect()
}

#[test]
fn raw_bounds_cover_min_and_max_anchor() {
    let flat = flat_with_counts(&[3, 2]);
    let bounds = collect(&flat, &anchors(&[(0, 0), (2, 4), (3, 6)]));
    assert_eq!(bounds, vec![Some(span(0, 5)), Some(span(6, 7))]);
}

#[test]
fn monotone_push_moves_start_and_keeps_span_valid() {
    assert_eq!(enforce_monotone(span(4, 6), 2), (span(4, 6), false));
    assert_eq!(enforce_monotone(span(1, 3), 5), (span(5, 5), true));
    assert_eq!(enforce_monotone(span(1, 8), 5), (span(5, 8), true));
}

#[test]
fn fill_run_shares_gap_by_word_count() {
    let mut spans = vec![WordSpan::default(); 2];
    fill_run(&mut spans, &[1, 3], 10, 18);
    assert_eq!(spans, vec![span(10, 12), span(12, 18)]);
}

#[test]
fn fill_run_gives_zero_word_lines_empty_spans() {
    let mut spans = vec![WordSpan::default(); 3];
    fill_run(&mut spans, &[2, 0, 2], 0, 4);
    assert_eq!(spans, vec![span(0, 2), span(2, 2), span(2, 4)]);

    let mut spans = vec![WordSpan::default(); 2];
    fill_run(&mut spans, &[2, 0], 0, 5);
    assert_eq!(spans, vec![span(0, 5), span(5, 5)]);
}

#[test]
fn fill_run_rounds_half_shares_to_even() {
    let mut spans = vec![WordSpan::default(); 2];
    fill_run(&mut spans, &[1, 1], 0, 5);
    assert_eq!(spans, vec![span(0, 2), span(2, 5)]);

    let mut spans = vec![WordSpan::default(); 2];
    fill_run(&mut spans, &[1, 1], 0, 7);
    assert_eq!(spans, vec![span(0, 4), span(4, 7)]);
}

#[test]
fn fill_run_all_empty_consumes_nothing() {
    let mut spans = vec![WordSpan::default(); 3];
    fill_run(&mut spans, &[0, 0, 0], 7, 12);
    assert!(spans.iter().all(|s| *s == span(7, 7)));
}

#[test]
fn fill_run_last_weighted_line_absorbs_residue() {
    let mut spans = vec![WordSpan::default(); 3];
    // 10 * 1/3 rounds to 3 for the first two lines; the last takes 4.
    fill_run(&mut spans, &[1, 1, 1], 0, 10);
    assert_eq!(spans, vec![span(0, 3), span(3, 6), span(6, 10)]);
}

#[test]
fn close_gaps_meets_at_midpoint() {
    let mut spans = vec![span(0, 2), span(6, 8), span(8, 9)];
    close_gaps(&mut spans);
    assert_eq!(spans, vec![span(0, 4), span(4, 8), span(8, 9)]);
}

#[test]
fn close_gaps_rounds_midpoint_down() {
    let mut spans = vec![span(0, 2), span(2, 2), span(3, 5)];
    close_gaps(&mut spans);
    assert_eq!(spans, vec![span(0, 2), span(2, 2), span(2, 5)]);
}

#[test]
fn close_gaps_resolves_overlap() {
    let mut spans = vec![span(0, 6), span(4, 9)];
    close_gaps(&mut spans);
    assert_eq!(spans, vec![span(0, 5), span(5, 9)]);
}

#[test]
fn exact_lines_map_to_their_tokens() {
    let flat = flat_with_counts(&[2, 2, 1]);
    let resolved = resolve_line_spans(&flat, &anchors(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]), 5);
    assert_eq!(resolved.spans, vec![span(0, 2), span(2, 4), span(4, 5)]);
    assert_eq!(resolved.anchored_lines, 3);
    assert_eq!(resolved.pushed_lines, 0);
}

#[test]
fn empty_interior_line_gets_empty_span() {
    let bounds = [Some(span(0, 2)), None, Some(span(3, 5))];
    let resolved = resolve_from_bounds(&bounds, &[2, 0, 2], 5);
    assert_eq!(resolved.spans, vec![span(0, 2), span(2, 2), span(2, 5)]);
}

#[test]
fn leading_run_starts_at_zero() {
    let bounds = [None, None, Some(span(6, 8))];
    let resolved = resolve_from_bounds(&bounds, &[1, 2, 2], 8);
    assert_eq!(resolved.spans, vec![span(0, 2), span(2, 6), span(6, 8)]);
}

#[test]
fn trailing_run_takes_rest_of_canonical() {
    let bounds = [Some(span(0, 3)), None, None];
    let resolved = resolve_from_bounds(&bounds, &[3, 1, 1], 9);
    assert_eq!(resolved.spans, vec![span(0, 3), span(3, 6), span(6, 9)]);
}

#[test]
fn all_lines_empty_yield_empty_spans_at_zero() {
    let bounds = [None, None, None];
    let resolved = resolve_from_bounds(&bounds, &[0, 0, 0], 12);
    assert!(resolved.spans.iter().all(|s| *s == span(0, 0)));
}

#[test]
fn single_token_canonical_clamps_other_lines() {
    let bounds = [Some(span(0, 1)), None];
    let resolved = resolve_from_bounds(&bounds, &[1, 1], 1);
    assert_eq!(resolved.spans, vec![span(0, 1), span(1, 1)]);
}

#[test]
fn reordered_anchor_is_pushed_and_counted() {
    let bounds = [Some(span(4, 8)), Some(span(2, 5)), Some(span(8, 10))];
    let resolved = resolve_from_bounds(&bounds, &[2, 2, 2], 10);
    assert_eq!(resolved.pushed_lines, 1);
    assert_eq!(resolved.spans, vec![span(4, 8), span(8, 8), span(8, 10)]);
}

#[test]
fn resolved_spans_are_monotone_and_touching() {
    let bounds = [
        None,
        Some(span(3, 6)),
        None,
        None,
        Some(span(12, 15)),
        Some(span(11, 13)),
        None,
    ];
    let resolved = resolve_from_bounds(&bounds, &[2, 3, 0, 4, 3, 2, 1], 20);
    for s in &resolved.spans {
        assert!(s.start <= s.end && s.end <= 20);
    }
    for pair in resolved.spans.windows(2) {
        assert!(pair[0].start <= pair[1].start);
        assert_eq!(pair[0].end, pair[1].start);
    }
}
