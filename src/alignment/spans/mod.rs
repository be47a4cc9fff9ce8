use crate::types::{Anchor, FlatOcr, WordSpan};

mod closure;
mod interpolation;
mod raw_bounds;
#[cfg(test)]
mod tests;

/// One canonical span per OCR line plus bookkeeping for the debug log.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanResolution {
    pub spans: Vec<WordSpan>,
    /// Lines that owned at least one anchor.
    pub anchored_lines: usize,
    /// Anchored lines whose start was pushed forward to keep starts monotone.
    pub pushed_lines: usize,
}

/// Turn anchors into one half-open canonical span per line of `flat`.
///
/// Anchored lines take the range of their anchors (pushed forward when an
/// earlier line already ends past it); runs of anchor-less lines share the
/// gap to the next anchored line by word count; finally adjacent spans are
/// made to touch. Every span is clamped to `[0, canonical_len]`.
pub fn resolve_line_spans(
    flat: &FlatOcr,
    anchors: &[Anchor],
    canonical_len: usize,
) -> SpanResolution {
    let bounds = raw_bounds::collect(flat, anchors);
    let word_counts: Vec<usize> = (0..flat.line_count()).map(|i| flat.word_count(i)).collect();
    resolve_from_bounds(&bounds, &word_counts, canonical_len)
}

pub(crate) fn resolve_from_bounds(
    bounds: &[Option<WordSpan>],
    word_counts: &[usize],
    canonical_len: usize,
) -> SpanResolution {
    let n = bounds.len();
    let mut spans = vec![WordSpan::default(); n];
    let mut last_end = 0usize;
    let mut pushed_lines = 0usize;

    let mut i = 0;
    while i < n {
        if let Some(bound) = bounds[i] {
            let (span, pushed) = raw_bounds::enforce_monotone(bound, last_end);
            if pushed {
                pushed_lines += 1;
                tracing::debug!(
                    line_no = i + 1,
                    anchored_start = bound.start,
                    pushed_by = span.start - bound.start,
                    "spans: anchored start pushed past previous line end"
                );
            }
            spans[i] = span;
            last_end = span.end;
            i += 1;
            continue;
        }

        let run_end = (i..n).find(|&j| bounds[j].is_some()).unwrap_or(n);
        let next_start = bounds
            .get(run_end)
            .copied()
            .flatten()
            .map(|bound| bound.start)
            .unwrap_or(canonical_len)
            .max(last_end);
        interpolation::fill_run(
            &mut spans[i..run_end],
            &word_counts[i..run_end],
            last_end,
            next_start,
        );
        last_end = spans[run_end - 1].end;
        i = run_end;
    }

    closure::close_gaps(&mut spans);

    for span in &mut spans {
        span.end = span.end.min(canonical_len);
        span.start = span.start.min(span.end);
    }

    SpanResolution {
        spans,
        anchored_lines: bounds.iter().filter(|bound| bound.is_some()).count(),
        pushed_lines,
    }
}
