use crate::types::{Anchor, FlatOcr, WordSpan};

/// Step 1: per line, the tightest canonical range covering every anchor whose
/// OCR token the line owns. `None` for lines without anchors.
pub(super) fn collect(flat: &FlatOcr, anchors: &[Anchor]) -> Vec<Option<WordSpan>> {
    let mut bounds: Vec<Option<WordSpan>> = vec![None; flat.line_count()];
    for anchor in anchors {
        let Some(&line) = flat.owner.get(anchor.ocr) else {
            continue;
        };
        let bound = &mut bounds[line];
        *bound = Some(match *bound {
            Some(span) => WordSpan::new(
                span.start.min(anchor.canonical),
                span.end.max(anchor.canonical + 1),
            ),
            None => WordSpan::new(anchor.canonical, anchor.canonical + 1),
        });
    }
    bounds
}

/// Step 2: never start before the previous line ended and never invert.
/// Returns the adjusted span and whether its start had to be pushed.
pub(super) fn enforce_monotone(bound: WordSpan, last_end: usize) -> (WordSpan, bool) {
    let start = bound.start.max(last_end);
    let end = bound.end.max(start);
    (WordSpan::new(start, end), start != bound.start)
}
