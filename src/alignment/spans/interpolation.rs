use crate::types::WordSpan;

/// Step 3: place a maximal run of anchor-less lines inside
/// `[prev_end, next_start)`.
///
/// The gap is shared in proportion to OCR word counts, each share rounded
/// to the nearest token with halves going to the even count. The last line carrying words absorbs the rounding
/// residue; lines without words get an empty span at the cursor. A run in
/// which no line has words consumes nothing.
pub(super) fn fill_run(
    spans: &mut [WordSpan],
    word_counts: &[usize],
    prev_end: usize,
    next_start: usize,
) {
    debug_assert_eq!(spans.len(), word_counts.len());
    let next_start = next_start.max(prev_end);
    let gap = next_start - prev_end;
    let total: usize = word_counts.iter().sum();

    let Some(last_weighted) = word_counts.iter().rposition(|&count| count > 0) else {
        spans.fill(WordSpan::new(prev_end, prev_end));
        return;
    };

    let mut cursor = prev_end;
    for (k, (span, &count)) in spans.iter_mut().zip(word_counts).enumerate() {
        let share = if count == 0 {
            0
        } else {
            (gap as f64 * count as f64 / total as f64).round_ties_even() as usize
        };
        let end = if k == last_weighted {
            next_start
        } else {
            (cursor + share).min(next_start)
        };
        *span = WordSpan::new(cursor, end);
        cursor = end;
    }
}
