use crate::types::WordSpan;

/// Step 4: make adjacent spans touch. A gap or an overlap between line `i`
/// and line `i + 1` is resolved at the midpoint (rounded down), clamped so
/// neither span inverts.
pub(super) fn close_gaps(spans: &mut [WordSpan]) {
    for i in 0..spans.len().saturating_sub(1) {
        let end = spans[i].end;
        let next_start = spans[i + 1].start;
        if end == next_start {
            continue;
        }
        let mid = (end + next_start) / 2;
        spans[i].end = mid.max(spans[i].start);
        spans[i + 1].start = mid.min(spans[i + 1].end);
    }
}
