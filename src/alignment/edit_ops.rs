use std::iter;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    Equal,
    Replace,
    Insert,
    Delete,
}

impl OpTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Replace => "replace",
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }
}

/// One edit block over half-open ranges: `a[a_start..a_end]` (source) turns
/// into `b[b_start..b_end]` (target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Opcode {
    pub tag: OpTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Opcode {
    /// `(a, b)` index pairs of an `equal` block; empty for every other tag.
    pub fn equal_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let len = if self.tag == OpTag::Equal {
            self.a_end - self.a_start
        } else {
            0
        };
        (0..len).map(move |off| (self.a_start + off, self.b_start + off))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Sub,
    Del,
    Ins,
}

/// Unit-cost Levenshtein alignment of two code sequences, returned as
/// grouped opcodes covering both sequences completely.
///
/// Common prefix and suffix are matched first; the remainder goes through
/// Hirschberg's divide and conquer, so peak DP memory is one row over `b`.
/// Ties always resolve to the leftmost split, which makes the result a pure
/// function of the inputs.
pub fn levenshtein_opcodes(a: &[u32], b: &[u32]) -> Vec<Opcode> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut steps = Vec::with_capacity(a.len().max(b.len()));
    steps.extend(iter::repeat(Step::Keep).take(prefix));
    hirschberg(
        &a[prefix..a.len() - suffix],
        &b[prefix..b.len() - suffix],
        &mut steps,
    );
    steps.extend(iter::repeat(Step::Keep).take(suffix));

    steps_to_opcodes(&steps)
}

/// Edit distance implied by a set of opcodes.
pub fn distance(opcodes: &[Opcode]) -> usize {
    opcodes
        .iter()
        .map(|op| match op.tag {
            OpTag::Equal => 0,
            OpTag::Replace | OpTag::Delete => op.a_end - op.a_start,
            OpTag::Insert => op.b_end - op.b_start,
        })
        .sum()
}

fn hirschberg(a: &[u32], b: &[u32], out: &mut Vec<Step>) {
    if a.is_empty() {
        out.extend(iter::repeat(Step::Ins).take(b.len()));
        return;
    }
    if b.is_empty() {
        out.extend(iter::repeat(Step::Del).take(a.len()));
        return;
    }
    if a.len() == 1 {
        match b.iter().position(|&c| c == a[0]) {
            Some(j) => {
                out.extend(iter::repeat(Step::Ins).take(j));
                out.push(Step::Keep);
                out.extend(iter::repeat(Step::Ins).take(b.len() - j - 1));
            }
            None => {
                out.push(Step::Sub);
                out.extend(iter::repeat(Step::Ins).take(b.len() - 1));
            }
        }
        return;
    }
    if b.len() == 1 {
        match a.iter().position(|&c| c == b[0]) {
            Some(i) => {
                out.extend(iter::repeat(Step::Del).take(i));
                out.push(Step::Keep);
                out.extend(iter::repeat(Step::Del).take(a.len() - i - 1));
            }
            None => {
                out.push(Step::Sub);
                out.extend(iter::repeat(Step::Del).take(a.len() - 1));
            }
        }
        return;
    }

    let mid = a.len() / 2;
    let (a_left, a_right) = a.split_at(mid);
    let forward = last_cost_row(a_left, b, false);
    let backward = last_cost_row(a_right, b, true);
    let n = b.len();
    let split = (0..=n)
        .min_by_key(|&j| (forward[j] + backward[n - j], j))
        .unwrap_or(0);

    hirschberg(a_left, &b[..split], out);
    hirschberg(a_right, &b[split..], out);
}

/// Last row of the Levenshtein DP of `a` against every prefix of `b`
/// (or, reversed, every suffix).
fn last_cost_row(a: &[u32], b: &[u32], reversed: bool) -> Vec<usize> {
    let at = |s: &[u32], i: usize| -> u32 {
        if reversed {
            s[s.len() - 1 - i]
        } else {
            s[i]
        }
    };
    let n = b.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];
    for i in 0..a.len() {
        curr[0] = i + 1;
        let ai = at(a, i);
        for j in 0..n {
            let sub = prev[j] + usize::from(ai != at(b, j));
            let del = prev[j + 1] + 1;
            let ins = curr[j] + 1;
            curr[j + 1] = sub.min(del).min(ins);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev
}

fn steps_to_opcodes(steps: &[Step]) -> Vec<Opcode> {
    let mut opcodes: Vec<Opcode> = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    for &step in steps {
        let (tag, di, dj) = match step {
            Step::Keep => (OpTag::Equal, 1, 1),
            Step::Sub => (OpTag::Replace, 1, 1),
            Step::Del => (OpTag::Delete, 1, 0),
            Step::Ins => (OpTag::Insert, 0, 1),
        };
        match opcodes.last_mut() {
            Some(last) if last.tag == tag => {
                last.a_end += di;
                last.b_end += dj;
            }
            _ => opcodes.push(Opcode {
                tag,
                a_start: i,
                a_end: i + di,
                b_start: j,
                b_end: j + dj,
            }),
        }
        i += di;
        j += dj;
    }
    opcodes
}
