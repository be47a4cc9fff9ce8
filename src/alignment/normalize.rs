//! Arabic skeleton normalization.
//!
//! Two tokens are identical for alignment purposes when their skeletons are
//! equal. The raw token is never modified; skeletons are only compared.

use crate::pipeline::traits::Normalizer;

const TATWEEL: char = '\u{0640}';
const ALEF: char = '\u{0627}';
const WAW: char = '\u{0648}';
const YEH: char = '\u{064A}';
const KAF: char = '\u{0643}';
const HEH: char = '\u{0647}';

/// Skeleton of one whitespace-free token. May be empty when the token holds
/// no Arabic letters (punctuation, digits, Latin noise).
pub fn normalize_token(raw: &str) -> String {
    raw.chars().filter_map(fold_char).collect()
}

/// Skeleton of free text under `normalizer`: every whitespace token
/// normalized, empty skeletons dropped, joined by single spaces.
pub fn normalize_text(text: &str, normalizer: &dyn Normalizer) -> String {
    text.split_whitespace()
        .map(|token| normalizer.normalize(token))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_char(c: char) -> Option<char> {
    if is_mark(c) {
        return None;
    }
    let folded = match c {
        // hamza-bearing alef forms, alef wasla and the lone hamza
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' | '\u{0672}' | '\u{0673}'
        | '\u{0621}' => ALEF,
        '\u{0624}' => WAW,
        // yeh with hamza, alef maqsura, Persian/Urdu yeh forms
        '\u{0626}' | '\u{0649}' | '\u{06CC}' | '\u{06D0}' | '\u{06D2}' => YEH,
        // keheh and swash kaf
        '\u{06A9}' | '\u{06AA}' => KAF,
        '\u{06C1}' | '\u{06D5}' => HEH,
        other => other,
    };
    is_arabic_letter(folded).then_some(folded)
}

fn is_mark(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06ED}'
        | '\u{08D3}'..='\u{08FF}'
        | '\u{200B}'..='\u{200F}'
        | '\u{2060}'
        | '\u{FEFF}'
    ) || c == TATWEEL
}

fn is_arabic_letter(c: char) -> bool {
    matches!(c,
        '\u{0621}'..='\u{063A}'
        | '\u{0641}'..='\u{064A}'
        | '\u{066E}'..='\u{066F}'
        | '\u{0674}'..='\u{06D3}'
    )
}
