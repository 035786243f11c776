//! Corruption primitives.
//!
//! Each primitive takes a clean value plus the caller's random state and
//! returns a possibly corrupted variant. They have no other side effects, so
//! a seeded `StdRng` makes every result reproducible.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::MaybeNull;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// The kind of single-character typo applied by [`typo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypoKind {
    /// Swap the character at `pos` with its right neighbour.
    Swap,
    /// Drop the character at `pos`.
    Remove,
    /// Insert a second copy of the character at `pos`.
    Duplicate,
    /// Overwrite the character at `pos` with a random lowercase letter.
    Replace,
}

impl TypoKind {
    pub const ALL: [TypoKind; 4] = [
        TypoKind::Swap,
        TypoKind::Remove,
        TypoKind::Duplicate,
        TypoKind::Replace,
    ];
}

/// A concrete typo: what was done and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypoEdit {
    pub kind: TypoKind,
    /// Character (not byte) index.
    pub pos: usize,
    /// Letter written by [`TypoKind::Replace`].
    pub replacement: Option<char>,
}

impl TypoEdit {
    /// Apply the edit to `text`. Out-of-range positions leave the text unchanged.
    pub fn apply(&self, text: &str) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        match self.kind {
            TypoKind::Swap if self.pos + 1 < chars.len() => chars.swap(self.pos, self.pos + 1),
            TypoKind::Remove if self.pos < chars.len() => {
                chars.remove(self.pos);
            }
            TypoKind::Duplicate if self.pos < chars.len() => {
                let c = chars[self.pos];
                chars.insert(self.pos, c);
            }
            TypoKind::Replace if self.pos < chars.len() => {
                if let Some(c) = self.replacement {
                    chars[self.pos] = c;
                }
            }
            _ => {}
        }
        chars.into_iter().collect()
    }

    /// Whether applying this edit to `text` can leave it unchanged
    /// (swapping two equal neighbours, or replacing a letter with itself).
    pub fn is_identity_on(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        match self.kind {
            TypoKind::Swap => chars.get(self.pos) == chars.get(self.pos + 1),
            TypoKind::Replace => chars.get(self.pos).copied() == self.replacement,
            TypoKind::Remove | TypoKind::Duplicate => false,
        }
    }
}

/// Draw a typo for a string of `len` characters. Requires `len >= 2`.
fn draw_typo<R: Rng + ?Sized>(rng: &mut R, len: usize) -> TypoEdit {
    let kind = TypoKind::ALL[rng.gen_range(0..TypoKind::ALL.len())];
    let pos = match kind {
        // A swap needs a right neighbour.
        TypoKind::Swap => rng.gen_range(0..len - 1),
        _ => rng.gen_range(0..len),
    };
    let replacement = match kind {
        TypoKind::Replace => Some(LOWERCASE[rng.gen_range(0..LOWERCASE.len())] as char),
        _ => None,
    };
    TypoEdit {
        kind,
        pos,
        replacement,
    }
}

/// Like [`typo`], but also reports which edit (if any) was applied.
pub fn typo_with_edit<R: Rng + ?Sized>(
    rng: &mut R,
    text: &str,
    p: f64,
) -> (String, Option<TypoEdit>) {
    if !rng.gen_bool(p) {
        return (text.to_string(), None);
    }
    let len = text.chars().count();
    if len < 2 {
        return (text.to_string(), None);
    }
    let edit = draw_typo(rng, len);
    (edit.apply(text), Some(edit))
}

/// With probability `p`, apply exactly one swap / remove / duplicate / replace
/// at a uniformly random position. Texts shorter than two characters are
/// returned unchanged.
pub fn typo<R: Rng + ?Sized>(rng: &mut R, text: &str, p: f64) -> String {
    typo_with_edit(rng, text, p).0
}

/// With probability `p`, replace `value` with one of the null-like markers,
/// chosen uniformly.
pub fn maybe_null<T, R: Rng + ?Sized>(rng: &mut R, value: T, p: f64) -> MaybeNull<T> {
    if !rng.gen_bool(p) {
        return MaybeNull::Value(value);
    }
    match rng.gen_range(0..3) {
        0 => MaybeNull::Absent,
        1 => MaybeNull::Empty,
        _ => MaybeNull::Blank,
    }
}

/// Case transformation picked by [`maybe_case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStyle {
    Upper,
    Lower,
    /// First character upper-cased, the rest lower-cased.
    Capitalized,
    Unchanged,
}

impl CaseStyle {
    pub const ALL: [CaseStyle; 4] = [
        CaseStyle::Upper,
        CaseStyle::Lower,
        CaseStyle::Capitalized,
        CaseStyle::Unchanged,
    ];

    pub fn apply(&self, text: &str) -> String {
        match self {
            CaseStyle::Upper => text.to_uppercase(),
            CaseStyle::Lower => text.to_lowercase(),
            CaseStyle::Capitalized => capitalize(text),
            CaseStyle::Unchanged => text.to_string(),
        }
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// With probability `p`, apply one of upper / lower / capitalized / identity.
pub fn maybe_case<R: Rng + ?Sized>(rng: &mut R, text: &str, p: f64) -> String {
    if text.is_empty() || !rng.gen_bool(p) {
        return text.to_string();
    }
    let style = CaseStyle::ALL
        .choose(rng)
        .copied()
        .unwrap_or(CaseStyle::Unchanged);
    style.apply(text)
}

/// Remove diacritics (`é` → `e`, `Île` → `Ile`).
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Whether `text` contains any character that [`strip_accents`] would change.
pub fn has_accents(text: &str) -> bool {
    text.nfd().any(is_combining_mark)
}
