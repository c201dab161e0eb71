//! Character folding used when matching keystrokes against stored words.
//!
//! Letters below U+0500 (Latin, Greek, Cyrillic) fold to the first scalar of
//! their canonical decomposition, so `é`, `È` and `ë` all match an `e` key.

use unicode_normalization::char::decompose_canonical;

/// Code points at or above this value are never reduced to a base letter.
pub const BASE_CHAR_LIMIT: u32 = 0x500;

pub const APOSTROPHE: char = '\'';

/// Strip diacritics from a letter in the folding range.
pub fn base_char(c: char) -> char {
    if c.is_ascii() || c as u32 >= BASE_CHAR_LIMIT {
        return c;
    }
    let mut base = None;
    decompose_canonical(c, |d| {
        if base.is_none() {
            base = Some(d);
        }
    });
    base.unwrap_or(c)
}

/// Single-scalar lowercase; characters whose lowercase form expands to
/// several scalars are returned unchanged.
pub fn lower_char(c: char) -> char {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Single-scalar uppercase, see [`lower_char`].
pub fn upper_char(c: char) -> char {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Base-letter fold followed by lowercasing. This is the comparison key of
/// the fuzzy search and of the commonality check.
pub fn fold_char(c: char) -> char {
    let base = base_char(c);
    if base.is_ascii_uppercase() {
        base.to_ascii_lowercase()
    } else if !base.is_ascii() {
        lower_char(base)
    } else {
        base
    }
}
