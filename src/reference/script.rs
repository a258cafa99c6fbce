// Traditional/simplified character conversion.
//
// The rhyme books are in traditional characters while parts of the corpus
// are simplified, so dictionary lookups fall back to the other form of a
// character.

use zhconv::{zhconv, Variant};

use crate::stats::frequency::single_char;

fn convert(c: char, target: Variant) -> Option<char> {
    let mut buf = [0u8; 4];
    let converted = zhconv(c.encode_utf8(&mut buf), target);
    single_char(&converted).filter(|&t| t != c)
}

/// The simplified form of `c`, if it differs from `c`.
pub fn to_simplified(c: char) -> Option<char> {
    convert(c, Variant::ZhHans)
}

/// The traditional form of `c`, if it differs from `c`.
pub fn to_traditional(c: char) -> Option<char> {
    convert(c, Variant::ZhHant)
}
