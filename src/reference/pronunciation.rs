// Mandarin readings with tone marks.

use ::pinyin::ToPinyin;

/// Pinyin of `c` with tone marks (`yuè`), or an empty string for
/// characters without a reading. Heteronyms give their first reading.
pub fn pinyin_of(c: char) -> String {
    c.to_pinyin()
        .map(|p| p.with_tone().to_string())
        .unwrap_or_default()
}
