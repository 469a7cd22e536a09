//! Pinyin transliteration for search keys.
//!
//! Chinese text is romanized to unmarked-tone pinyin so that latin keyboard
//! input can match it ("bj" or "beijing" both find 北京). Transliteration is
//! best-effort and total: characters without a romanization pass through
//! unchanged, and no input ever fails.
//!
//! Each picker owns its own converter instance rather than sharing a
//! process-wide one.

use deunicode::deunicode_char;

/// Transliterates text to phonetic search keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinConverter;

impl PinyinConverter {
    pub fn new() -> Self {
        Self
    }

    /// Full romanization: each transliterable character becomes its
    /// unmarked-tone syllable, concatenated. ASCII passes through as-is.
    pub fn to_full_pinyin(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch);
                continue;
            }
            match deunicode_char(ch) {
                Some(syllable) => {
                    for c in syllable.trim_end().chars() {
                        out.extend(c.to_lowercase());
                    }
                }
                None => out.push(ch),
            }
        }
        out
    }

    /// Initials form: the first letter of each romanized syllable (北京 ->
    /// "bj"). ASCII characters are their own one-letter syllable.
    pub fn to_initials(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.chars().count());
        for ch in text.chars() {
            if ch.is_ascii() {
                out.push(ch);
                continue;
            }
            match deunicode_char(ch).and_then(|s| s.chars().next()) {
                Some(first) => out.extend(first.to_lowercase()),
                None => out.push(ch),
            }
        }
        out
    }
}
