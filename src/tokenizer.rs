//! Space-separated tokenization over raw text.
//!
//! The only separator is the single ASCII space (0x20). Case is preserved,
//! punctuation is not trimmed, and byte equality defines word equality.

/// Split `text` into non-empty words on single ASCII spaces.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|word| !word.is_empty()).collect()
}

/// A word is valid iff no byte falls in `[0x00, 0x20)`.
pub fn is_valid_word(word: &str) -> bool {
    !word.bytes().any(|b| b < b' ')
}
