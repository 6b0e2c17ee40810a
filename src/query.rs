//! Query parsing: plus/minus word classification and validation.
//!
//! A query is a space-separated list of words. A `-` prefix marks a word the
//! results must not contain. Stop words are dropped after prefix handling,
//! so `-the` with `the` as a stop word is simply discarded.

use std::collections::BTreeSet;

use crate::tokenizer::{is_valid_word, split_into_words};
use crate::Error;

/// Whether duplicate query words are collapsed at parse time.
///
/// Ranking parses with [`Dedup::Yes`] under both execution policies (a
/// repeated plus word must not double-count relevance). The parallel match
/// path parses raw and deduplicates its output instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    /// Sort and deduplicate both word lists.
    Yes,
    /// Keep words in token order, duplicates included.
    No,
}

/// A parsed query: plus words must match, minus words must not.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    /// Words a matching document must contain at least one of.
    pub plus_words: Vec<String>,
    /// Words that exclude a document outright.
    pub minus_words: Vec<String>,
}

struct QueryWord<'a> {
    data: &'a str,
    is_minus: bool,
}

fn parse_query_word(token: &str) -> Result<QueryWord<'_>, Error> {
    if !is_valid_word(token) {
        return Err(Error::InvalidQueryCharacter(token.to_string()));
    }
    if token == "-" {
        return Err(Error::EmptyMinusWord);
    }
    if let Some(rest) = token.strip_prefix('-') {
        if rest.starts_with('-') {
            return Err(Error::DoubleMinus(token.to_string()));
        }
        return Ok(QueryWord {
            data: rest,
            is_minus: true,
        });
    }
    Ok(QueryWord {
        data: token,
        is_minus: false,
    })
}

impl Query {
    /// Parse `text`, discarding stop words.
    pub fn parse(text: &str, stop_words: &BTreeSet<String>, dedup: Dedup) -> Result<Self, Error> {
        let mut query = Query::default();

        for token in split_into_words(text) {
            let word = parse_query_word(token)?;
            if stop_words.contains(word.data) {
                continue;
            }
            if word.is_minus {
                query.minus_words.push(word.data.to_string());
            } else {
                query.plus_words.push(word.data.to_string());
            }
        }

        if dedup == Dedup::Yes {
            query.plus_words.sort_unstable();
            query.plus_words.dedup();
            query.minus_words.sort_unstable();
            query.minus_words.dedup();
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_words(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn classifies_plus_and_minus_words() {
        let query = Query::parse("cat -city dog", &stop_words(&[]), Dedup::Yes).unwrap();
        assert_eq!(query.plus_words, vec!["cat", "dog"]);
        assert_eq!(query.minus_words, vec!["city"]);
    }

    #[test]
    fn drops_stop_words_after_minus_stripping() {
        let query = Query::parse("cat -the the", &stop_words(&["the"]), Dedup::Yes).unwrap();
        assert_eq!(query.plus_words, vec!["cat"]);
        assert!(query.minus_words.is_empty());
    }

    #[test]
    fn dedup_sorts_and_collapses_duplicates() {
        let query = Query::parse("b a b -x -x", &stop_words(&[]), Dedup::Yes).unwrap();
        assert_eq!(query.plus_words, vec!["a", "b"]);
        assert_eq!(query.minus_words, vec!["x"]);
    }

    #[test]
    fn raw_parse_keeps_token_order_and_duplicates() {
        let query = Query::parse("b a b", &stop_words(&[]), Dedup::No).unwrap();
        assert_eq!(query.plus_words, vec!["b", "a", "b"]);
    }

    #[test]
    fn bare_minus_is_rejected() {
        assert_eq!(
            Query::parse("cat -", &stop_words(&[]), Dedup::Yes),
            Err(Error::EmptyMinusWord)
        );
    }

    #[test]
    fn double_minus_is_rejected() {
        assert_eq!(
            Query::parse("--cat", &stop_words(&[]), Dedup::Yes),
            Err(Error::DoubleMinus("--cat".to_string()))
        );
    }

    #[test]
    fn control_characters_are_rejected() {
        assert_eq!(
            Query::parse("ca\x12t", &stop_words(&[]), Dedup::Yes),
            Err(Error::InvalidQueryCharacter("ca\x12t".to_string()))
        );
    }

    #[test]
    fn validation_precedes_minus_handling() {
        // An invalid byte inside a minus word reports the character error,
        // not a minus-syntax error.
        assert_eq!(
            Query::parse("-ca\x01t", &stop_words(&[]), Dedup::Yes),
            Err(Error::InvalidQueryCharacter("-ca\x01t".to_string()))
        );
    }
}
