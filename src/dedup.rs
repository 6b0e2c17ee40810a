//! Duplicate elimination: documents with equal distinct-word sets.

use std::collections::BTreeSet;
use std::io::{self, Write};

use tracing::info;

use crate::document::DocumentId;
use crate::index::SearchIndex;

/// Remove documents whose distinct-word set repeats an earlier document's.
///
/// Term frequencies are ignored; only the set of indexed words counts. Ids
/// are scanned in ascending order and the first occurrence of each word set
/// is kept. Every removal is announced on `diagnostics` as
/// `Found duplicate document id <id>`, ascending. Returns the removed ids.
pub fn remove_duplicates<W: Write>(
    index: &mut SearchIndex,
    diagnostics: &mut W,
) -> io::Result<Vec<DocumentId>> {
    let duplicates: Vec<DocumentId> = {
        let mut seen: BTreeSet<Vec<&str>> = BTreeSet::new();
        let mut duplicates = Vec::new();
        for id in index.document_ids() {
            let words: Vec<&str> = index
                .word_frequencies(id)
                .keys()
                .map(String::as_str)
                .collect();
            if !seen.insert(words) {
                duplicates.push(id);
            }
        }
        duplicates
    };

    for &id in &duplicates {
        writeln!(diagnostics, "Found duplicate document id {id}")?;
        info!(id, "duplicate document removed");
        index.remove_document(id);
    }
    Ok(duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;

    #[test]
    fn keeps_first_id_and_reports_the_rest_in_order() {
        let mut index = SearchIndex::new(Vec::<String>::new()).unwrap();
        // Same word set, different frequencies and order.
        index
            .add_document(1, "cat city cat", DocumentStatus::Actual, &[1])
            .unwrap();
        index
            .add_document(2, "city cat", DocumentStatus::Actual, &[2])
            .unwrap();
        index
            .add_document(3, "cat city city city", DocumentStatus::Actual, &[3])
            .unwrap();
        index
            .add_document(4, "dog city", DocumentStatus::Actual, &[4])
            .unwrap();

        let mut diagnostics = Vec::new();
        let removed = remove_duplicates(&mut index, &mut diagnostics).unwrap();

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Found duplicate document id 2\nFound duplicate document id 3\n"
        );
        let ids: Vec<_> = index.document_ids().collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn distinct_word_sets_are_untouched() {
        let mut index = SearchIndex::new(Vec::<String>::new()).unwrap();
        index
            .add_document(1, "a b", DocumentStatus::Actual, &[])
            .unwrap();
        index
            .add_document(2, "a c", DocumentStatus::Actual, &[])
            .unwrap();

        let mut diagnostics = Vec::new();
        let removed = remove_duplicates(&mut index, &mut diagnostics).unwrap();

        assert!(removed.is_empty());
        assert!(diagnostics.is_empty());
        assert_eq!(index.document_count(), 2);
    }
}
