//! Batched query execution: independent queries fanned out with rayon.

use rayon::prelude::*;

use crate::document::Document;
use crate::index::SearchIndex;
use crate::Error;

/// Run every query through `find_top_documents`, preserving input order.
///
/// Queries are independent, so they rank in parallel; the first query that
/// fails to parse fails the whole batch.
pub fn process_queries(
    index: &SearchIndex,
    queries: &[String],
) -> Result<Vec<Vec<Document>>, Error> {
    queries
        .par_iter()
        .map(|query| index.find_top_documents(query))
        .collect()
}

/// As [`process_queries`], flattened into a single result list.
pub fn process_queries_joined(
    index: &SearchIndex,
    queries: &[String],
) -> Result<Vec<Document>, Error> {
    Ok(process_queries(index, queries)?
        .into_iter()
        .flatten()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;

    fn sample_index() -> SearchIndex {
        let mut index = SearchIndex::new(Vec::<String>::new()).unwrap();
        for (id, text) in [(0, "cat city"), (1, "dog park"), (2, "cat dog")] {
            index
                .add_document(id, text, DocumentStatus::Actual, &[1])
                .unwrap();
        }
        index
    }

    #[test]
    fn results_line_up_with_input_queries() {
        let index = sample_index();
        let queries = vec!["city".to_string(), "park".to_string(), "owl".to_string()];

        let results = process_queries(&index, &queries).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].id, 0);
        assert_eq!(results[1][0].id, 1);
        assert!(results[2].is_empty());
    }

    #[test]
    fn joined_flattens_in_query_order() {
        let index = sample_index();
        let queries = vec!["city".to_string(), "park".to_string()];

        let joined = process_queries_joined(&index, &queries).unwrap();

        let ids: Vec<_> = joined.iter().map(|doc| doc.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn invalid_query_fails_the_batch() {
        let index = sample_index();
        let queries = vec!["cat".to_string(), "--dog".to_string()];

        assert!(matches!(
            process_queries(&index, &queries),
            Err(Error::DoubleMinus(_))
        ));
    }
}
