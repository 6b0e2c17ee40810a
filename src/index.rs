//! The search index: document lifecycle, postings, TF-IDF ranking, matching.
//!
//! `SearchIndex` owns all state: the stop-word set fixed at construction,
//! one record per live document, and a posting list per indexed word. It is
//! not internally synchronized between mutators and readers; concurrent
//! readers are fine as long as no mutation is in flight. Within a parallel
//! query only the sharded accumulator is written.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::debug;

use crate::concurrent_map::{ConcurrentMap, DEFAULT_SHARD_COUNT};
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::query::{Dedup, Query};
use crate::tokenizer::{is_valid_word, split_into_words};
use crate::Error;

/// Maximum number of documents returned by a single query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevance delta below which ordering falls back to rating.
///
/// The window also absorbs float jitter between the sequential and parallel
/// accumulation orders.
pub const RELEVANCE_TIE_EPSILON: f64 = 1e-6;

/// Per-index tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Result-list cap for `find_top_documents`.
    pub max_results: usize,
    /// Tie window of the relevance sort.
    pub tie_epsilon: f64,
    /// Shard count of the parallel ranking accumulator.
    pub shard_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULT_DOCUMENT_COUNT,
            tie_epsilon: RELEVANCE_TIE_EPSILON,
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }
}

/// Execution policy selected per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Single-threaded and deterministic.
    #[default]
    Sequential,
    /// Data-parallel over query words (rayon); results stay within float
    /// tolerance of the sequential path.
    Parallel,
}

#[derive(Debug)]
struct DocumentRecord {
    content: String,
    rating: i32,
    status: DocumentStatus,
    // Mirrors this document's entries across the posting lists.
    word_freqs: BTreeMap<String, f64>,
}

/// In-memory TF-IDF search index.
#[derive(Debug, Default)]
pub struct SearchIndex {
    config: SearchConfig,
    stop_words: BTreeSet<String>,
    documents: BTreeMap<DocumentId, DocumentRecord>,
    postings: HashMap<String, BTreeMap<DocumentId, f64>>,
}

impl SearchIndex {
    /// Create an index with the given stop words.
    ///
    /// Empty stop words are discarded silently; a stop word with a control
    /// character fails with [`Error::InvalidStopWord`].
    pub fn new<I, S>(stop_words: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(stop_words, SearchConfig::default())
    }

    /// Create an index from a single space-separated stop-word string.
    pub fn from_stop_words_text(text: &str) -> Result<Self, Error> {
        Self::new(split_into_words(text))
    }

    /// Create an index with explicit configuration.
    ///
    /// A zero `shard_count` fails with [`Error::InvalidShardCount`]; the
    /// parallel accumulator needs at least one shard.
    pub fn with_config<I, S>(stop_words: I, config: SearchConfig) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if config.shard_count == 0 {
            return Err(Error::InvalidShardCount);
        }
        let mut words = BTreeSet::new();
        for word in stop_words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(Error::InvalidStopWord(word.to_string()));
            }
            words.insert(word.to_string());
        }
        Ok(Self {
            config,
            stop_words: words,
            documents: BTreeMap::new(),
            postings: HashMap::new(),
        })
    }

    /// Insert a document.
    ///
    /// The text is split on single spaces, stop words are dropped, and each
    /// remaining occurrence contributes `1 / word_count` to its word's term
    /// frequency, so per-document frequencies sum to one. A document whose
    /// words are all stop words is stored with no indexed words.
    pub fn add_document(
        &mut self,
        id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<(), Error> {
        if self.documents.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }
        if id < 0 {
            return Err(Error::NegativeId(id));
        }
        if !is_valid_word(text) {
            return Err(Error::InvalidDocumentText);
        }

        let words: Vec<&str> = split_into_words(text)
            .into_iter()
            .filter(|word| !self.stop_words.contains(*word))
            .collect();

        let mut word_freqs = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in words {
                *word_freqs.entry(word.to_string()).or_insert(0.0) += inv_word_count;
            }
        }
        for (word, tf) in &word_freqs {
            self.postings.entry(word.clone()).or_default().insert(id, *tf);
        }

        debug!(id, words = word_freqs.len(), "document added");
        self.documents.insert(
            id,
            DocumentRecord {
                content: text.to_string(),
                rating: average_rating(ratings),
                status,
                word_freqs,
            },
        );
        Ok(())
    }

    /// Count of live documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    /// Word-to-term-frequency map of a document; empty for unknown ids.
    pub fn word_frequencies(&self, id: DocumentId) -> &BTreeMap<String, f64> {
        static EMPTY: BTreeMap<String, f64> = BTreeMap::new();
        self.documents
            .get(&id)
            .map(|record| &record.word_freqs)
            .unwrap_or(&EMPTY)
    }

    /// Original text of a document, if it is live.
    pub fn document_text(&self, id: DocumentId) -> Option<&str> {
        self.documents.get(&id).map(|record| record.content.as_str())
    }

    /// Remove a document sequentially. Unknown ids are a no-op.
    pub fn remove_document(&mut self, id: DocumentId) {
        self.remove_document_policy(Policy::Sequential, id);
    }

    /// Remove a document under an execution policy. Unknown ids are a no-op.
    ///
    /// The id is stripped from the posting list of every word the document
    /// carried; posting lists that empty out are dropped.
    pub fn remove_document_policy(&mut self, policy: Policy, id: DocumentId) {
        let Some(record) = self.documents.remove(&id) else {
            return;
        };
        match policy {
            Policy::Sequential => {
                for word in record.word_freqs.keys() {
                    let now_empty = match self.postings.get_mut(word) {
                        Some(posting) => {
                            posting.remove(&id);
                            posting.is_empty()
                        }
                        None => false,
                    };
                    if now_empty {
                        self.postings.remove(word);
                    }
                }
            }
            Policy::Parallel => {
                self.postings.par_iter_mut().for_each(|(word, posting)| {
                    if record.word_freqs.contains_key(word) {
                        posting.remove(&id);
                    }
                });
                self.postings.retain(|_, posting| !posting.is_empty());
            }
        }
        debug!(id, "document removed");
    }

    /// Top documents for `query` among `Actual` documents (sequential).
    pub fn find_top_documents(&self, query: &str) -> Result<Vec<Document>, Error> {
        self.find_top_documents_policy(Policy::Sequential, query)
    }

    /// Top documents for `query` among `Actual` documents.
    pub fn find_top_documents_policy(
        &self,
        policy: Policy,
        query: &str,
    ) -> Result<Vec<Document>, Error> {
        self.find_top_documents_with_status_policy(policy, query, DocumentStatus::Actual)
    }

    /// Top documents for `query` with the given status (sequential).
    pub fn find_top_documents_with_status(
        &self,
        query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, Error> {
        self.find_top_documents_with_status_policy(Policy::Sequential, query, status)
    }

    /// Top documents for `query` with the given status.
    pub fn find_top_documents_with_status_policy(
        &self,
        policy: Policy,
        query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, Error> {
        self.find_top_documents_with_policy(policy, query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Top documents for `query` among documents accepted by `predicate`
    /// (sequential).
    pub fn find_top_documents_with<P>(
        &self,
        query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, Error>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        self.find_top_documents_with_policy(Policy::Sequential, query, predicate)
    }

    /// Top documents for `query` among documents accepted by `predicate`.
    ///
    /// Results are sorted by relevance descending; within
    /// `config.tie_epsilon` the higher rating wins. At most
    /// `config.max_results` documents are returned.
    pub fn find_top_documents_with_policy<P>(
        &self,
        policy: Policy,
        query: &str,
        predicate: P,
    ) -> Result<Vec<Document>, Error>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = Query::parse(query, &self.stop_words, Dedup::Yes)?;
        let mut results = match policy {
            Policy::Sequential => self.find_all_documents(&query, &predicate),
            Policy::Parallel => self.find_all_documents_parallel(&query, &predicate),
        };

        let tie_epsilon = self.config.tie_epsilon;
        results.sort_by(|lhs, rhs| {
            if (lhs.relevance - rhs.relevance).abs() < tie_epsilon {
                rhs.rating.cmp(&lhs.rating)
            } else {
                rhs.relevance.total_cmp(&lhs.relevance)
            }
        });
        results.truncate(self.config.max_results);
        debug!(hits = results.len(), "query ranked");
        Ok(results)
    }

    /// Plus words of `query` that hit document `id`, with its status
    /// (sequential).
    pub fn match_document(
        &self,
        query: &str,
        id: DocumentId,
    ) -> Result<(Vec<String>, DocumentStatus), Error> {
        self.match_document_policy(Policy::Sequential, query, id)
    }

    /// Plus words of `query` that hit document `id`, with its status.
    ///
    /// Any minus-word hit empties the word list. The returned words are
    /// ascending and deduplicated under both policies.
    pub fn match_document_policy(
        &self,
        policy: Policy,
        query: &str,
        id: DocumentId,
    ) -> Result<(Vec<String>, DocumentStatus), Error> {
        let Some(record) = self.documents.get(&id) else {
            return Err(Error::UnknownDocumentId(id));
        };
        let status = record.status;

        match policy {
            Policy::Sequential => {
                let query = Query::parse(query, &self.stop_words, Dedup::Yes)?;
                for word in &query.minus_words {
                    if self.word_hits(word, id) {
                        return Ok((Vec::new(), status));
                    }
                }
                let matched = query
                    .plus_words
                    .iter()
                    .filter(|word| self.word_hits(word.as_str(), id))
                    .cloned()
                    .collect();
                Ok((matched, status))
            }
            Policy::Parallel => {
                let query = Query::parse(query, &self.stop_words, Dedup::No)?;
                if query
                    .minus_words
                    .par_iter()
                    .any(|word| self.word_hits(word, id))
                {
                    return Ok((Vec::new(), status));
                }
                let mut matched: Vec<String> = query
                    .plus_words
                    .par_iter()
                    .filter(|word| self.word_hits(word.as_str(), id))
                    .cloned()
                    .collect();
                matched.sort_unstable();
                matched.dedup();
                Ok((matched, status))
            }
        }
    }

    fn word_hits(&self, word: &str, id: DocumentId) -> bool {
        self.postings
            .get(word)
            .is_some_and(|posting| posting.contains_key(&id))
    }

    /// Natural-log IDF of a word given its posting list.
    fn inverse_document_freq(&self, posting: &BTreeMap<DocumentId, f64>) -> f64 {
        (self.document_count() as f64 / posting.len() as f64).ln()
    }

    fn find_all_documents<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool,
    {
        let mut relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();

        for word in &query.plus_words {
            let Some(posting) = self.postings.get(word) else {
                continue;
            };
            let idf = self.inverse_document_freq(posting);
            for (&id, &tf) in posting {
                let record = &self.documents[&id];
                if predicate(id, record.status, record.rating) {
                    *relevance.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }

        for word in &query.minus_words {
            let Some(posting) = self.postings.get(word) else {
                continue;
            };
            for &id in posting.keys() {
                relevance.remove(&id);
            }
        }

        relevance
            .into_iter()
            .map(|(id, relevance)| Document::new(id, relevance, self.documents[&id].rating))
            .collect()
    }

    fn find_all_documents_parallel<P>(&self, query: &Query, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let relevance: ConcurrentMap<f64> = ConcurrentMap::with_shards(self.config.shard_count);

        query.plus_words.par_iter().for_each(|word| {
            let Some(posting) = self.postings.get(word) else {
                return;
            };
            let idf = self.inverse_document_freq(posting);
            for (&id, &tf) in posting {
                let record = &self.documents[&id];
                if predicate(id, record.status, record.rating) {
                    *relevance.access(id) += tf * idf;
                }
            }
        });

        // The accumulation join above happens-before the exclusion pass.
        query.minus_words.par_iter().for_each(|word| {
            if let Some(posting) = self.postings.get(word) {
                for &id in posting.keys() {
                    relevance.erase(id);
                }
            }
        });

        relevance
            .build_flat()
            .into_iter()
            .map(|(id, relevance)| Document::new(id, relevance, self.documents[&id].rating))
            .collect()
    }
}

fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&rating| i64::from(rating)).sum();
    (sum / ratings.len() as i64) as i32
}
