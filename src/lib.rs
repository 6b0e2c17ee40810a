//! `topdocs`: in-memory TF-IDF document search.
//!
//! Documents are short texts keyed by a non-negative integer id, indexed at
//! insertion time; callers later issue text queries and receive a ranked,
//! truncated list of matching documents.
//!
//! Scope:
//! - In-memory inverted index with per-document statistics
//! - Deterministic TF-IDF ranking (relevance desc, rating tie-break)
//! - Plus/minus query words with stop-word filtering
//! - Per-call execution policy: sequential or data-parallel (rayon)
//!
//! Non-goals:
//! - Storing anything outside process memory (no persistence)
//! - Phrase queries / positional postings
//! - Stemming or Unicode-aware tokenization (words split on single spaces)
//! - Ranking models beyond TF-IDF
//!
//! References:
//! - Spärck Jones (1972): term specificity / IDF motivation.

pub mod batch;
pub mod concurrent_map;
pub mod dedup;
pub mod document;
pub mod index;
pub mod paginator;
pub mod query;
pub mod request_log;
pub mod tokenizer;

pub use batch::{process_queries, process_queries_joined};
pub use concurrent_map::{ConcurrentMap, DEFAULT_SHARD_COUNT};
pub use dedup::remove_duplicates;
pub use document::{Document, DocumentId, DocumentStatus};
pub use error::Error;
pub use index::{
    Policy, SearchConfig, SearchIndex, MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_TIE_EPSILON,
};
pub use paginator::paginate;
pub use request_log::{RequestLog, REQUEST_WINDOW};

mod error {
    use crate::document::DocumentId;

    /// Errors for index construction, document insertion, and query parsing.
    ///
    /// Removals never fail, and a failing `add_document` leaves the index
    /// exactly as it was.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        /// A stop word contained a control character.
        #[error("stop word contains a control character: {0:?}")]
        InvalidStopWord(String),
        /// The configured accumulator shard count was zero.
        #[error("shard count must be positive")]
        InvalidShardCount,
        /// The document id is already present in the index.
        #[error("duplicate document id: {0}")]
        DuplicateId(DocumentId),
        /// The document id is negative.
        #[error("negative document id: {0}")]
        NegativeId(DocumentId),
        /// The document text contained a control character.
        #[error("document text contains a control character")]
        InvalidDocumentText,
        /// A query word contained a control character.
        #[error("query word contains a control character: {0:?}")]
        InvalidQueryCharacter(String),
        /// A bare `-` with no word after it.
        #[error("empty minus word in query")]
        EmptyMinusWord,
        /// A query word started with `--`.
        #[error("double minus before query word: {0:?}")]
        DoubleMinus(String),
        /// The document id is not in the live set.
        #[error("unknown document id: {0}")]
        UnknownDocumentId(DocumentId),
    }
}
