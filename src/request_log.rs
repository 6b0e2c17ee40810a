//! Sliding-window history of recent query outcomes.

use std::collections::VecDeque;

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::index::SearchIndex;
use crate::Error;

/// Number of most recent requests retained: one per minute over a day.
pub const REQUEST_WINDOW: usize = 1440;

/// Fixed-capacity log of query outcomes over a [`SearchIndex`].
///
/// Each successful find records whether the result list was empty; once the
/// window is full the oldest outcome falls off. Failed parses are not
/// recorded.
#[derive(Debug)]
pub struct RequestLog<'a> {
    index: &'a SearchIndex,
    // true marks an empty outcome.
    outcomes: VecDeque<bool>,
    empty_requests: usize,
}

impl<'a> RequestLog<'a> {
    /// Create a log over `index`.
    pub fn new(index: &'a SearchIndex) -> Self {
        Self {
            index,
            outcomes: VecDeque::with_capacity(REQUEST_WINDOW),
            empty_requests: 0,
        }
    }

    /// Run the default query form and record the outcome.
    pub fn find(&mut self, query: &str) -> Result<Vec<Document>, Error> {
        let results = self.index.find_top_documents(query)?;
        self.record(results.is_empty());
        Ok(results)
    }

    /// Run a status-filtered query and record the outcome.
    pub fn find_with_status(
        &mut self,
        query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>, Error> {
        let results = self.index.find_top_documents_with_status(query, status)?;
        self.record(results.is_empty());
        Ok(results)
    }

    /// Run a predicate-filtered query and record the outcome.
    pub fn find_with<P>(&mut self, query: &str, predicate: P) -> Result<Vec<Document>, Error>
    where
        P: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
    {
        let results = self.index.find_top_documents_with(query, predicate)?;
        self.record(results.is_empty());
        Ok(results)
    }

    /// Number of windowed requests that returned no documents.
    pub fn empty_request_count(&self) -> usize {
        self.empty_requests
    }

    fn record(&mut self, is_empty: bool) {
        if self.outcomes.len() == REQUEST_WINDOW && self.outcomes.pop_front() == Some(true) {
            self.empty_requests -= 1;
        }
        self.outcomes.push_back(is_empty);
        if is_empty {
            self.empty_requests += 1;
        }
    }
}
