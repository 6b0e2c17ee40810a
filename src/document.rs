//! Result documents and their lifecycle status.

use std::fmt;

/// Document identifier. Non-negative for all live documents.
pub type DocumentId = i64;

/// Lifecycle status attached to a document at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    /// Live and searched by default.
    Actual,
    /// Kept in the index but considered outdated.
    Irrelevant,
    /// Excluded by moderation.
    Banned,
    /// Scheduled for removal.
    Removed,
}

/// A ranked search result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Document {
    /// Identifier the document was added under.
    pub id: DocumentId,
    /// Accumulated TF-IDF relevance.
    pub relevance: f64,
    /// Average user rating, truncated toward zero.
    pub rating: i32,
}

impl Document {
    /// Create a result document.
    pub fn new(id: DocumentId, relevance: f64, rating: i32) -> Self {
        Self {
            id,
            relevance,
            rating,
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_braced_field_layout() {
        let doc = Document::new(2, 0.5, 4);
        assert_eq!(
            doc.to_string(),
            "{ document_id = 2, relevance = 0.5, rating = 4 }"
        );
    }
}
