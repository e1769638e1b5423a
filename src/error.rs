use thiserror::Error;

/// Errors raised while validating or answering a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Blank or whitespace-only query
    #[error("Query is missing.")]
    EmptyQuery,
    /// Mode string is not one of basic, medium, advanced
    #[error("Search mode {0} is missing or not supported.")]
    UnsupportedMode(String),
    /// Basic mode only accepts a single word
    #[error("Query must contain only one word.")]
    MultiWordInBasicMode,
    /// An index lookup referenced a document that does not exist
    #[error("Corpus invariant violated: {0}")]
    CorpusInvariantViolation(String),
    #[error("Search index is still loading")]
    NotLoaded,
    #[error("Search index has already been loaded")]
    AlreadyLoaded,
    /// The load attempt ended in an error; queries cannot be answered
    #[error("Search index failed to load: {0}")]
    LoadFailed(String),
}

impl SearchError {
    /// Validation failures that are reported back to the caller verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyQuery
                | SearchError::UnsupportedMode(_)
                | SearchError::MultiWordInBasicMode
        )
    }
}

/// Errors raised while crawling.
#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("Failed to fetch {target}: {reason}")]
    FetchFailure { target: String, reason: String },
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Crawl did not finish within {0}s")]
    Timeout(u64),
}
