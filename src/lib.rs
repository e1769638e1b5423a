// Re-export main components
pub mod api;
pub mod config;
pub mod crawler;
pub mod document;
pub mod error;
pub mod index;
pub mod parser;
pub mod ranking;
pub mod scorer;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlGraphBuilder, HttpFetcher, InMemoryFetcher, PageFetcher};
pub use document::{Article, Corpus, Document, WordId};
pub use error::{CrawlError, SearchError};
pub use index::WordIndex;
pub use parser::{ContentParser, HtmlParser};
pub use ranking::AuthorityRanker;
pub use scorer::{Scorer, SearchMode, SearchResult};
pub use service::{RankingService, SearchModel};
pub use storage::{ArtifactStore, NullArtifactStore, SledArtifactStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
