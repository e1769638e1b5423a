use crate::config::Config;
use crate::crawler::{CrawlGraphBuilder, HttpFetcher, PageFetcher};
use crate::document::{Article, Corpus, Document};
use crate::error::{CrawlError, SearchError};
use crate::index::{IndexStats, WordIndex};
use crate::parser::{ContentParser, HtmlParser};
use crate::ranking::AuthorityRanker;
use crate::scorer::{Scorer, SearchMode, SearchResult};
use crate::storage::{ArtifactStore, NullArtifactStore, SledArtifactStore};
use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Everything a query reads. Immutable once built.
#[derive(Debug)]
pub struct SearchModel {
    pub corpus: Corpus,
    pub index: WordIndex,
}

impl SearchModel {
    /// Index crawled articles, count word frequencies and compute authority scores.
    pub fn build(articles: &[Article]) -> Self {
        let mut index = WordIndex::new();
        let documents = articles
            .iter()
            .map(|article| {
                let words = index.build_document_word_ids(&article.words);
                Document::new(
                    article.name.clone(),
                    article.url.clone(),
                    words,
                    article.links.clone(),
                )
            })
            .collect();
        let mut corpus = Corpus::new(documents);

        WordIndex::compute_frequencies(&mut corpus);
        AuthorityRanker::default().rank(&mut corpus);

        Self { corpus, index }
    }
}

/// Loads the corpus once, then answers queries against it.
pub struct RankingService {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn ContentParser>,
    store: Arc<dyn ArtifactStore>,
    model: OnceLock<SearchModel>,
    load_error: RwLock<Option<String>>,
    load_lock: Mutex<()>,
}

impl RankingService {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn ContentParser>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            parser,
            store,
            model: OnceLock::new(),
            load_error: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// HTTP fetcher, HTML parser, and a sled store when `store_path` is set
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.base_url, config.fetch_timeout())?;
        let parser = HtmlParser::new(config.article_prefix.clone());
        let store: Arc<dyn ArtifactStore> = match &config.store_path {
            Some(path) => Arc::new(SledArtifactStore::open(path)?),
            None => Arc::new(NullArtifactStore),
        };
        Ok(Self::new(config, Arc::new(fetcher), Arc::new(parser), store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Message of the last failed load, cleared once a load succeeds
    pub fn load_error(&self) -> Option<String> {
        self.load_error
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_load_error(&self, message: Option<String>) {
        *self
            .load_error
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = message;
    }

    /// Crawl, persist artifacts, index and rank. Queries fail with `NotLoaded` until this returns,
    /// or with `LoadFailed` if it returned an error.
    pub async fn load(&self) -> Result<()> {
        let _guard = self.load_lock.lock().await;
        if self.is_loaded() {
            return Err(SearchError::AlreadyLoaded.into());
        }

        match self.build_model().await {
            Ok(model) => {
                self.model
                    .set(model)
                    .map_err(|_| SearchError::AlreadyLoaded)?;
                self.set_load_error(None);
                Ok(())
            }
            Err(e) => {
                error!("Load failed: {:#}", e);
                self.set_load_error(Some(format!("{:#}", e)));
                Err(e)
            }
        }
    }

    async fn build_model(&self) -> Result<SearchModel> {
        let start = Instant::now();
        info!(seed = %self.config.seed, max_documents = self.config.max_documents, "Crawling articles");
        let builder = CrawlGraphBuilder::new(self.fetcher.as_ref(), self.parser.as_ref())
            .article_prefix(self.config.article_prefix.clone())
            .title_suffix(self.config.title_suffix.clone())
            .tolerate_fetch_failures(self.config.tolerate_fetch_failures);
        let crawl = builder.crawl(&self.config.seed, self.config.max_documents);
        let articles = match self.config.load_timeout() {
            Some(limit) => tokio::time::timeout(limit, crawl)
                .await
                .map_err(|_| CrawlError::Timeout(limit.as_secs()))?,
            None => crawl.await,
        }
        .context("Crawl failed")?;
        info!(articles = articles.len(), elapsed = ?start.elapsed(), "Crawl finished");

        self.save_artifacts(&articles)?;

        let start = Instant::now();
        let model = SearchModel::build(&articles);
        info!(
            documents = model.corpus.len(),
            vocabulary = model.index.len(),
            elapsed = ?start.elapsed(),
            "Index and authority scores ready"
        );
        Ok(model)
    }

    fn save_artifacts(&self, articles: &[Article]) -> Result<()> {
        info!("Saving crawl artifacts");
        for article in articles {
            self.store
                .save_raw(article)
                .with_context(|| format!("Failed to save page {}", article.name))?;
            self.store.save_words(article)?;
            self.store.save_links(article)?;
        }
        self.store.flush()
    }

    /// Trim and lower-case the raw query, validate it, and rank the corpus.
    pub fn query(&self, raw: &str, mode: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = raw.trim().to_lowercase();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let mode: SearchMode = mode.parse()?;
        self.query_normalized(&query, mode)
    }

    pub fn query_with_mode(&self, raw: &str, mode: SearchMode) -> Result<Vec<SearchResult>, SearchError> {
        let query = raw.trim().to_lowercase();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        self.query_normalized(&query, mode)
    }

    fn query_normalized(&self, query: &str, mode: SearchMode) -> Result<Vec<SearchResult>, SearchError> {
        if mode == SearchMode::Basic && query.split_whitespace().count() > 1 {
            return Err(SearchError::MultiWordInBasicMode);
        }
        let model = match self.model.get() {
            Some(model) => model,
            None => {
                return Err(match self.load_error() {
                    Some(message) => SearchError::LoadFailed(message),
                    None => SearchError::NotLoaded,
                })
            }
        };
        Scorer::new(&model.corpus, &model.index).score_all(query, mode)
    }

    pub fn stats(&self) -> Option<IndexStats> {
        self.model
            .get()
            .map(|model| model.index.stats(&model.corpus))
    }
}
