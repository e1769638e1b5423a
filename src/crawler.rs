use crate::document::{canonical_name, Article};
use crate::error::CrawlError;
use crate::parser::{extract_title, ContentParser};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Raw page as returned by a [`PageFetcher`]
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub title: String,
    pub content: String,
}

/// Source of raw pages, addressed by site-relative target
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, target: &str) -> Result<FetchedPage, CrawlError>;
}

/// Fetches pages over HTTP relative to a base url.
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let base =
            Url::parse(base_url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("wikirank/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::FetchFailure {
                target: base_url.to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<FetchedPage, CrawlError> {
        let url = self
            .base
            .join(target)
            .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", target, e)))?;
        let failure = |reason: String| CrawlError::FetchFailure {
            target: target.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failure(format!("HTTP {}", response.status())));
        }
        let content = response.text().await.map_err(|e| failure(e.to_string()))?;
        let title = extract_title(&content).unwrap_or_else(|| target.to_string());

        Ok(FetchedPage { title, content })
    }
}

/// Serves pages from memory. Used for tests and offline corpora.
#[derive(Default)]
pub struct InMemoryFetcher {
    pages: HashMap<String, FetchedPage>,
    fetched: Mutex<Vec<String>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, target: &str, title: &str, content: &str) -> Self {
        self.pages.insert(
            target.to_string(),
            FetchedPage {
                title: title.to_string(),
                content: content.to_string(),
            },
        );
        self
    }

    /// Targets requested so far, in order
    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl PageFetcher for InMemoryFetcher {
    async fn fetch(&self, target: &str) -> Result<FetchedPage, CrawlError> {
        self.fetched.lock().await.push(target.to_string());
        self.pages
            .get(target)
            .cloned()
            .ok_or_else(|| CrawlError::FetchFailure {
                target: target.to_string(),
                reason: "not found".to_string(),
            })
    }
}

/// Depth-first discovery of articles and their outgoing links.
pub struct CrawlGraphBuilder<'a> {
    fetcher: &'a dyn PageFetcher,
    parser: &'a dyn ContentParser,
    article_prefix: String,
    title_suffix: String,
    tolerate_fetch_failures: bool,
}

impl<'a> CrawlGraphBuilder<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, parser: &'a dyn ContentParser) -> Self {
        Self {
            fetcher,
            parser,
            article_prefix: "/wiki/".to_string(),
            title_suffix: " - Wikipedia".to_string(),
            tolerate_fetch_failures: false,
        }
    }

    pub fn article_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.article_prefix = prefix.into();
        self
    }

    pub fn title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = suffix.into();
        self
    }

    pub fn tolerate_fetch_failures(mut self, tolerate: bool) -> Self {
        self.tolerate_fetch_failures = tolerate;
        self
    }

    /// Crawl from `seed` until `max_documents` articles are admitted or the frontier runs dry.
    ///
    /// Targets are drained most-recent-first and never fetched twice. A fetched
    /// page whose canonical name was already admitted is skipped along with its links.
    pub async fn crawl(&self, seed: &str, max_documents: usize) -> Result<Vec<Article>, CrawlError> {
        let mut frontier: Vec<String> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut articles: Vec<Article> = Vec::new();
        let mut next = Some(seed.to_string());

        while articles.len() < max_documents {
            let target = match next.take().or_else(|| pop_unvisited(&mut frontier, &visited)) {
                Some(target) => target,
                None => {
                    info!(admitted = articles.len(), "crawl frontier exhausted");
                    break;
                }
            };
            visited.insert(target.clone());

            let page = match self.fetcher.fetch(&target).await {
                Ok(page) => page,
                Err(e) if self.tolerate_fetch_failures => {
                    warn!(%target, error = %e, "skipping page");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let name = canonical_name(&page.title, &self.title_suffix);
            if !names.insert(name.clone()) {
                debug!(%target, %name, "duplicate article skipped");
                continue;
            }

            let links = self.parser.parse_links(&page.content);
            let words = self.parser.parse_words(&page.content);
            debug!(%target, %name, words = words.len(), links = links.len(), "article admitted");
            frontier.extend(links.iter().cloned());

            articles.push(Article {
                url: format!("{}{}", self.article_prefix, name),
                name,
                content: page.content,
                words,
                links,
            });
            if articles.len() % 25 == 0 {
                info!(
                    admitted = articles.len(),
                    visited = visited.len(),
                    frontier = frontier.len(),
                    "crawl progress"
                );
            }
        }

        Ok(articles)
    }
}

fn pop_unvisited(frontier: &mut Vec<String>, visited: &HashSet<String>) -> Option<String> {
    while let Some(target) = frontier.pop() {
        if !visited.contains(&target) {
            return Some(target);
        }
    }
    None
}
