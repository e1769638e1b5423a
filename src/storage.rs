use crate::document::Article;
use anyhow::{Context, Result};
use sled::Db;
use std::path::Path;

const RAW_TREE: &str = "raw";
const WORDS_TREE: &str = "words";
const LINKS_TREE: &str = "links";

/// Side-channel persistence of crawl artifacts. Never read back by the ranking engine.
pub trait ArtifactStore: Send + Sync {
    fn save_raw(&self, article: &Article) -> Result<()>;
    fn save_words(&self, article: &Article) -> Result<()>;
    fn save_links(&self, article: &Article) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything
pub struct NullArtifactStore;

impl ArtifactStore for NullArtifactStore {
    fn save_raw(&self, _article: &Article) -> Result<()> {
        Ok(())
    }

    fn save_words(&self, _article: &Article) -> Result<()> {
        Ok(())
    }

    fn save_links(&self, _article: &Article) -> Result<()> {
        Ok(())
    }
}

/// sled-backed artifact store, one tree per artifact kind keyed by canonical name
pub struct SledArtifactStore {
    db: Db,
}

impl SledArtifactStore {
    /// Open or create a storage database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path).context("Failed to open artifact database")?;
        Ok(Self { db })
    }

    /// Create a temporary database (for testing)
    pub fn in_memory() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open().context("Failed to create in-memory database")?;
        Ok(Self { db })
    }

    fn put(&self, tree: &str, key: &str, value: &[u8]) -> Result<()> {
        let tree = self.db.open_tree(tree)?;
        tree.insert(key.as_bytes(), value)
            .with_context(|| format!("Failed to store artifact {}", key))?;
        Ok(())
    }

    fn get_text(&self, tree: &str, key: &str) -> Result<Option<String>> {
        let tree = self.db.open_tree(tree)?;
        match tree.get(key.as_bytes())? {
            Some(data) => Ok(Some(String::from_utf8(data.to_vec())?)),
            None => Ok(None),
        }
    }

    pub fn get_raw(&self, name: &str) -> Result<Option<String>> {
        self.get_text(RAW_TREE, name)
    }

    pub fn get_words(&self, name: &str) -> Result<Option<String>> {
        self.get_text(WORDS_TREE, name)
    }

    pub fn get_links(&self, name: &str) -> Result<Option<String>> {
        self.get_text(LINKS_TREE, name)
    }

    /// Number of articles with raw content stored
    pub fn count(&self) -> Result<usize> {
        let tree = self.db.open_tree(RAW_TREE)?;
        Ok(tree.len())
    }
}

impl ArtifactStore for SledArtifactStore {
    fn save_raw(&self, article: &Article) -> Result<()> {
        self.put(RAW_TREE, &article.name, article.content.as_bytes())
    }

    fn save_words(&self, article: &Article) -> Result<()> {
        self.put(WORDS_TREE, &article.name, article.words_to_string().as_bytes())
    }

    fn save_links(&self, article: &Article) -> Result<()> {
        self.put(LINKS_TREE, &article.name, article.links_to_string().as_bytes())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush artifact database")?;
        Ok(())
    }
}
