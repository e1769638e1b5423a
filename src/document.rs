use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Dense word identifier, assigned from 1 in first-seen order
pub type WordId = u32;

/// A crawled article before indexing: canonical identity plus parsed words and links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub name: String,
    pub url: String,
    pub content: String,
    pub words: Vec<String>,
    pub links: Vec<String>,
}

impl Article {
    pub fn words_to_string(&self) -> String {
        self.words.join(" ")
    }

    pub fn links_to_string(&self) -> String {
        self.links.join("\n")
    }
}

/// Derive the canonical document name from a page title.
///
/// Only the last `/`-separated segment is kept, the site suffix is removed and
/// spaces become underscores, so `"Cat - Wikipedia"` becomes `"Cat"` and
/// `"Felis catus - Wikipedia"` becomes `"Felis_catus"`.
pub fn canonical_name(title: &str, site_suffix: &str) -> String {
    let segment = title.rsplit('/').next().unwrap_or(title);
    let segment = if site_suffix.is_empty() {
        segment
    } else {
        segment.strip_suffix(site_suffix).unwrap_or(segment)
    };
    segment.trim().replace(' ', "_")
}

/// One indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub url: String,
    /// Word ids in source order
    pub words: Vec<WordId>,
    /// Canonical urls of linked documents
    pub links: HashSet<String>,
    pub authority_score: f64,
    #[serde(default)]
    pub word_frequency: HashMap<WordId, u32>,
}

impl Document {
    pub fn new(name: String, url: String, words: Vec<WordId>, links: Vec<String>) -> Self {
        Self {
            name,
            url,
            words,
            links: links.into_iter().collect(),
            authority_score: 1.0,
            word_frequency: HashMap::new(),
        }
    }

    pub fn out_degree(&self) -> usize {
        self.links.len()
    }

    pub fn links_to(&self, url: &str) -> bool {
        self.links.contains(url)
    }

    /// Count occurrences of every word id. Called once, after `words` is final.
    pub fn compute_word_frequency(&mut self) {
        let mut frequency = HashMap::new();
        for &id in &self.words {
            *frequency.entry(id).or_insert(0) += 1;
        }
        self.word_frequency = frequency;
    }

    pub fn frequency_of(&self, id: WordId) -> u32 {
        self.word_frequency.get(&id).copied().unwrap_or(0)
    }

    /// 0-based position of the first occurrence of `id`.
    pub fn first_position(&self, id: WordId) -> Option<usize> {
        self.words.iter().position(|&w| w == id)
    }
}

/// Ordered documents; the position of a document is its id for scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Document, SearchError> {
        self.documents.get(index).ok_or_else(|| {
            SearchError::CorpusInvariantViolation(format!(
                "document {} requested from a corpus of {}",
                index,
                self.documents.len()
            ))
        })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [Document] {
        &mut self.documents
    }

    /// Map canonical url -> corpus index
    pub fn url_positions(&self) -> HashMap<&str, usize> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.url.as_str(), i))
            .collect()
    }

    pub fn total_links(&self) -> usize {
        self.documents.iter().map(Document::out_degree).sum()
    }
}
