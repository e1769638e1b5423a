use crate::document::{Corpus, Document, WordId};
use crate::error::SearchError;
use crate::index::WordIndex;
use crate::ranking::{normalize_inverse, normalize_max};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Location added for a query word that never occurs in the document
pub const MISSING_WORD_PENALTY: f64 = 100_000.0;

/// Results at or below this combined score are dropped
pub const MIN_SCORE: f64 = 0.001;

/// Scaling applied to the reported location component, in every mode
pub const LOCATION_DISPLAY_WEIGHT: f64 = 0.8;

/// Which signals are computed and how they are weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Term frequency of a single word
    #[default]
    Basic,
    /// Term frequency plus first-occurrence position
    Medium,
    /// Medium plus link authority
    Advanced,
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(SearchMode::Basic),
            "medium" => Ok(SearchMode::Medium),
            "advanced" => Ok(SearchMode::Advanced),
            _ => Err(SearchError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Basic => "basic",
            SearchMode::Medium => "medium",
            SearchMode::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Per-query scratch signals, one slot per corpus index
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    pub content: Vec<f64>,
    pub location: Vec<f64>,
}

impl ScoreVector {
    pub fn new(len: usize) -> Self {
        Self {
            content: vec![0.0; len],
            location: vec![0.0; len],
        }
    }

    pub fn normalize(&mut self) {
        normalize_max(&mut self.content);
        normalize_inverse(&mut self.location);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub link: String,
    pub score: f64,
    pub content: f64,
    pub location: f64,
    /// Only reported in advanced mode
    #[serde(rename = "pageRank")]
    pub authority: f64,
}

/// Scores every document in a loaded corpus against a query.
pub struct Scorer<'a> {
    corpus: &'a Corpus,
    index: &'a WordIndex,
}

impl<'a> Scorer<'a> {
    pub fn new(corpus: &'a Corpus, index: &'a WordIndex) -> Self {
        Self { corpus, index }
    }

    /// Rank the corpus for an already trimmed, lower-cased query.
    ///
    /// Results are sorted by descending score; equal scores keep corpus order.
    pub fn score_all(&self, query: &str, mode: SearchMode) -> Result<Vec<SearchResult>, SearchError> {
        let mut scores = self.signals(query, mode)?;
        scores.normalize();

        let mut ranked: Vec<(usize, SearchResult)> = Vec::new();
        for i in 0..self.corpus.len() {
            let doc = self.corpus.get(i)?;
            let content = scores.content[i];
            let location = scores.location[i];
            let score = combine(mode, content, location, doc.authority_score);
            if content != 0.0 && score > MIN_SCORE {
                ranked.push((
                    i,
                    SearchResult {
                        name: doc.name.clone(),
                        link: doc.url.clone(),
                        score,
                        content,
                        location: location * LOCATION_DISPLAY_WEIGHT,
                        authority: if mode == SearchMode::Advanced {
                            doc.authority_score
                        } else {
                            0.0
                        },
                    },
                ));
            }
        }

        ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
        Ok(ranked.into_iter().map(|(_, result)| result).collect())
    }

    /// Raw content and location signals before normalization
    pub fn signals(&self, query: &str, mode: SearchMode) -> Result<ScoreVector, SearchError> {
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if mode == SearchMode::Basic && words.len() > 1 {
            return Err(SearchError::MultiWordInBasicMode);
        }

        let ids: Vec<Option<WordId>> = words.iter().map(|w| self.index.lookup(w)).collect();
        let mut seen = HashSet::new();
        let distinct: Vec<Option<WordId>> = words
            .iter()
            .zip(&ids)
            .filter(|(word, _)| seen.insert(**word))
            .map(|(_, id)| *id)
            .collect();

        let mut scores = ScoreVector::new(self.corpus.len());
        for i in 0..self.corpus.len() {
            let doc = self.corpus.get(i)?;
            scores.content[i] = content_score(doc, &distinct);
            scores.location[i] = match mode {
                SearchMode::Basic => 0.0,
                SearchMode::Medium | SearchMode::Advanced => location_score(doc, &ids),
            };
        }
        Ok(scores)
    }
}

/// Summed frequency of the query words
fn content_score(doc: &Document, ids: &[Option<WordId>]) -> f64 {
    ids.iter()
        .flatten()
        .map(|&id| doc.frequency_of(id) as f64)
        .sum()
}

/// Summed 1-based first positions, with a penalty for absent words
fn location_score(doc: &Document, ids: &[Option<WordId>]) -> f64 {
    ids.iter()
        .map(|id| {
            id.and_then(|id| doc.first_position(id))
                .map(|pos| (pos + 1) as f64)
                .unwrap_or(MISSING_WORD_PENALTY)
        })
        .sum()
}

fn combine(mode: SearchMode, content: f64, location: f64, authority: f64) -> f64 {
    match mode {
        SearchMode::Basic => content,
        SearchMode::Medium => 1.0 * content + 0.8 * location,
        SearchMode::Advanced => {
            if content == 0.0 && location < MIN_SCORE {
                0.0
            } else {
                1.0 * content + 0.5 * location + 1.0 * authority
            }
        }
    }
}
