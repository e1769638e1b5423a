use crate::document::{Corpus, WordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vocabulary: word -> dense id, plus the reverse table.
///
/// Ids start at 1 and follow first-seen order. The mapping only grows.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WordIndex {
    ids: HashMap<String, WordId>,
    words: Vec<String>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `word`, assigning the next one if the word is new
    pub fn id_for(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        self.words.push(word.to_string());
        let id = self.words.len() as WordId;
        self.ids.insert(word.to_string(), id);
        id
    }

    /// Read-only lookup used at query time
    pub fn lookup(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    pub fn word(&self, id: WordId) -> Option<&str> {
        let slot = (id as usize).checked_sub(1)?;
        self.words.get(slot).map(String::as_str)
    }

    /// Map words to ids, keeping order and duplicates
    pub fn build_document_word_ids(&mut self, words: &[String]) -> Vec<WordId> {
        words.iter().map(|w| self.id_for(w)).collect()
    }

    /// Populate every document's frequency table in one pass.
    pub fn compute_frequencies(corpus: &mut Corpus) {
        for doc in corpus.documents_mut() {
            doc.compute_word_frequency();
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn stats(&self, corpus: &Corpus) -> IndexStats {
        let total_words: usize = corpus.documents().iter().map(|d| d.words.len()).sum();
        IndexStats {
            total_documents: corpus.len(),
            vocabulary_size: self.len(),
            total_links: corpus.total_links(),
            avg_words_per_document: if corpus.is_empty() {
                0.0
            } else {
                total_words as f64 / corpus.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub vocabulary_size: usize,
    pub total_links: usize,
    pub avg_words_per_document: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_id_assignment_is_idempotent() {
        let mut index = WordIndex::new();
        let cat = index.id_for("cat");
        let dog = index.id_for("dog");

        assert_eq!(cat, 1);
        assert_eq!(dog, 2);
        assert_eq!(index.id_for("cat"), cat);
        assert_eq!(index.len(), 2);
        assert_eq!(index.word(dog), Some("dog"));
        assert_eq!(index.word(0), None);
        assert_eq!(index.lookup("bird"), None);
    }

    #[test]
    fn test_document_word_ids_keep_order() {
        let mut index = WordIndex::new();
        let ids = index.build_document_word_ids(&words(&["the", "cat", "the", "hat"]));
        assert_eq!(ids, vec![1, 2, 1, 3]);

        let ids = index.build_document_word_ids(&words(&["hat", "bat"]));
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_compute_frequencies() {
        let mut index = WordIndex::new();
        let ids = index.build_document_word_ids(&words(&["sat", "sat", "mat"]));
        let mut corpus = Corpus::new(vec![Document::new(
            "A".to_string(),
            "/wiki/A".to_string(),
            ids,
            Vec::new(),
        )]);

        WordIndex::compute_frequencies(&mut corpus);

        let doc = &corpus.documents()[0];
        assert_eq!(doc.frequency_of(index.lookup("sat").unwrap()), 2);
        assert_eq!(doc.frequency_of(index.lookup("mat").unwrap()), 1);

        let stats = index.stats(&corpus);
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.vocabulary_size, 2);
        assert_eq!(stats.avg_words_per_document, 3.0);
    }
}
