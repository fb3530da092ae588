// File: src/core/vectorizer.rs
use crate::core::types::TermId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Term → index mapping fixed at fit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    index: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn get(&self, term: &str) -> Option<TermId> {
        self.index.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn get_or_insert(&mut self, term: &str) -> TermId {
        if let Some(id) = self.get(term) {
            id
        } else {
            let id = self.terms.len();
            self.terms.push(term.to_string());
            self.index.insert(term.to_string(), id);
            id
        }
    }
}

/// Sparse term counts over a [`Vocabulary`]. Iterates in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorizedDocument {
    counts: BTreeMap<TermId, u64>,
}

impl VectorizedDocument {
    pub fn count(&self, term: TermId) -> u64 {
        self.counts.get(&term).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, u64)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }

    /// Total number of in-vocabulary tokens.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Whitespace bag-of-words vectorizer. No stemming, no stopwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermVectorizer;

impl TermVectorizer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize<'a>(&self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        text.split_whitespace().map(str::to_lowercase)
    }

    /// Builds the vocabulary from a corpus. Indices follow first appearance.
    pub fn fit<I, S>(&self, corpus: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Vocabulary::default();
        for text in corpus {
            for token in self.tokenize(text.as_ref()) {
                vocabulary.get_or_insert(&token);
            }
        }
        vocabulary
    }

    /// Counts the tokens of `text` that `vocabulary` knows; the rest are dropped.
    pub fn transform(&self, text: &str, vocabulary: &Vocabulary) -> VectorizedDocument {
        let mut counts = BTreeMap::new();
        for token in self.tokenize(text) {
            if let Some(id) = vocabulary.get(&token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        VectorizedDocument { counts }
    }
}
