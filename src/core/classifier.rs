//! Multinomial naive Bayes over a frozen bag-of-words vocabulary.
//!
//! The vocabulary is fixed by [`ClassifierModel::fit`]. Online updates only
//! add counts for terms that were already known, so later examples can
//! reinforce existing terms but never introduce new ones.

use crate::core::types::ClassId;
use crate::core::vectorizer::{TermVectorizer, VectorizedDocument, Vocabulary};
use crate::error::{DiagnosisError, Result};
use serde::{Deserialize, Serialize};

/// Laplace smoothing.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ClassStats {
    label: String,
    documents: u64,
    /// Indexed by term id; always `vocabulary.len()` long.
    term_counts: Vec<u64>,
    total_terms: u64,
}

impl ClassStats {
    fn new(label: &str, vocabulary_size: usize) -> Self {
        Self {
            label: label.to_string(),
            documents: 0,
            term_counts: vec![0; vocabulary_size],
            total_terms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierModel {
    vocabulary: Vocabulary,
    /// Kept in training order, which is also the tie-break order.
    classes: Vec<ClassStats>,
    smoothing: f64,
}

impl ClassifierModel {
    /// An untrained model over an existing vocabulary.
    pub fn with_vocabulary(vocabulary: Vocabulary, smoothing: f64) -> Self {
        Self {
            vocabulary,
            classes: Vec::new(),
            smoothing,
        }
    }

    /// Initial training: fixes the vocabulary from `examples`' texts, then
    /// accumulates every `(text, label)` pair.
    pub fn fit<S, L>(examples: &[(S, L)], smoothing: f64) -> Self
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let vectorizer = TermVectorizer::new();
        let vocabulary = vectorizer.fit(examples.iter().map(|(text, _)| AsRef::<str>::as_ref(text)));
        let mut model = Self::with_vocabulary(vocabulary, smoothing);
        for (text, label) in examples {
            let doc = vectorizer.transform(text.as_ref(), &model.vocabulary);
            model.update(&doc, label.as_ref());
        }
        model
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Vectorizes `text` against this model's frozen vocabulary.
    pub fn vectorize(&self, text: &str) -> VectorizedDocument {
        TermVectorizer::new().transform(text, &self.vocabulary)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.label.as_str())
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn total_documents(&self) -> u64 {
        self.classes.iter().map(|c| c.documents).sum()
    }

    pub fn documents_for(&self, label: &str) -> u64 {
        self.find_class(label).map_or(0, |id| self.classes[id].documents)
    }

    fn find_class(&self, label: &str) -> Option<ClassId> {
        self.classes.iter().position(|c| c.label == label)
    }

    fn get_or_create_class(&mut self, label: &str) -> ClassId {
        if let Some(id) = self.find_class(label) {
            id
        } else {
            self.classes.push(ClassStats::new(label, self.vocabulary.len()));
            self.classes.len() - 1
        }
    }

    /// Log posterior (up to a constant) for every class, in class order.
    pub fn scores(&self, doc: &VectorizedDocument) -> Vec<(&str, f64)> {
        let total_documents = self.total_documents() as f64;
        let vocabulary_size = self.vocabulary.len() as f64;

        self.classes
            .iter()
            .map(|class| {
                let prior = (class.documents as f64 / total_documents).ln();
                let denominator = class.total_terms as f64 + self.smoothing * vocabulary_size;
                let likelihood: f64 = doc
                    .iter()
                    .map(|(term, count)| {
                        let term_count = class.term_counts.get(term).copied().unwrap_or(0);
                        count as f64 * ((term_count as f64 + self.smoothing) / denominator).ln()
                    })
                    .sum();
                (class.label.as_str(), prior + likelihood)
            })
            .collect()
    }

    /// Most probable label. Equal scores go to the class trained first.
    pub fn predict(&self, doc: &VectorizedDocument) -> Result<&str> {
        if self.classes.is_empty() {
            return Err(DiagnosisError::NotFound);
        }
        if doc.is_empty() {
            return Err(DiagnosisError::NoRecognizedSymptoms);
        }

        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.scores(doc) {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label).ok_or(DiagnosisError::NotFound)
    }

    /// Adds one labeled document. Unknown labels become new classes; the
    /// vocabulary is left untouched. Repeated calls keep compounding.
    pub fn update(&mut self, doc: &VectorizedDocument, label: &str) -> ClassId {
        let id = self.get_or_create_class(label);
        let class = &mut self.classes[id];
        class.documents += 1;
        for (term, count) in doc.iter() {
            if let Some(slot) = class.term_counts.get_mut(term) {
                *slot += count;
                class.total_terms += count;
            }
        }
        id
    }
}
