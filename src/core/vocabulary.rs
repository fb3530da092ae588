// File: src/core/vocabulary.rs
use crate::core::types::{normalize_symptom, Symptom};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The authoritative set of recognized symptom tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomVocabulary {
    symptoms: HashSet<Symptom>,
}

impl SymptomVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symptom: &str) -> bool {
        let symptom = normalize_symptom(symptom);
        !symptom.is_empty() && self.symptoms.insert(symptom)
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.symptoms.contains(symptom)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Keeps only the symptoms this vocabulary knows, as a set.
    pub fn recognize<'a, I>(&self, symptoms: I) -> HashSet<Symptom>
    where
        I: IntoIterator<Item = &'a Symptom>,
    {
        symptoms
            .into_iter()
            .filter(|s| self.contains(s))
            .cloned()
            .collect()
    }

    /// Sorted listing, as shown on the symptom entry form.
    pub fn sorted(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.symptoms.iter().map(String::as_str).collect();
        all.sort_unstable();
        all
    }
}

impl<S: AsRef<str>> FromIterator<S> for SymptomVocabulary {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut vocabulary = Self::new();
        for symptom in iter {
            vocabulary.insert(symptom.as_ref());
        }
        vocabulary
    }
}
