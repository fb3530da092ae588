// File: src/core/catalog.rs
use crate::core::types::{DiseaseRecord, Symptom};
use crate::core::vocabulary::SymptomVocabulary;
use serde::{Deserialize, Serialize};

/// Ordered disease records. Order decides ties in the rule-based matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseCatalog {
    records: Vec<DiseaseRecord>,
}

impl DiseaseCatalog {
    pub fn new(records: Vec<DiseaseRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: DiseaseRecord) {
        self.records.push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds a record by its unique name. First match wins.
    pub fn find(&self, name: &str) -> Option<&DiseaseRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Symptoms referenced by records but absent from the vocabulary, as
    /// `(disease, symptom)` pairs in catalog order. Such symptoms can never
    /// contribute to a score.
    pub fn unknown_symptoms(&self, vocabulary: &SymptomVocabulary) -> Vec<(String, Symptom)> {
        let mut unknown = Vec::new();
        for record in &self.records {
            let mut missing: Vec<&Symptom> = record
                .symptoms
                .iter()
                .filter(|s| !vocabulary.contains(s))
                .collect();
            missing.sort_unstable();
            unknown.extend(missing.into_iter().map(|s| (record.name.clone(), s.clone())));
        }
        unknown
    }
}

impl FromIterator<DiseaseRecord> for DiseaseCatalog {
    fn from_iter<T: IntoIterator<Item = DiseaseRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
