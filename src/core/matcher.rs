//! Constrained set-overlap matching of query symptoms against the catalog.

use crate::core::catalog::DiseaseCatalog;
use crate::core::types::{DiseaseRecord, Symptom};
use crate::core::vocabulary::SymptomVocabulary;
use crate::error::{DiagnosisError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How records with equal overlap are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Constraints are only checked when a record strictly beats the best
    /// accepted score. Later records with an equal score are never looked at,
    /// and a record that fails its constraint is skipped without lowering the
    /// bar for the ones after it.
    #[default]
    FirstStrict,
    /// Drop records whose constraint fails, then take the highest score,
    /// first in catalog order among equals.
    BestEligible,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estricto" | "strict" | "first-strict" => Ok(Self::FirstStrict),
            "mejor" | "best" | "best-eligible" => Ok(Self::BestEligible),
            other => Err(format!("unknown tie-break policy '{other}'")),
        }
    }
}

/// The accepted record and the overlap it was accepted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub record: &'a DiseaseRecord,
    pub score: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedMatcher {
    tie_break: TieBreak,
}

impl RuleBasedMatcher {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Picks the disease for a query.
    ///
    /// Symptoms outside `vocabulary` are ignored; if none remain the query
    /// fails with [`DiagnosisError::NoRecognizedSymptoms`]. A result requires
    /// a score above zero, otherwise [`DiagnosisError::NotFound`].
    pub fn find_match<'a>(
        &self,
        symptoms: &[Symptom],
        age: u32,
        gender: &str,
        vocabulary: &SymptomVocabulary,
        catalog: &'a DiseaseCatalog,
    ) -> Result<Match<'a>> {
        let recognized = vocabulary.recognize(symptoms);
        if recognized.is_empty() {
            return Err(DiagnosisError::NoRecognizedSymptoms);
        }

        let mut best: Option<Match<'a>> = None;
        let mut best_score = 0;

        for record in catalog.iter() {
            let score = record.score(&recognized);
            match self.tie_break {
                TieBreak::FirstStrict => {
                    if score > best_score {
                        if record.constraint.is_satisfied_by(age, gender) {
                            best_score = score;
                            best = Some(Match { record, score });
                        } else {
                            debug!("Skipping '{}' (score {score}): constraint not met", record.name);
                        }
                    }
                }
                TieBreak::BestEligible => {
                    if !record.constraint.is_satisfied_by(age, gender) {
                        continue;
                    }
                    if score > best_score {
                        best_score = score;
                        best = Some(Match { record, score });
                    }
                }
            }
        }

        best.ok_or(DiagnosisError::NotFound)
    }
}
