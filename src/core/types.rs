// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A normalized (trimmed, lowercase) symptom keyword.
pub type Symptom = String;

/// Position of a term in the frozen classifier vocabulary.
pub type TermId = usize;

/// Position of a diagnosis label in the classifier's class table.
pub type ClassId = usize;

/// Catalog value meaning "applies to every gender".
pub const ALL_GENDERS: &str = "todos";

/// Returned whenever no treatment text can be found for a diagnosis.
pub const TREATMENT_PLACEHOLDER: &str = "Tratamiento no disponible";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderRestriction {
    #[default]
    Any,
    Specific(String),
}

impl GenderRestriction {
    /// Interprets a catalog gender column. Missing values and `"todos"` mean any.
    pub fn from_catalog(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            None => Self::Any,
            Some(v) if v.is_empty() || v == ALL_GENDERS => Self::Any,
            Some(v) => Self::Specific(v),
        }
    }

    pub fn admits(&self, gender: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Specific(required) => *required == gender.trim().to_lowercase(),
        }
    }
}

/// Age bounds are inclusive; an unset bound leaves that side open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicConstraint {
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub gender: GenderRestriction,
}

impl DemographicConstraint {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn min_age(mut self, age: u32) -> Self {
        self.min_age = Some(age);
        self
    }

    pub fn max_age(mut self, age: u32) -> Self {
        self.max_age = Some(age);
        self
    }

    pub fn gender(mut self, gender: &str) -> Self {
        self.gender = GenderRestriction::from_catalog(Some(gender));
        self
    }

    pub fn is_satisfied_by(&self, age: u32, gender: &str) -> bool {
        self.min_age.map_or(true, |min| age >= min)
            && self.max_age.map_or(true, |max| age <= max)
            && self.gender.admits(gender)
    }
}

/// One catalog entry. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    pub symptoms: HashSet<Symptom>,
    pub constraint: DemographicConstraint,
    pub treatment: String,
}

impl DiseaseRecord {
    pub fn new<I, S>(name: &str, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            symptoms: symptoms
                .into_iter()
                .map(|s| normalize_symptom(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
            constraint: DemographicConstraint::unconstrained(),
            treatment: String::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: DemographicConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_treatment(mut self, treatment: &str) -> Self {
        self.treatment = treatment.to_string();
        self
    }

    /// Number of query symptoms this disease shares.
    pub fn score(&self, symptoms: &HashSet<Symptom>) -> usize {
        symptoms.intersection(&self.symptoms).count()
    }
}

/// A single diagnosis request, as received from the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub symptoms: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl UserQuery {
    pub fn new(symptoms: &str) -> Self {
        Self {
            symptoms: symptoms.to_string(),
            ..Self::default()
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Some(gender.to_string());
        self
    }

    /// The comma separated symptom list, normalized.
    pub fn symptom_list(&self) -> Vec<Symptom> {
        parse_symptom_list(&self.symptoms)
    }
}

/// Which of the two diagnosis mechanisms handles a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    #[default]
    RuleBased,
    Probabilistic,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleBased => write!(f, "reglas"),
            Self::Probabilistic => write!(f, "bayes"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reglas" | "rules" | "rule-based" => Ok(Self::RuleBased),
            "bayes" | "clasificador" | "classifier" => Ok(Self::Probabilistic),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub diagnosis: String,
    pub treatment: String,
    pub description: Option<String>,
    pub strategy: StrategyKind,
}

pub fn normalize_symptom(raw: &str) -> Symptom {
    raw.trim().to_lowercase()
}

/// Splits comma separated symptom text into normalized, non-empty symptoms.
pub fn parse_symptom_list(text: &str) -> Vec<Symptom> {
    text.split(',')
        .map(normalize_symptom)
        .filter(|s| !s.is_empty())
        .collect()
}
