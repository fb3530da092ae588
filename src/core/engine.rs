use crate::config::EngineConfig;
use crate::core::matcher::RuleBasedMatcher;
use crate::core::types::{
    parse_symptom_list, DiagnosisResult, StrategyKind, UserQuery, TREATMENT_PLACEHOLDER,
};
use crate::enrichment::{Describe, WikipediaDescriber};
use crate::error::{DiagnosisError, Result};
use crate::learning::{bootstrap_treatments, LearningEngine, TrainingExample};
use crate::persistence::FileModelStore;
use crate::provider::{CatalogProvider, JsonCatalogProvider};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

const MISSING_SYMPTOMS: &str = "Por favor, proporciona una lista de síntomas";
const MISSING_DEMOGRAPHICS: &str = "Por favor, proporciona una lista de síntomas, edad y género";

/// One way of turning a query into a diagnosis.
pub trait DiagnosisStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn diagnose(&self, query: &UserQuery) -> Result<DiagnosisResult>;

    /// Online training. Only learning strategies support it.
    fn train(&self, _example: &TrainingExample) -> Result<()> {
        Err(DiagnosisError::unavailable(format!(
            "la estrategia '{}' no admite entrenamiento",
            self.kind()
        )))
    }
}

/// Request-level checks shared by every entry point.
pub fn validate_query(query: &UserQuery, kind: StrategyKind) -> Result<()> {
    if query.symptoms.trim().is_empty() {
        let msg = match kind {
            StrategyKind::RuleBased => MISSING_DEMOGRAPHICS,
            StrategyKind::Probabilistic => MISSING_SYMPTOMS,
        };
        return Err(DiagnosisError::validation(msg));
    }
    if kind == StrategyKind::RuleBased {
        // An age of zero is what an empty form field turns into.
        let has_age = query.age.is_some_and(|age| age > 0);
        let has_gender = query.gender.as_deref().is_some_and(|g| !g.trim().is_empty());
        if !has_age || !has_gender {
            return Err(DiagnosisError::validation(MISSING_DEMOGRAPHICS));
        }
    }
    Ok(())
}

/// The `sintomas` field is a comma separated list; the classifier wants
/// whitespace separated words.
fn classifier_text(symptoms: &str) -> String {
    parse_symptom_list(symptoms).join(" ")
}

/// Catalog matcher over a [`CatalogProvider`].
pub struct RuleBasedStrategy {
    provider: Arc<dyn CatalogProvider>,
    matcher: RuleBasedMatcher,
}

impl RuleBasedStrategy {
    pub fn new(provider: Arc<dyn CatalogProvider>, matcher: RuleBasedMatcher) -> Self {
        Self { provider, matcher }
    }

    fn treatment_for(&self, disease: &str, stored: &str) -> String {
        if !stored.trim().is_empty() {
            return stored.to_string();
        }
        match self.provider.lookup_treatment(disease) {
            Ok(Some(treatment)) => treatment,
            Ok(None) => TREATMENT_PLACEHOLDER.to_string(),
            Err(e) => {
                warn!("Treatment lookup for '{disease}' failed: {e}");
                TREATMENT_PLACEHOLDER.to_string()
            }
        }
    }
}

impl DiagnosisStrategy for RuleBasedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    fn diagnose(&self, query: &UserQuery) -> Result<DiagnosisResult> {
        validate_query(query, StrategyKind::RuleBased)?;
        let age = query
            .age
            .ok_or_else(|| DiagnosisError::validation(MISSING_DEMOGRAPHICS))?;
        let gender = query
            .gender
            .as_deref()
            .map(|g| g.trim().to_lowercase())
            .ok_or_else(|| DiagnosisError::validation(MISSING_DEMOGRAPHICS))?;

        let symptoms = query.symptom_list();
        let (vocabulary, catalog) = self.provider.load_catalog()?;
        if vocabulary.recognize(&symptoms).is_empty() {
            return Err(DiagnosisError::NoRecognizedSymptoms);
        }

        let found = self
            .matcher
            .find_match(&symptoms, age, &gender, &vocabulary, &catalog)?;
        info!(
            "Rule-based diagnosis '{}' with {} matching symptoms",
            found.record.name, found.score
        );

        Ok(DiagnosisResult {
            diagnosis: found.record.name.clone(),
            treatment: self.treatment_for(&found.record.name, &found.record.treatment),
            description: None,
            strategy: StrategyKind::RuleBased,
        })
    }
}

/// Naive Bayes classifier with a fixed label → treatment table.
pub struct ClassifierStrategy {
    learning: LearningEngine,
    treatments: HashMap<String, String>,
}

impl ClassifierStrategy {
    pub fn new(learning: LearningEngine, treatments: HashMap<String, String>) -> Self {
        Self {
            learning,
            treatments,
        }
    }
}

impl DiagnosisStrategy for ClassifierStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Probabilistic
    }

    fn diagnose(&self, query: &UserQuery) -> Result<DiagnosisResult> {
        validate_query(query, StrategyKind::Probabilistic)?;
        let label = self.learning.predict(&classifier_text(&query.symptoms))?;
        info!("Classifier diagnosis '{label}'");
        let treatment = self
            .treatments
            .get(&label)
            .cloned()
            .unwrap_or_else(|| TREATMENT_PLACEHOLDER.to_string());
        Ok(DiagnosisResult {
            diagnosis: label,
            treatment,
            description: None,
            strategy: StrategyKind::Probabilistic,
        })
    }

    fn train(&self, example: &TrainingExample) -> Result<()> {
        let example = TrainingExample::new(&classifier_text(&example.symptoms), &example.diagnosis);
        self.learning.learn(&example)
    }
}

/// Entry point: picks a strategy per request and shapes the result.
pub struct DiagnosisEngine {
    strategies: Vec<Box<dyn DiagnosisStrategy>>,
    default_strategy: StrategyKind,
    describer: Option<Box<dyn Describe>>,
}

impl DiagnosisEngine {
    pub fn new(default_strategy: StrategyKind) -> Self {
        Self {
            strategies: Vec::new(),
            default_strategy,
            describer: None,
        }
    }

    /// Registers a strategy, replacing any previous one of the same kind.
    pub fn with_strategy(mut self, strategy: impl DiagnosisStrategy + 'static) -> Self {
        self.strategies.retain(|s| s.kind() != strategy.kind());
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn with_describer(mut self, describer: impl Describe + 'static) -> Self {
        self.describer = Some(Box::new(describer));
        self
    }

    /// Wires both strategies from configuration: the JSON catalog for the
    /// matcher and the snapshot file (bootstrapped if missing) for the
    /// classifier.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::new(JsonCatalogProvider::new(&config.catalog_path));
        let store = FileModelStore::new(&config.model_path);
        let learning = LearningEngine::open(Box::new(store), config.smoothing)?;

        let mut engine = Self::new(config.strategy)
            .with_strategy(RuleBasedStrategy::new(
                provider,
                RuleBasedMatcher::new(config.tie_break),
            ))
            .with_strategy(ClassifierStrategy::new(learning, bootstrap_treatments()));

        if config.describe {
            match WikipediaDescriber::new(&config.wiki_base_url, config.http_timeout()) {
                Ok(describer) => engine = engine.with_describer(describer),
                Err(e) => warn!("Description enrichment disabled: {e}"),
            }
        }
        info!("Diagnosis engine ready (default strategy: {})", config.strategy);
        Ok(engine)
    }

    pub fn default_strategy(&self) -> StrategyKind {
        self.default_strategy
    }

    fn strategy(&self, kind: StrategyKind) -> Result<&dyn DiagnosisStrategy> {
        match self.strategies.iter().find(|s| s.kind() == kind) {
            Some(strategy) => Ok(&**strategy),
            None => Err(DiagnosisError::unavailable(format!(
                "estrategia '{kind}' no configurada"
            ))),
        }
    }

    pub fn diagnose(&self, query: &UserQuery) -> Result<DiagnosisResult> {
        self.diagnose_with(query, self.default_strategy)
    }

    /// Each strategy validates its own query.
    pub fn diagnose_with(&self, query: &UserQuery, kind: StrategyKind) -> Result<DiagnosisResult> {
        let outcome = self.strategy(kind).and_then(|strategy| strategy.diagnose(query));

        match outcome {
            Ok(mut result) => {
                if kind == StrategyKind::RuleBased {
                    if let Some(describer) = &self.describer {
                        result.description = Some(describer.describe(&result.diagnosis));
                    }
                }
                Ok(result)
            }
            Err(e) => {
                if let DiagnosisError::DependencyUnavailable(_) = e {
                    error!("Diagnosis failed: {e}");
                }
                Err(e)
            }
        }
    }

    /// Feeds one labeled example to the classifier and persists it.
    pub fn train(&self, symptoms: &str, diagnosis: &str) -> Result<()> {
        let example = TrainingExample::new(symptoms, diagnosis);
        self.strategy(StrategyKind::Probabilistic)?.train(&example)
    }
}
