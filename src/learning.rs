// File: src/learning.rs
use crate::core::classifier::ClassifierModel;
use crate::error::{DiagnosisError, Result};
use crate::persistence::ModelStore;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Process-wide classifier state. Readers predict concurrently; an update
/// takes the write lock for the duration of the count changes only.
pub type SharedModel = Arc<RwLock<ClassifierModel>>;

/// Synthetic symptom phrases used when no snapshot exists yet.
pub const BOOTSTRAP_CORPUS: &[(&str, &str)] = &[
    ("fiebre tos dolor muscular cansancio", "gripe"),
    ("fiebre alta escalofrios tos dolor de garganta", "gripe"),
    ("estornudos congestion nasal dolor de garganta", "resfriado comun"),
    ("congestion nasal estornudos tos leve", "resfriado comun"),
    ("dolor de cabeza intenso nauseas sensibilidad a la luz", "migraña"),
    ("dolor de cabeza pulsatil vision borrosa nauseas", "migraña"),
    ("diarrea vomitos dolor abdominal fiebre", "gastroenteritis"),
    ("nauseas diarrea deshidratacion dolor abdominal", "gastroenteritis"),
    ("picazon ojos llorosos estornudos erupcion", "alergia"),
    ("estornudos picazon en la nariz ojos rojos", "alergia"),
    ("tos con flema fiebre dificultad respiratoria dolor en el pecho", "neumonia"),
    ("dificultad respiratoria sibilancias opresion en el pecho", "asma"),
];

/// Treatment text for every label in [`BOOTSTRAP_CORPUS`].
pub const BOOTSTRAP_TREATMENTS: &[(&str, &str)] = &[
    ("gripe", "Reposo, hidratación y antipiréticos. Consultar si la fiebre persiste más de tres días."),
    ("resfriado comun", "Reposo, líquidos abundantes y descongestionantes de venta libre."),
    ("migraña", "Analgésicos, descanso en un lugar oscuro y evitar desencadenantes conocidos."),
    ("gastroenteritis", "Rehidratación oral, dieta blanda y vigilancia de signos de deshidratación."),
    ("alergia", "Antihistamínicos y evitar la exposición al alérgeno."),
    ("neumonia", "Evaluación médica urgente; puede requerir antibióticos."),
    ("asma", "Broncodilatadores de rescate y control con un especialista."),
];

pub fn bootstrap_treatments() -> HashMap<String, String> {
    BOOTSTRAP_TREATMENTS
        .iter()
        .map(|(label, treatment)| (label.to_string(), treatment.to_string()))
        .collect()
}

/// One labeled example received for online training.
pub struct TrainingExample {
    pub symptoms: String,
    pub diagnosis: String,
}

impl TrainingExample {
    pub fn new(symptoms: &str, diagnosis: &str) -> Self {
        Self {
            symptoms: symptoms.to_string(),
            diagnosis: diagnosis.to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.symptoms.trim().is_empty() || self.diagnosis.trim().is_empty() {
            return Err(DiagnosisError::validation(
                "Por favor, proporciona síntomas y diagnóstico",
            ));
        }
        Ok(())
    }
}

/// Owns the shared classifier and the store its snapshots go to.
///
/// Updates are copy-on-write: the next model is built and saved on the side
/// and only replaces the shared one once the save succeeded.
pub struct LearningEngine {
    model: SharedModel,
    store: Box<dyn ModelStore>,
    /// Serializes learners so each one starts from the latest saved model.
    writer: Mutex<()>,
}

fn poisoned<T>(_: PoisonError<T>) -> DiagnosisError {
    DiagnosisError::unavailable("classifier model lock poisoned")
}

impl LearningEngine {
    pub fn new(model: ClassifierModel, store: Box<dyn ModelStore>) -> Self {
        Self {
            writer: Mutex::new(()),
            model: Arc::new(RwLock::new(model)),
            store,
        }
    }

    /// Loads the last snapshot, or trains on [`BOOTSTRAP_CORPUS`] and saves
    /// the result when the store is empty. A snapshot keeps the smoothing it
    /// was trained with; `smoothing` only applies to a fresh bootstrap.
    pub fn open(store: Box<dyn ModelStore>, smoothing: f64) -> Result<Self> {
        let model = match store.load()? {
            Some(model) => {
                info!(
                    "Loaded classifier snapshot: {} classes, {} terms",
                    model.class_count(),
                    model.vocabulary().len()
                );
                if model.smoothing() != smoothing {
                    warn!(
                        "Configured smoothing {smoothing} ignored, snapshot was trained with {}",
                        model.smoothing()
                    );
                }
                model
            }
            None => {
                info!(
                    "No classifier snapshot found, bootstrapping from {} examples",
                    BOOTSTRAP_CORPUS.len()
                );
                let model = ClassifierModel::fit(BOOTSTRAP_CORPUS, smoothing);
                store.save(&model)?;
                model
            }
        };
        Ok(Self::new(model, store))
    }

    pub fn model(&self) -> SharedModel {
        Arc::clone(&self.model)
    }

    pub fn predict(&self, text: &str) -> Result<String> {
        let model = self.model.read().map_err(poisoned)?;
        let doc = model.vectorize(text);
        model.predict(&doc).map(str::to_string)
    }

    /// Applies one example and persists the updated model. When the save
    /// fails the live model is left as it was.
    pub fn learn(&self, example: &TrainingExample) -> Result<()> {
        example.validate()?;
        let label = example.diagnosis.trim().to_lowercase();

        let _writer = self.writer.lock().map_err(poisoned)?;
        let mut next = self.model.read().map_err(poisoned)?.clone();
        let doc = next.vectorize(&example.symptoms);
        if doc.is_empty() {
            debug!("Training text for '{label}' has no known terms; only the prior changes");
        }
        next.update(&doc, &label);
        self.store.save(&next)?;

        let total = next.total_documents();
        *self.model.write().map_err(poisoned)? = next;
        info!("Learned example for '{label}' ({total} documents total)");
        Ok(())
    }
}
