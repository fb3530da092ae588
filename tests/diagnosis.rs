use consulta_core::api::{handle_diagnose, handle_train};
use consulta_core::core::classifier::{ClassifierModel, DEFAULT_SMOOTHING};
use consulta_core::core::types::TREATMENT_PLACEHOLDER;
use consulta_core::learning::{LearningEngine, TrainingExample};
use consulta_core::persistence::{FileModelStore, MemoryModelStore, ModelStore};
use consulta_core::{DiagnosisEngine, DiagnosisError, EngineConfig, StrategyKind, UserQuery};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const CATALOG: &str = include_str!("../data/catalog.json");

fn workspace() -> (TempDir, EngineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.json");
    fs::write(&catalog_path, CATALOG).unwrap();
    let config = EngineConfig {
        catalog_path,
        model_path: dir.path().join("modelo.bin"),
        ..EngineConfig::default()
    };
    (dir, config)
}

fn adult(symptoms: &str) -> UserQuery {
    UserQuery::new(symptoms).with_age(30).with_gender("femenino")
}

#[test]
fn rule_based_diagnosis_from_catalog_file() {
    let (_dir, config) = workspace();
    let engine = DiagnosisEngine::from_config(&config).unwrap();

    let result = engine.diagnose(&adult("Fiebre, tos")).unwrap();
    assert_eq!(result.diagnosis, "Gripe (influenza)");
    assert!(result.treatment.starts_with("Reposo"));
    assert!(result.description.is_none());

    // Alergia has no treatment column.
    let result = engine.diagnose(&adult("picazon, ojos llorosos")).unwrap();
    assert_eq!(result.diagnosis, "Alergia");
    assert_eq!(result.treatment, TREATMENT_PLACEHOLDER);
}

#[test]
fn empty_and_unknown_symptoms() {
    let (_dir, config) = workspace();
    let engine = DiagnosisEngine::from_config(&config).unwrap();

    let err = engine.diagnose(&adult("   ")).unwrap_err();
    assert!(matches!(err, DiagnosisError::Validation(_)));

    let err = engine.diagnose(&adult("hipo, insomnio")).unwrap_err();
    assert_eq!(err, DiagnosisError::NoRecognizedSymptoms);
}

#[test]
fn missing_catalog_is_a_server_error() {
    let (dir, mut config) = workspace();
    config.catalog_path = dir.path().join("missing.json");
    let engine = DiagnosisEngine::from_config(&config).unwrap();
    let err = engine.diagnose(&adult("fiebre")).unwrap_err();
    assert_eq!(err.status_code(), 500);
}

#[test]
fn first_start_bootstraps_a_snapshot() {
    let (_dir, config) = workspace();
    assert!(!config.model_path.exists());
    let engine = DiagnosisEngine::from_config(&config).unwrap();
    assert!(config.model_path.exists());

    let result = engine
        .diagnose_with(
            &UserQuery::new("estornudos congestion nasal dolor de garganta"),
            StrategyKind::Probabilistic,
        )
        .unwrap();
    assert_eq!(result.diagnosis, "resfriado comun");
}

#[test]
fn training_survives_a_restart() {
    let (_dir, config) = workspace();
    {
        let engine = DiagnosisEngine::from_config(&config).unwrap();
        for _ in 0..4 {
            engine.train("tos fiebre cansancio", "covid").unwrap();
        }
    }

    let saved = FileModelStore::new(&config.model_path).load().unwrap().unwrap();
    assert_eq!(saved.documents_for("covid"), 4);

    let engine = DiagnosisEngine::from_config(&config).unwrap();
    let result = engine
        .diagnose_with(&UserQuery::new("tos fiebre cansancio"), StrategyKind::Probabilistic)
        .unwrap();
    assert_eq!(result.diagnosis, "covid");
}

#[test]
fn unseen_words_stay_unseen() {
    let (_dir, config) = workspace();
    let engine = DiagnosisEngine::from_config(&config).unwrap();
    let query = UserQuery::new("anosmia");

    let before = engine.diagnose_with(&query, StrategyKind::Probabilistic);
    engine.train("anosmia anosmia", "covid").unwrap();
    engine.train("anosmia tos", "covid").unwrap();
    let after = engine.diagnose_with(&query, StrategyKind::Probabilistic);

    assert_eq!(before, Err(DiagnosisError::NoRecognizedSymptoms));
    assert_eq!(before, after);
}

#[test]
fn json_surface_round_trip() {
    let (_dir, config) = workspace();
    let engine = DiagnosisEngine::from_config(&config).unwrap();

    let reply = handle_diagnose(
        &engine,
        &json!({"sintomas": "fiebre, tos, dificultad respiratoria", "edad": "10", "genero": "masculino"})
            .to_string(),
    );
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body["diagnostico"], "Gripe (influenza)");
    assert!(reply.body.get("descripcion").is_none());

    let reply = handle_diagnose(&engine, &json!({"sintomas": "fiebre"}).to_string());
    assert_eq!(reply.status, 400);
    assert!(reply.body["error"].as_str().unwrap().contains("edad"));

    let reply = handle_train(&engine, &json!({"sintomas": "tos", "diagnostico": "gripe"}).to_string());
    assert_eq!(reply.status, 200);
    assert!(reply.body["message"].is_string());

    let reply = handle_train(&engine, &json!({"sintomas": "tos"}).to_string());
    assert_eq!(reply.status, 400);
}

#[test]
fn concurrent_predictions_and_updates() {
    let store = MemoryModelStore::new();
    let learning = Arc::new(
        LearningEngine::open(Box::new(store.clone()), DEFAULT_SMOOTHING).unwrap(),
    );

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let learning = Arc::clone(&learning);
            thread::spawn(move || {
                for _ in 0..25 {
                    learning
                        .learn(&TrainingExample::new("fiebre tos", "gripe"))
                        .unwrap();
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let learning = Arc::clone(&learning);
            thread::spawn(move || {
                for _ in 0..25 {
                    assert!(learning.predict("fiebre tos").is_ok());
                }
            })
        })
        .collect();
    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let model = learning.model();
    let model = model.read().unwrap();
    let bootstrap = ClassifierModel::fit(consulta_core::learning::BOOTSTRAP_CORPUS, DEFAULT_SMOOTHING);
    assert_eq!(
        model.documents_for("gripe"),
        bootstrap.documents_for("gripe") + 100
    );
    assert_eq!(store.snapshot().unwrap().total_documents(), model.total_documents());
}
