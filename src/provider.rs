//! Catalog providers: where disease records and the symptom vocabulary come from.

use crate::core::catalog::DiseaseCatalog;
use crate::core::types::{parse_symptom_list, DemographicConstraint, DiseaseRecord, GenderRestriction};
use crate::core::vocabulary::SymptomVocabulary;
use crate::persistence::StoreError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub trait CatalogProvider: Send + Sync {
    fn load_diseases(&self) -> Result<DiseaseCatalog, StoreError>;
    fn load_symptom_vocabulary(&self) -> Result<SymptomVocabulary, StoreError>;

    /// Vocabulary and diseases from one consistent read of the source.
    fn load_catalog(&self) -> Result<(SymptomVocabulary, DiseaseCatalog), StoreError> {
        Ok((self.load_symptom_vocabulary()?, self.load_diseases()?))
    }

    /// Treatment text for a disease, `Ok(None)` when the disease has none.
    fn lookup_treatment(&self, disease: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .load_diseases()?
            .find(disease)
            .map(|record| record.treatment.clone())
            .filter(|t| !t.trim().is_empty()))
    }
}

/// A disease row as stored: symptoms are one comma separated string and the
/// demographic restriction columns are all optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseRow {
    pub nombre: String,
    pub sintomas: String,
    #[serde(default)]
    pub edad_minima: Option<u32>,
    #[serde(default)]
    pub edad_maxima: Option<u32>,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    pub tratamiento: Option<String>,
}

impl From<DiseaseRow> for DiseaseRecord {
    fn from(row: DiseaseRow) -> Self {
        DiseaseRecord::new(&row.nombre, parse_symptom_list(&row.sintomas))
            .with_constraint(DemographicConstraint {
                min_age: row.edad_minima,
                max_age: row.edad_maxima,
                gender: GenderRestriction::from_catalog(row.genero.as_deref()),
            })
            .with_treatment(row.tratamiento.as_deref().unwrap_or_default())
    }
}

/// On-disk catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub sintomas: Vec<String>,
    pub enfermedades: Vec<DiseaseRow>,
}

impl CatalogFile {
    pub fn into_parts(self) -> (SymptomVocabulary, DiseaseCatalog) {
        let vocabulary = self.sintomas.iter().collect();
        let catalog = self.enfermedades.into_iter().map(DiseaseRecord::from).collect();
        (vocabulary, catalog)
    }
}

fn warn_unknown_symptoms(catalog: &DiseaseCatalog, vocabulary: &SymptomVocabulary) {
    for (disease, symptom) in catalog.unknown_symptoms(vocabulary) {
        warn!("Disease '{disease}' lists symptom '{symptom}' which is not in the vocabulary");
    }
}

/// Fixed catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    vocabulary: SymptomVocabulary,
    catalog: DiseaseCatalog,
}

impl InMemoryCatalog {
    pub fn new(vocabulary: SymptomVocabulary, catalog: DiseaseCatalog) -> Self {
        warn_unknown_symptoms(&catalog, &vocabulary);
        Self { vocabulary, catalog }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn load_diseases(&self) -> Result<DiseaseCatalog, StoreError> {
        Ok(self.catalog.clone())
    }

    fn load_symptom_vocabulary(&self) -> Result<SymptomVocabulary, StoreError> {
        Ok(self.vocabulary.clone())
    }
}

/// Reads a [`CatalogFile`] on every call, so edits to the file are picked
/// up between requests.
#[derive(Debug, Clone)]
pub struct JsonCatalogProvider {
    path: PathBuf,
}

impl JsonCatalogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CatalogFile, StoreError> {
        let file = File::open(&self.path)?;
        let document: CatalogFile = serde_json::from_reader(BufReader::new(file))?;
        Ok(document)
    }
}

impl CatalogProvider for JsonCatalogProvider {
    fn load_diseases(&self) -> Result<DiseaseCatalog, StoreError> {
        self.load_catalog().map(|(_, catalog)| catalog)
    }

    fn load_symptom_vocabulary(&self) -> Result<SymptomVocabulary, StoreError> {
        let document = self.read()?;
        Ok(document.sintomas.iter().collect())
    }

    fn load_catalog(&self) -> Result<(SymptomVocabulary, DiseaseCatalog), StoreError> {
        let (vocabulary, catalog) = self.read()?.into_parts();
        warn_unknown_symptoms(&catalog, &vocabulary);
        info!("Loaded {} diseases from {}", catalog.len(), self.path.display());
        Ok((vocabulary, catalog))
    }
}
