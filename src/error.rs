//! Error handling for the diagnosis core.

use thiserror::Error;

/// Every way a diagnosis or training request can fail.
///
/// The user-facing messages are the ones the consultation service has always
/// returned, so transports can forward `to_string()` unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiagnosisError {
    /// Missing or empty input (symptom text, age, gender, training label).
    #[error("{0}")]
    Validation(String),

    /// None of the supplied symptoms exist in the vocabulary.
    #[error("Ningún síntoma proporcionado coincide con nuestra base de datos")]
    NoRecognizedSymptoms,

    /// No disease scored above zero under its demographic constraints.
    #[error("No se encontró ninguna enfermedad que coincida con los síntomas proporcionados")]
    NotFound,

    /// The catalog, the model store or a strategy could not be reached.
    #[error("Servicio no disponible: {0}")]
    DependencyUnavailable(String),
}

impl DiagnosisError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DependencyUnavailable(msg.into())
    }

    /// HTTP-equivalent status for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::NoRecognizedSymptoms | Self::NotFound => 400,
            Self::DependencyUnavailable(_) => 500,
        }
    }

    /// Whether the caller sent a bad request (as opposed to a service fault).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Result type for diagnosis operations
pub type Result<T> = std::result::Result<T, DiagnosisError>;
