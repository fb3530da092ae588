//! Transport-neutral request and response shapes.
//!
//! Field names follow the consultation form (`sintomas`, `edad`, `genero`)
//! so any transport can forward bodies without renaming.

use crate::core::engine::DiagnosisEngine;
use crate::core::types::{DiagnosisResult, StrategyKind, UserQuery};
use crate::error::{DiagnosisError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TRAINED_MESSAGE: &str = "Modelo actualizado correctamente";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    pub sintomas: String,
    /// Number or numeric string; empty and null count as absent.
    #[serde(default)]
    pub edad: Option<Value>,
    #[serde(default)]
    pub genero: Option<String>,
    /// `reglas` or `bayes`; the engine default when absent.
    #[serde(default)]
    pub estrategia: Option<String>,
}

fn parse_age(raw: Option<&Value>) -> Result<Option<u32>> {
    let invalid = || DiagnosisError::validation("La edad debe ser un número entero positivo");
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

impl DiagnoseRequest {
    pub fn into_query(self) -> Result<(UserQuery, Option<StrategyKind>)> {
        let strategy = match self.estrategia.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(name.parse::<StrategyKind>().map_err(DiagnosisError::Validation)?),
        };
        let query = UserQuery {
            age: parse_age(self.edad.as_ref())?,
            symptoms: self.sintomas,
            gender: self.genero.filter(|g| !g.trim().is_empty()),
        };
        Ok((query, strategy))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnoseResponse {
    pub diagnostico: String,
    pub tratamiento: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

impl From<DiagnosisResult> for DiagnoseResponse {
    fn from(result: DiagnosisResult) -> Self {
        Self {
            diagnostico: result.diagnosis,
            tratamiento: result.treatment,
            descripcion: result.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainRequest {
    #[serde(default)]
    pub sintomas: String,
    #[serde(default)]
    pub diagnostico: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A status code and a JSON body, ready for any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::from(DiagnosisError::unavailable(e.to_string())),
        }
    }
}

impl From<DiagnosisError> for Reply {
    fn from(err: DiagnosisError) -> Self {
        Self {
            status: err.status_code(),
            body: serde_json::json!(ErrorResponse {
                error: err.to_string()
            }),
        }
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| DiagnosisError::validation(format!("Solicitud inválida: {e}")))
}

/// `diagnosticar`: JSON body in, JSON reply out.
pub fn handle_diagnose(engine: &DiagnosisEngine, raw: &str) -> Reply {
    let outcome = parse_body::<DiagnoseRequest>(raw)
        .and_then(DiagnoseRequest::into_query)
        .and_then(|(query, strategy)| {
            engine.diagnose_with(&query, strategy.unwrap_or(engine.default_strategy()))
        });
    match outcome {
        Ok(result) => Reply::ok(&DiagnoseResponse::from(result)),
        Err(e) => e.into(),
    }
}

/// `entrenar`: one labeled example in, confirmation out.
pub fn handle_train(engine: &DiagnosisEngine, raw: &str) -> Reply {
    let outcome = parse_body::<TrainRequest>(raw)
        .and_then(|req| engine.train(&req.sintomas, &req.diagnostico));
    match outcome {
        Ok(()) => Reply::ok(&MessageResponse {
            message: TRAINED_MESSAGE.to_string(),
        }),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> DiagnoseRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn age_accepts_numbers_and_numeric_strings() {
        let (query, _) = request(json!({"sintomas": "tos", "edad": 42})).into_query().unwrap();
        assert_eq!(query.age, Some(42));
        let (query, _) = request(json!({"sintomas": "tos", "edad": " 7 "})).into_query().unwrap();
        assert_eq!(query.age, Some(7));
        let (query, _) = request(json!({"sintomas": "tos", "edad": ""})).into_query().unwrap();
        assert_eq!(query.age, None);
    }

    #[test]
    fn bad_age_is_a_validation_error() {
        for edad in [json!(-3), json!("doce"), json!(4.5), json!([1])] {
            let err = request(json!({"sintomas": "tos", "edad": edad})).into_query().unwrap_err();
            assert!(matches!(err, DiagnosisError::Validation(_)));
        }
    }

    #[test]
    fn strategy_field_is_optional() {
        let (_, strategy) = request(json!({"sintomas": "tos"})).into_query().unwrap();
        assert_eq!(strategy, None);
        let (_, strategy) = request(json!({"sintomas": "tos", "estrategia": "bayes"}))
            .into_query()
            .unwrap();
        assert_eq!(strategy, Some(StrategyKind::Probabilistic));
        assert!(request(json!({"sintomas": "tos", "estrategia": "?"})).into_query().is_err());
    }

    #[test]
    fn description_is_omitted_when_absent() {
        let response = DiagnoseResponse::from(DiagnosisResult {
            diagnosis: "gripe".into(),
            treatment: "Reposo".into(),
            description: None,
            strategy: StrategyKind::Probabilistic,
        });
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"diagnostico": "gripe", "tratamiento": "Reposo"})
        );
    }

    #[test]
    fn errors_become_error_bodies() {
        let reply = Reply::from(DiagnosisError::NotFound);
        assert_eq!(reply.status, 400);
        assert!(reply.body["error"].as_str().unwrap().starts_with("No se encontró"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let engine = DiagnosisEngine::new(StrategyKind::RuleBased);
        let reply = handle_diagnose(&engine, "{sintomas");
        assert_eq!(reply.status, 400);
    }
}
