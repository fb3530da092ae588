//! Configuration for the diagnosis engine.

use crate::core::classifier::DEFAULT_SMOOTHING;
use crate::core::matcher::TieBreak;
use crate::core::types::StrategyKind;
use crate::error::{DiagnosisError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Prefix of every environment variable read by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "CONSULTA_";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Strategy used when a request does not name one
    pub strategy: StrategyKind,
    /// Ranking policy of the rule-based matcher
    pub tie_break: TieBreak,
    /// Additive smoothing constant of the classifier
    pub smoothing: f64,
    /// JSON catalog with diseases and the symptom vocabulary
    pub catalog_path: PathBuf,
    /// Classifier snapshot
    pub model_path: PathBuf,
    /// Attach encyclopedia descriptions to rule-based diagnoses
    pub describe: bool,
    pub wiki_base_url: String,
    pub http_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::RuleBased,
            tie_break: TieBreak::FirstStrict,
            smoothing: DEFAULT_SMOOTHING,
            catalog_path: PathBuf::from("data/catalog.json"),
            model_path: PathBuf::from("data/modelo.bin"),
            describe: false,
            wiki_base_url: "https://es.wikipedia.org/wiki".to_string(),
            http_timeout_secs: 10,
        }
    }
}

fn parse_var<T, E>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr<Err = E>,
    E: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| DiagnosisError::validation(format!("{ENV_PREFIX}{name}: {e}")))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "si" | "sí" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(DiagnosisError::validation(format!(
            "{ENV_PREFIX}{name}: expected a boolean, got '{other}'"
        ))),
    }
}

impl EngineConfig {
    /// Defaults overridden by `CONSULTA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup("STRATEGY") {
            config.strategy = parse_var("STRATEGY", &raw)?;
        }
        if let Some(raw) = lookup("TIE_BREAK") {
            config.tie_break = parse_var("TIE_BREAK", &raw)?;
        }
        if let Some(raw) = lookup("SMOOTHING") {
            config.smoothing = parse_var("SMOOTHING", &raw)?;
        }
        if let Some(raw) = lookup("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("MODEL_PATH") {
            config.model_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("DESCRIBE") {
            config.describe = parse_bool("DESCRIBE", &raw)?;
        }
        if let Some(raw) = lookup("WIKI_BASE_URL") {
            config.wiki_base_url = raw;
        }
        if let Some(raw) = lookup("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_var("HTTP_TIMEOUT_SECS", &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(DiagnosisError::validation(format!(
                "{ENV_PREFIX}SMOOTHING must be a positive number, got {}",
                self.smoothing
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(DiagnosisError::validation(format!(
                "{ENV_PREFIX}HTTP_TIMEOUT_SECS must be at least 1"
            )));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.tie_break, TieBreak::FirstStrict);
    }

    #[test]
    fn variables_override_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("STRATEGY", "bayes"),
            ("TIE_BREAK", "mejor"),
            ("SMOOTHING", "0.5"),
            ("DESCRIBE", "sí"),
            ("MODEL_PATH", "/tmp/m.bin"),
        ]))
        .unwrap();
        assert_eq!(config.strategy, StrategyKind::Probabilistic);
        assert_eq!(config.tie_break, TieBreak::BestEligible);
        assert_eq!(config.smoothing, 0.5);
        assert!(config.describe);
        assert_eq!(config.model_path, PathBuf::from("/tmp/m.bin"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = EngineConfig::from_lookup(lookup(&[("SMOOTHING", "-1")])).unwrap_err();
        assert!(err.to_string().contains("CONSULTA_SMOOTHING"));
        let err = EngineConfig::from_lookup(lookup(&[("STRATEGY", "tarot")])).unwrap_err();
        assert!(err.to_string().contains("CONSULTA_STRATEGY"));
        let err = EngineConfig::from_lookup(lookup(&[("DESCRIBE", "quizás")])).unwrap_err();
        assert!(matches!(err, DiagnosisError::Validation(_)));
    }
}
