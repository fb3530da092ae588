// src/lib.rs

pub mod api;
pub mod config;
pub mod core;
pub mod enrichment;
pub mod error;
pub mod learning;
pub mod persistence;
pub mod provider;

pub use crate::config::EngineConfig;
pub use crate::core::engine::DiagnosisEngine;
pub use crate::core::types::{DiagnosisResult, StrategyKind, UserQuery};
pub use crate::error::{DiagnosisError, Result};
