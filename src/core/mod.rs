pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod matcher;
pub mod types;
pub mod vectorizer;
pub mod vocabulary;
