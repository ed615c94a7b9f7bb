//! Error types for funcloc.

use thiserror::Error;

/// Main error type for the analysis pipeline and language server.
#[derive(Error, Debug)]
pub enum FuncLocError {
    #[error("No active document")]
    NoActiveDocument,

    #[error("Symbol provider unavailable: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FuncLocError>;

/// Failures reported by a symbol provider.
///
/// The pipeline never propagates these; a failed provider call is the same
/// as a document without functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("failed to load grammar for {language}: {message}")]
    Grammar { language: String, message: String },

    #[error("parser produced no tree for {0}")]
    ParseFailed(String),

    #[error("{0}")]
    Other(String),
}
