//! Error types for reqbench
//!
//! Only a few of these ever reach a caller of the engine. Script, template and
//! encoding problems are absorbed where they happen; dispatch problems are
//! folded into `ExecutionResult::error`. What remains are lookup misses at the
//! workbench boundary and configuration/workspace loading failures.

use thiserror::Error;

/// Main error type for reqbench
#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("{kind} {id} not found")]
    NotFound {
        kind: &'static str,
        id: i64,
    },

    #[error("Invalid argument: {0}")]
    Argument(String),
}

impl WorkbenchError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        WorkbenchError::NotFound { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, WorkbenchError>;
