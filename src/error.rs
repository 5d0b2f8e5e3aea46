//! Error types for document loading, graph building, and type resolution.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::DanglingRef;

/// Errors while loading and deserializing a source document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("document does not match the expected OpenAPI shape: {source}")]
    InvalidDocument {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            Self::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during type resolution or derived-artifact generation.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The descriptor matched none of the classification rules. Carries the
    /// offending shape serialized as JSON for diagnosis.
    #[error("unsupported type: {descriptor}")]
    UnsupportedType { descriptor: String },

    /// A reference survived binding without a target and was dereferenced.
    #[error("reference '{reference}' does not resolve to any schema in the document")]
    DanglingReference { reference: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from whole-document checks after construction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{} unresolved reference(s): {}", refs.len(), refs.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; "))]
    UnresolvedReferences { refs: Vec<DanglingRef> },

    #[error("operation code collision: '{first}' and '{second}' both hash to {code}")]
    CodeCollision {
        code: String,
        first: String,
        second: String,
    },

    #[error("duplicate operation id '{id}'")]
    DuplicateOperationId { id: String },
}

impl BuildError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnresolvedReferences { .. } => 1,
            Self::CodeCollision { .. } | Self::DuplicateOperationId { .. } => 2,
        }
    }
}

/// A resolution failure wrapped with the operation or schema being rendered,
/// so the report names the affected part of the document.
#[derive(Debug, Error)]
#[error("failed to render '{context}': {source}")]
pub struct RenderError {
    pub context: String,
    #[source]
    pub source: ResolveError,
}

impl RenderError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}
