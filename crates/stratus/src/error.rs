//! Error types for Stratus operations.
//!
//! This module provides the main error type [`StratusError`] which wraps
//! every failure that can abort building or rendering a diagram. None of them
//! are recovered from: a failed render writes no output file.

use std::io;

use thiserror::Error;

use stratus_core::semantic::{ImageFormat, ModelError};

use crate::diagnostic::ManifestError;

/// A reference to a node or cluster that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("edge #{edge} references undeclared node `{node}`")]
    UnknownNode { edge: usize, node: String },

    #[error("node `{node}` belongs to undeclared cluster `{cluster}`")]
    UnknownOwner { node: String, cluster: String },

    #[error("cluster `{cluster}` is nested in undeclared cluster `{parent}`")]
    UnknownParent { cluster: String, parent: String },

    #[error("node `{node}` was declared on a different canvas")]
    ForeignHandle { node: String },
}

/// The main error type for Stratus operations.
///
/// # Diagnostic Variants
///
/// The `Manifest` variant carries structured diagnostics with source spans
/// together with the manifest text, so callers can render rich reports.
#[derive(Debug, Error)]
pub enum StratusError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),

    #[error("Cluster `{cluster}` is nested inside itself")]
    ClusterCycle { cluster: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("{err}")]
    Manifest { err: ManifestError, src: String },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend `{backend}` cannot produce {format} output")]
    UnsupportedFormat {
        backend: &'static str,
        format: ImageFormat,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StratusError {
    /// Create a new `Manifest` error with the associated manifest source.
    pub fn new_manifest_error(err: ManifestError, src: impl Into<String>) -> Self {
        Self::Manifest {
            err,
            src: src.into(),
        }
    }
}
