//! Render backends.
//!
//! A [`Backend`] turns a validated [`DiagramHierarchy`] into image bytes. Two
//! implementations exist:
//!
//! - [`GraphvizBackend`] (feature `graphviz`) - translates the hierarchy to DOT
//!   and runs the Graphviz `dot` executable.
//! - [`LayoutBackend`] - pure Rust SVG renderer built on `layout-rs`.
//!
//! [`BackendKind`] names a backend in configuration and [`select`] builds it.

#[cfg(feature = "graphviz")]
mod graphviz;
mod native;

use std::{fmt, str::FromStr};

use log::debug;
use serde::Deserialize;

use stratus_core::semantic::ImageFormat;

use crate::{config::AppConfig, error::StratusError, structure::DiagramHierarchy, style::Theme};

#[cfg(feature = "graphviz")]
pub use graphviz::{GraphvizBackend, to_dot};
pub use native::LayoutBackend;

/// A renderer that turns a diagram hierarchy into image bytes.
pub trait Backend {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Returns true if this backend can produce `format`.
    fn supports(&self, format: ImageFormat) -> bool;

    /// Render `hierarchy` into the bytes of a `format` file.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::UnsupportedFormat`] for formats outside
    /// [`Backend::supports`], [`StratusError::BackendUnavailable`] when the
    /// rendering engine cannot be started, and [`StratusError::Render`] when it
    /// fails.
    fn render(
        &self,
        hierarchy: &DiagramHierarchy<'_>,
        theme: &Theme,
        format: ImageFormat,
    ) -> Result<Vec<u8>, StratusError>;
}

/// Available render backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Graphviz `dot` executable
    Graphviz,
    /// Built-in `layout-rs` renderer, SVG only
    Layout,
}

impl Default for BackendKind {
    /// Graphviz when compiled in, the built-in renderer otherwise.
    fn default() -> Self {
        if cfg!(feature = "graphviz") {
            Self::Graphviz
        } else {
            Self::Layout
        }
    }
}

impl FromStr for BackendKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graphviz" => Ok(Self::Graphviz),
            "layout" => Ok(Self::Layout),
            _ => Err("Unsupported backend"),
        }
    }
}

impl From<BackendKind> for &'static str {
    fn from(val: BackendKind) -> Self {
        match val {
            BackendKind::Graphviz => "graphviz",
            BackendKind::Layout => "layout",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Build the backend named in `config`.
///
/// # Errors
///
/// Returns [`StratusError::BackendUnavailable`] if the Graphviz backend is
/// requested but was not compiled in.
pub fn select(config: &AppConfig) -> Result<Box<dyn Backend>, StratusError> {
    let kind = config.render().backend();
    debug!(backend:% = kind; "Selecting backend");

    match kind {
        #[cfg(feature = "graphviz")]
        BackendKind::Graphviz => Ok(Box::new(GraphvizBackend::new())),
        #[cfg(not(feature = "graphviz"))]
        BackendKind::Graphviz => Err(StratusError::BackendUnavailable(
            "stratus was built without the `graphviz` feature".to_string(),
        )),
        BackendKind::Layout => Ok(Box::new(LayoutBackend::new())),
    }
}

/// Fails with [`StratusError::UnsupportedFormat`] unless `backend` supports `format`.
pub(crate) fn ensure_supported(
    backend: &dyn Backend,
    format: ImageFormat,
) -> Result<(), StratusError> {
    if backend.supports(format) {
        Ok(())
    } else {
        Err(StratusError::UnsupportedFormat {
            backend: backend.name(),
            format,
        })
    }
}
