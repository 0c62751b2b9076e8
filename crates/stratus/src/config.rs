//! Configuration types for Stratus rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML configuration file. Every field is optional; a missing section falls
//! back to its default.
//!
//! - [`AppConfig`] - Top-level configuration combining render and style settings.
//! - [`RenderConfig`] - Backend, forced output format and output locations.
//! - [`StyleConfig`] - Visual defaults such as the background color.
//!
//! # Example
//!
//! ```
//! # use stratus::config::AppConfig;
//! let config: AppConfig = toml::from_str(
//!     r#"
//!     [render]
//!     backend = "layout"
//!     format = "svg"
//!
//!     [style]
//!     background_color = "white"
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.render().backend().to_string(), "layout");
//! assert!(config.style().background_color().unwrap().is_some());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use stratus_core::{color::Color, semantic::ImageFormat};

use crate::backend::BackendKind;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    render: RenderConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(render: RenderConfig, style: StyleConfig) -> Self {
        Self { render, style }
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Replaces the render section, keeping the style section.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// Where and how diagrams are rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Backend that turns a diagram into image bytes.
    #[serde(default)]
    backend: BackendKind,

    /// Output format forced on every diagram, overriding the diagram's own choice.
    #[serde(default)]
    format: Option<ImageFormat>,

    /// Directory output files are written to. Defaults to the working directory.
    #[serde(default)]
    output_dir: Option<PathBuf>,

    /// Root of the icon tree, laid out as `<provider>/<group>/<kind>.png`.
    #[serde(default)]
    icons_dir: Option<PathBuf>,
}

impl RenderConfig {
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn icons_dir(&self) -> Option<&Path> {
        self.icons_dir.as_deref()
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_icons_dir(mut self, icons_dir: Option<PathBuf>) -> Self {
        self.icons_dir = icons_dir;
        self
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to the diagram's own options and then
/// to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    /// Background color used when a diagram does not set its own.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    pub fn new(background_color: Option<String>) -> Self {
        Self { background_color }
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}
