//! Stratus - cloud architecture diagrams as code.
//!
//! Diagrams are declared through a scoped [`canvas::Canvas`] or loaded from a
//! TOML [`manifest`], validated into a cluster hierarchy, laid out by a render
//! [`backend`] and written to a single image file named after the title.

pub mod backend;
pub mod blueprints;
pub mod canvas;
pub mod config;
pub mod diagnostic;
pub mod manifest;
pub mod structure;

mod error;
mod output;
mod style;

pub use stratus_core::{category, color, identifier, semantic};

pub use error::{ReferenceError, StratusError};
pub use style::Theme;

use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use backend::Backend;
use canvas::Canvas;
use config::AppConfig;
use semantic::{Diagram, DiagramOptions, ImageFormat};
use structure::DiagramHierarchy;

/// Outcome of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    path: PathBuf,
    format: ImageFormat,
    bytes: usize,
    backend: &'static str,
}

impl Rendered {
    /// Path of the written file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Size of the written file in bytes.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Name of the backend that produced the file.
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

/// Builder for loading and rendering Stratus diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use stratus::{DiagramBuilder, config::AppConfig, semantic::DiagramOptions};
/// use stratus::category::catalog::azure;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// let rendered = builder
///     .draw("Web Service", DiagramOptions::default(), |canvas| {
///         let gateway = canvas.node("App Gateway", azure::network::application_gateway());
///         let sql = canvas.node("Azure SQL", azure::database::sql_database());
///         canvas.edge(gateway, sql)
///     })
///     .expect("Failed to render");
///
/// assert_eq!(rendered.path().to_str(), Some("web_service.png"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a TOML manifest into a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::Manifest`] with every problem found in `source`.
    pub fn parse(&self, source: &str) -> Result<Diagram, StratusError> {
        info!("Parsing manifest");
        let diagram = manifest::parse(source)?;

        debug!("Manifest parsed successfully");
        trace!(diagram:?; "Parsed diagram");
        Ok(diagram)
    }

    /// Declare a diagram on a fresh canvas and render it once `declare` returns.
    ///
    /// Nothing is written if `declare` fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `declare`, or any error from [`Self::render`].
    pub fn draw<F>(
        &self,
        title: impl Into<String>,
        options: DiagramOptions,
        declare: F,
    ) -> Result<Rendered, StratusError>
    where
        F: FnOnce(&mut Canvas) -> Result<(), StratusError>,
    {
        let mut canvas = Canvas::new(title, options);
        declare(&mut canvas)?;
        self.render(&canvas.finish())
    }

    /// Render `diagram` with the configured backend and write the image file.
    ///
    /// # Errors
    ///
    /// - [`StratusError::InvalidReference`] or [`StratusError::ClusterCycle`]
    ///   if the diagram is structurally invalid.
    /// - [`StratusError::BackendUnavailable`], [`StratusError::UnsupportedFormat`]
    ///   or [`StratusError::Render`] if the backend cannot produce the image.
    /// - [`StratusError::Io`] if the output file cannot be written.
    pub fn render(&self, diagram: &Diagram) -> Result<Rendered, StratusError> {
        let backend = backend::select(&self.config)?;
        self.render_with(diagram, backend.as_ref())
    }

    /// Render `diagram` with an explicit backend.
    ///
    /// The output format is the configured one if set, else the diagram's own,
    /// else PNG. The file is written atomically: on any error nothing appears
    /// at the output path.
    ///
    /// # Errors
    ///
    /// Same as [`Self::render`], minus backend selection.
    pub fn render_with(
        &self,
        diagram: &Diagram,
        backend: &dyn Backend,
    ) -> Result<Rendered, StratusError> {
        info!(title = diagram.title(), backend = backend.name(); "Building diagram structure");
        let hierarchy = DiagramHierarchy::from_diagram(diagram)?;
        debug!("Structure built successfully");

        let format = self
            .config
            .render()
            .format()
            .or(diagram.options().format())
            .unwrap_or_default();
        backend::ensure_supported(backend, format)?;

        let theme = Theme::from_config(&self.config, diagram.options())?;
        let bytes = backend.render(&hierarchy, &theme, format)?;

        let path = output::output_path(
            self.config.render().output_dir(),
            &diagram.file_stem(),
            format,
        );
        output::write_atomic(&path, &bytes)?;

        info!(path:? = path, format:% = format, bytes = bytes.len(); "Diagram rendered");
        Ok(Rendered {
            path,
            format,
            bytes: bytes.len(),
            backend: backend.name(),
        })
    }

    /// Returns the DOT source the Graphviz backend would receive for `diagram`.
    ///
    /// # Errors
    ///
    /// Returns the same structural and configuration errors as [`Self::render`].
    #[cfg(feature = "graphviz")]
    pub fn describe(&self, diagram: &Diagram) -> Result<String, StratusError> {
        let hierarchy = DiagramHierarchy::from_diagram(diagram)?;
        let theme = Theme::from_config(&self.config, diagram.options())?;
        Ok(backend::to_dot(&hierarchy, &theme))
    }
}
