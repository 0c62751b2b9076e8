//! The root diagram type and its global rendering options.
//!
//! - [`Diagram`] - title, options, clusters, nodes and edges
//! - [`DiagramOptions`] - font, background, spacing and output settings
//! - [`RankDirection`], [`SplineStyle`], [`ImageFormat`] - option enums

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    color::Color,
    identifier::Id,
    semantic::element::{Cluster, Edge, Node},
};

/// File stem used when a diagram has neither a title nor an explicit filename.
pub const DEFAULT_FILE_STEM: &str = "diagrams_image";

/// Errors raised while populating a [`Diagram`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("node `{0}` is declared more than once")]
    DuplicateNode(Id),

    #[error("cluster `{0}` is declared more than once")]
    DuplicateCluster(Id),
}

/// Direction in which graph ranks are laid out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum RankDirection {
    /// Left to right (default)
    #[default]
    #[serde(alias = "lr")]
    LR,
    /// Right to left
    #[serde(alias = "rl")]
    RL,
    /// Top to bottom
    #[serde(alias = "tb")]
    TB,
    /// Bottom to top
    #[serde(alias = "bt")]
    BT,
}

impl FromStr for RankDirection {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            "TB" => Ok(Self::TB),
            "BT" => Ok(Self::BT),
            _ => Err("Unsupported rank direction"),
        }
    }
}

impl From<RankDirection> for &'static str {
    fn from(val: RankDirection) -> Self {
        match val {
            RankDirection::LR => "LR",
            RankDirection::RL => "RL",
            RankDirection::TB => "TB",
            RankDirection::BT => "BT",
        }
    }
}

impl fmt::Display for RankDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// How edges are routed between nodes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplineStyle {
    /// Axis-aligned segments (default)
    #[default]
    Ortho,
    Curved,
    Spline,
    Polyline,
}

impl FromStr for SplineStyle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ortho" => Ok(Self::Ortho),
            "curved" => Ok(Self::Curved),
            "spline" => Ok(Self::Spline),
            "polyline" => Ok(Self::Polyline),
            _ => Err("Unsupported spline style"),
        }
    }
}

impl From<SplineStyle> for &'static str {
    fn from(val: SplineStyle) -> Self {
        match val {
            SplineStyle::Ortho => "ortho",
            SplineStyle::Curved => "curved",
            SplineStyle::Spline => "spline",
            SplineStyle::Polyline => "polyline",
        }
    }
}

impl fmt::Display for SplineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Output image format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// PNG raster image (default)
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    /// Graphviz source text
    Dot,
}

impl ImageFormat {
    /// File extension for this format, without the leading dot.
    pub fn extension(self) -> &'static str {
        self.into()
    }
}

impl FromStr for ImageFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" | "gv" => Ok(Self::Dot),
            _ => Err("Unsupported image format"),
        }
    }
}

impl From<ImageFormat> for &'static str {
    fn from(val: ImageFormat) -> Self {
        match val {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Dot => "dot",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Global rendering options of a diagram.
///
/// Defaults follow the look of the classic Python `diagrams` package: 15pt
/// Sans-Serif title, left-to-right ranks, orthogonal edges and a 2.0 inch pad.
///
/// # Examples
///
/// ```
/// use stratus_core::{color::Color, semantic::DiagramOptions};
///
/// let options = DiagramOptions::default()
///     .with_font_size(30.0)
///     .with_background_color(Color::new("white").ok())
///     .with_margin(Some(0.0))
///     .with_pad(0.5);
///
/// assert_eq!(options.font_size(), 30.0);
/// assert_eq!(options.pad(), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramOptions {
    font_size: f32,
    font_name: String,
    background_color: Option<Color>,
    margin: Option<f32>,
    pad: f32,
    direction: RankDirection,
    splines: SplineStyle,
    filename: Option<String>,
    format: Option<ImageFormat>,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            font_size: 15.0,
            font_name: "Sans-Serif".to_string(),
            background_color: None,
            margin: None,
            pad: 2.0,
            direction: RankDirection::default(),
            splines: SplineStyle::default(),
            filename: None,
            format: None,
        }
    }
}

impl DiagramOptions {
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_font_name(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    pub fn with_background_color(mut self, color: Option<Color>) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_margin(mut self, margin: Option<f32>) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_pad(mut self, pad: f32) -> Self {
        self.pad = pad;
        self
    }

    pub fn with_direction(mut self, direction: RankDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_splines(mut self, splines: SplineStyle) -> Self {
        self.splines = splines;
        self
    }

    /// Overrides the output file stem derived from the title.
    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    /// Overrides the output format chosen by configuration.
    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn margin(&self) -> Option<f32> {
        self.margin
    }

    pub fn pad(&self) -> f32 {
        self.pad
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    pub fn splines(&self) -> SplineStyle {
        self.splines
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}

/// A complete diagram: title, options, clusters, nodes and edges.
///
/// Elements are kept in declaration order. Adding an element never checks
/// references; that happens when the diagram is turned into a hierarchy for
/// rendering, so a `Diagram` assembled by hand can still be rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    title: String,
    options: DiagramOptions,
    clusters: IndexMap<Id, Cluster>,
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new(title: impl Into<String>, options: DiagramOptions) -> Self {
        Self {
            title: title.into(),
            options,
            clusters: IndexMap::new(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Add a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateCluster`] if a cluster with the same id exists.
    pub fn add_cluster(&mut self, cluster: Cluster) -> Result<(), ModelError> {
        if self.clusters.contains_key(&cluster.id()) {
            return Err(ModelError::DuplicateCluster(cluster.id()));
        }
        self.clusters.insert(cluster.id(), cluster);
        Ok(())
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateNode`] if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.nodes.contains_key(&node.id()) {
            return Err(ModelError::DuplicateNode(node.id()));
        }
        self.nodes.insert(node.id(), node);
        Ok(())
    }

    /// Add an edge.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    pub fn cluster(&self, id: Id) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Clusters in declaration order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the file stem the rendered image is saved under.
    ///
    /// The explicit filename option wins; otherwise the title's words are
    /// joined with underscores and lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_core::semantic::{Diagram, DiagramOptions};
    ///
    /// let diagram = Diagram::new("Azure AKS  High Availability", DiagramOptions::default());
    /// assert_eq!(diagram.file_stem(), "azure_aks_high_availability");
    ///
    /// let named = Diagram::new(
    ///     "Azure AKS High Availability",
    ///     DiagramOptions::default().with_filename(Some("aks_ha_architecture".into())),
    /// );
    /// assert_eq!(named.file_stem(), "aks_ha_architecture");
    /// ```
    pub fn file_stem(&self) -> String {
        if let Some(filename) = self.options.filename().filter(|name| !name.is_empty()) {
            return filename.to_string();
        }

        let stem = self
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase();

        if stem.is_empty() {
            DEFAULT_FILE_STEM.to_string()
        } else {
            stem
        }
    }
}
