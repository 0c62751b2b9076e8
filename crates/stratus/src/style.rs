//! Visual defaults shared by the render backends.
//!
//! The palette and sizes reproduce the classic look of cloud architecture
//! diagrams: icon nodes with the label below, rounded clusters whose
//! background alternates by nesting depth, and grey edges.

use std::path::{Path, PathBuf};

use log::trace;

use stratus_core::{category::Category, color::Color, semantic::DiagramOptions};

use crate::{config::AppConfig, error::StratusError};

pub const FONT_COLOR: &str = "#2D3436";
pub const EDGE_COLOR: &str = "#7B8894";
pub const CLUSTER_PEN_COLOR: &str = "#AEB6BE";

pub const NODE_SEP: f32 = 0.60;
pub const RANK_SEP: f32 = 0.75;

pub const NODE_FONT_SIZE: f32 = 13.0;
pub const NODE_SIZE: f32 = 1.4;
pub const CLUSTER_FONT_SIZE: f32 = 12.0;

/// Height of an icon node with a single-line label, in inches.
pub const ICON_NODE_HEIGHT: f32 = 1.9;
/// Extra height for every additional label line.
pub const LABEL_LINE_HEIGHT: f32 = 0.4;

const CLUSTER_BACKGROUNDS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

/// Background color of a cluster at the given nesting depth.
///
/// Top-level clusters use the first color; deeper clusters cycle through the
/// palette.
pub fn cluster_background(depth: usize) -> &'static str {
    CLUSTER_BACKGROUNDS[depth % CLUSTER_BACKGROUNDS.len()]
}

/// Fill color for a node drawn without an icon.
pub fn provider_color(category: Category) -> &'static str {
    match category.provider().as_string().as_str() {
        "azure" => "#0078D4",
        "k8s" => "#326CE5",
        "onprem" => "#E6522C",
        _ => EDGE_COLOR,
    }
}

/// Height of an icon node whose label spans `lines` lines.
pub fn icon_node_height(lines: usize) -> f32 {
    ICON_NODE_HEIGHT + LABEL_LINE_HEIGHT * lines.saturating_sub(1) as f32
}

/// Looks up node icons under a root directory.
#[derive(Debug, Clone, Default)]
pub struct IconResolver {
    root: Option<PathBuf>,
}

impl IconResolver {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Returns the icon file for `category` if one exists on disk.
    pub fn resolve(&self, category: Category) -> Option<PathBuf> {
        let root = self.root.as_deref()?;
        let path = Self::icon_path(root, category);
        let found = path.is_file();
        trace!(category:% = category, found; "Icon lookup");
        found.then_some(path)
    }

    fn icon_path(root: &Path, category: Category) -> PathBuf {
        root.join(category.provider().as_string())
            .join(category.group().as_string())
            .join(format!("{}.png", category.kind()))
    }
}

/// Resolved visual settings for one render.
#[derive(Debug, Clone)]
pub struct Theme {
    background_color: Option<Color>,
    icons: IconResolver,
}

impl Theme {
    /// Builds the theme for `options`, falling back to `config` for anything
    /// the diagram leaves unset.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::Config`] if the configured background color is
    /// invalid.
    pub fn from_config(config: &AppConfig, options: &DiagramOptions) -> Result<Self, StratusError> {
        let configured = config
            .style()
            .background_color()
            .map_err(StratusError::Config)?;

        Ok(Self {
            background_color: options.background_color().or(configured),
            icons: IconResolver::new(config.render().icons_dir().map(Path::to_path_buf)),
        })
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn icons(&self) -> &IconResolver {
        &self.icons
    }
}
