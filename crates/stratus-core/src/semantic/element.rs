//! Diagram elements: nodes, clusters and edges.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{category::Category, color::Color, identifier::Id};

/// A labeled vertex representing one architecture element.
///
/// Nodes are immutable once created. The owning cluster, if any, is referenced
/// by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    label: String,
    category: Category,
    cluster: Option<Id>,
}

impl Node {
    /// Create a new node.
    pub fn new(id: Id, label: impl Into<String>, category: Category, cluster: Option<Id>) -> Self {
        Self {
            id,
            label: label.into(),
            category,
            cluster,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The cluster this node is drawn inside, or `None` for a top-level node.
    pub fn cluster(&self) -> Option<Id> {
        self.cluster
    }
}

/// A named visual grouping of nodes and nested clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: Id,
    label: String,
    parent: Option<Id>,
}

impl Cluster {
    /// Create a new cluster, nested in `parent` when given.
    pub fn new(id: Id, label: impl Into<String>, parent: Option<Id>) -> Self {
        Self {
            id,
            label: label.into(),
            parent,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }
}

/// Arrowheads drawn on an edge.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Arrow at the target (`a >> b`).
    #[default]
    Forward,
    /// Arrow at the source (`a << b`).
    Back,
    /// Arrows at both ends (`a << Edge() >> b`).
    Both,
    /// No arrows (`a - b`).
    None,
}

impl Direction {
    /// Returns true if the edge has at least one arrowhead.
    pub fn is_directed(self) -> bool {
        self != Self::None
    }
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "back" => Ok(Self::Back),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            _ => Err("Unsupported edge direction"),
        }
    }
}

impl From<Direction> for &'static str {
    fn from(val: Direction) -> Self {
        match val {
            Direction::Forward => "forward",
            Direction::Back => "back",
            Direction::Both => "both",
            Direction::None => "none",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Line pattern of an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl FromStr for EdgeStyle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            _ => Err("Unsupported edge style"),
        }
    }
}

impl From<EdgeStyle> for &'static str {
    fn from(val: EdgeStyle) -> Self {
        match val {
            EdgeStyle::Solid => "solid",
            EdgeStyle::Dashed => "dashed",
            EdgeStyle::Dotted => "dotted",
            EdgeStyle::Bold => "bold",
        }
    }
}

impl fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A connection between two nodes.
///
/// The pair is ordered (`source`, `target`) even for [`Direction::None`] and
/// [`Direction::Both`]; the direction only decides which arrowheads are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: Id,
    target: Id,
    direction: Direction,
    label: Option<String>,
    color: Option<Color>,
    style: EdgeStyle,
}

impl Edge {
    /// Create a new edge with default styling.
    pub fn new(source: Id, target: Id, direction: Direction) -> Self {
        Self {
            source,
            target,
            direction,
            label: None,
            color: None,
            style: EdgeStyle::default(),
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn style(&self) -> EdgeStyle {
        self.style
    }
}
