//! Scoped construction of diagrams.
//!
//! A [`Canvas`] is a diagram under construction. Nodes, clusters and edges are
//! declared through it, or through a [`Scope`] when they belong to a cluster.
//! Opening a cluster hands a child [`Scope`] to a closure; everything declared
//! through that scope lands in the cluster, and the cluster is closed as soon
//! as the closure returns.
//!
//! ```
//! use stratus::canvas::{Canvas, Link};
//! use stratus::category::catalog::{azure, k8s};
//! use stratus::semantic::DiagramOptions;
//!
//! # fn main() -> Result<(), stratus::StratusError> {
//! let mut canvas = Canvas::new("Web Tier", DiagramOptions::default());
//! let gateway = canvas.node("App Gateway", azure::network::application_gateway());
//!
//! let ingress = canvas.cluster("AKS", |aks| {
//!     let ingress = aks.node("Ingress", k8s::network::ingress());
//!     let service = aks.node("Web Service", k8s::network::service());
//!     aks.edge(service, ingress)?;
//!     Ok(ingress)
//! })?;
//!
//! canvas.link(gateway, ingress, Link::forward().with_label("HTTPS"))?;
//!
//! let diagram = canvas.finish();
//! assert_eq!(diagram.nodes().count(), 3);
//! assert_eq!(diagram.clusters().count(), 1);
//! assert_eq!(diagram.edges().len(), 2);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};

use stratus_core::{
    category::Category,
    color::Color,
    identifier::Id,
    semantic::{Cluster, Diagram, DiagramOptions, Direction, Edge, EdgeStyle, Node},
};

use crate::error::{ReferenceError, StratusError};

/// Source of canvas identities, so handles from one canvas are rejected by another.
static NEXT_CANVAS: AtomicU64 = AtomicU64::new(0);

/// Handle to a node declared on a [`Canvas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    canvas: u64,
    id: Id,
}

impl NodeRef {
    /// The node's identifier in the finished [`Diagram`].
    pub fn id(&self) -> Id {
        self.id
    }
}

/// Styling of an edge: arrowheads, label, color and line pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    direction: Direction,
    label: Option<String>,
    color: Option<Color>,
    style: EdgeStyle,
}

impl Link {
    /// Arrow from source to target.
    pub fn forward() -> Self {
        Self::with_direction(Direction::Forward)
    }

    /// Arrow from target back to source.
    pub fn back() -> Self {
        Self::with_direction(Direction::Back)
    }

    /// Arrows at both ends.
    pub fn both() -> Self {
        Self::with_direction(Direction::Both)
    }

    /// A plain line with no arrows.
    pub fn undirected() -> Self {
        Self::with_direction(Direction::None)
    }

    fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// A diagram under construction.
///
/// The canvas owns the [`Diagram`] being built and generates sequential
/// identifiers for everything declared on it, so building the same canvas
/// twice yields equal diagrams.
#[derive(Debug)]
pub struct Canvas {
    token: u64,
    diagram: Diagram,
    next_node: usize,
    next_cluster: usize,
}

impl Canvas {
    /// Start a new diagram with the given title and global options.
    pub fn new(title: impl Into<String>, options: DiagramOptions) -> Self {
        let diagram = Diagram::new(title, options);
        debug!(title = diagram.title(); "Opened canvas");
        Self {
            token: NEXT_CANVAS.fetch_add(1, Ordering::Relaxed),
            diagram,
            next_node: 0,
            next_cluster: 0,
        }
    }

    /// The top-level scope of this canvas.
    pub fn root(&mut self) -> Scope<'_> {
        Scope {
            canvas: self,
            cluster: None,
        }
    }

    /// Declare a top-level node.
    pub fn node(&mut self, label: impl Into<String>, category: Category) -> NodeRef {
        self.root().node(label, category)
    }

    /// Open a top-level cluster for the duration of `populate`.
    ///
    /// # Errors
    ///
    /// Returns whatever error `populate` returns.
    pub fn cluster<T, F>(&mut self, label: impl Into<String>, populate: F) -> Result<T, StratusError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<T, StratusError>,
    {
        self.root().cluster(label, populate)
    }

    /// Declare a forward edge from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] if either handle was not
    /// issued by this canvas.
    pub fn edge(&mut self, source: NodeRef, target: NodeRef) -> Result<(), StratusError> {
        self.root().edge(source, target)
    }

    /// Declare an edge with explicit styling.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] if either handle was not
    /// issued by this canvas.
    pub fn link(&mut self, source: NodeRef, target: NodeRef, link: Link) -> Result<(), StratusError> {
        self.root().link(source, target, link)
    }

    /// Declare a forward edge from `source` to each of `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] on the first foreign handle.
    pub fn fan_out(&mut self, source: NodeRef, targets: &[NodeRef]) -> Result<(), StratusError> {
        self.root().fan_out(source, targets)
    }

    /// Declare a forward edge from each of `sources` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] on the first foreign handle.
    pub fn fan_in(&mut self, sources: &[NodeRef], target: NodeRef) -> Result<(), StratusError> {
        self.root().fan_in(sources, target)
    }

    /// The diagram declared so far.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Stop building and return the finished diagram.
    pub fn finish(self) -> Diagram {
        debug!(
            nodes = self.next_node,
            clusters = self.next_cluster,
            edges = self.diagram.edges().len();
            "Closed canvas"
        );
        self.diagram
    }

    fn resolve(&self, handle: NodeRef) -> Result<Id, StratusError> {
        if handle.canvas != self.token {
            return Err(ReferenceError::ForeignHandle {
                node: handle.id.to_string(),
            }
            .into());
        }
        Ok(handle.id)
    }
}

/// Declaration context for one level of nesting.
///
/// The root scope of a [`Canvas`] declares top-level elements; the scope
/// passed to a [`Scope::cluster`] closure declares members of that cluster.
/// Edges may be declared from any scope and may cross cluster boundaries.
#[derive(Debug)]
pub struct Scope<'c> {
    canvas: &'c mut Canvas,
    cluster: Option<Id>,
}

impl Scope<'_> {
    /// The cluster this scope declares into, or `None` at the top level.
    pub fn cluster_id(&self) -> Option<Id> {
        self.cluster
    }

    /// Declare a node in this scope.
    pub fn node(&mut self, label: impl Into<String>, category: Category) -> NodeRef {
        let id = Id::sequential("node", self.canvas.next_node);
        self.canvas.next_node += 1;

        let node = Node::new(id, label, category, self.cluster);
        trace!(node:?; "Declared node");
        self.canvas
            .diagram
            .add_node(node)
            .expect("generated node ids are unique");

        NodeRef {
            canvas: self.canvas.token,
            id,
        }
    }

    /// Declare several nodes of the same category, one per label.
    pub fn nodes<I, S>(&mut self, labels: I, category: Category) -> Vec<NodeRef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        labels
            .into_iter()
            .map(|label| self.node(label, category))
            .collect()
    }

    /// Open a nested cluster for the duration of `populate`.
    ///
    /// The cluster exists as soon as this is called, so it is kept even if
    /// `populate` fails; the error still aborts the whole diagram.
    ///
    /// # Errors
    ///
    /// Returns whatever error `populate` returns.
    pub fn cluster<T, F>(&mut self, label: impl Into<String>, populate: F) -> Result<T, StratusError>
    where
        F: FnOnce(&mut Scope<'_>) -> Result<T, StratusError>,
    {
        let id = Id::sequential("cluster", self.canvas.next_cluster);
        self.canvas.next_cluster += 1;

        let cluster = Cluster::new(id, label, self.cluster);
        debug!(cluster = cluster.label(), parent:? = self.cluster; "Opened cluster");
        self.canvas
            .diagram
            .add_cluster(cluster)
            .expect("generated cluster ids are unique");

        let mut inner = Scope {
            canvas: &mut *self.canvas,
            cluster: Some(id),
        };
        let result = populate(&mut inner);

        trace!(cluster:% = id, ok = result.is_ok(); "Closed cluster");
        result
    }

    /// Declare a forward edge from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] if either handle was not
    /// issued by this canvas.
    pub fn edge(&mut self, source: NodeRef, target: NodeRef) -> Result<(), StratusError> {
        self.link(source, target, Link::forward())
    }

    /// Declare an edge with explicit styling.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] if either handle was not
    /// issued by this canvas.
    pub fn link(&mut self, source: NodeRef, target: NodeRef, link: Link) -> Result<(), StratusError> {
        let source = self.canvas.resolve(source)?;
        let target = self.canvas.resolve(target)?;

        let edge = Edge::new(source, target, link.direction)
            .with_label(link.label)
            .with_color(link.color)
            .with_style(link.style);
        trace!(edge:?; "Declared edge");
        self.canvas.diagram.add_edge(edge);
        Ok(())
    }

    /// Declare a forward edge from `source` to each of `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] on the first foreign handle.
    pub fn fan_out(&mut self, source: NodeRef, targets: &[NodeRef]) -> Result<(), StratusError> {
        targets
            .iter()
            .try_for_each(|target| self.edge(source, *target))
    }

    /// Declare a forward edge from each of `sources` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StratusError::InvalidReference`] on the first foreign handle.
    pub fn fan_in(&mut self, sources: &[NodeRef], target: NodeRef) -> Result<(), StratusError> {
        sources
            .iter()
            .try_for_each(|source| self.edge(*source, target))
    }
}
