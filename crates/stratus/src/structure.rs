//! Validated cluster hierarchy of a diagram.
//!
//! [`DiagramHierarchy`] is what backends render from. Building it checks every
//! reference in a [`Diagram`] and proves the cluster nesting is a tree, then
//! indexes the tree so backends can walk it top-down in declaration order.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::{algo::toposort, graph::DiGraph};

use stratus_core::{
    identifier::Id,
    semantic::{Cluster, Diagram, Edge, Node},
};

use crate::error::{ReferenceError, StratusError};

/// Finds a cluster that takes part in a nesting cycle.
///
/// `nesting` lists `(parent, child)` pairs. Returns `None` when the nesting is
/// a forest. A cluster that is its own parent counts as a cycle.
pub(crate) fn find_nesting_cycle(clusters: &[Id], nesting: &[(Id, Id)]) -> Option<Id> {
    let mut graph = DiGraph::<Id, ()>::with_capacity(clusters.len(), nesting.len());
    let indices: HashMap<Id, _> = clusters
        .iter()
        .map(|id| (*id, graph.add_node(*id)))
        .collect();

    for (parent, child) in nesting {
        if let (Some(parent), Some(child)) = (indices.get(parent), indices.get(child)) {
            graph.add_edge(*parent, *child, ());
        }
    }

    toposort(&graph, None)
        .err()
        .map(|cycle| graph[cycle.node_id()])
}

/// A diagram whose references and nesting have been validated.
///
/// Building the hierarchy twice from equal diagrams yields equal hierarchies.
#[derive(Debug, PartialEq)]
pub struct DiagramHierarchy<'a> {
    diagram: &'a Diagram,
    root_clusters: Vec<Id>,
    root_nodes: Vec<Id>,
    child_clusters: HashMap<Id, Vec<Id>>,
    members: HashMap<Id, Vec<Id>>,
    depths: HashMap<Id, usize>,
}

impl<'a> DiagramHierarchy<'a> {
    /// Validate `diagram` and index its cluster tree.
    ///
    /// # Errors
    ///
    /// - [`StratusError::InvalidReference`] if a node names an undeclared owning
    ///   cluster, a cluster names an undeclared parent, or an edge names an
    ///   undeclared node.
    /// - [`StratusError::ClusterCycle`] if clusters are nested inside themselves.
    pub fn from_diagram(diagram: &'a Diagram) -> Result<Self, StratusError> {
        for node in diagram.nodes() {
            if let Some(cluster) = node.cluster().filter(|id| diagram.cluster(*id).is_none()) {
                return Err(ReferenceError::UnknownOwner {
                    node: node.id().to_string(),
                    cluster: cluster.to_string(),
                }
                .into());
            }
        }

        for cluster in diagram.clusters() {
            if let Some(parent) = cluster.parent().filter(|id| diagram.cluster(*id).is_none()) {
                return Err(ReferenceError::UnknownParent {
                    cluster: cluster.id().to_string(),
                    parent: parent.to_string(),
                }
                .into());
            }
        }

        let cluster_ids: Vec<Id> = diagram.clusters().map(Cluster::id).collect();
        let nesting: Vec<(Id, Id)> = diagram
            .clusters()
            .filter_map(|cluster| cluster.parent().map(|parent| (parent, cluster.id())))
            .collect();
        if let Some(cluster) = find_nesting_cycle(&cluster_ids, &nesting) {
            let label = diagram
                .cluster(cluster)
                .map_or_else(|| cluster.to_string(), |c| c.label().to_string());
            return Err(StratusError::ClusterCycle { cluster: label });
        }

        for (index, edge) in diagram.edges().iter().enumerate() {
            for endpoint in [edge.source(), edge.target()] {
                if diagram.node(endpoint).is_none() {
                    return Err(ReferenceError::UnknownNode {
                        edge: index,
                        node: endpoint.to_string(),
                    }
                    .into());
                }
            }
        }

        let mut hierarchy = Self {
            diagram,
            root_clusters: Vec::new(),
            root_nodes: Vec::new(),
            child_clusters: HashMap::new(),
            members: HashMap::new(),
            depths: HashMap::new(),
        };

        for cluster in diagram.clusters() {
            match cluster.parent() {
                Some(parent) => hierarchy
                    .child_clusters
                    .entry(parent)
                    .or_default()
                    .push(cluster.id()),
                None => hierarchy.root_clusters.push(cluster.id()),
            }
        }

        for node in diagram.nodes() {
            match node.cluster() {
                Some(cluster) => hierarchy.members.entry(cluster).or_default().push(node.id()),
                None => hierarchy.root_nodes.push(node.id()),
            }
        }

        let mut pending: Vec<(Id, usize)> =
            hierarchy.root_clusters.iter().map(|id| (*id, 0)).collect();
        while let Some((cluster, depth)) = pending.pop() {
            hierarchy.depths.insert(cluster, depth);
            pending.extend(
                hierarchy
                    .child_clusters(cluster)
                    .iter()
                    .map(|child| (*child, depth + 1)),
            );
        }

        debug!(
            nodes = hierarchy.node_count(),
            clusters = hierarchy.cluster_count(),
            edges = hierarchy.edge_count(),
            max_depth = hierarchy.max_depth();
            "Hierarchy built"
        );
        trace!(hierarchy:?; "Validated hierarchy");

        Ok(hierarchy)
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    /// Clusters with no parent, in declaration order.
    pub fn root_clusters(&self) -> &[Id] {
        &self.root_clusters
    }

    /// Nodes outside every cluster, in declaration order.
    pub fn root_nodes(&self) -> &[Id] {
        &self.root_nodes
    }

    /// Clusters nested directly in `cluster`, in declaration order.
    pub fn child_clusters(&self, cluster: Id) -> &[Id] {
        self.child_clusters.get(&cluster).map_or(&[], Vec::as_slice)
    }

    /// Nodes placed directly in `cluster`, in declaration order.
    pub fn members(&self, cluster: Id) -> &[Id] {
        self.members.get(&cluster).map_or(&[], Vec::as_slice)
    }

    /// Nesting depth of `cluster`; top-level clusters have depth 0.
    pub fn depth(&self, cluster: Id) -> usize {
        self.depths.get(&cluster).copied().unwrap_or_default()
    }

    /// Deepest nesting level, or 0 for a diagram without clusters.
    pub fn max_depth(&self) -> usize {
        self.depths.values().copied().max().unwrap_or_default()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this diagram; ids handed out by the
    /// hierarchy always are.
    pub(crate) fn node(&self, id: Id) -> &'a Node {
        self.diagram
            .node(id)
            .expect("hierarchy only hands out declared node ids")
    }

    /// Returns the cluster with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a cluster of this diagram.
    pub(crate) fn cluster(&self, id: Id) -> &'a Cluster {
        self.diagram
            .cluster(id)
            .expect("hierarchy only hands out declared cluster ids")
    }

    /// Clusters enclosing `node`, outermost first.
    pub fn cluster_path(&self, node: Id) -> Vec<&'a Cluster> {
        let mut path = Vec::new();
        let mut current = self.diagram.node(node).and_then(Node::cluster);
        while let Some(id) = current {
            let cluster = self.cluster(id);
            path.push(cluster);
            current = cluster.parent();
        }
        path.reverse();
        path
    }

    pub fn edges(&self) -> &'a [Edge] {
        self.diagram.edges()
    }

    pub fn node_count(&self) -> usize {
        self.diagram.nodes().count()
    }

    pub fn cluster_count(&self) -> usize {
        self.diagram.clusters().count()
    }

    pub fn edge_count(&self) -> usize {
        self.diagram.edges().len()
    }

    /// Number of edges with at least one arrowhead.
    pub fn directed_edge_count(&self) -> usize {
        self.edges()
            .iter()
            .filter(|edge| edge.direction().is_directed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use stratus_core::{
        category::catalog,
        semantic::{DiagramOptions, Direction},
    };

    use super::*;

    fn node(id: &str, cluster: Option<&str>) -> Node {
        Node::new(
            Id::new(id),
            id,
            catalog::generic::blank::blank(),
            cluster.map(Id::new),
        )
    }

    fn cluster(id: &str, parent: Option<&str>) -> Cluster {
        Cluster::new(Id::new(id), id, parent.map(Id::new))
    }

    #[test]
    fn test_flat_diagram() {
        let mut diagram = Diagram::new("Flat", DiagramOptions::default());
        diagram.add_node(node("a", None)).unwrap();
        diagram.add_node(node("b", None)).unwrap();
        diagram.add_edge(Edge::new(Id::new("a"), Id::new("b"), Direction::Forward));

        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        assert_eq!(hierarchy.root_nodes(), [Id::new("a"), Id::new("b")]);
        assert!(hierarchy.root_clusters().is_empty());
        assert_eq!(hierarchy.max_depth(), 0);
        assert_eq!(hierarchy.directed_edge_count(), 1);
    }

    #[test]
    fn test_nesting_is_indexed_in_declaration_order() {
        let mut diagram = Diagram::new("Nested", DiagramOptions::default());
        diagram.add_cluster(cluster("region", None)).unwrap();
        diagram.add_cluster(cluster("hub", Some("region"))).unwrap();
        diagram.add_cluster(cluster("spoke", Some("region"))).unwrap();
        diagram.add_cluster(cluster("pool", Some("spoke"))).unwrap();
        diagram.add_node(node("fw", Some("hub"))).unwrap();
        diagram.add_node(node("vm", Some("pool"))).unwrap();

        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        assert_eq!(hierarchy.root_clusters(), [Id::new("region")]);
        assert_eq!(
            hierarchy.child_clusters(Id::new("region")),
            [Id::new("hub"), Id::new("spoke")]
        );
        assert_eq!(hierarchy.members(Id::new("pool")), [Id::new("vm")]);
        assert_eq!(hierarchy.depth(Id::new("pool")), 2);
        assert_eq!(hierarchy.max_depth(), 2);

        let path: Vec<&str> = hierarchy
            .cluster_path(Id::new("vm"))
            .iter()
            .map(|c| c.label())
            .collect();
        assert_eq!(path, ["region", "spoke", "pool"]);
    }

    #[test]
    fn test_parent_declared_after_child() {
        let mut diagram = Diagram::new("Late parent", DiagramOptions::default());
        diagram.add_cluster(cluster("inner", Some("outer"))).unwrap();
        diagram.add_cluster(cluster("outer", None)).unwrap();

        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        assert_eq!(hierarchy.depth(Id::new("inner")), 1);
    }

    #[test]
    fn test_edge_to_undeclared_node() {
        let mut diagram = Diagram::new("Dangling", DiagramOptions::default());
        diagram.add_node(node("x", None)).unwrap();
        diagram.add_edge(Edge::new(Id::new("x"), Id::new("y"), Direction::Forward));

        let err = DiagramHierarchy::from_diagram(&diagram).unwrap_err();
        assert!(matches!(
            err,
            StratusError::InvalidReference(ReferenceError::UnknownNode { edge: 0, ref node })
                if node == "y"
        ));
    }

    #[test]
    fn test_node_in_undeclared_cluster() {
        let mut diagram = Diagram::new("Orphan", DiagramOptions::default());
        diagram.add_node(node("x", Some("nowhere"))).unwrap();

        let err = DiagramHierarchy::from_diagram(&diagram).unwrap_err();
        assert!(matches!(
            err,
            StratusError::InvalidReference(ReferenceError::UnknownOwner { .. })
        ));
    }

    #[test]
    fn test_cluster_in_undeclared_parent() {
        let mut diagram = Diagram::new("Orphan", DiagramOptions::default());
        diagram.add_cluster(cluster("child", Some("ghost"))).unwrap();

        let err = DiagramHierarchy::from_diagram(&diagram).unwrap_err();
        assert!(matches!(
            err,
            StratusError::InvalidReference(ReferenceError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_cluster_nested_in_itself() {
        let mut diagram = Diagram::new("Self", DiagramOptions::default());
        diagram.add_cluster(cluster("loop", Some("loop"))).unwrap();

        let err = DiagramHierarchy::from_diagram(&diagram).unwrap_err();
        assert!(matches!(err, StratusError::ClusterCycle { ref cluster } if cluster == "loop"));
    }

    #[test]
    fn test_transitive_cluster_cycle() {
        let mut diagram = Diagram::new("Cycle", DiagramOptions::default());
        diagram.add_cluster(cluster("a", Some("c"))).unwrap();
        diagram.add_cluster(cluster("b", Some("a"))).unwrap();
        diagram.add_cluster(cluster("c", Some("b"))).unwrap();

        let err = DiagramHierarchy::from_diagram(&diagram).unwrap_err();
        assert!(matches!(err, StratusError::ClusterCycle { .. }));
    }

    #[test]
    fn test_lookups_cover_every_handed_out_id() {
        let mut diagram = Diagram::new("Lookups", DiagramOptions::default());
        diagram.add_cluster(cluster("region", None)).unwrap();
        diagram.add_cluster(cluster("pool", Some("region"))).unwrap();
        diagram.add_node(node("pod", Some("pool"))).unwrap();
        diagram.add_node(node("dns", None)).unwrap();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();

        let mut clusters = hierarchy.root_clusters().to_vec();
        let mut nodes = hierarchy.root_nodes().to_vec();
        while let Some(id) = clusters.pop() {
            assert_eq!(hierarchy.cluster(id).id(), id);
            clusters.extend(hierarchy.child_clusters(id));
            nodes.extend(hierarchy.members(id));
        }
        for id in &nodes {
            assert_eq!(hierarchy.node(*id).id(), *id);
        }
        assert_eq!(nodes.len(), 2);

        assert!(hierarchy.cluster_path(Id::new("nowhere")).is_empty());
    }

    #[test]
    fn test_find_nesting_cycle_on_forest() {
        let ids = [Id::new("p"), Id::new("q"), Id::new("r")];
        let nesting = [(ids[0], ids[1]), (ids[0], ids[2])];
        assert_eq!(find_nesting_cycle(&ids, &nesting), None);
    }

    #[test]
    fn test_equal_diagrams_give_equal_hierarchies() {
        let build = || {
            let mut diagram = Diagram::new("Twice", DiagramOptions::default());
            diagram.add_cluster(cluster("r1", None)).unwrap();
            diagram.add_node(node("n1", Some("r1"))).unwrap();
            diagram.add_node(node("n2", None)).unwrap();
            diagram.add_edge(Edge::new(Id::new("n1"), Id::new("n2"), Direction::Both));
            diagram
        };
        let first = build();
        let second = build();

        assert_eq!(
            DiagramHierarchy::from_diagram(&first).unwrap(),
            DiagramHierarchy::from_diagram(&second).unwrap()
        );
    }
}
