//! Graphviz backend: DOT translation and `dot` execution.

use std::io;

use dot_generator::id;
use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec,
    printer::{DotPrinter, PrinterContext},
};
use log::{debug, info, trace};

use stratus_core::semantic::{self, Direction, EdgeStyle, ImageFormat};

use super::{Backend, ensure_supported};
use crate::{error::StratusError, structure::DiagramHierarchy, style, style::Theme};

/// Renders through the Graphviz `dot` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphvizBackend;

impl GraphvizBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for GraphvizBackend {
    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        matches!(
            format,
            ImageFormat::Png | ImageFormat::Jpg | ImageFormat::Svg | ImageFormat::Pdf | ImageFormat::Dot
        )
    }

    fn render(
        &self,
        hierarchy: &DiagramHierarchy<'_>,
        theme: &Theme,
        format: ImageFormat,
    ) -> Result<Vec<u8>, StratusError> {
        ensure_supported(self, format)?;

        let graph = build_graph(hierarchy, theme);
        let mut ctx = PrinterContext::default();

        let engine_format = match format {
            ImageFormat::Dot => return Ok(graph.print(&mut ctx).into_bytes()),
            ImageFormat::Png => Format::Png,
            ImageFormat::Jpg => Format::Jpg,
            ImageFormat::Svg => Format::Svg,
            ImageFormat::Pdf => Format::Pdf,
        };

        info!(format:% = format; "Running graphviz");
        exec(graph, &mut ctx, vec![CommandArg::Format(engine_format)])
            .map(Vec::<u8>::from)
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => StratusError::BackendUnavailable(format!(
                    "graphviz `dot` executable not found: {err}"
                )),
                _ => StratusError::Render(format!("graphviz failed: {err}")),
            })
    }
}

/// Returns the DOT source the Graphviz backend renders for `hierarchy`.
///
/// The text is a pure function of the hierarchy and theme, so equal diagrams
/// always describe to equal text.
pub fn to_dot(hierarchy: &DiagramHierarchy<'_>, theme: &Theme) -> String {
    build_graph(hierarchy, theme).print(&mut PrinterContext::default())
}

fn build_graph(hierarchy: &DiagramHierarchy<'_>, theme: &Theme) -> Graph {
    let diagram = hierarchy.diagram();
    let options = diagram.options();

    let mut graph_attrs = vec![
        plain("pad", options.pad()),
        plain("splines", options.splines()),
        plain("nodesep", format!("{:.2}", style::NODE_SEP)),
        plain("ranksep", format!("{:.2}", style::RANK_SEP)),
        quoted("fontname", options.font_name()),
        plain("fontsize", options.font_size()),
        quoted("fontcolor", style::FONT_COLOR),
        plain("rankdir", options.direction()),
        quoted("label", diagram.title()),
    ];
    if let Some(color) = theme.background_color() {
        graph_attrs.push(quoted("bgcolor", &color.to_hex()));
    }
    if let Some(margin) = options.margin() {
        graph_attrs.push(plain("margin", margin));
    }

    let node_defaults = vec![
        plain("shape", "box"),
        plain("style", "rounded"),
        plain("fixedsize", true),
        plain("width", style::NODE_SIZE),
        plain("height", style::NODE_SIZE),
        plain("labelloc", "b"),
        plain("imagescale", true),
        quoted("fontname", options.font_name()),
        plain("fontsize", style::NODE_FONT_SIZE),
        quoted("fontcolor", style::FONT_COLOR),
    ];

    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(graph_attrs)),
        Stmt::GAttribute(GraphAttributes::Node(node_defaults)),
        Stmt::GAttribute(GraphAttributes::Edge(vec![quoted(
            "color",
            style::EDGE_COLOR,
        )])),
    ];

    for cluster in hierarchy.root_clusters() {
        stmts.push(Stmt::Subgraph(cluster_subgraph(hierarchy, theme, *cluster)));
    }
    for node in hierarchy.root_nodes() {
        stmts.push(Stmt::Node(node_stmt(hierarchy.node(*node), theme)));
    }
    for edge in hierarchy.edges() {
        stmts.push(Stmt::Edge(edge_stmt(edge)));
    }

    debug!(statements = stmts.len(); "DOT graph built");
    let graph = Graph::DiGraph {
        id: id!("stratus"),
        strict: false,
        stmts,
    };
    trace!(graph:?; "DOT graph");
    graph
}

fn cluster_subgraph(
    hierarchy: &DiagramHierarchy<'_>,
    theme: &Theme,
    cluster_id: stratus_core::identifier::Id,
) -> Subgraph {
    let cluster = hierarchy.cluster(cluster_id);
    let font_name = hierarchy.diagram().options().font_name();

    let mut stmts: Vec<Stmt> = [
        quoted("label", cluster.label()),
        plain("style", "rounded"),
        plain("labeljust", "l"),
        quoted("pencolor", style::CLUSTER_PEN_COLOR),
        quoted("fontname", font_name),
        plain("fontsize", style::CLUSTER_FONT_SIZE),
        quoted("bgcolor", style::cluster_background(hierarchy.depth(cluster_id))),
    ]
    .into_iter()
    .map(Stmt::Attribute)
    .collect();

    for node in hierarchy.members(cluster_id) {
        stmts.push(Stmt::Node(node_stmt(hierarchy.node(*node), theme)));
    }
    for child in hierarchy.child_clusters(cluster_id) {
        stmts.push(Stmt::Subgraph(cluster_subgraph(hierarchy, theme, *child)));
    }

    Subgraph {
        id: escaped(&format!("cluster_{cluster_id}")),
        stmts,
    }
}

fn node_stmt(node: &semantic::Node, theme: &Theme) -> Node {
    let mut attributes = vec![quoted("label", node.label())];

    match theme.icons().resolve(node.category()) {
        Some(icon) => {
            let lines = node.label().lines().count();
            attributes.push(quoted("image", &icon.to_string_lossy()));
            attributes.push(plain("shape", "none"));
            attributes.push(plain("height", style::icon_node_height(lines)));
        }
        None => {
            attributes.push(quoted("style", "rounded,filled"));
            attributes.push(quoted("fillcolor", style::provider_color(node.category())));
            attributes.push(quoted("fontcolor", "#FFFFFF"));
            attributes.push(plain("labelloc", "c"));
        }
    }

    Node {
        id: node_id(node.id()),
        attributes,
    }
}

fn edge_stmt(edge: &semantic::Edge) -> Edge {
    let dir = match edge.direction() {
        Direction::Forward => "forward",
        Direction::Back => "back",
        Direction::Both => "both",
        Direction::None => "none",
    };

    let mut attributes = vec![plain("dir", dir)];
    if let Some(label) = edge.label() {
        attributes.push(quoted("label", label));
    }
    if let Some(color) = edge.color() {
        attributes.push(quoted("color", &color.to_hex()));
    }
    match edge.style() {
        EdgeStyle::Solid => {}
        style => attributes.push(plain("style", style)),
    }

    Edge {
        ty: EdgeTy::Pair(
            Vertex::N(node_id(edge.source())),
            Vertex::N(node_id(edge.target())),
        ),
        attributes,
    }
}

fn node_id(id: stratus_core::identifier::Id) -> NodeId {
    NodeId(escaped(&id.to_string()), None)
}

/// Attribute whose value is a keyword or number.
fn plain(key: &str, value: impl std::fmt::Display) -> Attribute {
    Attribute(id!(key), id!(value))
}

/// Attribute whose value is free text and must be quoted.
fn quoted(key: &str, value: &str) -> Attribute {
    Attribute(id!(key), escaped(value))
}

fn escaped(value: &str) -> Id {
    let value = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    Id::Escaped(format!("\"{value}\""))
}

#[cfg(test)]
mod tests {
    use stratus_core::{
        category::catalog,
        color::Color,
        identifier,
        semantic::{Cluster, Diagram, DiagramOptions},
    };

    use super::*;
    use crate::config::{AppConfig, RenderConfig};

    fn sample() -> Diagram {
        let mut diagram = Diagram::new(
            "Web \"Tier\"",
            DiagramOptions::default().with_background_color(Color::new("white").ok()),
        );
        diagram
            .add_cluster(Cluster::new(identifier::Id::new("region"), "Region 1", None))
            .unwrap();
        diagram
            .add_cluster(Cluster::new(
                identifier::Id::new("pool"),
                "Node Pool",
                Some(identifier::Id::new("region")),
            ))
            .unwrap();
        diagram
            .add_node(semantic::Node::new(
                identifier::Id::new("fd"),
                "Front Door",
                catalog::azure::web::front_doors(),
                None,
            ))
            .unwrap();
        diagram
            .add_node(semantic::Node::new(
                identifier::Id::new("pod"),
                "Web Pod 1",
                catalog::k8s::compute::pod(),
                Some(identifier::Id::new("pool")),
            ))
            .unwrap();
        diagram.add_edge(
            semantic::Edge::new(
                identifier::Id::new("fd"),
                identifier::Id::new("pod"),
                Direction::Both,
            )
            .with_label(Some("HTTPS".to_string()))
            .with_style(EdgeStyle::Dashed),
        );
        diagram
    }

    fn theme(diagram: &Diagram) -> Theme {
        Theme::from_config(&AppConfig::default(), diagram.options()).unwrap()
    }

    #[test]
    fn test_graph_attributes() {
        let diagram = sample();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let dot = to_dot(&hierarchy, &theme(&diagram));

        assert!(dot.starts_with("digraph stratus"));
        assert!(dot.contains("nodesep=0.60"));
        assert!(dot.contains("ranksep=0.75"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.contains("splines=ortho"));
        assert!(dot.contains("bgcolor=\"#ffffff\""));
        assert!(dot.contains("label=\"Web \\\"Tier\\\"\""));
    }

    #[test]
    fn test_clusters_become_nested_subgraphs() {
        let diagram = sample();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let dot = to_dot(&hierarchy, &theme(&diagram));

        let region = dot.find("\"cluster_region\"").unwrap();
        let pool = dot.find("\"cluster_pool\"").unwrap();
        assert!(region < pool);
        assert!(dot.contains("bgcolor=\"#E5F5FD\""));
        assert!(dot.contains("bgcolor=\"#EBF3E7\""));
        assert!(dot.contains("labeljust=l"));
    }

    #[test]
    fn test_nodes_without_icons_are_filled_boxes() {
        let diagram = sample();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let dot = to_dot(&hierarchy, &theme(&diagram));

        assert!(dot.contains("fillcolor=\"#0078D4\""));
        assert!(dot.contains("fillcolor=\"#326CE5\""));
        assert!(!dot.contains("image="));
    }

    #[test]
    fn test_nodes_with_icons_grow_per_label_line() {
        let icons = tempfile::tempdir().unwrap();
        let aks_icon = icons.path().join("azure").join("compute").join("aks.png");
        std::fs::create_dir_all(aks_icon.parent().unwrap()).unwrap();
        std::fs::write(&aks_icon, b"png").unwrap();

        let mut diagram = Diagram::new("Icons", DiagramOptions::default());
        for (id, label, category) in [
            ("aks1", "AKS", catalog::azure::compute::aks()),
            ("aks2", "AKS\nCluster 2", catalog::azure::compute::aks()),
            ("fw", "Firewall", catalog::azure::network::firewall()),
            ("gke", "GKE", "gcp.compute.gke".parse().unwrap()),
        ] {
            diagram
                .add_node(semantic::Node::new(identifier::Id::new(id), label, category, None))
                .unwrap();
        }
        let config = AppConfig::default().with_render(
            RenderConfig::default().with_icons_dir(Some(icons.path().to_path_buf())),
        );
        let theme = Theme::from_config(&config, diagram.options()).unwrap();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let dot = to_dot(&hierarchy, &theme);

        let image = format!("image=\"{}\"", aks_icon.display());
        assert_eq!(dot.matches(&image).count(), 2, "{dot}");
        assert_eq!(dot.matches("shape=none").count(), 2);
        assert!(dot.contains("height=1.9"));
        assert!(dot.contains("height=2.3"));

        // No icon file for the firewall, and gke is not cataloged at all.
        assert!(dot.contains("fillcolor=\"#0078D4\""));
        assert!(dot.contains("fillcolor=\"#7B8894\""));
        assert_eq!(dot.matches("style=\"rounded,filled\"").count(), 2);
    }

    #[test]
    fn test_edge_attributes() {
        let diagram = sample();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let dot = to_dot(&hierarchy, &theme(&diagram));

        assert_eq!(dot.matches("->").count(), 1);
        assert!(dot.contains("dir=both"));
        assert!(dot.contains("style=dashed"));
        assert!(dot.contains("label=\"HTTPS\""));
    }

    #[test]
    fn test_dot_format_skips_the_engine() {
        let diagram = sample();
        let hierarchy = DiagramHierarchy::from_diagram(&diagram).unwrap();
        let theme = theme(&diagram);

        let bytes = GraphvizBackend::new()
            .render(&hierarchy, &theme, ImageFormat::Dot)
            .unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), to_dot(&hierarchy, &theme));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            escaped("a \"b\"\nc\\d"),
            Id::Escaped("\"a \\\"b\\\"\\nc\\\\d\"".to_string())
        );
    }
}
