//! Built-in SVG backend on top of `layout-rs`.
//!
//! The renderer has no notion of clusters, so a node inside clusters is
//! labeled with its cluster path, e.g. `Region 1 / Hub VNet / Azure Firewall`.

use std::collections::HashMap;

use layout::{
    backends::svg::SVGWriter,
    core::{
        base::Orientation,
        geometry::Point,
        style::{LineStyleKind, StyleAttr},
    },
    std_shapes::shapes::{Arrow, Element, LineEndKind, ShapeKind},
    topo::layout::VisualGraph,
};
use log::{debug, info, warn};

use stratus_core::semantic::{Direction, EdgeStyle, ImageFormat, RankDirection};

use super::{Backend, ensure_supported};
use crate::{error::StratusError, structure::DiagramHierarchy, style::Theme};

const NODE_WIDTH: f64 = 160.0;
const NODE_HEIGHT: f64 = 60.0;

/// Pure Rust renderer producing SVG.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutBackend;

impl LayoutBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for LayoutBackend {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Svg
    }

    fn render(
        &self,
        hierarchy: &DiagramHierarchy<'_>,
        _theme: &Theme,
        format: ImageFormat,
    ) -> Result<Vec<u8>, StratusError> {
        ensure_supported(self, format)?;
        info!(nodes = hierarchy.node_count(); "Running built-in layout");

        let orientation = match hierarchy.diagram().options().direction() {
            RankDirection::LR | RankDirection::RL => Orientation::LeftToRight,
            RankDirection::TB | RankDirection::BT => Orientation::TopToBottom,
        };

        let mut graph = VisualGraph::new(orientation);
        let mut handles = HashMap::new();

        for node in hierarchy.diagram().nodes() {
            let label = qualified_label(hierarchy, node.id());
            let element = Element::create(
                ShapeKind::new_box(&label),
                StyleAttr::simple(),
                orientation,
                Point::new(NODE_WIDTH, NODE_HEIGHT),
            );
            handles.insert(node.id(), graph.add_node(element));
        }

        let mut skipped = 0;
        for edge in hierarchy.edges() {
            if edge.source() == edge.target() {
                warn!(node:% = edge.source(); "Self-loop not supported by the built-in layout, skipping");
                skipped += 1;
                continue;
            }

            let (start, end) = match edge.direction() {
                Direction::Forward => (LineEndKind::None, LineEndKind::Arrow),
                Direction::Back => (LineEndKind::Arrow, LineEndKind::None),
                Direction::Both => (LineEndKind::Arrow, LineEndKind::Arrow),
                Direction::None => (LineEndKind::None, LineEndKind::None),
            };
            let line = match edge.style() {
                EdgeStyle::Dashed => LineStyleKind::Dashed,
                EdgeStyle::Dotted => LineStyleKind::Dotted,
                EdgeStyle::Solid | EdgeStyle::Bold => LineStyleKind::Normal,
            };
            let arrow = Arrow::new(
                start,
                end,
                line,
                edge.label().unwrap_or_default(),
                &StyleAttr::simple(),
                &None,
                &None,
            );

            graph.add_edge(arrow, handles[&edge.source()], handles[&edge.target()]);
        }
        debug!(edges = hierarchy.edge_count() - skipped, skipped; "Edges placed");

        let mut writer = SVGWriter::new();
        if hierarchy.node_count() > 0 {
            graph.do_it(false, false, false, &mut writer);
        }
        Ok(writer.finalize().into_bytes())
    }
}

fn qualified_label(hierarchy: &DiagramHierarchy<'_>, node: stratus_core::identifier::Id) -> String {
    let mut parts: Vec<&str> = hierarchy
        .cluster_path(node)
        .into_iter()
        .map(|cluster| cluster.label())
        .collect();
    parts.push(hierarchy.node(node).label());
    parts.join(" / ")
}
