//! TOML diagram manifests.
//!
//! A manifest declares a diagram as data: a title, optional rendering
//! options, and arrays of `[[cluster]]`, `[[node]]` and `[[edge]]` tables.
//! Loading reports every problem it finds at once, each as a
//! [`Diagnostic`] pointing at the offending bytes of the source.
//!
//! ```toml
//! title = "Web Service"
//!
//! [[cluster]]
//! id = "region"
//! label = "Region 1"
//!
//! [[node]]
//! id = "gw"
//! label = "App Gateway"
//! category = "azure.network.application_gateway"
//! cluster = "region"
//!
//! [[node]]
//! id = "sql"
//! label = "Azure SQL"
//! category = "azure.database.sql_database"
//!
//! [[edge]]
//! from = "gw"
//! to = "sql"
//! ```

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use toml::Spanned;

use stratus_core::{
    category::{Category, catalog},
    color::Color,
    identifier::Id,
    semantic::{
        Cluster, Diagram, DiagramOptions, Direction, Edge, EdgeStyle, ImageFormat, Node,
        RankDirection, SplineStyle,
    },
};

use crate::{
    diagnostic::{Diagnostic, ErrorCode},
    error::StratusError,
    structure::find_nesting_cycle,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    title: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    format: Option<ImageFormat>,
    #[serde(default)]
    options: OptionsTable,
    #[serde(default, rename = "cluster")]
    clusters: Vec<ClusterEntry>,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeEntry>,
    #[serde(default, rename = "edge")]
    edges: Vec<EdgeEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsTable {
    font_size: Option<f32>,
    font_name: Option<String>,
    background_color: Option<Spanned<String>>,
    margin: Option<f32>,
    pad: Option<f32>,
    direction: Option<RankDirection>,
    splines: Option<SplineStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClusterEntry {
    id: Spanned<String>,
    label: String,
    parent: Option<Spanned<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeEntry {
    id: Spanned<String>,
    label: String,
    category: Spanned<String>,
    cluster: Option<Spanned<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: Spanned<String>,
    to: Spanned<String>,
    #[serde(default)]
    direction: Direction,
    label: Option<String>,
    color: Option<Spanned<String>>,
    #[serde(default)]
    style: EdgeStyle,
}

/// Parse a manifest into a [`Diagram`].
///
/// The returned diagram already satisfies every structural rule, so building a
/// hierarchy from it cannot fail.
///
/// # Errors
///
/// Returns [`StratusError::Manifest`] carrying every diagnostic found:
/// syntax and schema errors (`E100`), duplicate ids (`E200`), references to
/// undeclared nodes or clusters (`E201`), cluster cycles (`E202`) and invalid
/// categories or colors (`E300`).
pub fn parse(src: &str) -> Result<Diagram, StratusError> {
    let file: ManifestFile = toml::from_str(src).map_err(|err| {
        let mut diag = Diagnostic::error(err.message().trim().to_string()).with_code(ErrorCode::E100);
        if let Some(span) = err.span() {
            diag = diag.with_label(span, "here");
        }
        StratusError::new_manifest_error(diag.into(), src)
    })?;
    info!(
        title = file.title.as_str(),
        clusters = file.clusters.len(),
        nodes = file.nodes.len(),
        edges = file.edges.len();
        "Manifest loaded"
    );

    let mut loader = Loader::default();
    let options = loader.options(&file);
    let clusters = loader.clusters(&file.clusters);
    let nodes = loader.nodes(&file.nodes, &clusters);
    let edges = loader.edges(&file.edges, &nodes);

    if !loader.diagnostics.is_empty() {
        debug!(count = loader.diagnostics.len(); "Manifest rejected");
        return Err(StratusError::new_manifest_error(
            loader.diagnostics.into(),
            src,
        ));
    }

    let mut diagram = Diagram::new(file.title, options);
    for cluster in clusters.into_values() {
        diagram.add_cluster(cluster.cluster)?;
    }
    for node in nodes.into_values() {
        diagram.add_node(node)?;
    }
    for edge in edges {
        diagram.add_edge(edge);
    }
    Ok(diagram)
}

struct DeclaredCluster {
    cluster: Cluster,
    span: Range<usize>,
    parent_span: Option<Range<usize>>,
}

#[derive(Default)]
struct Loader {
    diagnostics: Vec<Diagnostic>,
}

impl Loader {
    fn options(&mut self, file: &ManifestFile) -> DiagramOptions {
        let table = &file.options;
        let defaults = DiagramOptions::default();

        let background_color = table
            .background_color
            .as_ref()
            .and_then(|color| self.color(color, "background color"));

        defaults
            .clone()
            .with_font_size(table.font_size.unwrap_or(defaults.font_size()))
            .with_font_name(table.font_name.as_deref().unwrap_or(defaults.font_name()))
            .with_background_color(background_color)
            .with_margin(table.margin)
            .with_pad(table.pad.unwrap_or(defaults.pad()))
            .with_direction(table.direction.unwrap_or_default())
            .with_splines(table.splines.unwrap_or_default())
            .with_filename(file.filename.clone())
            .with_format(file.format)
    }

    fn clusters(&mut self, entries: &[ClusterEntry]) -> IndexMap<Id, DeclaredCluster> {
        let mut declared: IndexMap<Id, DeclaredCluster> = IndexMap::new();

        for entry in entries {
            let id = Id::new(entry.id.get_ref());
            if let Some(first) = declared.get(&id) {
                self.duplicate("cluster", entry.id.get_ref(), entry.id.span(), first.span.clone());
                continue;
            }
            declared.insert(
                id,
                DeclaredCluster {
                    cluster: Cluster::new(
                        id,
                        entry.label.as_str(),
                        entry.parent.as_ref().map(|p| Id::new(p.get_ref())),
                    ),
                    span: entry.id.span(),
                    parent_span: entry.parent.as_ref().map(Spanned::span),
                },
            );
        }

        let mut unresolved = false;
        for entry in declared.values() {
            let Some(parent) = entry.cluster.parent() else {
                continue;
            };
            if let Some(span) = entry.parent_span.clone().filter(|_| !declared.contains_key(&parent)) {
                unresolved = true;
                self.diagnostics.push(
                    Diagnostic::error(format!(
                        "cluster `{}` is nested in undeclared cluster `{parent}`",
                        entry.cluster.id()
                    ))
                    .with_code(ErrorCode::E201)
                    .with_label(span, "no cluster with this id"),
                );
            }
        }

        if !unresolved {
            let ids: Vec<Id> = declared.keys().copied().collect();
            let nesting: Vec<(Id, Id)> = declared
                .values()
                .filter_map(|entry| entry.cluster.parent().map(|p| (p, entry.cluster.id())))
                .collect();
            if let Some(cluster) = find_nesting_cycle(&ids, &nesting) {
                let entry = &declared[&cluster];
                let mut diag = Diagnostic::error(format!("cluster `{cluster}` is nested inside itself"))
                    .with_code(ErrorCode::E202)
                    .with_help("cluster parents must form a tree");
                if let Some(span) = entry.parent_span.clone() {
                    diag = diag.with_label(span, "this parent leads back to the cluster");
                }
                self.diagnostics
                    .push(diag.with_secondary_label(entry.span.clone(), "cluster declared here"));
            }
        }

        declared
    }

    fn nodes(
        &mut self,
        entries: &[NodeEntry],
        clusters: &IndexMap<Id, DeclaredCluster>,
    ) -> IndexMap<Id, Node> {
        let mut nodes = IndexMap::new();
        let mut spans: HashMap<Id, Range<usize>> = HashMap::new();

        for entry in entries {
            let id = Id::new(entry.id.get_ref());
            if let Some(first) = spans.get(&id) {
                self.duplicate("node", entry.id.get_ref(), entry.id.span(), first.clone());
                continue;
            }
            spans.insert(id, entry.id.span());

            // An invalid category is reported; the placeholder keeps the id resolvable for edges.
            let category = self
                .category(&entry.category)
                .unwrap_or_else(catalog::generic::blank::blank);

            let cluster = entry.cluster.as_ref().map(|cluster| {
                let cluster_id = Id::new(cluster.get_ref());
                if !clusters.contains_key(&cluster_id) {
                    self.diagnostics.push(
                        Diagnostic::error(format!(
                            "node `{id}` belongs to undeclared cluster `{cluster_id}`"
                        ))
                        .with_code(ErrorCode::E201)
                        .with_label(cluster.span(), "no cluster with this id"),
                    );
                }
                cluster_id
            });

            nodes.insert(id, Node::new(id, entry.label.as_str(), category, cluster));
        }

        nodes
    }

    fn edges(&mut self, entries: &[EdgeEntry], nodes: &IndexMap<Id, Node>) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let mut valid = true;
            for endpoint in [&entry.from, &entry.to] {
                if !nodes.contains_key(&Id::new(endpoint.get_ref())) {
                    valid = false;
                    self.diagnostics.push(
                        Diagnostic::error(format!(
                            "edge #{index} references undeclared node `{}`",
                            endpoint.get_ref()
                        ))
                        .with_code(ErrorCode::E201)
                        .with_label(endpoint.span(), "no node with this id")
                        .with_help("declare the node in a [[node]] table"),
                    );
                }
            }

            let color = match &entry.color {
                Some(color) => match self.color(color, "edge color") {
                    Some(color) => Some(color),
                    None => {
                        valid = false;
                        None
                    }
                },
                None => None,
            };

            if valid {
                edges.push(
                    Edge::new(
                        Id::new(entry.from.get_ref()),
                        Id::new(entry.to.get_ref()),
                        entry.direction,
                    )
                    .with_label(entry.label.clone())
                    .with_color(color)
                    .with_style(entry.style),
                );
            }
        }

        edges
    }

    fn category(&mut self, value: &Spanned<String>) -> Option<Category> {
        match value.get_ref().parse::<Category>() {
            Ok(category) if category.is_cataloged() => Some(category),
            Ok(category) => {
                self.diagnostics.push(
                    Diagnostic::error(format!("unknown category `{category}`"))
                        .with_code(ErrorCode::E300)
                        .with_label(value.span(), "not in the category catalog")
                        .with_help("use `generic.blank.blank` for elements without a category"),
                );
                None
            }
            Err(err) => {
                self.diagnostics.push(
                    Diagnostic::error(err.to_string())
                        .with_code(ErrorCode::E300)
                        .with_label(value.span(), "expected `provider.group.kind`"),
                );
                None
            }
        }
    }

    fn color(&mut self, value: &Spanned<String>, what: &str) -> Option<Color> {
        match Color::new(value.get_ref()) {
            Ok(color) => Some(color),
            Err(err) => {
                self.diagnostics.push(
                    Diagnostic::error(format!("invalid {what} `{}`: {err}", value.get_ref()))
                        .with_code(ErrorCode::E300)
                        .with_label(value.span(), "not a color"),
                );
                None
            }
        }
    }

    fn duplicate(&mut self, kind: &str, id: &str, span: Range<usize>, first: Range<usize>) {
        self.diagnostics.push(
            Diagnostic::error(format!("{kind} `{id}` is declared more than once"))
                .with_code(ErrorCode::E200)
                .with_label(span, "declared again here")
                .with_secondary_label(first, "first declared here"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics(src: &str) -> Vec<Diagnostic> {
        match parse(src) {
            Err(StratusError::Manifest { err, .. }) => err.diagnostics().to_vec(),
            other => panic!("expected manifest error, got {other:?}"),
        }
    }

    fn codes(src: &str) -> Vec<ErrorCode> {
        diagnostics(src).iter().filter_map(Diagnostic::code).collect()
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let diagram = parse(
            r#"
            title = "Three Tier"

            [[node]]
            id = "a"
            label = "Gateway"
            category = "azure.network.application_gateway"

            [[node]]
            id = "b"
            label = "Service"
            category = "k8s.network.service"

            [[edge]]
            from = "a"
            to = "b"
            "#,
        )
        .unwrap();

        assert_eq!(diagram.title(), "Three Tier");
        assert_eq!(diagram.nodes().count(), 2);
        assert_eq!(diagram.edges().len(), 1);
        assert_eq!(diagram.edges()[0].direction(), Direction::Forward);
        assert_eq!(diagram.file_stem(), "three_tier");
    }

    #[test]
    fn test_options_and_edge_attributes() {
        let diagram = parse(
            r##"
            title = "Options"
            filename = "custom"
            format = "svg"

            [options]
            font_size = 30
            background_color = "white"
            margin = 0.0
            pad = 0.5
            direction = "TB"
            splines = "curved"

            [[node]]
            id = "sql1"
            label = "Azure SQL"
            category = "azure.database.sql_database"

            [[node]]
            id = "sql2"
            label = "Azure SQL"
            category = "azure.database.sql_database"

            [[edge]]
            from = "sql1"
            to = "sql2"
            direction = "both"
            label = "Geo-Replication"
            color = "#ff0000"
            style = "dashed"
            "##,
        )
        .unwrap();

        let options = diagram.options();
        assert_eq!(options.font_size(), 30.0);
        assert_eq!(options.pad(), 0.5);
        assert_eq!(options.margin(), Some(0.0));
        assert_eq!(options.direction(), RankDirection::TB);
        assert_eq!(options.splines(), SplineStyle::Curved);
        assert_eq!(options.format(), Some(ImageFormat::Svg));
        assert_eq!(diagram.file_stem(), "custom");

        let edge = &diagram.edges()[0];
        assert_eq!(edge.direction(), Direction::Both);
        assert_eq!(edge.label(), Some("Geo-Replication"));
        assert_eq!(edge.style(), EdgeStyle::Dashed);
        assert_eq!(edge.color().map(|c| c.to_hex()), Some("#ff0000".to_string()));
    }

    #[test]
    fn test_clusters_keep_declaration_order() {
        let diagram = parse(
            r#"
            title = "Order"

            [[cluster]]
            id = "pool"
            label = "Node Pool"
            parent = "aks"

            [[cluster]]
            id = "aks"
            label = "AKS Cluster"
            "#,
        )
        .unwrap();

        let order: Vec<&str> = diagram.clusters().map(|c| c.label()).collect();
        assert_eq!(order, ["Node Pool", "AKS Cluster"]);
    }

    #[test]
    fn test_syntax_error_has_span() {
        let diags = diagnostics("title = \n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), Some(ErrorCode::E100));
        assert_eq!(diags[0].labels().len(), 1);
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        assert_eq!(codes("title = \"x\"\ncolour = \"red\"\n"), [ErrorCode::E100]);
    }

    #[test]
    fn test_duplicate_node() {
        let src = r#"
            [[node]]
            id = "a"
            label = "A"
            category = "generic.blank.blank"

            [[node]]
            id = "a"
            label = "A again"
            category = "generic.blank.blank"
            "#;
        let diags = diagnostics(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), Some(ErrorCode::E200));
        assert_eq!(diags[0].labels().len(), 2);

        let primary = diags[0].labels()[0].span();
        assert_eq!(&src[primary], "\"a\"");
    }

    #[test]
    fn test_every_problem_is_reported() {
        let src = r#"
            [[cluster]]
            id = "r1"
            label = "Region 1"
            parent = "nowhere"

            [[node]]
            id = "x"
            label = "X"
            category = "azure.compute.teleporter"
            cluster = "r2"

            [[node]]
            id = "ok"
            label = "Ok"
            category = "azure"

            [[edge]]
            from = "ok"
            to = "y"
            color = "not a color"
            "#;

        assert_eq!(
            codes(src),
            [
                ErrorCode::E201,
                ErrorCode::E300,
                ErrorCode::E201,
                ErrorCode::E300,
                ErrorCode::E201,
                ErrorCode::E300,
            ]
        );
    }

    #[test]
    fn test_edge_to_undeclared_node_points_at_reference() {
        let src = r#"
            [[cluster]]
            id = "region1"
            label = "Region1"

            [[node]]
            id = "x"
            label = "X"
            category = "generic.blank.blank"
            cluster = "region1"

            [[edge]]
            from = "x"
            to = "y"
            "#;
        let diags = diagnostics(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code(), Some(ErrorCode::E201));
        assert_eq!(&src[diags[0].labels()[0].span()], "\"y\"");
    }

    #[test]
    fn test_cluster_cycles() {
        let self_parent = r#"
            [[cluster]]
            id = "loop"
            label = "Loop"
            parent = "loop"
            "#;
        assert_eq!(codes(self_parent), [ErrorCode::E202]);

        let transitive = r#"
            [[cluster]]
            id = "a"
            label = "A"
            parent = "b"

            [[cluster]]
            id = "b"
            label = "B"
            parent = "a"
            "#;
        assert_eq!(codes(transitive), [ErrorCode::E202]);
    }

    #[test]
    fn test_manifest_error_keeps_source() {
        let src = "[[edge]]\nfrom = \"a\"\nto = \"b\"\n";
        match parse(src) {
            Err(StratusError::Manifest { src: kept, err }) => {
                assert_eq!(kept, src);
                assert_eq!(err.diagnostics().len(), 2);
            }
            other => panic!("expected manifest error, got {other:?}"),
        }
    }
}
