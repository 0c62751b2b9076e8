//! Diagrams shipped with the library.

use log::info;

use stratus_core::{
    category::catalog::{azure, k8s, onprem},
    color::Color,
    semantic::{Diagram, DiagramOptions},
};

use crate::{
    canvas::{Canvas, Link, NodeRef, Scope},
    error::StratusError,
};

/// Handles of a region that global services connect to.
struct Region {
    app_gateway: NodeRef,
    ingress: NodeRef,
    aks: NodeRef,
    sql: NodeRef,
    cosmos: NodeRef,
}

/// Two-region Azure Kubernetes Service deployment behind Azure Front Door.
///
/// Each region has a hub and a spoke virtual network, an AKS cluster with
/// system, web and database node pools, regional data services and a
/// Prometheus/Grafana monitoring stack. SQL and Cosmos DB replicate across
/// the regions.
///
/// # Errors
///
/// Only fails if the canvas rejects one of its own handles, which indicates a
/// bug rather than bad input.
///
/// # Example
///
/// ```
/// let diagram = stratus::blueprints::aks_ha_architecture().unwrap();
/// assert_eq!(diagram.file_stem(), "aks_ha_architecture");
/// assert_eq!(diagram.nodes().count(), 58);
/// ```
pub fn aks_ha_architecture() -> Result<Diagram, StratusError> {
    let options = DiagramOptions::default()
        .with_font_size(30.0)
        .with_background_color(Color::new("white").ok())
        .with_margin(Some(0.0))
        .with_pad(0.5)
        .with_filename(Some("aks_ha_architecture".to_string()));
    let mut canvas = Canvas::new("Azure AKS High Availability Architecture", options);

    let aad = canvas.node("Azure AD", azure::identity::active_directory());
    let frontdoor = canvas.node("Azure Front Door", azure::web::front_doors());

    let east = canvas.cluster("Region 1 (East US)", |scope| region(scope, 1))?;
    let west = canvas.cluster("Region 2 (West US)", |scope| region(scope, 2))?;

    canvas.fan_out(frontdoor, &[east.app_gateway, west.app_gateway])?;
    canvas.edge(east.app_gateway, east.ingress)?;
    canvas.edge(west.app_gateway, west.ingress)?;

    canvas.link(east.sql, west.sql, Link::both().with_label("Geo-Replication"))?;
    canvas.link(
        east.cosmos,
        west.cosmos,
        Link::both().with_label("Multi-Region Write"),
    )?;

    canvas.fan_out(aad, &[east.aks, west.aks])?;

    let diagram = canvas.finish();
    info!(
        nodes = diagram.nodes().count(),
        clusters = diagram.clusters().count(),
        edges = diagram.edges().len();
        "AKS HA blueprint declared"
    );
    Ok(diagram)
}

fn region(scope: &mut Scope<'_>, index: usize) -> Result<Region, StratusError> {
    let (hub_vnet, firewall) = scope.cluster("Hub VNet", |hub| {
        Ok((
            hub.node("Hub VNet", azure::network::virtual_networks()),
            hub.node("Azure Firewall", azure::network::firewall()),
        ))
    })?;

    let (spoke_vnet, app_gateway) = scope.cluster("Spoke VNet", |spoke| {
        Ok((
            spoke.node("Spoke VNet", azure::network::virtual_networks()),
            spoke.node("App Gateway + WAF", azure::network::application_gateway()),
        ))
    })?;

    let (aks, ingress) = scope.cluster(format!("AKS Cluster {index}"), |cluster| {
        let aks = cluster.node("AKS Control Plane", azure::compute::aks());

        cluster.cluster("System Node Pool", |pool| {
            pool.node("System Nodes", azure::compute::vm_scale_set());
            Ok(())
        })?;

        let ingress = cluster.cluster("Web App Node Pool", |pool| {
            pool.node("Web App Nodes", azure::compute::vm_scale_set());
            pool.cluster("Web Application", web_application)
        })?;

        cluster.cluster("Database Node Pool", |pool| {
            pool.node("DB Nodes", azure::compute::vm_scale_set());
            pool.cluster("Database", database)
        })?;

        Ok((aks, ingress))
    })?;

    let sql = scope.node("Azure SQL", azure::database::sql_database());
    let cosmos = scope.node("Cosmos DB", azure::database::cosmos_db());
    scope.node("Storage Account", azure::storage::storage_accounts());
    scope.node("Key Vault", azure::security::key_vault());
    scope.node("Log Analytics", azure::analytics::log_analytics_workspaces());

    scope.cluster("Monitoring", |monitoring| {
        let prometheus = monitoring.node("Prometheus", onprem::monitoring::prometheus());
        let grafana = monitoring.node("Grafana", onprem::monitoring::grafana());
        monitoring.edge(prometheus, grafana)
    })?;

    scope.link(hub_vnet, spoke_vnet, Link::both().with_label("Peering"))?;
    scope.edge(firewall, spoke_vnet)?;

    Ok(Region {
        app_gateway,
        ingress,
        aks,
        sql,
        cosmos,
    })
}

/// Declares the web workload and returns its ingress controller.
fn web_application(app: &mut Scope<'_>) -> Result<NodeRef, StratusError> {
    let deployment = app.node("Web Deployment", k8s::compute::deployment());
    let pods = app.nodes(["Web Pod 1", "Web Pod 2", "Web Pod 3"], k8s::compute::pod());
    let service = app.node("Web Service", k8s::network::service());
    let ingress = app.node("Ingress Controller", k8s::network::ingress());

    for pod in &pods {
        app.edge(deployment, *pod)?;
        app.edge(*pod, service)?;
    }
    app.edge(service, ingress)?;

    Ok(ingress)
}

fn database(db: &mut Scope<'_>) -> Result<(), StratusError> {
    let stateful_set = db.node("DB StatefulSet", k8s::compute::stateful_set());
    let pods = db.nodes(["DB Pod 1", "DB Pod 2", "DB Pod 3"], k8s::compute::pod());
    let service = db.node("DB Service", k8s::network::service());
    let claim = db.node("Persistent Volume Claim", k8s::storage::pvc());
    let volume = db.node("Persistent Volume", k8s::storage::pv());

    for pod in &pods {
        db.edge(stateful_set, *pod)?;
        db.edge(*pod, service)?;
    }
    db.link(pods[0], claim, Link::undirected())?;
    db.link(claim, volume, Link::undirected())
}
