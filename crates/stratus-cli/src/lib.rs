//! CLI logic for the Stratus diagram tool.
//!
//! Loads configuration, applies command-line overrides, reads the manifest
//! (or falls back to the built-in AKS high availability blueprint) and renders
//! it to a single image file.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::PathBuf};

use log::info;

use stratus::{
    DiagramBuilder, Rendered, StratusError, blueprints,
    config::{AppConfig, RenderConfig},
};

/// Run the Stratus CLI application
///
/// # Errors
///
/// Returns `StratusError` for:
/// - Configuration loading errors
/// - Manifest I/O and parse errors
/// - Invalid references or cluster cycles
/// - Backend and rendering errors
/// - Output I/O errors
pub fn run(args: &Args) -> Result<Rendered, StratusError> {
    info!(
        manifest:? = args.manifest,
        output_dir:? = args.output_dir;
        "Processing diagram"
    );

    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);
    let builder = DiagramBuilder::new(app_config);

    let diagram = match &args.manifest {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            builder.parse(&source)?
        }
        None => {
            info!("No manifest given, using the AKS high availability blueprint");
            blueprints::aks_ha_architecture()?
        }
    };

    let rendered = builder.render(&diagram)?;

    info!(
        output_file = rendered.path().display().to_string(),
        backend = rendered.backend(),
        bytes = rendered.bytes();
        "Diagram exported successfully"
    );

    Ok(rendered)
}

fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let mut render: RenderConfig = config.render().clone();
    if let Some(backend) = args.backend {
        render = render.with_backend(backend);
    }
    if let Some(format) = args.format {
        render = render.with_format(Some(format));
    }
    if let Some(dir) = &args.output_dir {
        render = render.with_output_dir(Some(PathBuf::from(dir)));
    }
    config.with_render(render)
}
