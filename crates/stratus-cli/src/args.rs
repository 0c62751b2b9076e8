//! Command-line argument definitions for the Stratus CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Flags given here override the matching configuration file
//! settings.

use clap::Parser;

use stratus::{backend::BackendKind, semantic::ImageFormat};

/// Command-line arguments for the Stratus diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a diagram manifest (TOML)
    #[arg(help = "Path to the manifest; renders the AKS high availability blueprint when omitted")]
    pub manifest: Option<String>,

    /// Directory the image is written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Output format (png, jpg, svg, pdf, dot)
    #[arg(short, long)]
    pub format: Option<ImageFormat>,

    /// Render backend (graphviz, layout)
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
