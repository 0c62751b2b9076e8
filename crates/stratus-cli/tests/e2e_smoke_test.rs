use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use stratus::{backend::BackendKind, semantic::ImageFormat};
use stratus_cli::{Args, run};

/// Collects all .toml manifests from a directory
fn collect_manifests(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo manifests live at the workspace root, not in the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Arguments that render without an external engine: DOT text when Graphviz
/// support is compiled in, built-in SVG otherwise.
fn args_for(manifest: Option<&Path>, output_dir: &Path) -> Args {
    let (backend, format) = if cfg!(feature = "graphviz") {
        (BackendKind::Graphviz, ImageFormat::Dot)
    } else {
        (BackendKind::Layout, ImageFormat::Svg)
    };

    Args {
        manifest: manifest.map(|path| path.to_string_lossy().to_string()),
        output_dir: Some(output_dir.to_string_lossy().to_string()),
        format: Some(format),
        backend: Some(backend),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let demos = collect_manifests(demos_dir());
    assert!(!demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &demos {
        // A fresh directory per demo so output names cannot collide
        let temp_dir = tempdir().expect("Failed to create temp directory");

        match run(&args_for(Some(demo_path), temp_dir.path())) {
            Ok(rendered) => {
                assert!(rendered.path().starts_with(temp_dir.path()));
                assert!(rendered.path().is_file(), "{} wrote no file", demo_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let error_demos = collect_manifests(demos_dir().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let temp_dir = tempdir().expect("Failed to create temp directory");

        if run(&args_for(Some(demo_path), temp_dir.path())).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert_eq!(
            fs::read_dir(temp_dir.path()).unwrap().count(),
            0,
            "{} left output behind",
            demo_path.display()
        );
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_blueprint_without_manifest() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let rendered = run(&args_for(None, temp_dir.path())).expect("Blueprint failed to render");

    let stem = rendered.path().file_stem().and_then(|s| s.to_str());
    assert_eq!(stem, Some("aks_ha_architecture"));
    assert!(rendered.bytes() > 0);
}
