//! Output file placement and atomic writes.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;

use stratus_core::semantic::ImageFormat;

/// Path of the rendered file: `<dir>/<stem>.<extension>`.
///
/// Without a directory the file lands in the working directory.
pub fn output_path(dir: Option<&Path>, stem: &str, format: ImageFormat) -> PathBuf {
    let file_name = format!("{stem}.{}", format.extension());
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Writes `bytes` to `path` so that readers never observe a partial file.
///
/// The content goes to a temporary file in the same directory which then
/// replaces `path`. The directory must already exist.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory is missing or not
/// writable, or if the final rename fails. `path` is left untouched then.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;

    debug!(path:? = path, bytes = bytes.len(); "Output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(None, "aks_ha_architecture", ImageFormat::Png),
            PathBuf::from("aks_ha_architecture.png")
        );
        assert_eq!(
            output_path(Some(Path::new("out")), "web", ImageFormat::Dot),
            Path::new("out").join("web.dot")
        );
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.svg");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"<svg/>").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"<svg/>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("diagram.png");

        assert!(write_atomic(&path, b"png").is_err());
        assert!(!path.exists());
    }
}
