// src/render/output.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::normalize::Summary;

/// Machine-readable description of one generated file.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest<'a> {
    pub name: &'a str,
    pub table_name: &'a str,
    pub data_name: &'a str,
    pub output: &'a Path,
    #[serde(flatten)]
    pub summary: &'a Summary,
}

/// Write `contents` to `path`, replacing any existing file.
///
/// The bytes go to a temp file next to `path` first and are renamed into place,
/// so a failure never leaves a truncated file behind. The parent directory must
/// already exist.
#[instrument(level = "debug", skip(path, contents), fields(path = %path.as_ref().display()))]
pub fn write_output<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = parent_dir(path);

    let mut tmp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("creating temp file in {:?}", dir))?;
    tmp.write_all(contents)
        .with_context(|| format!("writing {:?}", tmp.path()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming into {:?}", path))?;

    debug!(bytes = contents.len(), "wrote output");
    Ok(())
}

/// Pretty-print `manifest` as JSON with a trailing newline.
pub fn write_manifest<P: AsRef<Path>>(path: P, manifest: &Manifest<'_>) -> Result<()> {
    let mut buf = serde_json::to_vec_pretty(manifest).context("serializing manifest")?;
    buf.push(b'\n');
    write_output(path, &buf)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_write_output_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("k.c");
        fs::write(&path, "old contents that are longer")?;
        write_output(&path, b"new")?;
        assert_eq!(fs::read_to_string(&path)?, "new");
        // no stray temp files left behind
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_write_output_needs_existing_dir() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("missing").join("k.c");
        assert!(write_output(&path, b"x").is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("k.c")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("out/k.c")), PathBuf::from("out"));
    }

    #[test]
    fn test_write_manifest() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("k.json");
        let summary = Summary {
            items: 2,
            min_index: 0,
            max_index: 1,
            min_value: 0,
            max_value: 39,
            value_sorted: true,
            diagnostics: vec![],
        };
        let manifest = Manifest {
            name: "k",
            table_name: "_k",
            data_name: "_k_data",
            output: Path::new("output/k.c"),
            summary: &summary,
        };
        write_manifest(&path, &manifest)?;

        let text = fs::read_to_string(&path)?;
        assert!(text.ends_with("}\n"));
        let v: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(v["table_name"], "_k");
        assert_eq!(v["items"], 2);
        assert_eq!(v["max_value"], 39);
        assert_eq!(v["value_sorted"], true);
        assert_eq!(v["output"], "output/k.c");
        Ok(())
    }
}
