//! Writes a bundle to disk.
//!
//! Every file name is validated against the output directory before anything
//! is written, so a bundler emitting `../x.js` cannot escape it. Files are
//! written to a temporary sibling first and renamed into place; a failed write
//! removes the temporaries it left behind.
//!
//! Island passes for several routes write into the same public directory at the
//! same time, so temporary names carry a process-wide counter instead of a fixed
//! `.tmp` extension.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use path_clean::PathClean;

use super::OutputBundle;
use crate::{Error, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Entries [`empty_dir`] never removes.
const KEEP_ON_EMPTY: &[&str] = &[".git"];

/// Write every item of `bundle` under `dir`, returning the written paths in
/// bundle order.
///
/// With `empty_first`, the existing contents of `dir` are removed first.
pub async fn write_bundle(
    bundle: &OutputBundle,
    dir: &Path,
    empty_first: bool,
) -> Result<Vec<PathBuf>> {
    let dir = dir.clean();

    // Validate everything before touching the disk
    let mut operations = Vec::with_capacity(bundle.len());
    for item in &bundle.items {
        let target = validate_output_path(&dir, item.file_name())?;
        operations.push((target, item.contents()));
    }

    if empty_first {
        empty_dir(&dir).await?;
    }

    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        Error::io(
            format!("Failed to create output directory '{}'", dir.display()),
            e,
        )
    })?;

    write_files_atomic(&operations).await?;

    tracing::debug!(
        "wrote {} files to {}",
        operations.len(),
        dir.display()
    );

    Ok(operations.into_iter().map(|(path, _)| path).collect())
}

/// Remove the contents of `dir`, keeping the directory itself and `.git`.
///
/// A missing directory is not an error.
pub async fn empty_dir(dir: &Path) -> Result<()> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(Error::io(
                format!("Failed to read output directory '{}'", dir.display()),
                e,
            ));
        }
    };

    let read_err =
        |e: std::io::Error| Error::io(format!("Failed to read output directory '{}'", dir.display()), e);
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        if KEEP_ON_EMPTY
            .iter()
            .any(|keep| entry.file_name() == std::ffi::OsStr::new(keep))
        {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().await.map_err(|e| {
            Error::io(format!("Failed to inspect '{}'", path.display()), e)
        })?;
        let removed = if file_type.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        removed.map_err(|e| Error::io(format!("Failed to remove '{}'", path.display()), e))?;
    }

    Ok(())
}

/// Resolve `filename` under `base_dir`, rejecting paths that escape it.
pub(crate) fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();

    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            filename,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{n}.tmp"));
    target.with_file_name(name)
}

async fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, &Path)> = Vec::with_capacity(operations.len());

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                cleanup_temp_files(&temp_files).await;
                return Err(Error::io(
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                ));
            }
        }

        let temp = temp_path_for(target);
        if let Err(e) = tokio::fs::write(&temp, content).await {
            cleanup_temp_files(&temp_files).await;
            return Err(Error::io(
                format!("Failed to write temporary file '{}'", temp.display()),
                e,
            ));
        }
        temp_files.push((temp, target.as_path()));
    }

    for (index, (temp, target)) in temp_files.iter().enumerate() {
        if let Err(e) = tokio::fs::rename(temp, target).await {
            cleanup_temp_files(&temp_files[index..]).await;
            return Err(Error::io(
                format!(
                    "Failed to rename '{}' to '{}'",
                    temp.display(),
                    target.display()
                ),
                e,
            ));
        }
    }

    Ok(())
}

/// Best-effort; we're already failing.
async fn cleanup_temp_files(temp_files: &[(PathBuf, &Path)]) {
    for (temp, _) in temp_files {
        match tokio::fs::remove_file(temp).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to clean up temporary file '{}': {}",
                temp.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputAsset, OutputChunk};
    use tempfile::TempDir;

    #[test]
    fn validate_output_path_normal() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "assets/index.js").unwrap();
        assert_eq!(result, Path::new("/tmp/output/assets/index.js"));
    }

    #[test]
    fn validate_output_path_current_dir() {
        let base = Path::new("/tmp/output");
        let result = validate_output_path(base, "./index.html").unwrap();
        assert_eq!(result, Path::new("/tmp/output/index.html"));
    }

    #[test]
    fn validate_output_path_traversal() {
        let base = Path::new("/tmp/output");
        let err = validate_output_path(base, "safe/../../../../etc/passwd").unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
    }

    #[test]
    fn validate_output_path_null_byte() {
        let base = Path::new("/tmp/output");
        assert!(validate_output_path(base, "file\0name.js").is_err());
    }

    #[test]
    fn temp_names_are_unique_per_call() {
        let target = Path::new("/tmp/output/index.js");
        assert_ne!(temp_path_for(target), temp_path_for(target));
    }

    #[tokio::test]
    async fn writes_nested_files_and_leaves_no_temporaries() {
        let temp = TempDir::new().unwrap();
        let bundle = OutputBundle::new()
            .with(OutputChunk::new("assets/main.js", "main()"))
            .with(OutputAsset::new("index.html", "<html></html>"));

        let written = write_bundle(&bundle, temp.path(), false).await.unwrap();

        assert_eq!(written.len(), 2);
        let js = std::fs::read_to_string(temp.path().join("assets/main.js")).unwrap();
        assert_eq!(js, "main()");
        let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("assets"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn empty_first_removes_stale_files_but_keeps_git() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("stale.js"), "old").unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();

        let bundle = OutputBundle::new().with(OutputChunk::new("fresh.js", "new"));
        write_bundle(&bundle, temp.path(), true).await.unwrap();

        assert!(!temp.path().join("stale.js").exists());
        assert!(temp.path().join(".git").exists());
        assert!(temp.path().join("fresh.js").exists());
    }

    #[tokio::test]
    async fn without_empty_first_existing_files_survive() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("about.html"), "keep").unwrap();

        let bundle = OutputBundle::new().with(OutputChunk::new("islands.js", "x"));
        write_bundle(&bundle, temp.path(), false).await.unwrap();

        assert!(temp.path().join("about.html").exists());
    }

    #[tokio::test]
    async fn rejects_escaping_file_before_writing_anything() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let bundle = OutputBundle::new()
            .with(OutputChunk::new("ok.js", "x"))
            .with(OutputAsset::new("../escape.txt", "x"));

        let err = write_bundle(&bundle, &out, false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
        assert!(!out.join("ok.js").exists());
    }

    #[tokio::test]
    async fn emptying_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        empty_dir(&temp.path().join("nope")).await.unwrap();
    }
}
