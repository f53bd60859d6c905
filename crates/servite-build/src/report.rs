//! Size report for built island scripts.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use owo_colors::OwoColorize;

use crate::ui::format_kib;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSummaryEntry {
    pub file_name: String,
    pub size_bytes: u64,
    pub gzip_size_bytes: u64,
}

impl AssetSummaryEntry {
    pub fn exceeds(&self, limit_kib: u64) -> bool {
        self.size_bytes > limit_kib.saturating_mul(1024)
    }
}

/// Size of `bytes` after gzip at the highest compression level.
pub fn gzip_size(bytes: &[u8]) -> Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(bytes)
        .map_err(|e| Error::io("Failed to gzip asset", e))?;
    let compressed = encoder
        .finish()
        .map_err(|e| Error::io("Failed to gzip asset", e))?;
    Ok(compressed.len() as u64)
}

/// Read each of `names` under `dir` and measure it.
pub async fn summarize(dir: &Path, names: &[String]) -> Result<Vec<AssetSummaryEntry>> {
    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::io(format!("Failed to read asset '{}'", path.display()), e))?;
        entries.push(AssetSummaryEntry {
            file_name: name.clone(),
            size_bytes: bytes.len() as u64,
            gzip_size_bytes: gzip_size(&bytes)?,
        });
    }
    Ok(entries)
}

/// Write a tree listing of `entries`, one line each.
///
/// Sizes over `limit_kib` are highlighted.
pub fn print_assets<W: Write>(
    out: &mut W,
    display_dir: &str,
    entries: &[AssetSummaryEntry],
    limit_kib: u64,
) -> std::io::Result<()> {
    let width = entries
        .iter()
        .map(|entry| entry.file_name.chars().count())
        .max()
        .unwrap_or(0)
        + 3;
    let prefix = if display_dir.is_empty() {
        String::new()
    } else {
        format!("{}/", display_dir.trim_end_matches('/'))
    };

    for (index, entry) in entries.iter().enumerate() {
        let branch = if index + 1 == entries.len() {
            "└─"
        } else {
            "├─"
        };
        let name = format!("{:<width$}", entry.file_name);
        let sizes = format!(
            "{} KiB / gzip: {} KiB",
            format_kib(entry.size_bytes),
            format_kib(entry.gzip_size_bytes)
        );

        if entry.exceeds(limit_kib) {
            writeln!(
                out,
                "  {} {}{}{}",
                branch.dimmed(),
                prefix.dimmed(),
                name.cyan(),
                sizes.yellow()
            )?;
        } else {
            writeln!(
                out,
                "  {} {}{}{}",
                branch.dimmed(),
                prefix.dimmed(),
                name.cyan(),
                sizes.dimmed()
            )?;
        }
    }
    Ok(())
}

/// Measure the named files under `root/out_dir`, list them on stdout and warn
/// about the ones over `limit_kib`.
pub async fn report_assets(
    root: &Path,
    out_dir: &Path,
    names: &[String],
    limit_kib: u64,
) -> Result<Vec<AssetSummaryEntry>> {
    let dir = root.join(out_dir);
    let entries = summarize(&dir, names).await?;

    let display_dir: PathBuf = dir
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| dir.clone());
    let display_dir = display_dir.to_string_lossy().replace('\\', "/");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    print_assets(&mut out, &display_dir, &entries, limit_kib)
        .map_err(|e| Error::io("Failed to write asset report", e))?;

    for entry in entries.iter().filter(|entry| entry.exceeds(limit_kib)) {
        tracing::warn!(
            "{} is {} KiB, larger than {} KiB after minification",
            entry.file_name,
            format_kib(entry.size_bytes),
            limit_kib
        );
    }

    Ok(entries)
}
