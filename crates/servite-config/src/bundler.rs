//! Inline bundler configuration fragments.
//!
//! Every build phase contributes a [`BundlerOptions`] fragment that is merged
//! over the shared base options before the bundler resolves it. Fields left as
//! `None` keep the base value; lists concatenate.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::html::HtmlTag;
use crate::level::LogLevel;

/// Default chunk size warning limit in KiB
pub const DEFAULT_CHUNK_SIZE_WARNING_LIMIT: u64 = 500;

/// Bundle input: one module, or named entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BuildInput {
    Single(String),
    Named(IndexMap<String, String>),
}

impl BuildInput {
    /// Single named entry
    pub fn named(name: impl Into<String>, module: impl Into<String>) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(name.into(), module.into());
        BuildInput::Named(entries)
    }

    /// Entries as `(name, module)` pairs; a single input has no name.
    pub fn entries(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            BuildInput::Single(module) => vec![(None, module.as_str())],
            BuildInput::Named(map) => map
                .iter()
                .map(|(name, module)| (Some(name.as_str()), module.as_str()))
                .collect(),
        }
    }

    fn merge(&mut self, other: BuildInput) {
        match (self, other) {
            (BuildInput::Named(target), BuildInput::Named(update)) => target.extend(update),
            (target, update) => *target = update,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_out_dir: Option<bool>,

    /// Emit `ssr-manifest.json` (module id → chunk files)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr_manifest: Option<bool>,

    /// Server entry module; set for server-rendering bundles only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<BuildInput>,

    /// In KiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size_warning_limit: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub html_tags: Vec<HtmlTag>,
}

impl BuildOptions {
    fn merge(&mut self, other: BuildOptions) {
        merge_opt(&mut self.out_dir, other.out_dir);
        merge_opt(&mut self.empty_out_dir, other.empty_out_dir);
        merge_opt(&mut self.ssr_manifest, other.ssr_manifest);
        merge_opt(&mut self.ssr, other.ssr);
        merge_opt(
            &mut self.chunk_size_warning_limit,
            other.chunk_size_warning_limit,
        );
        match (&mut self.input, other.input) {
            (Some(target), Some(update)) => target.merge(update),
            (target, update @ Some(_)) => *target = update,
            (_, None) => {}
        }
        self.html_tags.extend(other.html_tags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsrOptions {
    /// Packages bundled into the server bundle instead of externalized
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_external: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
}

impl SsrOptions {
    fn merge(&mut self, other: SsrOptions) {
        extend_unique(&mut self.no_external, other.no_external);
        extend_unique(&mut self.external, other.external);
    }
}

/// Inline bundler options as handed to a build phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Public base path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    #[serde(default)]
    pub build: BuildOptions,

    #[serde(default)]
    pub ssr: SsrOptions,
}

impl BundlerOptions {
    /// Merge `other` over `self`.
    pub fn merge(&mut self, other: BundlerOptions) {
        merge_opt(&mut self.root, other.root);
        merge_opt(&mut self.base, other.base);
        merge_opt(&mut self.mode, other.mode);
        merge_opt(&mut self.log_level, other.log_level);
        self.build.merge(other.build);
        self.ssr.merge(other.ssr);
    }

    /// Builder-style variant of [`merge`](Self::merge).
    pub fn merged(mut self, other: BundlerOptions) -> Self {
        self.merge(other);
        self
    }

    /// Fill in defaults. Relative roots resolve against `cwd`.
    pub fn resolve(self, cwd: &Path) -> ResolvedOptions {
        let root = match self.root {
            Some(root) if root.is_absolute() => root.clean(),
            Some(root) => cwd.join(root).clean(),
            None => cwd.to_path_buf().clean(),
        };

        let out_dir = self.build.out_dir.unwrap_or_else(|| PathBuf::from("dist"));
        // Strictly below the root: emptying the root itself would wipe the project
        let full_out_dir = root.join(&out_dir).clean();
        let out_dir_inside_root = full_out_dir != root && full_out_dir.starts_with(&root);
        let empty_out_dir = match self.build.empty_out_dir {
            Some(empty) => empty,
            None => {
                if !out_dir_inside_root {
                    tracing::warn!(
                        "out dir {} is not strictly inside project root and will not be emptied",
                        out_dir.display()
                    );
                }
                out_dir_inside_root
            }
        };

        ResolvedOptions {
            root,
            base: self.base.unwrap_or_else(|| "/".to_string()),
            mode: self.mode.unwrap_or_else(|| "production".to_string()),
            log_level: self.log_level.unwrap_or_default(),
            build: ResolvedBuildOptions {
                out_dir,
                empty_out_dir,
                ssr_manifest: self.build.ssr_manifest.unwrap_or(false),
                ssr: self.build.ssr,
                input: self.build.input,
                chunk_size_warning_limit: self
                    .build
                    .chunk_size_warning_limit
                    .unwrap_or(DEFAULT_CHUNK_SIZE_WARNING_LIMIT),
                html_tags: self.build.html_tags,
            },
            ssr: self.ssr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedBuildOptions {
    /// Relative to root unless absolute
    pub out_dir: PathBuf,
    pub empty_out_dir: bool,
    pub ssr_manifest: bool,
    pub ssr: Option<String>,
    pub input: Option<BuildInput>,
    pub chunk_size_warning_limit: u64,
    pub html_tags: Vec<HtmlTag>,
}

/// Bundler options after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    /// Always absolute
    pub root: PathBuf,
    pub base: String,
    pub mode: String,
    pub log_level: LogLevel,
    pub build: ResolvedBuildOptions,
    pub ssr: SsrOptions,
}

impl ResolvedOptions {
    /// Absolute output directory
    pub fn out_dir_path(&self) -> PathBuf {
        self.root.join(&self.build.out_dir).clean()
    }

    /// Whether this pass produces a server-rendering bundle
    pub fn is_ssr(&self) -> bool {
        self.build.ssr.is_some()
    }
}

fn merge_opt<T>(target: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *target = update;
    }
}

fn extend_unique(target: &mut Vec<String>, update: Vec<String>) {
    for item in update {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
