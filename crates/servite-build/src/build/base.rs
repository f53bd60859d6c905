//! One bundler invocation.

use std::path::PathBuf;

use servite_config::ServiteConfig;

use super::{BuildPhase, Builder};
use crate::capture::{Captured, capture};
use crate::config::{InlineConfig, ResolvedConfig};
use crate::html::entry_url;
use crate::output::{OutputBundle, OutputChunk, write_bundle};
use crate::pages::Page;
use crate::{Error, Result};

/// What a build phase adds to the shared base config.
#[derive(Debug, Clone, Default)]
pub struct PhaseConfig {
    /// Merged over the base config
    pub config: InlineConfig,
    /// Written under the resolved out dir; never handed to the bundler
    pub nested_out_dir: Option<PathBuf>,
    /// Runs on the generated bundle before it is written
    pub transform_bundle: Option<fn(&mut OutputBundle)>,
}

impl PhaseConfig {
    pub fn new(config: impl Into<InlineConfig>) -> Self {
        Self {
            config: config.into(),
            ..Default::default()
        }
    }

    pub fn nested_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.nested_out_dir = Some(dir.into());
        self
    }

    pub fn transform_bundle(mut self, transform: fn(&mut OutputBundle)) -> Self {
        self.transform_bundle = Some(transform);
        self
    }
}

/// Result of one build phase.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    pub bundle: OutputBundle,
    /// The config the bundle was generated with, nested out dir included
    pub resolved: ResolvedConfig,
    pub app_config: ServiteConfig,
    /// Out dir as resolved, before nesting
    pub out_dir: PathBuf,
    pub pages: Vec<Page>,
}

impl BuildArtifact {
    pub fn entry_chunk(&self) -> Option<&OutputChunk> {
        self.bundle.entry_chunk()
    }

    /// Public URL of the entry chunk under the resolved base.
    pub fn entry_url(&self, phase: BuildPhase) -> Result<String> {
        let chunk = self
            .entry_chunk()
            .ok_or(Error::MissingEntryChunk { phase })?;
        Ok(entry_url(self.resolved.base(), &chunk.file_name))
    }
}

impl Builder {
    /// Merge `phase_config` over the base config, resolve it, read the
    /// framework state back out, generate, and write the bundle.
    pub async fn base_build(
        &self,
        phase: BuildPhase,
        phase_config: PhaseConfig,
    ) -> Result<BuildArtifact> {
        let PhaseConfig {
            config,
            nested_out_dir,
            transform_bundle,
        } = phase_config;

        let inline = self.inline_config.clone().merged(config);
        let mut resolved = self
            .bundler
            .resolve_config(inline)
            .await
            .map_err(|source| Error::Bundler { phase, source })?;

        let Captured { app_config, pages } = capture(&resolved).await?;

        let out_dir = resolved.options.build.out_dir.clone();
        if let Some(nested) = &nested_out_dir {
            resolved.options.build.out_dir = out_dir.join(nested);
        }

        let mut bundle = self
            .bundler
            .generate(&resolved)
            .await
            .map_err(|source| Error::Bundler { phase, source })?;

        if let Some(transform) = transform_bundle {
            transform(&mut bundle);
        }

        let target = resolved.out_dir_path();
        write_bundle(&bundle, &target, resolved.options.build.empty_out_dir).await?;

        tracing::debug!(
            "{phase} bundle: {} files written to {}",
            bundle.len(),
            target.display()
        );

        Ok(BuildArtifact {
            bundle,
            resolved,
            app_config,
            out_dir,
            pages,
        })
    }
}
