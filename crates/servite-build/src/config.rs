//! Bundler config as it flows through a build pass: inline options plus the
//! plugin chain, before and after resolution.

use std::path::{Path, PathBuf};

use servite_config::{BundlerOptions, ResolvedOptions};

use crate::plugins::PluginChain;

/// Inline config for one bundler invocation.
#[derive(Debug, Clone, Default)]
pub struct InlineConfig {
    pub options: BundlerOptions,
    pub plugins: PluginChain,
}

impl InlineConfig {
    pub fn new(options: BundlerOptions) -> Self {
        Self {
            options,
            plugins: PluginChain::new(),
        }
    }

    pub fn plugins(mut self, plugins: PluginChain) -> Self {
        self.plugins = plugins;
        self
    }

    /// Merge a phase fragment over `self`.
    pub fn merge(&mut self, fragment: InlineConfig) {
        self.options.merge(fragment.options);
        self.plugins.merge(fragment.plugins);
    }

    pub fn merged(mut self, fragment: InlineConfig) -> Self {
        self.merge(fragment);
        self
    }

    /// Apply option defaults. Bundler implementations call this from
    /// [`Bundler::resolve_config`](crate::Bundler::resolve_config) unless
    /// they resolve options themselves.
    pub fn resolve(self, cwd: &Path) -> ResolvedConfig {
        ResolvedConfig {
            options: self.options.resolve(cwd),
            plugins: self.plugins,
        }
    }
}

impl From<BundlerOptions> for InlineConfig {
    fn from(options: BundlerOptions) -> Self {
        InlineConfig::new(options)
    }
}

/// The bundler's fully resolved config for one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub options: ResolvedOptions,
    pub plugins: PluginChain,
}

impl ResolvedConfig {
    pub fn root(&self) -> &Path {
        &self.options.root
    }

    pub fn base(&self) -> &str {
        &self.options.base
    }

    /// Absolute output directory
    pub fn out_dir_path(&self) -> PathBuf {
        self.options.out_dir_path()
    }
}
