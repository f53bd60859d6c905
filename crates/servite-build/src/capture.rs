//! Reading framework state back out of a resolved bundler config.

use servite_config::ServiteConfig;

use crate::config::ResolvedConfig;
use crate::pages::Page;
use crate::{Error, Result};

/// Framework state captured from one build pass.
#[derive(Debug, Clone)]
pub struct Captured {
    pub app_config: ServiteConfig,
    pub pages: Vec<Page>,
}

/// Look up the framework and pages plugins in `resolved` and read their state.
///
/// Fails with [`Error::MissingPlugin`] when either plugin is absent from the
/// resolved plugin chain.
pub async fn capture(resolved: &ResolvedConfig) -> Result<Captured> {
    let servite = resolved.plugins.servite()?;
    let pages_plugin = resolved.plugins.pages()?;

    let app_config = servite.servite_config();
    let pages = pages_plugin
        .pages()
        .await
        .map_err(|source| Error::Pages { source })?;

    tracing::debug!("captured {} pages", pages.len());

    Ok(Captured { app_config, pages })
}
