//! The module bundler collaborator.

use async_trait::async_trait;

use crate::BoxError;
use crate::config::{InlineConfig, ResolvedConfig};
use crate::output::OutputBundle;

/// A module bundler.
///
/// One build pass calls [`resolve_config`](Self::resolve_config) once, then
/// [`generate`](Self::generate) with the result (possibly with an adjusted out
/// dir). Writing the bundle to disk is left to the caller.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Resolve an inline config, applying defaults and running config hooks.
    ///
    /// The returned config must carry the inline plugin chain.
    async fn resolve_config(&self, config: InlineConfig) -> Result<ResolvedConfig, BoxError>;

    /// Bundle the inputs described by `config`.
    async fn generate(&self, config: &ResolvedConfig) -> Result<OutputBundle, BoxError>;
}
