//! Island bundles: one script per prerendered page.

use servite_config::{BuildInput, BuildOptions, BundlerOptions, LogLevel};

use super::{BuildArtifact, BuildPhase, Builder, PhaseConfig};
use crate::Result;
use crate::constants::ISLANDS_ENTRY_NAME;
use crate::output::{OutputBundle, OutputItem};
use crate::runtime::RuntimeOptions;

pub(crate) fn islands_phase(runtime_options: &RuntimeOptions, entry: &str) -> PhaseConfig {
    PhaseConfig::new(BundlerOptions {
        log_level: Some(LogLevel::Warn),
        build: BuildOptions {
            // the public dir already holds prerendered pages
            empty_out_dir: Some(false),
            out_dir: Some(runtime_options.public_dir.clone()),
            input: Some(BuildInput::named(ISLANDS_ENTRY_NAME, entry)),
            ..Default::default()
        },
        ..Default::default()
    })
    .transform_bundle(drop_assets)
}

/// Styles and other assets were already emitted by the client pass.
fn drop_assets(bundle: &mut OutputBundle) {
    bundle.items.retain(|item| !matches!(item, OutputItem::Asset(_)));
}

impl Builder {
    /// Bundle a single island entry into the runtime's public dir.
    pub async fn islands_build(
        &self,
        runtime_options: &RuntimeOptions,
        entry: &str,
    ) -> Result<BuildArtifact> {
        tracing::debug!("building island entry {}", entry.escape_debug());
        self.base_build(BuildPhase::Islands, islands_phase(runtime_options, entry))
            .await
    }
}
