//! Server-rendering bundle.

use servite_config::{BuildOptions, BundlerOptions, SsrOptions};

use super::{BuildArtifact, BuildPhase, Builder, PhaseConfig};
use crate::Result;
use crate::constants::{FRAMEWORK_PACKAGE, SSR_ENTRY_ID, SSR_OUT_DIR};

pub(crate) fn ssr_phase() -> PhaseConfig {
    PhaseConfig::new(BundlerOptions {
        build: BuildOptions {
            ssr: Some(SSR_ENTRY_ID.to_string()),
            ..Default::default()
        },
        ssr: SsrOptions {
            // the framework must share module state with the app
            no_external: vec![FRAMEWORK_PACKAGE.to_string()],
            ..Default::default()
        },
        ..Default::default()
    })
    .nested_out_dir(SSR_OUT_DIR)
}

impl Builder {
    /// The artifact's `out_dir` is the base out dir; the bundle itself is
    /// written to its `ssr/` subdirectory.
    pub async fn ssr_build(&self) -> Result<BuildArtifact> {
        tracing::info!("building server bundle");
        self.base_build(BuildPhase::Ssr, ssr_phase()).await
    }
}
