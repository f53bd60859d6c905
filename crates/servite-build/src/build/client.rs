//! Browser bundle.

use servite_config::{BuildInput, BuildOptions, BundlerOptions, HtmlTag};

use super::{BuildArtifact, BuildPhase, Builder, PhaseConfig};
use crate::Result;
use crate::constants::{CLIENT_ENTRY_ID, CLIENT_SHELL_HTML, INDEX_HTML};
use crate::html::normalize_posix;
use crate::output::OutputBundle;

pub(crate) fn client_phase() -> PhaseConfig {
    PhaseConfig::new(BundlerOptions {
        build: BuildOptions {
            ssr_manifest: Some(true),
            input: Some(BuildInput::Single(CLIENT_SHELL_HTML.to_string())),
            html_tags: vec![HtmlTag::module_script(CLIENT_ENTRY_ID)],
            ..Default::default()
        },
        ..Default::default()
    })
    .transform_bundle(relocate_shell)
}

/// The shell is emitted under its source path; serve it as `index.html`.
fn relocate_shell(bundle: &mut OutputBundle) {
    for asset in bundle.assets_mut() {
        if normalize_posix(&asset.file_name.replace('\\', "/")) == CLIENT_SHELL_HTML {
            asset.file_name = INDEX_HTML.to_string();
        }
    }
}

impl Builder {
    pub async fn client_build(&self) -> Result<BuildArtifact> {
        tracing::info!("building client bundle");
        self.base_build(BuildPhase::Client, client_phase()).await
    }
}
