//! Production build orchestration.
//!
//! A build runs these phases strictly in order:
//!
//! 1. client bundle (HTML shell, client entry, ssr manifest)
//! 2. server-rendering bundle, nested under `ssr/`
//! 3. server runtime init and prepare
//! 4. server assets copied next to the runtime output
//! 5. public assets copied, routes prerendered, island scripts built per page
//! 6. runtime build and close
//!
//! Every phase resolves its own config from the shared base [`InlineConfig`],
//! so phases never observe each other's config changes.

mod base;
mod client;
mod islands;
mod prerender;
mod ssr;

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub use base::{BuildArtifact, PhaseConfig};
pub use prerender::IslandBuild;

use crate::bundler::Bundler;
use crate::config::InlineConfig;
use crate::constants::{SERVER_ASSET_FILES, SERVER_ASSETS_DIR};
use crate::routes::select_prerender_routes;
use crate::runtime::{RuntimeInit, RuntimeStep, ServerRuntime};
use crate::ui::format_duration;
use crate::{BoxError, Error, Result};

/// Which bundler pass a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Client,
    Ssr,
    Islands,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildPhase::Client => "client",
            BuildPhase::Ssr => "ssr",
            BuildPhase::Islands => "islands",
        })
    }
}

/// Outcome of a full build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Public URL of the client entry chunk
    pub client_entry_url: String,
    pub prerender_routes: Vec<String>,
    /// In route order
    pub islands: Vec<IslandBuild>,
}

/// Runs build phases against one bundler, one server runtime and a shared
/// base config.
#[derive(Clone)]
pub struct Builder {
    bundler: Arc<dyn Bundler>,
    runtime: Arc<dyn ServerRuntime>,
    inline_config: InlineConfig,
}

impl Builder {
    pub fn new(
        bundler: Arc<dyn Bundler>,
        runtime: Arc<dyn ServerRuntime>,
        inline_config: InlineConfig,
    ) -> Self {
        Self {
            bundler,
            runtime,
            inline_config,
        }
    }

    pub fn inline_config(&self) -> &InlineConfig {
        &self.inline_config
    }

    /// Run every phase. The first failure aborts the build; files written by
    /// earlier phases stay on disk.
    pub async fn build(&self) -> Result<BuildSummary> {
        let start = Instant::now();

        let client = self.client_build().await?;
        let client_entry_url = client.entry_url(BuildPhase::Client)?;
        tracing::debug!("client entry: {client_entry_url}");

        let ssr = self.ssr_build().await?;
        let prerender_routes = select_prerender_routes(&ssr.pages, &ssr.app_config.ssg);
        tracing::debug!("prerender routes: {prerender_routes:?}");

        // the runtime must see the base out dir, not ssr/
        let mut bundler_options = ssr.resolved.options.clone();
        bundler_options.build.out_dir = ssr.out_dir.clone();

        let root = bundler_options.root.clone();
        let out_dir = bundler_options.build.out_dir.clone();

        tracing::info!("initializing server runtime");
        let runtime = self
            .runtime
            .init(RuntimeInit {
                app_config: ssr.app_config.clone(),
                bundler: bundler_options,
                dev: false,
                prerender_routes: prerender_routes.clone(),
            })
            .await
            .map_err(runtime_error(RuntimeStep::Init))?;

        runtime
            .prepare()
            .await
            .map_err(runtime_error(RuntimeStep::Prepare))?;
        copy_server_assets(&root, &out_dir).await?;
        runtime
            .copy_public_assets()
            .await
            .map_err(runtime_error(RuntimeStep::CopyPublicAssets))?;

        let islands = prerender::prerender(self, runtime.as_ref(), &client_entry_url).await?;

        tracing::info!("building server");
        runtime
            .build()
            .await
            .map_err(runtime_error(RuntimeStep::Build))?;
        runtime
            .close()
            .await
            .map_err(runtime_error(RuntimeStep::Close))?;

        tracing::info!("build complete in {}", format_duration(start.elapsed()));

        Ok(BuildSummary {
            client_entry_url,
            prerender_routes,
            islands,
        })
    }
}

/// Build with `bundler` and `runtime` from `inline_config`.
pub async fn build(
    bundler: Arc<dyn Bundler>,
    runtime: Arc<dyn ServerRuntime>,
    inline_config: InlineConfig,
) -> Result<BuildSummary> {
    Builder::new(bundler, runtime, inline_config).build().await
}

fn runtime_error(step: RuntimeStep) -> impl FnOnce(BoxError) -> Error {
    move |source| Error::Runtime { step, source }
}

/// Copy the client's `index.html` and `ssr-manifest.json` to where the server
/// runtime reads them at request time.
pub(crate) async fn copy_server_assets(root: &Path, out_dir: &Path) -> Result<()> {
    let from = root.join(out_dir);
    let to = from.join(SERVER_ASSETS_DIR);

    tokio::fs::create_dir_all(&to)
        .await
        .map_err(|e| Error::io(format!("Failed to create '{}'", to.display()), e))?;

    for file in SERVER_ASSET_FILES {
        let src = from.join(file);
        let dest = to.join(file);
        tokio::fs::copy(&src, &dest).await.map_err(|e| {
            Error::io(
                format!("Failed to copy '{}' to '{}'", src.display(), dest.display()),
                e,
            )
        })?;
    }

    Ok(())
}
