//! Static rendering and per-page island builds.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tokio::task::JoinSet;

use super::{BuildPhase, Builder};
use crate::config::ResolvedConfig;
use crate::constants::INDEX_HTML;
use crate::html::{entry_url, find_island_reference, rewrite_island_html, unwrap_id};
use crate::report::report_assets;
use crate::runtime::{RuntimeHandle, RuntimeOptions, RuntimeStep};
use crate::ui::IslandSpinner;
use crate::{Error, Result};

/// An island bundle built for one prerendered page.
#[derive(Debug, Clone)]
pub struct IslandBuild {
    pub route_path: String,
    /// The rewritten page
    pub html_path: PathBuf,
    /// Virtual module URL found in the page
    pub script_url: String,
    /// Entry chunk, relative to the public dir
    pub file_name: String,
    /// URL now referenced by the page
    pub final_url: String,
    pub resolved: ResolvedConfig,
}

/// Let the runtime render every prerender route, then build and link the
/// island script of each rendered page.
///
/// Pages are handled concurrently. Islands come back in route order; pages
/// that were not rendered or have no island are skipped.
pub(crate) async fn prerender(
    builder: &Builder,
    runtime: &dyn RuntimeHandle,
    client_entry_url: &str,
) -> Result<Vec<IslandBuild>> {
    let options = Arc::new(runtime.options().clone());
    let routes = options.prerender_routes.clone();
    if routes.is_empty() {
        tracing::debug!("no routes to prerender");
        return Ok(Vec::new());
    }

    tracing::info!("prerendering {} routes", routes.len());
    runtime
        .prerender()
        .await
        .map_err(|source| Error::Runtime {
            step: RuntimeStep::Prerender,
            source,
        })?;

    let spinner: Arc<OnceLock<IslandSpinner>> = Arc::new(OnceLock::new());
    let client_entry_url: Arc<str> = Arc::from(client_entry_url);

    let mut join_set = JoinSet::new();
    for (index, route) in routes.iter().cloned().enumerate() {
        let builder = builder.clone();
        let options = Arc::clone(&options);
        let spinner = Arc::clone(&spinner);
        let client_entry_url = Arc::clone(&client_entry_url);

        join_set.spawn(async move {
            let result =
                build_page_island(&builder, &options, &route, &client_entry_url, &spinner).await;
            (index, result)
        });
    }

    let mut slots: Vec<Option<IslandBuild>> = (0..routes.len()).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        let failure = match joined {
            Ok((index, Ok(island))) => {
                slots[index] = island;
                continue;
            }
            Ok((_, Err(err))) => err,
            Err(join_err) => Error::TaskPanicked(join_err.to_string()),
        };

        join_set.abort_all();
        if let Some(spinner) = spinner.get() {
            spinner.fail();
        }
        return Err(failure);
    }

    let islands: Vec<IslandBuild> = slots.into_iter().flatten().collect();

    if let Some(spinner) = spinner.get() {
        spinner.finish(islands.len());
    }

    if let Some(last) = islands.last() {
        let names: Vec<String> = islands.iter().map(|i| i.file_name.clone()).collect();
        let build = &last.resolved.options.build;
        report_assets(
            last.resolved.root(),
            &build.out_dir,
            &names,
            build.chunk_size_warning_limit,
        )
        .await?;
    }

    Ok(islands)
}

async fn build_page_island(
    builder: &Builder,
    options: &RuntimeOptions,
    route: &str,
    client_entry_url: &str,
    spinner: &OnceLock<IslandSpinner>,
) -> Result<Option<IslandBuild>> {
    let html_path = options
        .public_dir
        .join(route.trim_start_matches('/'))
        .join(INDEX_HTML);

    let Some(html) = read_rendered(&html_path).await? else {
        tracing::debug!("{route}: no prerendered html at {}", html_path.display());
        return Ok(None);
    };

    let Some(reference) = find_island_reference(route, &html) else {
        tracing::debug!("{route}: no islands");
        return Ok(None);
    };

    let spinner = spinner.get_or_init(IslandSpinner::start);
    spinner.building(route);
    let artifact = builder
        .islands_build(options, &unwrap_id(&reference.script_url))
        .await;
    spinner.built();
    let artifact = artifact?;
    let file_name = artifact
        .entry_chunk()
        .ok_or(Error::MissingEntryChunk {
            phase: BuildPhase::Islands,
        })?
        .file_name
        .clone();
    let final_url = entry_url(artifact.resolved.base(), &file_name);

    let rewritten = rewrite_island_html(&html, client_entry_url, &reference.script_url, &final_url);
    tokio::fs::write(&html_path, rewritten)
        .await
        .map_err(|e| Error::io(format!("Failed to write '{}'", html_path.display()), e))?;

    tracing::debug!("{route}: island {file_name}");

    Ok(Some(IslandBuild {
        route_path: reference.route_path,
        html_path,
        script_url: reference.script_url,
        file_name,
        final_url,
        resolved: artifact.resolved,
    }))
}

/// The page the runtime rendered at `path`, or `None` when it rendered none.
async fn read_rendered(path: &Path) -> Result<Option<String>> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| Error::io(format!("Failed to check '{}'", path.display()), e))?;
    if !exists {
        return Ok(None);
    }

    tokio::fs::read_to_string(path)
        .await
        .map(Some)
        .map_err(|e| Error::io(format!("Failed to read '{}'", path.display()), e))
}
