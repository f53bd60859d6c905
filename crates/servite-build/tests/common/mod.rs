//! In-memory bundler and server runtime for pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use servite_build::constants::{CLIENT_ENTRY_ID, SERVER_ASSETS_DIR};
use servite_build::{
    BoxError, Bundler, InlineConfig, OutputAsset, OutputBundle, OutputChunk, Page, PluginChain,
    ResolvedConfig, RuntimeHandle, RuntimeInit, RuntimeOptions, ServerRuntime, ServiteConfig,
};
use servite_config::{BuildInput, BundlerOptions, ResolvedOptions, inject_tags};
use tempfile::TempDir;

/// URL of the client entry chunk emitted by [`FakeBundler`] under base `/`.
pub const CLIENT_ENTRY_URL: &str = "/assets/index.js";

const SHELL: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>app</title>\n</head>\n<body>\n<div id=\"root\"><!--app-html--></div>\n</body>\n</html>\n";

/// Island script reference as the server renderer emits it.
pub fn island_tag(name: &str) -> String {
    format!(
        r#"<script type="module" src="/@id/__x00__virtual:servite/islands/{name}"></script>"#
    )
}

fn short_hash(value: &str) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

/// Which pass a generate call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Client,
    Ssr,
    Islands,
}

fn pass_of(options: &ResolvedOptions) -> Pass {
    if options.is_ssr() {
        Pass::Ssr
    } else if matches!(options.build.input, Some(BuildInput::Named(_))) {
        Pass::Islands
    } else {
        Pass::Client
    }
}

/// Deterministic stand-in for a module bundler.
///
/// - client pass (single HTML input): entry chunk, a stylesheet, the HTML shell
///   with injected tags and, when requested, an ssr manifest
/// - server pass: one server entry chunk
/// - named-input pass: one hashed chunk plus a stylesheet per entry
#[derive(Default)]
pub struct FakeBundler {
    cwd: PathBuf,
    /// Module id substring → latency before generating
    delays: Vec<(String, Duration)>,
    fail_pass: Option<Pass>,
    calls: Mutex<Vec<ResolvedOptions>>,
}

impl FakeBundler {
    pub fn new(cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, module_contains: &str, delay: Duration) -> Self {
        self.delays.push((module_contains.to_string(), delay));
        self
    }

    pub fn failing(mut self, pass: Pass) -> Self {
        self.fail_pass = Some(pass);
        self
    }

    pub fn calls(&self) -> Vec<ResolvedOptions> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, pass: Pass) -> Vec<ResolvedOptions> {
        self.calls()
            .into_iter()
            .filter(|options| pass_of(options) == pass)
            .collect()
    }

    fn client_bundle(options: &ResolvedOptions, shell_path: &str) -> OutputBundle {
        let entry_url = format!("{}assets/index.js", options.base);
        let html = inject_tags(SHELL, &options.build.html_tags).replace(CLIENT_ENTRY_ID, &entry_url);

        let mut bundle = OutputBundle::new()
            .with(
                OutputChunk::new("assets/index.js", "hydrateRoot(document.body);")
                    .entry("index")
                    .facade(CLIENT_ENTRY_ID),
            )
            .with(OutputAsset::new("assets/index.css", "body{margin:0}"))
            .with(OutputAsset::new(shell_path, html));
        if options.build.ssr_manifest {
            bundle.push(OutputAsset::new(
                "ssr-manifest.json",
                r#"{"src/pages/index.tsx":["/assets/index.js"]}"#,
            ));
        }
        bundle
    }

    fn delay_for(&self, options: &ResolvedOptions) -> Option<Duration> {
        let input = options.build.input.as_ref()?;
        input.entries().into_iter().find_map(|(_, module)| {
            self.delays
                .iter()
                .find(|(key, _)| module.contains(key.as_str()))
                .map(|(_, delay)| *delay)
        })
    }

    fn named_bundle(&self, input: &BuildInput) -> OutputBundle {
        let mut bundle = OutputBundle::new();
        for (name, module) in input.entries() {
            let name = name.unwrap_or("main");
            let hash = short_hash(module);
            bundle.push(
                OutputChunk::new(
                    format!("assets/{name}.{hash}.js"),
                    format!("import {:?};", module),
                )
                .entry(name)
                .facade(module),
            );
            bundle.push(OutputAsset::new(
                format!("assets/{name}.{hash}.css"),
                ".island{}",
            ));
        }
        bundle
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn resolve_config(&self, config: InlineConfig) -> Result<ResolvedConfig, BoxError> {
        Ok(config.resolve(&self.cwd))
    }

    async fn generate(&self, config: &ResolvedConfig) -> Result<OutputBundle, BoxError> {
        let options = &config.options;
        // latency before the call is observed, so call order is finish order
        if let Some(delay) = self.delay_for(options) {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(options.clone());

        let pass = pass_of(options);
        if self.fail_pass == Some(pass) {
            return Err(format!("{pass:?} pass exploded").into());
        }

        match (&options.build.ssr, &options.build.input) {
            (Some(entry), _) => Ok(OutputBundle::new().with(
                OutputChunk::new("entry.server.js", format!("export * from {entry:?};"))
                    .entry("entry.server"),
            )),
            (None, Some(BuildInput::Single(shell))) => Ok(Self::client_bundle(options, shell)),
            (None, Some(input @ BuildInput::Named(_))) => Ok(self.named_bundle(input)),
            (None, None) => Err("no input".into()),
        }
    }
}

/// Stand-in for the server runtime.
///
/// Prerendering fills the server-assets HTML shell with a per-route body.
#[derive(Default)]
pub struct FakeRuntime {
    bodies: HashMap<String, String>,
    fail_prerender: bool,
    steps: Arc<Mutex<Vec<&'static str>>>,
    init: Mutex<Option<RuntimeInit>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body rendered for `route`; routes without a body produce no HTML.
    pub fn with_page(mut self, route: &str, body: &str) -> Self {
        self.bodies.insert(route.to_string(), body.to_string());
        self
    }

    pub fn failing_prerender(mut self) -> Self {
        self.fail_prerender = true;
        self
    }

    pub fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().unwrap().clone()
    }

    pub fn init_args(&self) -> Option<RuntimeInit> {
        self.init.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServerRuntime for FakeRuntime {
    async fn init(&self, init: RuntimeInit) -> Result<Box<dyn RuntimeHandle>, BoxError> {
        self.steps.lock().unwrap().push("init");

        let root = init.bundler.root.clone();
        let out_dir = root.join(&init.bundler.build.out_dir);
        let options = RuntimeOptions {
            root,
            public_dir: out_dir.join(".output/public"),
            output_dir: out_dir.join(".output"),
            prerender_routes: init.prerender_routes.clone(),
        };
        *self.init.lock().unwrap() = Some(init);

        Ok(Box::new(FakeHandle {
            options,
            server_assets: out_dir.join(SERVER_ASSETS_DIR),
            bodies: self.bodies.clone(),
            fail_prerender: self.fail_prerender,
            steps: Arc::clone(&self.steps),
        }))
    }
}

struct FakeHandle {
    options: RuntimeOptions,
    server_assets: PathBuf,
    bodies: HashMap<String, String>,
    fail_prerender: bool,
    steps: Arc<Mutex<Vec<&'static str>>>,
}

impl FakeHandle {
    fn record(&self, step: &'static str) {
        self.steps.lock().unwrap().push(step);
    }
}

#[async_trait]
impl RuntimeHandle for FakeHandle {
    fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    async fn prepare(&self) -> Result<(), BoxError> {
        self.record("prepare");
        tokio::fs::create_dir_all(&self.options.public_dir).await?;
        Ok(())
    }

    async fn copy_public_assets(&self) -> Result<(), BoxError> {
        self.record("copy_public_assets");
        Ok(())
    }

    async fn prerender(&self) -> Result<(), BoxError> {
        self.record("prerender");
        if self.fail_prerender {
            return Err("render crashed".into());
        }

        let shell = tokio::fs::read_to_string(self.server_assets.join("index.html")).await?;
        for route in &self.options.prerender_routes {
            let Some(body) = self.bodies.get(route) else {
                continue;
            };
            let dir = self.options.public_dir.join(route.trim_start_matches('/'));
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(dir.join("index.html"), shell.replace("<!--app-html-->", body))
                .await?;
        }
        Ok(())
    }

    async fn build(&self) -> Result<(), BoxError> {
        self.record("build");
        Ok(())
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.record("close");
        Ok(())
    }
}

/// A project root with its base config.
pub struct Fixture {
    pub temp: TempDir,
    pub config: InlineConfig,
}

impl Fixture {
    /// `ssg` is the framework's static generation setting, as JSON.
    pub fn new(pages: Vec<Page>, ssg: serde_json::Value) -> Self {
        let temp = TempDir::new().unwrap();
        let app_config = ServiteConfig::from_value(serde_json::json!({ "ssg": ssg })).unwrap();
        let config = InlineConfig::new(BundlerOptions {
            root: Some(temp.path().to_path_buf()),
            ..Default::default()
        })
        .plugins(
            PluginChain::new()
                .with_servite(Arc::new(app_config))
                .with_pages(Arc::new(pages)),
        );
        Self { temp, config }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.dist().join(".output/public")
    }

    pub fn page_html(&self, route: &str) -> Option<String> {
        let path = self
            .public_dir()
            .join(route.trim_start_matches('/'))
            .join("index.html");
        std::fs::read_to_string(path).ok()
    }
}

pub fn pages(routes: &[&str]) -> Vec<Page> {
    routes
        .iter()
        .map(|route| {
            let file = if *route == "/" {
                "index".to_string()
            } else {
                route.trim_start_matches('/').to_string()
            };
            Page::new(*route, format!("src/pages/{file}.tsx"))
        })
        .collect()
}
