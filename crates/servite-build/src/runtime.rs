//! The server runtime collaborator.
//!
//! The runtime owns the production server output: it prerenders routes into
//! its public directory, copies static assets, and produces the deployable
//! server. The build drives it through [`RuntimeHandle`] in a fixed order.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use servite_config::{ResolvedOptions, ServiteConfig};

use crate::BoxError;

/// What the runtime is initialized with.
#[derive(Debug, Clone)]
pub struct RuntimeInit {
    pub app_config: ServiteConfig,
    /// Resolved options of the server-rendering pass, with its base out dir
    pub bundler: ResolvedOptions,
    pub dev: bool,
    pub prerender_routes: Vec<String>,
}

/// Resolved runtime options, as reported by an initialized runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub root: PathBuf,
    /// Absolute; prerendered HTML and island scripts land here
    pub public_dir: PathBuf,
    /// Absolute; where the deployable server is written
    pub output_dir: PathBuf,
    /// Routes to prerender, possibly extended by the runtime
    pub prerender_routes: Vec<String>,
}

/// A server runtime implementation.
#[async_trait]
pub trait ServerRuntime: Send + Sync {
    async fn init(&self, init: RuntimeInit) -> Result<Box<dyn RuntimeHandle>, BoxError>;
}

/// An initialized server runtime.
#[async_trait]
pub trait RuntimeHandle: Send + Sync {
    fn options(&self) -> &RuntimeOptions;

    /// Clean the runtime output directories.
    async fn prepare(&self) -> Result<(), BoxError>;

    async fn copy_public_assets(&self) -> Result<(), BoxError>;

    /// Render every prerender route to `<public_dir>/<route>/index.html`.
    async fn prerender(&self) -> Result<(), BoxError>;

    /// Build the production server.
    async fn build(&self) -> Result<(), BoxError>;

    async fn close(&self) -> Result<(), BoxError>;
}

/// A runtime lifecycle step, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStep {
    Init,
    Prepare,
    CopyPublicAssets,
    Prerender,
    Build,
    Close,
}

impl fmt::Display for RuntimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuntimeStep::Init => "init",
            RuntimeStep::Prepare => "prepare",
            RuntimeStep::CopyPublicAssets => "copy public assets",
            RuntimeStep::Prerender => "prerender",
            RuntimeStep::Build => "build",
            RuntimeStep::Close => "close",
        })
    }
}
