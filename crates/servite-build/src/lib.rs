#![cfg_attr(docsrs, feature(doc_cfg))]

//! # servite-build
//!
//! Production build orchestration for servite apps: a client bundle, a
//! server-rendering bundle, static prerendering of selected routes, and one
//! island bundle per prerendered page that hydrates only its interactive parts.
//!
//! The bundler and the server runtime are collaborators behind the
//! [`Bundler`] and [`ServerRuntime`] traits. This crate sequences them, pulls the
//! state each pass needs out of the resolved config, and rewrites the
//! prerendered HTML.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use servite_build::{InlineConfig, PluginChain, build};
//! # use servite_build::{Bundler, ServerRuntime, PagesPlugin};
//! # async fn example(
//! #     bundler: Arc<dyn Bundler>,
//! #     runtime: Arc<dyn ServerRuntime>,
//! #     pages: Arc<dyn PagesPlugin>,
//! # ) -> servite_build::Result<()> {
//! let app_config = servite_config::ServiteConfig::from_value(serde_json::json!({
//!     "ssg": ["/", "/docs/**"]
//! }))?;
//!
//! let config = InlineConfig::default().plugins(
//!     PluginChain::new()
//!         .with_servite(Arc::new(app_config))
//!         .with_pages(pages),
//! );
//!
//! let summary = build(bundler, runtime, config).await?;
//! println!("{} islands built", summary.islands.len());
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod bundler;
pub mod capture;
pub mod config;
pub mod constants;
pub mod html;
pub mod output;
pub mod pages;
pub mod plugins;
pub mod report;
pub mod routes;
pub mod runtime;
pub mod ui;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{init_logging, init_logging_from_env};

pub use build::{BuildArtifact, BuildPhase, BuildSummary, Builder, IslandBuild, PhaseConfig, build};
pub use bundler::Bundler;
pub use capture::{Captured, capture};
pub use config::{InlineConfig, ResolvedConfig};
pub use output::{OutputAsset, OutputBundle, OutputChunk, OutputItem};
pub use pages::Page;
pub use plugins::{PagesPlugin, PluginChain, ServitePlugin};
pub use report::AssetSummaryEntry;
pub use routes::select_prerender_routes;
pub use runtime::{RuntimeHandle, RuntimeInit, RuntimeOptions, RuntimeStep, ServerRuntime};

pub use servite_config::{LogLevel, RenderPolicy, ServiteConfig};

/// Error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for servite-build operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A collaborator plugin the build depends on is not in the plugin chain.
    #[error("bundler plugin \"{name}\" not found")]
    MissingPlugin { name: &'static str },

    /// The bundler rejected a build pass.
    #[error("{phase} build failed: {source}")]
    Bundler {
        phase: BuildPhase,
        #[source]
        source: BoxError,
    },

    /// The pages plugin failed to enumerate pages.
    #[error("failed to load pages: {source}")]
    Pages {
        #[source]
        source: BoxError,
    },

    /// A server runtime step failed.
    #[error("server runtime {step} failed: {source}")]
    Runtime {
        step: RuntimeStep,
        #[source]
        source: BoxError,
    },

    /// A build pass produced no script chunk to point the HTML at.
    #[error("{phase} build emitted no entry chunk")]
    MissingEntryChunk { phase: BuildPhase },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// I/O error with context message.
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid framework configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] servite_config::ConfigError),

    /// A prerender task panicked.
    #[error("Build task panicked: {0}")]
    TaskPanicked(String),
}

/// Result type alias for servite-build operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source,
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::MissingPlugin { .. } => "MISSING_PLUGIN",
            Error::Bundler { .. } => "BUNDLER_ERROR",
            Error::Pages { .. } => "PAGES_ERROR",
            Error::Runtime { .. } => "RUNTIME_ERROR",
            Error::MissingEntryChunk { .. } => "MISSING_ENTRY_CHUNK",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::Io { .. } => "IO_ERROR",
            Error::Config(_) => "INVALID_CONFIG",
            Error::TaskPanicked(_) => "TASK_PANICKED",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::MissingPlugin { name } => Some(Box::new(format!(
                "Add the \"{name}\" plugin to the bundler config before building."
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Ensure it stays inside the output directory."
            ))),
            Error::Io { .. } => Some(Box::new(
                "Check disk space and permissions. Files written by earlier phases are left in place.",
            )),
            Error::TaskPanicked(_) => Some(Box::new("This is a bug in servite. Please report it.")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn missing_plugin_names_the_plugin() {
        let err = Error::MissingPlugin {
            name: constants::PAGES_PLUGIN_NAME,
        };
        assert_eq!(err.to_string(), "bundler plugin \"servite:pages\" not found");
        assert_eq!(err.code().unwrap().to_string(), "MISSING_PLUGIN");
        assert!(err.help().unwrap().to_string().contains("servite:pages"));
    }

    #[test]
    fn bundler_error_mentions_phase() {
        let err = Error::Bundler {
            phase: BuildPhase::Ssr,
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "ssr build failed: boom");
    }
}
