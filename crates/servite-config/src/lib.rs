//! # servite-config
//!
//! Configuration types shared by the servite build pipeline.
//!
//! - [`UserServiteConfig`] / [`ServiteConfig`]: the framework configuration and
//!   its defaults.
//! - [`RenderPolicy`]: `true`, `false` or a list of route globs, used for both
//!   server rendering and static generation.
//! - [`BundlerOptions`]: inline bundler configuration fragments, their merge
//!   rules, and resolution into [`ResolvedOptions`].
//! - [`HtmlTag`]: tag descriptors injected into the HTML shell.

pub mod app;
pub mod bundler;
pub mod error;
pub mod html;
pub mod level;

pub use app::*;
pub use bundler::*;
pub use error::*;
pub use html::{HtmlTag, InjectTo, inject_tags};
pub use level::LogLevel;
