//! Collaborator plugins carried through the bundler config.
//!
//! The bundler's build result does not expose the framework config or the page
//! list. Both come from plugins that travel with the config, so each build pass
//! can read them back out of its own resolved config. Slots are named and
//! typed; an empty slot is reported as [`Error::MissingPlugin`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use servite_config::ServiteConfig;

use crate::constants::{PAGES_PLUGIN_NAME, SERVITE_PLUGIN_NAME};
use crate::pages::Page;
use crate::{BoxError, Error, Result};

/// The framework plugin: owns the resolved [`ServiteConfig`].
pub trait ServitePlugin: Send + Sync {
    fn servite_config(&self) -> ServiteConfig;
}

impl ServitePlugin for ServiteConfig {
    fn servite_config(&self) -> ServiteConfig {
        self.clone()
    }
}

/// The page discovery plugin.
#[async_trait]
pub trait PagesPlugin: Send + Sync {
    /// Enumerate the app's pages. Called once per build pass.
    async fn pages(&self) -> std::result::Result<Vec<Page>, BoxError>;
}

#[async_trait]
impl PagesPlugin for Vec<Page> {
    async fn pages(&self) -> std::result::Result<Vec<Page>, BoxError> {
        Ok(self.clone())
    }
}

/// Plugins attached to a bundler config.
#[derive(Clone, Default)]
pub struct PluginChain {
    servite: Option<Arc<dyn ServitePlugin>>,
    pages: Option<Arc<dyn PagesPlugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_servite(mut self, plugin: Arc<dyn ServitePlugin>) -> Self {
        self.servite = Some(plugin);
        self
    }

    pub fn with_pages(mut self, plugin: Arc<dyn PagesPlugin>) -> Self {
        self.pages = Some(plugin);
        self
    }

    /// Slots set in `other` replace ours.
    pub fn merge(&mut self, other: PluginChain) {
        if other.servite.is_some() {
            self.servite = other.servite;
        }
        if other.pages.is_some() {
            self.pages = other.pages;
        }
    }

    pub fn servite(&self) -> Result<&Arc<dyn ServitePlugin>> {
        self.servite.as_ref().ok_or(Error::MissingPlugin {
            name: SERVITE_PLUGIN_NAME,
        })
    }

    pub fn pages(&self) -> Result<&Arc<dyn PagesPlugin>> {
        self.pages.as_ref().ok_or(Error::MissingPlugin {
            name: PAGES_PLUGIN_NAME,
        })
    }

    /// Names of the plugins present, in chain order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.servite.is_some() {
            names.push(SERVITE_PLUGIN_NAME);
        }
        if self.pages.is_some() {
            names.push(PAGES_PLUGIN_NAME);
        }
        names
    }
}

impl fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
