//! Framework configuration: what the user writes and what the build consumes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result as ConfigResult};

/// `true`, `false`, or a list of route globs.
///
/// Used for both `ssr` and `ssg`. An empty list behaves like `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderPolicy {
    Enabled(bool),
    Routes(Vec<String>),
}

impl RenderPolicy {
    /// Whether the policy selects nothing at all.
    pub fn is_disabled(&self) -> bool {
        match self {
            RenderPolicy::Enabled(enabled) => !enabled,
            RenderPolicy::Routes(patterns) => patterns.is_empty(),
        }
    }
}

impl Default for RenderPolicy {
    fn default() -> Self {
        RenderPolicy::Enabled(true)
    }
}

impl From<bool> for RenderPolicy {
    fn from(enabled: bool) -> Self {
        RenderPolicy::Enabled(enabled)
    }
}

impl<S: Into<String>> FromIterator<S> for RenderPolicy {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RenderPolicy::Routes(iter.into_iter().map(Into::into).collect())
    }
}

/// A directory scanned for routable pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesDir {
    pub dir: PathBuf,

    /// Route prefix for pages found in this directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_route: Option<String>,
}

impl PagesDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            base_route: None,
        }
    }
}

/// Framework config as written by the user. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserServiteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_dirs: Option<Vec<PagesDir>>,

    /// Server side render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssr: Option<RenderPolicy>,

    /// Static site generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssg: Option<RenderPolicy>,

    /// Use a hash router instead of a browser router
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_router: Option<bool>,

    /// Options forwarded untouched to the server runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nitro: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resolved framework config, shared read-only by the build phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiteConfig {
    pub pages_dirs: Vec<PagesDir>,
    pub ssr: RenderPolicy,
    pub ssg: RenderPolicy,
    pub hash_router: bool,
    #[serde(default)]
    pub nitro: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServiteConfig {
    /// Create from a `serde_json::Value` holding a user config
    ///
    /// # Example
    ///
    /// ```
    /// use servite_config::{RenderPolicy, ServiteConfig};
    /// use serde_json::json;
    ///
    /// let config = ServiteConfig::from_value(json!({ "ssg": ["/about"] })).unwrap();
    /// assert_eq!(config.ssg, RenderPolicy::Routes(vec!["/about".to_string()]));
    /// assert!(!config.hash_router);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        let user: UserServiteConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "servite".to_string(),
                hint: Some(e.to_string()),
            })?;
        resolve_servite_config(user)
    }
}

/// Fill in framework defaults.
///
/// `pagesDirs` defaults to `src/pages`, `ssr` and `ssg` to `true`, and
/// `hashRouter` to `false`. An explicitly empty `pagesDirs` is rejected.
pub fn resolve_servite_config(user: UserServiteConfig) -> ConfigResult<ServiteConfig> {
    let UserServiteConfig {
        pages_dirs,
        ssr,
        ssg,
        hash_router,
        nitro,
        extra,
    } = user;

    let pages_dirs = pages_dirs.unwrap_or_else(|| vec![PagesDir::new("src/pages")]);
    if pages_dirs.is_empty() {
        return Err(ConfigError::EmptyPagesDirs);
    }

    Ok(ServiteConfig {
        pages_dirs,
        ssr: ssr.unwrap_or_default(),
        ssg: ssg.unwrap_or_default(),
        hash_router: hash_router.unwrap_or(false),
        nitro: nitro.unwrap_or(Value::Null),
        extra,
    })
}
