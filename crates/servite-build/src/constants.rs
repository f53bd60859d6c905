//! Reserved ids, paths and names shared by the build phases.
//!
//! The HTML injector (client pass) and the HTML extractor (prerender pass) both
//! read their prefixes from here.

/// Framework package name; bundled into the server bundle
pub const FRAMEWORK_PACKAGE: &str = "servite";

/// Plugin exposing the resolved [`ServiteConfig`](servite_config::ServiteConfig)
pub const SERVITE_PLUGIN_NAME: &str = "servite";

/// Plugin exposing the discovered pages
pub const PAGES_PLUGIN_NAME: &str = "servite:pages";

/// Prefix the bundler puts in front of ids that are not valid URLs
pub const VALID_ID_PREFIX: &str = "/@id/";

/// Stand-in for `\0` in virtual module ids served as URLs
pub const NULL_BYTE_PLACEHOLDER: &str = "__x00__";

/// Virtual module namespace for island entries
pub const VIRTUAL_ISLANDS_ID: &str = "virtual:servite/islands/";

/// `VALID_ID_PREFIX` + `VIRTUAL_ISLANDS_ID`, as found in rendered `src` attributes
pub const ISLANDS_ID_PREFIX: &str = "/@id/virtual:servite/islands/";

/// Client entry script injected into the HTML shell
pub const CLIENT_ENTRY_ID: &str = "/@servite/client/entry.client";

/// Server entry module of the server-rendering bundle
pub const SSR_ENTRY_ID: &str = "servite/server/entry.server";

/// HTML shell generated by the framework plugin, relative to root
pub const CLIENT_SHELL_HTML: &str = "node_modules/.servite/index.html";

/// Final name of the HTML shell in the client output
pub const INDEX_HTML: &str = "index.html";

pub const SSR_MANIFEST: &str = "ssr-manifest.json";

/// Server bundle location, nested under the base out dir
pub const SSR_OUT_DIR: &str = "ssr";

/// Entry name of every island bundle
pub const ISLANDS_ENTRY_NAME: &str = "islands";

/// Where the server runtime reads render assets at request time, nested under the base out dir
pub const SERVER_ASSETS_DIR: &str = ".output/server-assets";

/// Client outputs duplicated into [`SERVER_ASSETS_DIR`]
pub const SERVER_ASSET_FILES: [&str; 2] = [INDEX_HTML, SSR_MANIFEST];
