//! Prerendered HTML rewriting.
//!
//! A prerendered page still points at the client entry script (injected into
//! the HTML shell by the client pass) and at its island entry as a virtual
//! module URL. Once the island bundle exists, the client entry is dropped and
//! the virtual URL is swapped for the built script.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{ISLANDS_ID_PREFIX, NULL_BYTE_PLACEHOLDER, VALID_ID_PREFIX};

static ISLAND_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"<script[^>]*?src="({}[^"]*)""#,
        regex::escape(ISLANDS_ID_PREFIX)
    ))
    .expect("island script pattern is valid")
});

/// A page's island entry, before it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IslandReference {
    pub route_path: String,
    /// Virtual module URL, e.g. `/@id/virtual:servite/islands/about`
    pub script_url: String,
}

/// Find the first island entry script in `html`.
pub fn find_island_reference(route_path: &str, html: &str) -> Option<IslandReference> {
    ISLAND_SCRIPT_RE
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|script_url| IslandReference {
            route_path: route_path.to_string(),
            script_url: script_url.as_str().to_string(),
        })
}

/// Turn a served module URL back into the module id the bundler understands.
pub fn unwrap_id(url: &str) -> String {
    url.strip_prefix(VALID_ID_PREFIX)
        .unwrap_or(url)
        .replace(NULL_BYTE_PLACEHOLDER, "\0")
}

/// Public URL of an emitted file.
///
/// Bases with a scheme (`https://cdn.example.com/`) are prefixed verbatim;
/// anything else is joined and normalized as a POSIX path, so a relative base
/// yields a relative URL.
pub fn entry_url(base: &str, file_name: &str) -> String {
    let file_name = file_name.trim_start_matches('/');

    if base.contains("://") {
        return if base.ends_with('/') {
            format!("{base}{file_name}")
        } else {
            format!("{base}/{file_name}")
        };
    }
    if base.is_empty() {
        return normalize_posix(file_name);
    }

    normalize_posix(&format!("{}/{}", base.trim_end_matches('/'), file_name))
}

/// Resolve `.` and `..` segments of a `/`-separated path.
pub(crate) fn normalize_posix(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Drop the client entry script tag and point the island script at its built
/// bundle.
///
/// Only the first occurrence of each is touched. Running it again on its own
/// output changes nothing.
pub fn rewrite_island_html(
    html: &str,
    client_entry_url: &str,
    script_url: &str,
    final_url: &str,
) -> String {
    let client_entry_re = Regex::new(&format!(
        r#"<script[^>]*?src="{}"[^>]*>.*?</script>"#,
        regex::escape(client_entry_url)
    ));

    let html = match client_entry_re {
        Ok(re) => re.replace(html, "").into_owned(),
        // Escaped input always compiles; keep the page intact if it somehow doesn't
        Err(_) => html.to_string(),
    };

    html.replacen(script_url, final_url, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <script type="module" src="/assets/entry.client.4f1c.js"></script>
    <link rel="stylesheet" href="/assets/style.css">
  </head>
  <body>
    <div id="root"><button data-island="Counter">0</button></div>
    <script type="module" src="/@id/virtual:servite/islands/counter?route=/"></script>
  </body>
</html>"#;

    #[test]
    fn finds_first_island_reference() {
        let found = find_island_reference("/", PAGE).unwrap();
        assert_eq!(found.route_path, "/");
        assert_eq!(
            found.script_url,
            "/@id/virtual:servite/islands/counter?route=/"
        );
    }

    #[test]
    fn pages_without_islands_have_no_reference() {
        let html = r#"<script type="module" src="/assets/entry.client.js"></script>"#;
        assert!(find_island_reference("/about", html).is_none());
    }

    #[test]
    fn unwrap_id_restores_null_byte() {
        assert_eq!(
            unwrap_id("/@id/__x00__virtual:servite/islands/a"),
            "\0virtual:servite/islands/a"
        );
        assert_eq!(unwrap_id("virtual:x"), "virtual:x");
    }

    #[test]
    fn entry_url_joins_base() {
        assert_eq!(entry_url("/", "assets/islands.1a2b.js"), "/assets/islands.1a2b.js");
        assert_eq!(entry_url("/app/", "assets/a.js"), "/app/assets/a.js");
        assert_eq!(entry_url("/app", "/assets/a.js"), "/app/assets/a.js");
        assert_eq!(entry_url("./", "assets/a.js"), "assets/a.js");
        assert_eq!(entry_url("/app/../", "a.js"), "/a.js");
        assert_eq!(
            entry_url("https://cdn.example.com/", "assets/a.js"),
            "https://cdn.example.com/assets/a.js"
        );
    }

    #[test]
    fn rewrite_drops_client_entry_and_swaps_island_url() {
        let out = rewrite_island_html(
            PAGE,
            "/assets/entry.client.4f1c.js",
            "/@id/virtual:servite/islands/counter?route=/",
            "/assets/islands.9e8d.js",
        );

        assert!(!out.contains("entry.client"));
        assert!(!out.contains(ISLANDS_ID_PREFIX));
        assert!(out.contains(r#"src="/assets/islands.9e8d.js""#));
        assert!(out.contains(r#"<link rel="stylesheet" href="/assets/style.css">"#));
    }

    #[test]
    fn rewrite_replaces_only_first_occurrence() {
        let html = "<script src=\"/@id/virtual:servite/islands/a\"></script>\n\
                    <!-- /@id/virtual:servite/islands/a -->";
        let out = rewrite_island_html(html, "/entry.js", "/@id/virtual:servite/islands/a", "/i.js");
        assert_eq!(out.matches("/i.js").count(), 1);
        assert_eq!(out.matches("/@id/virtual:servite/islands/a").count(), 1);
    }

    #[test]
    fn rewrite_is_idempotent() {
        let args = (
            "/assets/entry.client.4f1c.js",
            "/@id/virtual:servite/islands/counter?route=/",
            "/assets/islands.9e8d.js",
        );
        let once = rewrite_island_html(PAGE, args.0, args.1, args.2);
        let twice = rewrite_island_html(&once, args.0, args.1, args.2);
        assert_eq!(once, twice);
    }

    #[test]
    fn client_entry_url_is_matched_literally() {
        // `.` in the URL must not match arbitrary characters
        let html = r#"<script type="module" src="/assets/entryXclient.js"></script>"#;
        let out = rewrite_island_html(html, "/assets/entry.client.js", "/@id/x", "/y");
        assert_eq!(out, html);
    }
}
