//! HTML tag descriptors injected into the HTML shell during a bundler pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where a tag is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectTo {
    /// Before `</head>`
    #[default]
    Head,
    /// Right after `<head>`
    HeadPrepend,
    /// Before `</body>`
    Body,
    /// Right after `<body>`
    BodyPrepend,
}

/// A tag to inject into the HTML shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlTag {
    pub tag: String,

    #[serde(default)]
    pub attrs: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,

    #[serde(default)]
    pub inject_to: InjectTo,
}

const VOID_TAGS: &[&str] = &["link", "meta", "base", "br", "hr", "img", "input"];

impl HtmlTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: None,
            inject_to: InjectTo::default(),
        }
    }

    /// `<script type="module" src="...">` injected into head.
    pub fn module_script(src: impl Into<String>) -> Self {
        Self::new("script")
            .attr("type", "module")
            .attr("src", src)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn inject_to(mut self, inject_to: InjectTo) -> Self {
        self.inject_to = inject_to;
        self
    }

    /// Serialize to markup. Attribute order is insertion order.
    pub fn render(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return out;
        }

        if let Some(children) = &self.children {
            out.push_str(children);
        }
        out.push_str(&format!("</{}>", self.tag));
        out
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Inject rendered tags into an HTML document.
///
/// Tags keep their relative order per injection point. When the anchor element
/// is missing, head tags are prepended to the document and body tags appended.
pub fn inject_tags(html: &str, tags: &[HtmlTag]) -> String {
    let mut out = html.to_string();

    for inject_to in [
        InjectTo::HeadPrepend,
        InjectTo::Head,
        InjectTo::BodyPrepend,
        InjectTo::Body,
    ] {
        let rendered: String = tags
            .iter()
            .filter(|tag| tag.inject_to == inject_to)
            .map(HtmlTag::render)
            .collect::<Vec<_>>()
            .join("\n");

        if rendered.is_empty() {
            continue;
        }

        let position = match inject_to {
            InjectTo::HeadPrepend => end_of_open_tag(&out, "head"),
            InjectTo::Head => find_ci(&out, "</head>"),
            InjectTo::BodyPrepend => end_of_open_tag(&out, "body"),
            InjectTo::Body => find_ci(&out, "</body>"),
        };

        match (position, inject_to) {
            (Some(pos), _) => out.insert_str(pos, &rendered),
            (None, InjectTo::Head | InjectTo::HeadPrepend) => out.insert_str(0, &rendered),
            (None, _) => out.push_str(&rendered),
        }
    }

    out
}

/// ASCII case-insensitive search. Lowercasing ASCII keeps byte offsets intact.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

/// Byte offset right after `<tag ...>`.
fn end_of_open_tag(html: &str, tag: &str) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let mut from = 0;
    while let Some(rel) = lower[from..].find(&open) {
        let start = from + rel;
        let after = start + open.len();
        // `<header>` must not match `<head`
        match lower.as_bytes().get(after) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                return lower[after..].find('>').map(|end| after + end + 1);
            }
            _ => from = after,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_module_script() {
        let tag = HtmlTag::module_script("/@servite/client");
        assert_eq!(
            tag.render(),
            r#"<script type="module" src="/@servite/client"></script>"#
        );
    }

    #[test]
    fn renders_void_tag_without_close() {
        let tag = HtmlTag::new("link").attr("rel", "modulepreload");
        assert_eq!(tag.render(), r#"<link rel="modulepreload">"#);
    }

    #[test]
    fn escapes_attribute_values() {
        let tag = HtmlTag::new("meta").attr("content", r#"a "b" & c"#);
        assert_eq!(
            tag.render(),
            r#"<meta content="a &quot;b&quot; &amp; c">"#
        );
    }

    #[test]
    fn injects_into_head() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        let out = inject_tags(html, &[HtmlTag::module_script("/entry.js")]);
        assert_eq!(
            out,
            r#"<html><head><title>x</title><script type="module" src="/entry.js"></script></head><body></body></html>"#
        );
    }

    #[test]
    fn head_prepend_skips_header_element() {
        let html = "<html><HEAD lang=\"en\"><header></header></HEAD></html>";
        let tag = HtmlTag::new("meta")
            .attr("charset", "utf-8")
            .inject_to(InjectTo::HeadPrepend);
        let out = inject_tags(html, &[tag]);
        assert_eq!(
            out,
            "<html><HEAD lang=\"en\"><meta charset=\"utf-8\"><header></header></HEAD></html>"
        );
    }

    #[test]
    fn missing_head_prepends_to_document() {
        let out = inject_tags("<div></div>", &[HtmlTag::module_script("/a.js")]);
        assert!(out.starts_with(r#"<script type="module" src="/a.js"></script>"#));
    }
}
