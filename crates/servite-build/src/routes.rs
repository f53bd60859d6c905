//! Prerender route selection.
//!
//! Route patterns use the micromatch dialect common to JavaScript tooling,
//! compiled to anchored regexes:
//!
//! - `*` matches within one segment; a segment that is only `*` needs at
//!   least one character, so `/*` does not match `/`
//! - `**` as a whole segment matches any number of segments, and a trailing
//!   `/**` also matches its parent (`/docs/**` matches `/docs`)
//! - `**` inside a segment behaves like `*`
//! - `?`, `[abc]`, `[!a-z]` and `{a,b}` work as usual

use regex::Regex;
use servite_config::RenderPolicy;

use crate::pages::Page;

enum RouteMatcher {
    Pattern(Regex),
    // Did not compile (e.g. a reversed class range); compared verbatim
    Literal(String),
}

impl RouteMatcher {
    fn new(pattern: &str) -> Self {
        let alternatives: Vec<String> = expand_braces(pattern)
            .iter()
            .map(|alternative| translate(alternative))
            .collect();
        match Regex::new(&format!("^(?:{})$", alternatives.join("|"))) {
            Ok(regex) => RouteMatcher::Pattern(regex),
            Err(e) => {
                tracing::debug!("route pattern {pattern:?} matched literally: {e}");
                RouteMatcher::Literal(pattern.to_string())
            }
        }
    }

    fn matches(&self, route: &str) -> bool {
        match self {
            RouteMatcher::Pattern(regex) => regex.is_match(route),
            RouteMatcher::Literal(literal) => literal == route,
        }
    }
}

/// Expand the first `{a,b}` group, recursively. Groups without a top-level
/// comma stay literal.
fn expand_braces(pattern: &str) -> Vec<String> {
    let mut from = 0;
    while let Some(offset) = pattern[from..].find('{') {
        let open = from + offset;
        if let Some((close, alternatives)) = brace_group(pattern, open) {
            if alternatives.len() > 1 {
                let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
                return alternatives
                    .iter()
                    .flat_map(|alternative| expand_braces(&format!("{prefix}{alternative}{suffix}")))
                    .collect();
            }
        }
        from = open + 1;
    }
    vec![pattern.to_string()]
}

/// Closing index and top-level alternatives of the group opened at `open`.
fn brace_group(pattern: &str, open: usize) -> Option<(usize, Vec<&str>)> {
    let mut depth = 0usize;
    let mut start = open + 1;
    let mut alternatives = Vec::new();
    for (i, c) in pattern.char_indices().skip_while(|&(i, _)| i <= open) {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                alternatives.push(&pattern[start..i]);
                return Some((i, alternatives));
            }
            '}' => depth -= 1,
            ',' if depth == 0 => {
                alternatives.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    None
}

/// Regex body (unanchored) for one brace-free pattern.
fn translate(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    let last = segments.len() - 1;
    let mut out = String::new();

    for (i, segment) in segments.iter().enumerate() {
        if *segment == "**" {
            out.push_str(match (i, i == last) {
                (0, true) => ".*",
                (0, false) => "(?:[^/]*/)*",
                (_, true) => "(?:/.*)?",
                (_, false) => "(?:/[^/]+)*",
            });
            continue;
        }
        // a leading globstar already consumed the separator
        if i > 0 && !(i == 1 && segments[0] == "**") {
            out.push('/');
        }
        push_segment(&mut out, segment);
    }

    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !segment.is_empty() && segment.chars().all(|c| c == '*') {
        out.push_str("[^/]+");
        return;
    }

    let mut chars = segment.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '*' => {
                while chars.next_if(|&(_, c)| c == '*').is_some() {}
                out.push_str("[^/]*");
            }
            '?' => out.push_str("[^/]"),
            '[' => match class_end(segment, i) {
                Some(end) => {
                    push_class(out, &segment[i + 1..end]);
                    while chars.next_if(|&(j, _)| j <= end).is_some() {}
                }
                None => push_literal(out, c),
            },
            '\\' => match chars.next() {
                Some((_, escaped)) => push_literal(out, escaped),
                None => push_literal(out, c),
            },
            c => push_literal(out, c),
        }
    }
}

/// Index of the `]` closing the class opened at `open`. A `]` right after the
/// opening (or its negation) is a member, not the end.
fn class_end(segment: &str, open: usize) -> Option<usize> {
    let body = &segment[open + 1..];
    let negation = usize::from(body.starts_with(['!', '^']));
    let first_member = body[negation..].chars().next()?;
    let search_from = negation + first_member.len_utf8();
    body[search_from..]
        .find(']')
        .map(|offset| open + 1 + search_from + offset)
}

fn push_class(out: &mut String, body: &str) {
    let (negated, body) = match body.strip_prefix(['!', '^']) {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    out.push('[');
    if negated {
        out.push_str("^/");
    }
    let members: Vec<char> = body.chars().collect();
    for (i, member) in members.iter().enumerate() {
        if *member == '-' && i > 0 && i + 1 < members.len() {
            out.push('-');
        } else {
            push_literal(out, *member);
        }
    }
    out.push(']');
}

fn push_literal(out: &mut String, c: char) {
    out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}

/// Pick the routes to prerender.
///
/// Layout pages are never selected. `true` selects every other page, `false`
/// or an empty list selects nothing. A list is applied in order: a pattern
/// selects the routes it matches, a `!`-prefixed pattern deselects them, and
/// the last matching pattern wins. A list made only of negations starts from
/// every route. The result keeps page order.
///
/// # Example
///
/// ```
/// use servite_build::{Page, RenderPolicy, select_prerender_routes};
///
/// let pages = vec![
///     Page::new("/", "src/pages/index.tsx"),
///     Page::new("/blog/hello", "src/pages/blog/hello.mdx"),
///     Page::new("/blog/draft", "src/pages/blog/draft.mdx"),
/// ];
/// let policy: RenderPolicy = ["/blog/**", "!/blog/draft"].into_iter().collect();
///
/// assert_eq!(select_prerender_routes(&pages, &policy), vec!["/blog/hello"]);
/// ```
pub fn select_prerender_routes(pages: &[Page], policy: &RenderPolicy) -> Vec<String> {
    let candidates = pages.iter().filter(|page| !page.is_layout);

    let patterns = match policy {
        RenderPolicy::Enabled(false) => return Vec::new(),
        RenderPolicy::Enabled(true) => {
            return candidates.map(|page| page.route_path.clone()).collect();
        }
        RenderPolicy::Routes(patterns) if patterns.is_empty() => return Vec::new(),
        RenderPolicy::Routes(patterns) => patterns,
    };

    let rules: Vec<(bool, RouteMatcher)> = patterns
        .iter()
        .map(|pattern| match pattern.strip_prefix('!') {
            Some(negated) => (false, RouteMatcher::new(negated)),
            None => (true, RouteMatcher::new(pattern)),
        })
        .collect();
    let only_negations = rules.iter().all(|(select, _)| !select);

    candidates
        .filter(|page| {
            rules
                .iter()
                .fold(only_negations, |selected, (select, matcher)| {
                    if matcher.matches(&page.route_path) {
                        *select
                    } else {
                        selected
                    }
                })
        })
        .map(|page| page.route_path.clone())
        .collect()
}
