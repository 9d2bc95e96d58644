//! Rich-text handling for announcement bodies.
//!
//! Author HTML is parsed with an HTML5 parser and rebuilt from an allow-list,
//! so the stored markup is always well nested and free of scripts, event
//! handler attributes and `javascript:` links. The same tree drives the
//! length-bounded preview in [`excerpt`].

mod excerpt;

pub use excerpt::{excerpt, Excerpt};

use scraper::{ElementRef, Html, Node};

/// Elements kept in sanitized output.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "s", "ul", "ol", "li", "a", "h2", "h3", "h4",
    "blockquote", "span",
];

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "textarea",
    "select", "svg", "math", "head", "title", "meta", "link", "base", "frame", "frameset",
];

const BLOCK_TAGS: &[&str] = &["p", "h2", "h3", "h4", "ul", "ol", "li", "blockquote"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment {
    Text(String),
    Element {
        tag: &'static str,
        href: Option<String>,
        children: Vec<Fragment>,
    },
}

/// Where we are in the rebuilt tree. Used to unwrap elements an HTML5 parser
/// would re-nest differently, which keeps [`sanitize`] a fixed point.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_anchor: bool,
    in_phrasing_block: bool,
    in_list_item: bool,
}

/// Strip unsafe markup, keeping the allow-listed formatting subset.
pub fn sanitize(html: &str) -> String {
    render(&parse(html))
}

/// Visible text only, with line breaks for `<br>`.
pub fn plain_text(html: &str) -> String {
    let mut out = String::new();
    collect_text(&parse(html), &mut out);
    out
}

pub(crate) fn parse(html: &str) -> Vec<Fragment> {
    let fragment = Html::parse_fragment(html);
    let mut out = Vec::new();
    convert_children(fragment.root_element(), Context::default(), &mut out);
    out
}

fn convert_children(parent: ElementRef<'_>, ctx: Context, out: &mut Vec<Fragment>) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => push_text(out, text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    convert_element(element, ctx, out);
                }
            }
            _ => {}
        }
    }
}

fn convert_element(element: ElementRef<'_>, ctx: Context, out: &mut Vec<Fragment>) {
    let name = element.value().name();

    if DROPPED_TAGS.contains(&name) {
        return;
    }

    let Some(tag) = allowed_tag(name).filter(|tag| nests_cleanly(tag, ctx)) else {
        // Unwrap: keep the children in the current position.
        convert_children(element, ctx, out);
        return;
    };

    if tag == "br" {
        out.push(Fragment::Element { tag, href: None, children: Vec::new() });
        return;
    }

    let inner_ctx = Context {
        in_anchor: ctx.in_anchor || tag == "a",
        in_phrasing_block: ctx.in_phrasing_block || matches!(tag, "p" | "h2" | "h3" | "h4"),
        in_list_item: match tag {
            "li" => true,
            "ul" | "ol" | "blockquote" | "h2" | "h3" | "h4" => false,
            _ => ctx.in_list_item,
        },
    };

    let href = if tag == "a" {
        element.value().attr("href").and_then(safe_href)
    } else {
        None
    };

    let mut children = Vec::new();
    convert_children(element, inner_ctx, &mut children);
    out.push(Fragment::Element { tag, href, children });
}

fn allowed_tag(name: &str) -> Option<&'static str> {
    ALLOWED_TAGS.iter().find(|t| **t == name).copied()
}

fn nests_cleanly(tag: &str, ctx: Context) -> bool {
    if tag == "a" && ctx.in_anchor {
        return false;
    }
    if ctx.in_phrasing_block && BLOCK_TAGS.contains(&tag) {
        return false;
    }
    !(tag == "li" && ctx.in_list_item)
}

/// Merge with a preceding text node so the tree matches what a re-parse produces.
fn push_text(out: &mut Vec<Fragment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Fragment::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Fragment::Text(text.to_string()));
    }
}

fn safe_href(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Browsers ignore embedded whitespace and control characters when
    // resolving the scheme, so "java\tscript:" must be caught too.
    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);
    let has_scheme = match (scheme_end, path_start) {
        (Some(colon), Some(path)) => colon < path,
        (Some(_), None) => true,
        _ => false,
    };

    if has_scheme {
        let scheme = &compact[..compact.find(':').unwrap_or(0)];
        if !SAFE_SCHEMES.contains(&scheme) {
            return None;
        }
    }

    Some(trimmed.to_string())
}

pub(crate) fn render(nodes: &[Fragment]) -> String {
    let mut out = String::new();
    render_into(nodes, &mut out);
    out
}

fn render_into(nodes: &[Fragment], out: &mut String) {
    for node in nodes {
        match node {
            Fragment::Text(text) => escape_text(text, out),
            Fragment::Element { tag: "br", .. } => out.push_str("<br>"),
            Fragment::Element { tag, href, children } => {
                out.push('<');
                out.push_str(tag);
                if let Some(href) = href {
                    out.push_str(" href=\"");
                    escape_attr(href, out);
                    out.push('"');
                }
                out.push('>');
                render_into(children, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn collect_text(nodes: &[Fragment], out: &mut String) {
    for node in nodes {
        match node {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Element { tag: "br", .. } => out.push('\n'),
            Fragment::Element { children, .. } => collect_text(children, out),
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
