use serde::Serialize;

use super::{parse, render, Fragment};

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excerpt {
    /// Bounded rendering with every open tag closed at the cut.
    pub preview: String,
    /// Complete sanitized rendering.
    pub full: String,
    pub truncated: bool,
}

/// Preview of at most `limit` visible characters.
///
/// The cut backs off to the previous whitespace in the same text run so words
/// are not split, and an ellipsis marks the cut. Counting is by `char`, never
/// by byte.
pub fn excerpt(html: &str, limit: usize) -> Excerpt {
    let nodes = parse(html);
    let full = render(&nodes);

    let mut budget = limit;
    let (kept, truncated) = truncate(&nodes, &mut budget);
    let preview = if truncated { render(&kept) } else { full.clone() };

    Excerpt { preview, full, truncated }
}

fn truncate(nodes: &[Fragment], budget: &mut usize) -> (Vec<Fragment>, bool) {
    let mut kept = Vec::with_capacity(nodes.len());

    for node in nodes {
        match node {
            Fragment::Text(text) => {
                let len = text.chars().count();
                if len <= *budget {
                    *budget -= len;
                    kept.push(node.clone());
                } else {
                    kept.push(Fragment::Text(cut_text(text, *budget)));
                    *budget = 0;
                    return (kept, true);
                }
            }
            Fragment::Element { tag, href, children } => {
                let (inner, cut) = truncate(children, budget);
                kept.push(Fragment::Element {
                    tag: *tag,
                    href: href.clone(),
                    children: inner,
                });
                if cut {
                    return (kept, true);
                }
            }
        }
    }

    (kept, false)
}

fn cut_text(text: &str, chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..end];

    let lands_on_boundary = text[end..].chars().next().map_or(true, char::is_whitespace);
    let head = if lands_on_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(i) => &head[..i],
            None => head,
        }
    };

    let mut out = head.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}
