//! Visible-text labels for elements, approximating what a reader sees on screen.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::decoder::DocumentTree;
use crate::snapshot::{ELEMENT_NODE, TEXT_NODE};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const ELLIPSIS: &str = "...";
const LINE: u8 = 1;
const PARAGRAPH: u8 = 2;
const BLOCK_DISPLAYS: [&str; 6] = ["block", "flow-root", "flex", "grid", "table", "table-caption"];
const STRUCTURAL_SELECT_NODES: [&str; 3] = ["SELECT", "OPTGROUP", "OPTION"];

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Break(u8),
}

enum Visit {
    Enter(usize),
    Exit { node: usize, start: usize },
}

/// Text of `node`'s subtree, capped at `max_chars` characters plus an ellipsis.
pub fn text_content(tree: &DocumentTree<'_>, node: usize, max_chars: Option<usize>) -> String {
    if !tree.is_rendered(node) {
        return descendant_text(tree, node, max_chars);
    }

    let mut pieces = Vec::new();
    for &child in tree.children(node) {
        collect_rendered(tree, child, &mut pieces);
    }

    let Some(start) = pieces
        .iter()
        .position(|p| matches!(p, Piece::Text(s) if !s.is_empty()))
    else {
        return String::new();
    };

    let mut out = String::new();
    let mut written = 0usize;
    let mut pending: Option<u8> = None;
    for piece in &pieces[start..] {
        match piece {
            Piece::Text(text) => {
                if let Some(breaks) = pending.take() {
                    out.extend(std::iter::repeat('\n').take(breaks as usize));
                    written += breaks as usize;
                }
                out.push_str(text);
                written += text.chars().count();
                if max_chars.is_some_and(|max| written > max) {
                    break;
                }
            }
            Piece::Break(level) => {
                pending = Some(pending.map_or(*level, |p| p.max(*level)));
            }
        }
    }

    truncate(out, max_chars)
}

/// Unstyled depth-first concatenation used when the element itself is not laid out.
fn descendant_text(tree: &DocumentTree<'_>, node: usize, max_chars: Option<usize>) -> String {
    let mut out = String::new();
    let mut written = 0usize;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if max_chars.is_some_and(|max| written >= max) {
            break;
        }
        match tree.node_type(current) {
            TEXT_NODE => {
                let value = tree.node_value(current).unwrap_or_default();
                out.push_str(value);
                written += value.chars().count();
            }
            ELEMENT_NODE => stack.extend(tree.children(current).iter().rev()),
            _ => {}
        }
    }
    truncate(out, max_chars)
}

fn truncate(text: String, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(max) if text.chars().count() > max => {
            let mut cut: String = text.chars().take(max).collect();
            cut.push_str(ELLIPSIS);
            cut
        }
        _ => text,
    }
}

/// Children-first walk appending `node`'s contribution after its descendants'.
fn collect_rendered(tree: &DocumentTree<'_>, node: usize, pieces: &mut Vec<Piece>) {
    let mut stack = vec![Visit::Enter(node)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(current) => {
                stack.push(Visit::Exit {
                    node: current,
                    start: pieces.len(),
                });
                stack.extend(tree.children(current).iter().rev().map(|&c| Visit::Enter(c)));
            }
            Visit::Exit { node, start } => contribute(tree, node, start, pieces),
        }
    }
}

fn contribute(tree: &DocumentTree<'_>, node: usize, start: usize, pieces: &mut Vec<Piece>) {
    let name = tree.node_name(node).unwrap_or_default();
    let layout = tree.layout_index(node);
    if layout.is_none() && !STRUCTURAL_SELECT_NODES.contains(&name) {
        return;
    }

    let style = |key: &str| layout.and_then(|l| tree.style(l, key));
    let display = style("display");
    let node_type = tree.node_type(node);

    if node_type == TEXT_NODE && style("visibility") != Some("hidden") && display != Some("none") {
        let raw = match layout {
            Some(l) => tree.layout_text(l),
            None => tree.node_value(node),
        }
        .unwrap_or_default();
        let text = if style("white-space") == Some("pre") {
            raw.to_string()
        } else {
            WHITESPACE_RUN.replace_all(raw, " ").into_owned()
        };
        pieces.push(Piece::Text(text));
    }

    let is_element = node_type == ELEMENT_NODE;
    if is_element && name == "BR" {
        pieces.push(Piece::Text("\n".into()));
    }
    match display {
        Some("table-cell") => pieces.push(Piece::Text("\t".into())),
        Some("table-row") => pieces.push(Piece::Text("\n".into())),
        _ => {}
    }
    if is_element && name == "P" {
        pieces.push(Piece::Break(PARAGRAPH));
    }
    if is_element && display.is_some_and(|d| BLOCK_DISPLAYS.contains(&d)) {
        pieces.insert(start, Piece::Break(LINE));
        pieces.push(Piece::Break(LINE));
    }
}
