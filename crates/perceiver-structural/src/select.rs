//! Second pass over `<select>` elements: gather options, values and selection state.

use crate::decoder::DocumentTree;
use crate::element::{Element, ElementKind};
use crate::extract::FrameElements;
use crate::text::text_content;

/// `<option>` nodes under `select`, pre-order, returned in node order.
fn option_nodes(tree: &DocumentTree<'_>, select: usize) -> Vec<usize> {
    let mut found = Vec::new();
    let mut stack: Vec<usize> = tree.children(select).iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if tree.node_name(node) == Some("OPTION") {
            found.push(node);
        }
        stack.extend(tree.children(node).iter().rev());
    }
    found.sort_unstable();
    found
}

/// Builds the select variant for every queued `<select>` found in `elements`.
pub fn resolve_selects(
    tree: &DocumentTree<'_>,
    pending: &[usize],
    elements: &FrameElements,
) -> Vec<Element> {
    pending
        .iter()
        .filter_map(|&node| elements.get(node))
        .map(|select| {
            let mut options = Vec::new();
            let mut option_values = Vec::new();
            let mut selected_option_indices = Vec::new();

            for (position, option) in option_nodes(tree, select.node_id).into_iter().enumerate() {
                let text = text_content(tree, option, None);
                let value = match tree.attributes(option).remove("value") {
                    Some(Some(value)) => value,
                    _ => text.clone(),
                };
                if tree.is_option_selected(option) {
                    selected_option_indices.push(position);
                }
                options.push(text);
                option_values.push(value);
            }

            let mut resolved = select.clone();
            resolved.kind = ElementKind::Select {
                is_multi_select: select.has_attr("multiple"),
                options,
                option_values,
                selected_option_indices,
            };
            resolved
        })
        .collect()
}
