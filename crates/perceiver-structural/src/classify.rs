//! Heuristics deciding which extracted elements a user could act on.

use crate::element::Element;
use crate::extract::FrameElements;

const INTERACTIVE_TAGS: [&str; 12] = [
    "a", "button", "details", "embed", "input", "menu", "menuitem", "object", "select",
    "textarea", "summary", "label",
];

const INTERACTIVE_ROLES: [&str; 22] = [
    "button",
    "menu",
    "menuitem",
    "link",
    "checkbox",
    "radio",
    "slider",
    "tab",
    "tabpanel",
    "combobox",
    "textbox",
    "grid",
    "listbox",
    "option",
    "progressbar",
    "scrollbar",
    "searchbox",
    "switch",
    "tree",
    "treeitem",
    "spinbutton",
    "tooltip",
];

const INTERACTIVE_CURSORS: [&str; 29] = [
    "pointer",
    "move",
    "text",
    "grab",
    "grabbing",
    "cell",
    "copy",
    "alias",
    "all-scroll",
    "col-resize",
    "context-menu",
    "crosshair",
    "e-resize",
    "ew-resize",
    "help",
    "n-resize",
    "ne-resize",
    "nesw-resize",
    "ns-resize",
    "nw-resize",
    "nwse-resize",
    "row-resize",
    "s-resize",
    "se-resize",
    "sw-resize",
    "vertical-text",
    "w-resize",
    "zoom-in",
    "zoom-out",
];

const NON_INTERACTIVE_CURSORS: [&str; 6] =
    ["not-allowed", "no-drop", "wait", "progress", "initial", "inherit"];

fn is_document_element(element: &Element) -> bool {
    element.is_named("html") || element.is_named("body")
}

fn has_interactive_role(element: &Element) -> bool {
    ["role", "aria-role"]
        .iter()
        .filter_map(|attr| element.attr(attr))
        .any(|role| INTERACTIVE_ROLES.contains(&role))
}

pub fn is_commonly_interactable(element: &Element) -> bool {
    !is_document_element(element)
        && (element.is_clickable
            || INTERACTIVE_TAGS.contains(&element.name.to_ascii_lowercase().as_str())
            || has_interactive_role(element))
}

pub fn has_pointer_cursor(element: &Element) -> bool {
    element
        .style("cursor")
        .is_some_and(|c| INTERACTIVE_CURSORS.contains(&c))
}

pub fn is_disabled(element: &Element) -> bool {
    element.has_attr("disabled")
        || element.attr("aria-disabled") == Some("true")
        || element
            .style("cursor")
            .is_some_and(|c| NON_INTERACTIVE_CURSORS.contains(&c))
}

/// Interactive cursor that is not just inherited from the parent element.
fn has_direct_pointer_cursor(element: &Element, frame: &FrameElements) -> bool {
    has_pointer_cursor(element)
        && !element
            .parent_id
            .and_then(|parent| frame.get(parent))
            .is_some_and(has_pointer_cursor)
}

pub fn is_interactive(element: &Element, frame: &FrameElements) -> bool {
    if element.is_scrollable() {
        return true;
    }
    if is_disabled(element) {
        return false;
    }
    is_commonly_interactable(element)
        || (!is_document_element(element) && has_direct_pointer_cursor(element, frame))
}

/// Candidates of one frame, in layout order.
pub fn candidates(frame: &FrameElements) -> Vec<&Element> {
    frame.iter().filter(|e| is_interactive(e, frame)).collect()
}
