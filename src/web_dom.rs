//! The live document behind the engine's DOM seam.

use leptos::web_sys::{Document, Element, Node, Text};
use read_along_lib::highlight::scroll::Rect;
use read_along_lib::highlight::{
    is_block_tag, is_line_break, TextDom, TextRun, WordState, BLOCK_TAGS, MARKER_TAG,
    WORD_INDEX_ATTR, WORD_STATE_ATTR,
};
use wasm_bindgen::JsCast;

use crate::utils::utf16_offset;

const SHOW_ELEMENT: u32 = 0x1;
const SHOW_TEXT: u32 = 0x4;
const NON_RENDERED: &str = "script, style, noscript, template";

fn marker_selector() -> String {
    format!("[{WORD_INDEX_ATTR}]")
}

pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

/// Viewport-relative vertical extent of an element node.
pub fn client_rect(node: &Node) -> Option<Rect> {
    let rect = node.dyn_ref::<Element>()?.get_bounding_client_rect();
    Some(Rect::new(rect.top(), rect.bottom()))
}

impl TextDom for WebDom {
    type Node = Node;

    fn text_nodes(&self, root: &Node) -> Vec<TextRun<Node>> {
        let Ok(walker) = self
            .document
            .create_tree_walker_with_what_to_show(root, SHOW_ELEMENT | SHOW_TEXT)
        else {
            return Vec::new();
        };

        let blocks = BLOCK_TAGS.join(", ");
        let mut runs = Vec::new();
        let mut pending = false;
        let mut previous_block: Option<Element> = None;

        while let Ok(Some(node)) = walker.next_node() {
            if let Some(element) = node.dyn_ref::<Element>() {
                let tag = element.tag_name();
                pending |= is_line_break(&tag) || is_block_tag(&tag);
                continue;
            }
            let Some(parent) = node.parent_element() else {
                continue;
            };
            if parent.closest(NON_RENDERED).ok().flatten().is_some() {
                continue;
            }

            // Leaving a block shows up as a change of the enclosing block.
            let block = parent.closest(&blocks).ok().flatten();
            let left_block = previous_block != block;
            runs.push(TextRun {
                node,
                break_before: std::mem::take(&mut pending) || left_block,
            });
            previous_block = block;
        }
        runs
    }

    fn text(&self, node: &Node) -> String {
        node.dyn_ref::<Text>()
            .map(|t| t.data())
            .unwrap_or_default()
    }

    fn wrap_text(&mut self, node: &Node, start: usize, end: usize, word_index: usize) -> Option<Node> {
        let text = node.dyn_ref::<Text>()?;
        let content = text.data();
        let total = content.chars().count();
        if start >= end || end > total {
            return None;
        }
        let parent = node.parent_node()?;

        let from = utf16_offset(&content, start);
        let to = utf16_offset(&content, end);
        let word = text.split_text(from).ok()?;
        if end < total {
            word.split_text(to - from).ok()?;
        }

        let marker = self.document.create_element(MARKER_TAG).ok()?;
        marker
            .set_attribute(WORD_INDEX_ATTR, &word_index.to_string())
            .ok()?;
        marker
            .set_attribute(WORD_STATE_ATTR, WordState::Unspoken.as_str())
            .ok()?;
        parent.insert_before(&marker, Some(&word)).ok()?;
        marker.append_child(&word).ok()?;
        Some(marker.into())
    }

    fn set_word_state(&mut self, marker: &Node, state: WordState) {
        if let Some(element) = marker.dyn_ref::<Element>() {
            let _ = element.set_attribute(WORD_STATE_ATTR, state.as_str());
        }
    }

    fn is_attached(&self, node: &Node) -> bool {
        node.is_connected()
    }

    fn markers(&self, root: &Node) -> Vec<Node> {
        let Some(root) = root.dyn_ref::<Element>() else {
            return Vec::new();
        };
        let Ok(list) = root.query_selector_all(&marker_selector()) else {
            return Vec::new();
        };
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn unwrap_marker(&mut self, marker: &Node) {
        let Some(parent) = marker.parent_node() else {
            return;
        };
        while let Some(child) = marker.first_child() {
            if parent.insert_before(&child, Some(marker)).is_err() {
                break;
            }
        }
        let _ = parent.remove_child(marker);
    }

    fn normalize(&mut self, root: &Node) {
        root.normalize();
    }

    fn marker_word_index(&self, node: &Node) -> Option<usize> {
        let element = match node.dyn_ref::<Element>() {
            Some(element) => element.clone(),
            None => node.parent_element()?,
        };
        element
            .closest(&marker_selector())
            .ok()
            .flatten()?
            .get_attribute(WORD_INDEX_ATTR)?
            .parse()
            .ok()
    }
}
