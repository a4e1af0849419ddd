//! In-memory document tree implementing [`TextDom`].
//!
//! Used by headless hosts and by the test suite. Node 0 is the document;
//! a node is attached when its parent chain reaches it.

use std::collections::BTreeMap;

use crate::highlight::dom::{
    is_block_tag, is_line_break, TextDom, TextRun, WordState, MARKER_TAG, WORD_INDEX_ATTR,
    WORD_STATE_ATTR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element {
                    tag: "#document".to_string(),
                    attributes: BTreeMap::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(parent, node);
        node
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detaches every child of `parent`, as a wholesale re-render would.
    pub fn remove_children(&mut self, parent: NodeId) {
        for child in std::mem::take(&mut self.nodes[parent.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[node.0].kind {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(content) = &mut self.nodes[node.0].kind {
            *content = text.to_string();
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => self.nodes[node.0]
                .children
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    /// `(word index, marker text, state)` for each marker under `root`.
    pub fn marker_summary(&self, root: NodeId) -> Vec<(usize, String, Option<WordState>)> {
        self.markers(&root)
            .into_iter()
            .filter_map(|m| {
                let index = self.attribute(m, WORD_INDEX_ATTR)?.parse().ok()?;
                let state = self.attribute(m, WORD_STATE_ATTR).and_then(WordState::parse);
                Some((index, self.text_content(m), state))
            })
            .collect()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.nodes[reference.0].parent else {
            return;
        };
        self.detach(node);
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&c| c == reference)
            .map_or(siblings.len(), |p| p + 1);
        siblings.insert(position, node);
        self.nodes[node.0].parent = Some(parent);
    }

    fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Text(_))
    }

    fn collect(&self, node: NodeId, out: &mut Vec<NodeId>, keep: &dyn Fn(NodeId) -> bool) {
        for &child in &self.nodes[node.0].children {
            if keep(child) {
                out.push(child);
            }
            if !self.is_text(child) && !self.is_hidden(child) {
                self.collect(child, out, keep);
            }
        }
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        matches!(self.tag(node), Some("script" | "style"))
    }

    fn collect_runs(&self, node: NodeId, out: &mut Vec<TextRun<NodeId>>, pending: &mut bool) {
        for &child in &self.nodes[node.0].children {
            match self.tag(child) {
                None => out.push(TextRun {
                    node: child,
                    break_before: std::mem::take(pending),
                }),
                Some(_) if self.is_hidden(child) => {}
                Some(tag) if is_line_break(tag) => *pending = true,
                Some(tag) => {
                    let block = is_block_tag(tag);
                    *pending |= block;
                    self.collect_runs(child, out, pending);
                    *pending |= block;
                }
            }
        }
    }
}

impl TextDom for MemoryDom {
    type Node = NodeId;

    fn text_nodes(&self, root: &NodeId) -> Vec<TextRun<NodeId>> {
        let mut out = Vec::new();
        self.collect_runs(*root, &mut out, &mut false);
        out
    }

    fn text(&self, node: &NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => String::new(),
        }
    }

    fn wrap_text(
        &mut self,
        node: &NodeId,
        start: usize,
        end: usize,
        word_index: usize,
    ) -> Option<NodeId> {
        let text = match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => return None,
        };
        let chars: Vec<char> = text.chars().collect();
        if start >= end || end > chars.len() || self.nodes[node.0].parent.is_none() {
            return None;
        }

        let prefix: String = chars[..start].iter().collect();
        let middle: String = chars[start..end].iter().collect();
        let suffix: String = chars[end..].iter().collect();

        self.set_text(*node, &prefix);
        let marker = self.create_element(MARKER_TAG);
        self.set_attribute(marker, WORD_INDEX_ATTR, &word_index.to_string());
        self.set_attribute(marker, WORD_STATE_ATTR, WordState::Unspoken.as_str());
        let inner = self.create_text(&middle);
        self.append_child(marker, inner);
        self.insert_after(*node, marker);
        if !suffix.is_empty() {
            let rest = self.create_text(&suffix);
            self.insert_after(marker, rest);
        }
        Some(marker)
    }

    fn set_word_state(&mut self, marker: &NodeId, state: WordState) {
        self.set_attribute(*marker, WORD_STATE_ATTR, state.as_str());
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        let mut current = *node;
        loop {
            if current == self.document() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn markers(&self, root: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(*root, &mut out, &|n| self.attribute(n, WORD_INDEX_ATTR).is_some());
        out
    }

    fn unwrap_marker(&mut self, marker: &NodeId) {
        let Some(parent) = self.nodes[marker.0].parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[marker.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(position) = siblings.iter().position(|c| c == marker) {
            siblings.splice(position..=position, children);
        }
        self.nodes[marker.0].parent = None;
    }

    fn normalize(&mut self, root: &NodeId) {
        let children = std::mem::take(&mut self.nodes[root.0].children);
        let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());

        for child in children {
            if !self.is_text(child) {
                self.normalize(&child);
                merged.push(child);
                continue;
            }

            let text = self.text(&child);
            let previous = merged.last().copied().filter(|&p| self.is_text(p));
            match previous {
                _ if text.is_empty() => self.nodes[child.0].parent = None,
                Some(previous) => {
                    let combined = self.text(&previous) + &text;
                    self.set_text(previous, &combined);
                    self.nodes[child.0].parent = None;
                }
                None => merged.push(child),
            }
        }
        self.nodes[root.0].children = merged;
    }

    fn marker_word_index(&self, node: &NodeId) -> Option<usize> {
        let mut current = Some(*node);
        while let Some(id) = current {
            if let Some(value) = self.attribute(id, WORD_INDEX_ATTR) {
                return value.parse().ok();
            }
            current = self.nodes[id.0].parent;
        }
        None
    }
}
