// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::nodes::{write_tree_children, DomNode, ElementNode};
use crate::dom::parser;
use crate::dom::runs::{collect_runs, Run};
use crate::dom::DomHandle;
use crate::HtmlParseError;

/// The editable content tree.
///
/// The root has no tag of its own and always holds at least one block;
/// inline content is never a direct child of the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    root: ElementNode,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding a single empty paragraph.
    pub fn new() -> Self {
        Self::from_children(Vec::new())
    }

    pub fn from_children(children: Vec<DomNode>) -> Self {
        let mut document = Self {
            root: ElementNode::new_root(Vec::new()),
        };
        document.root.set_children(wrap_loose_inline(children));
        document.ensure_block();
        document
    }

    pub fn parse(html: &str) -> Result<Self, HtmlParseError> {
        parser::parse(html)
    }

    /// Parse `html`, logging and recovering from any parse errors.
    pub fn parse_lenient(html: &str) -> Self {
        parser::parse_lenient(html)
    }

    pub fn root(&self) -> &ElementNode {
        &self.root
    }

    /// The node at `handle`. The root is not a [DomNode]; use
    /// [Document::element] to reach it.
    pub fn lookup(&self, handle: &DomHandle) -> Option<&DomNode> {
        let (first, rest) = handle.raw().split_first()?;
        let mut node = self.root.get_child(*first)?;
        for index in rest {
            node = node.as_element()?.get_child(*index)?;
        }
        Some(node)
    }

    pub(crate) fn lookup_mut(&mut self, handle: &DomHandle) -> Option<&mut DomNode> {
        let (first, rest) = handle.raw().split_first()?;
        let mut node = self.root.children_mut().get_mut(*first)?;
        for index in rest {
            node = node.as_element_mut()?.children_mut().get_mut(*index)?;
        }
        Some(node)
    }

    pub fn element(&self, handle: &DomHandle) -> Option<&ElementNode> {
        if handle.is_root() {
            Some(&self.root)
        } else {
            self.lookup(handle)?.as_element()
        }
    }

    pub(crate) fn element_mut(&mut self, handle: &DomHandle) -> Option<&mut ElementNode> {
        if handle.is_root() {
            Some(&mut self.root)
        } else {
            self.lookup_mut(handle)?.as_element_mut()
        }
    }

    /// Replace the node at `handle` with zero or more nodes.
    pub(crate) fn replace_node(&mut self, handle: &DomHandle, nodes: Vec<DomNode>) -> bool {
        let (Some(parent), Some(index)) = (handle.parent_handle(), handle.index_in_parent())
        else {
            return false;
        };
        match self.element_mut(&parent) {
            Some(parent) if index < parent.children().len() => {
                parent.children_mut().splice(index..=index, nodes);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn insert_nodes(&mut self, parent: &DomHandle, index: usize, nodes: Vec<DomNode>) {
        if let Some(parent) = self.element_mut(parent) {
            let index = index.min(parent.children().len());
            parent.children_mut().splice(index..index, nodes);
        }
    }

    pub(crate) fn remove_node(&mut self, handle: &DomHandle) -> Option<DomNode> {
        let parent = self.element_mut(&handle.parent_handle()?)?;
        let index = handle.index_in_parent()?;
        if index < parent.children().len() {
            Some(parent.children_mut().remove(index))
        } else {
            None
        }
    }

    /// Restore the at-least-one-block invariant.
    pub(crate) fn ensure_block(&mut self) {
        if !self.root.children().iter().any(DomNode::is_block) {
            let inline = self.root.take_children();
            self.root
                .append_child(DomNode::new_element("p", inline));
        }
    }

    /// Handles of all text blocks in document order.
    pub fn text_blocks(&self) -> Vec<DomHandle> {
        let mut blocks = Vec::new();
        collect_text_blocks(&self.root, &DomHandle::root(), &mut blocks);
        blocks
    }

    /// The text block holding the node at `handle`, if any.
    pub fn text_block_of(&self, handle: &DomHandle) -> Option<DomHandle> {
        let mut current = Some(handle.clone());
        while let Some(h) = current {
            if self.element(&h).is_some_and(ElementNode::is_text_block) {
                return Some(h);
            }
            current = h.parent_handle();
        }
        None
    }

    /// Ancestors of `handle` from its parent up to, not including, the root.
    pub fn ancestors(&self, handle: &DomHandle) -> Vec<(DomHandle, &ElementNode)> {
        let mut out = Vec::new();
        let mut current = handle.parent_handle();
        while let Some(h) = current {
            if h.is_root() {
                break;
            }
            if let Some(el) = self.element(&h) {
                out.push((h.clone(), el));
            }
            current = h.parent_handle();
        }
        out
    }

    pub(crate) fn runs(&self, block: &DomHandle) -> Vec<Run> {
        self.element(block)
            .map(|e| collect_runs(e.children()))
            .unwrap_or_default()
    }

    pub(crate) fn set_runs(&mut self, block: &DomHandle, runs: Vec<Run>) {
        if let Some(el) = self.element_mut(block) {
            el.set_children(crate::dom::runs::build_nodes(runs));
        }
    }

    pub fn block_len(&self, block: &DomHandle) -> usize {
        self.element(block).map_or(0, ElementNode::inline_len)
    }

    pub fn to_html(&self) -> String {
        let mut buf = String::new();
        for child in self.root.children() {
            child.write_html(&mut buf);
        }
        buf
    }

    pub fn to_tree(&self) -> String {
        let mut buf = String::from("\n");
        write_tree_children(&self.root, &mut buf, "");
        buf
    }

    /// Visible text with one line per text block.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .map(|b| {
                self.runs(b)
                    .iter()
                    .map(|run| match run {
                        Run::Text { text, .. } => text.as_str(),
                        Run::Atom { node, .. } if node.tag() == "br" => "\n",
                        _ => "",
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize with selection markers inserted at the given positions,
    /// each given as (container handle, offset, marker).
    pub(crate) fn to_marked_html(&self, markers: &[(DomHandle, usize, &str)]) -> String {
        let mut buf = String::new();
        write_marked(&self.root, &DomHandle::root(), markers, &mut buf);
        buf
    }
}

fn collect_text_blocks(el: &ElementNode, handle: &DomHandle, out: &mut Vec<DomHandle>) {
    if el.is_text_block() {
        out.push(handle.clone());
    }
    for (i, child) in el.children().iter().enumerate() {
        if let DomNode::Element(c) = child {
            if c.is_block() {
                collect_text_blocks(c, &handle.child_handle(i), out);
            }
        }
    }
}

/// Group runs of inline nodes at the root into paragraphs.
fn wrap_loose_inline(children: Vec<DomNode>) -> Vec<DomNode> {
    let mut out = Vec::new();
    let mut inline = Vec::new();
    for child in children {
        if child.is_block() {
            if !inline.is_empty() {
                out.push(DomNode::new_element("p", std::mem::take(&mut inline)));
            }
            out.push(child);
        } else {
            inline.push(child);
        }
    }
    if !inline.is_empty() {
        out.push(DomNode::new_element("p", inline));
    }
    out
}

fn write_marked(
    el: &ElementNode,
    handle: &DomHandle,
    markers: &[(DomHandle, usize, &str)],
    buf: &mut String,
) {
    let marks_at = |offset: usize, buf: &mut String| {
        for (h, o, m) in markers {
            if h == handle && *o == offset {
                buf.push_str(m);
            }
        }
    };
    if !el.is_root() {
        el.write_open_tag(buf);
    }
    for (i, child) in el.children().iter().enumerate() {
        marks_at(i, buf);
        let child_handle = handle.child_handle(i);
        match child {
            DomNode::Text(t) => {
                for (j, c) in t.text().chars().enumerate() {
                    write_text_marks(&child_handle, j, markers, buf);
                    buf.push_str(&html_escape::encode_text(&c.to_string()));
                }
                write_text_marks(&child_handle, t.len(), markers, buf);
            }
            DomNode::Element(e) => write_marked(e, &child_handle, markers, buf),
        }
    }
    if !el.is_void() {
        marks_at(el.children().len(), buf);
    }
    if !el.is_root() {
        el.write_close_tag(buf);
    }
}

fn write_text_marks(
    handle: &DomHandle,
    offset: usize,
    markers: &[(DomHandle, usize, &str)],
    buf: &mut String,
) {
    for (h, o, m) in markers {
        if h == handle && *o == offset {
            buf.push_str(m);
        }
    }
}
