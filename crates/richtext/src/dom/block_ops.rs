// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Structural edits on blocks: wrapping and unwrapping, lists, alignment,
//! headings and clearing formatting.

use std::collections::BTreeSet;

use crate::dom::nodes::{DomNode, ElementNode, Style};
use crate::dom::runs::{split_runs, InlineAttrs, Run};
use crate::dom::{BlockPoint, Document, DomHandle};

/// Blocks a quote or code block can replace or be unwrapped from.
const WRAP_CANDIDATES: &[&str] = &[
    "p",
    "div",
    "blockquote",
    "pre",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
];

const HEADING_CANDIDATES: &[&str] = &["p", "div", "h1", "h2", "h3", "h4", "h5", "h6"];

/// The block a block-level toggle acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockTarget {
    /// A wrappable block below the root.
    Block(DomHandle),
    /// A list item or table cell holding the inline content directly.
    InsideContainer(DomHandle),
    /// Nothing suitable before the root was reached.
    None,
}

impl Document {
    /// Walk up from `handle` to the first block a block toggle applies to.
    pub fn find_block_target(&self, handle: &DomHandle) -> BlockTarget {
        let mut current = Some(handle.clone());
        while let Some(h) = current {
            if h.is_root() {
                break;
            }
            if let Some(el) = self.element(&h) {
                if WRAP_CANDIDATES.contains(&el.tag()) {
                    return BlockTarget::Block(h);
                }
                if (el.is_list_item() || el.is_table_cell()) && el.is_text_block() {
                    return BlockTarget::InsideContainer(h);
                }
            }
            current = h.parent_handle();
        }
        BlockTarget::None
    }

    /// Replace the block at `handle` with a `tag` element holding its
    /// children.
    pub fn wrap_in_block(&mut self, handle: &DomHandle, tag: &str) -> bool {
        let Some(el) = self.element_mut(handle) else {
            return false;
        };
        let children = el.take_children();
        let wrapper = DomNode::new_element(tag, children);
        self.replace_node(handle, vec![wrapper])
    }

    /// Put the inline children of a list item or cell inside a new `tag`
    /// element.
    pub fn wrap_children_in(&mut self, container: &DomHandle, tag: &str) -> bool {
        let Some(el) = self.element_mut(container) else {
            return false;
        };
        let children = el.take_children();
        el.append_child(DomNode::new_element(tag, children));
        true
    }

    /// Undo a wrapper block: inline content goes into a plain paragraph,
    /// nested blocks move up into the wrapper's place. The only block of a
    /// list item or cell gives its inline content back to the container.
    pub fn unwrap_block(&mut self, handle: &DomHandle) -> bool {
        let sole_in_container = handle.parent_handle().is_some_and(|p| {
            self.element(&p).is_some_and(|parent| {
                (parent.is_list_item() || parent.is_table_cell()) && parent.children().len() == 1
            })
        });
        let Some(el) = self.element_mut(handle) else {
            return false;
        };
        let children = el.take_children();
        let replacement = if sole_in_container && children.iter().all(DomNode::is_inline) {
            children
        } else if children.iter().all(DomNode::is_inline) {
            vec![DomNode::new_element("p", children)]
        } else {
            wrap_inline_groups(children)
        };
        self.replace_node(handle, replacement)
    }

    /// Move exactly the content between `start` and `end` into a new
    /// `tag` element, splitting the blocks at both ends. Content outside
    /// the range stays where it is. Returns the range of the wrapped
    /// content.
    pub fn wrap_range_in_block(
        &mut self,
        start: &BlockPoint,
        end: &BlockPoint,
        tag: &str,
    ) -> Option<(BlockPoint, BlockPoint)> {
        if start.block == end.block || start.block.is_ancestor_of(&end.block) {
            return None;
        }
        let common = start.block.common_ancestor(&end.block);
        let stop = self.nearest_flow_container(&common);
        if !stop.is_ancestor_of(&start.block) || !stop.is_ancestor_of(&end.block) {
            return None;
        }

        let end_index = self.split_block_at(end, &stop)?;
        let start_index = self.split_block_at(start, &stop)?;
        // The end split's right half moved along by one
        let end_index = end_index + 1;

        let container = self.element_mut(&stop)?;
        let mut selected: Vec<DomNode> =
            container.children_mut().drain(start_index..end_index).collect();
        while selected.len() > 1 && is_blank_node(selected.last()) {
            selected.pop();
        }
        while selected.len() > 1 && is_blank_node(selected.first()) {
            selected.remove(0);
        }
        container
            .children_mut()
            .insert(start_index, DomNode::new_element(tag, selected));

        let mut wrapper_index = start_index;
        if is_blank_node(container.get_child(wrapper_index + 1)) {
            container.children_mut().remove(wrapper_index + 1);
        }
        if wrapper_index > 0 && is_blank_node(container.get_child(wrapper_index - 1)) {
            container.children_mut().remove(wrapper_index - 1);
            wrapper_index -= 1;
        }

        let wrapper = stop.child_handle(wrapper_index);
        let inside: Vec<DomHandle> = self
            .text_blocks()
            .into_iter()
            .filter(|b| *b == wrapper || wrapper.is_ancestor_of(b))
            .collect();
        let first = inside.first()?.clone();
        let last = inside.last()?.clone();
        let last_len = self.block_len(&last);
        Some((BlockPoint::new(first, 0), BlockPoint::new(last, last_len)))
    }

    fn nearest_flow_container(&self, handle: &DomHandle) -> DomHandle {
        let mut current = Some(handle.clone());
        while let Some(h) = current {
            if self.element(&h).is_some_and(ElementNode::is_flow_container) {
                return h;
            }
            current = h.parent_handle();
        }
        DomHandle::root()
    }

    /// Turn the given text blocks into or out of a `list_tag` list.
    pub fn toggle_list(&mut self, blocks: &[DomHandle], list_tag: &str) {
        let units: BTreeSet<DomHandle> =
            blocks.iter().map(|b| self.list_unit(b)).collect();
        let units: Vec<DomHandle> = units.into_iter().collect();
        if units.is_empty() {
            return;
        }

        if units.iter().all(|u| self.is_item_of(u, list_tag)) {
            for unit in units.iter().rev() {
                self.lift_list_item(unit);
            }
            return;
        }

        let mut affected: BTreeSet<DomHandle> = BTreeSet::new();
        for unit in &units {
            if let Some(parent) = unit.parent_handle() {
                let retype = self
                    .element(&parent)
                    .is_some_and(|p| p.is_list() && p.tag() != list_tag)
                    && self.element(unit).is_some_and(ElementNode::is_list_item);
                if retype {
                    if let Some(list) = self.element_mut(&parent) {
                        list.set_tag(list_tag);
                    }
                }
            }
        }

        let convertible: Vec<DomHandle> = units
            .into_iter()
            .filter(|u| {
                !u.is_root()
                    && self
                        .element(u)
                        .is_some_and(|e| !e.is_list_item() && !e.is_table_cell())
            })
            .collect();

        for group in sibling_groups(&convertible).into_iter().rev() {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let (Some(parent), Some(from), Some(to)) = (
                first.parent_handle(),
                first.index_in_parent(),
                last.index_in_parent(),
            ) else {
                continue;
            };
            let Some(container) = self.element_mut(&parent) else {
                continue;
            };
            let items: Vec<DomNode> = container
                .children_mut()
                .drain(from..=to)
                .map(into_list_item)
                .collect();
            container
                .children_mut()
                .insert(from, DomNode::new_element(list_tag, items));
            affected.insert(parent);
        }

        for parent in affected.iter().rev() {
            self.merge_adjacent_lists(parent);
        }
    }

    /// A paragraph directly inside a list item acts for the item.
    fn list_unit(&self, block: &DomHandle) -> DomHandle {
        let is_item = self.element(block).is_some_and(ElementNode::is_list_item);
        if !is_item {
            if let Some(parent) = block.parent_handle() {
                if self.element(&parent).is_some_and(ElementNode::is_list_item) {
                    return parent;
                }
            }
        }
        block.clone()
    }

    fn is_item_of(&self, handle: &DomHandle, list_tag: &str) -> bool {
        self.element(handle).is_some_and(ElementNode::is_list_item)
            && handle
                .parent_handle()
                .and_then(|p| self.element(&p))
                .is_some_and(|p| p.tag() == list_tag)
    }

    /// Move a list item out of its list, splitting the list around it.
    fn lift_list_item(&mut self, item: &DomHandle) {
        let (Some(list_handle), Some(index)) = (item.parent_handle(), item.index_in_parent())
        else {
            return;
        };
        let Some(list) = self.element(&list_handle) else {
            return;
        };
        let Some(DomNode::Element(li)) = list.get_child(index) else {
            return;
        };

        let (inline, nested): (Vec<DomNode>, Vec<DomNode>) =
            li.children().iter().cloned().partition(DomNode::is_inline);
        let mut replacement = Vec::new();
        if index > 0 {
            replacement.push(DomNode::Element(
                list.shell().with_children(list.children()[..index].to_vec()),
            ));
        }
        if !inline.is_empty() || nested.is_empty() {
            replacement.push(DomNode::Element(
                ElementNode::new("p")
                    .with_style(li.style().clone())
                    .with_children(inline),
            ));
        }
        replacement.extend(nested);
        if index + 1 < list.children().len() {
            replacement.push(DomNode::Element(
                list.shell().with_children(list.children()[index + 1..].to_vec()),
            ));
        }
        self.replace_node(&list_handle, replacement);
    }

    fn merge_adjacent_lists(&mut self, parent: &DomHandle) {
        let Some(container) = self.element_mut(parent) else {
            return;
        };
        let children = container.children_mut();
        let mut i = children.len();
        while i > 1 {
            i -= 1;
            let same_kind = match (&children[i - 1], &children[i]) {
                (DomNode::Element(a), DomNode::Element(b)) => {
                    a.is_list() && a.tag() == b.tag()
                }
                _ => false,
            };
            if same_kind {
                if let DomNode::Element(mut next) = children.remove(i) {
                    let moved = next.take_children();
                    if let Some(prev) = children[i - 1].as_element_mut() {
                        prev.children_mut().extend(moved);
                    }
                }
            }
        }
    }

    /// Set (or with None, remove) a style property on a node.
    pub fn restyle_node(&mut self, handle: &DomHandle, property: &str, value: Option<&str>) -> bool {
        let Some(el) = self.element_mut(handle) else {
            return false;
        };
        match value {
            Some(value) => el.style_mut().set(property, value),
            None => {
                el.style_mut().remove(property);
            }
        }
        true
    }

    /// Retag text blocks as a heading of `level`, or as paragraphs.
    pub fn set_heading(&mut self, blocks: &[DomHandle], level: Option<u8>) {
        let tag = match level {
            Some(level) => format!("h{}", level.clamp(1, 6)),
            None => "p".to_owned(),
        };
        for block in blocks {
            if let Some(el) = self.element_mut(block) {
                if HEADING_CANDIDATES.contains(&el.tag()) {
                    el.set_tag(&tag);
                }
            }
        }
    }

    /// Apply `f` to the formatting of the inline content in `start..end`.
    pub(crate) fn map_inline(
        &mut self,
        start: &BlockPoint,
        end: &BlockPoint,
        mut f: impl FnMut(&mut InlineAttrs),
    ) {
        for (block, from, to) in self.segments(start, end) {
            if from >= to {
                continue;
            }
            let runs = crate::dom::runs::map_range(self.runs(&block), from, to, &mut f);
            self.set_runs(&block, runs);
        }
    }

    /// Formatting of every text run inside `start..end`.
    pub(crate) fn inline_attrs_in(&self, start: &BlockPoint, end: &BlockPoint) -> Vec<InlineAttrs> {
        let mut found = Vec::new();
        for (block, from, to) in self.segments(start, end) {
            let runs = self.runs(&block);
            found.extend(
                crate::dom::runs::text_attrs_in_range(&runs, from, to)
                    .into_iter()
                    .cloned(),
            );
        }
        found
    }

    /// Strip inline formatting, styles, links and wrappers from the
    /// content in `start..end`, and styles from the blocks it touches.
    /// Text, images and block structure are kept.
    pub fn remove_formatting(&mut self, start: &BlockPoint, end: &BlockPoint) {
        for (block, from, to) in self.segments(start, end) {
            if from < to {
                let (head, rest) = split_runs(self.runs(&block), from);
                let (mut middle, tail) = split_runs(rest, to - from);
                for run in middle.iter_mut() {
                    match run {
                        Run::Text { attrs, .. } => *attrs = InlineAttrs::default(),
                        Run::Atom { node, attrs } => {
                            *attrs = InlineAttrs::default();
                            node.retain_attrs(|name| name == "src" || name == "alt");
                            node.set_style(Style::default());
                        }
                        Run::Block(_) => {}
                    }
                }
                self.set_runs(&block, head.into_iter().chain(middle).chain(tail).collect());
            }
            if let Some(el) = self.element_mut(&block) {
                el.set_style(Style::default());
            }
        }
    }
}

fn is_blank_node(node: Option<&DomNode>) -> bool {
    matches!(node, Some(DomNode::Element(e)) if e.is_blank() && !e.is_void())
}

fn wrap_inline_groups(children: Vec<DomNode>) -> Vec<DomNode> {
    let mut out = Vec::new();
    let mut inline = Vec::new();
    for child in children {
        if child.is_block() {
            if inline.iter().any(|n: &DomNode| !n.text_content().trim().is_empty()) {
                out.push(DomNode::new_element("p", std::mem::take(&mut inline)));
            }
            inline.clear();
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

fn into_list_item(node: DomNode) -> DomNode {
    match node {
        DomNode::Element(mut el) if el.tag() == "p" || el.tag() == "div" => {
            let children = el.take_children();
            DomNode::Element(
                ElementNode::new("li")
                    .with_style(el.style().clone())
                    .with_children(children),
            )
        }
        other => DomNode::new_element("li", vec![other]),
    }
}

/// Split handles (in document order) into runs of consecutive siblings.
fn sibling_groups(handles: &[DomHandle]) -> Vec<Vec<DomHandle>> {
    let mut groups: Vec<Vec<DomHandle>> = Vec::new();
    for handle in handles {
        let extends = groups.last().and_then(|g| g.last()).is_some_and(|prev| {
            prev.parent_handle() == handle.parent_handle()
                && prev.index_in_parent().map(|i| i + 1) == handle.index_in_parent()
        });
        match groups.last_mut() {
            Some(group) if extends => group.push(handle.clone()),
            _ => groups.push(vec![handle.clone()]),
        }
    }
    groups
}
