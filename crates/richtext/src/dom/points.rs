// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Conversions between DOM positions and block points, and the edits that
//! are expressed in block points: deleting a range, splitting a block and
//! inserting nodes.

use crate::dom::nodes::{DomNode, ElementNode};
use crate::dom::runs::{split_runs, InlineAttrs, Run};
use crate::dom::{Document, DomHandle};
use crate::{Position, Selection};

/// A caret location as (text block, offset into its inline content).
///
/// Ordering compares the block handle first, which is document order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPoint {
    pub block: DomHandle,
    pub offset: usize,
}

impl BlockPoint {
    pub fn new(block: DomHandle, offset: usize) -> Self {
        Self { block, offset }
    }
}

impl Document {
    /// Map a DOM position onto the text block that contains it.
    ///
    /// Returns None when the position does not exist in this document.
    pub fn block_point(&self, position: &Position) -> Option<BlockPoint> {
        let path = &position.path;
        if let Some(DomNode::Text(t)) = self.lookup(path) {
            if position.offset > t.len() {
                return None;
            }
            let block = self.text_block_of(path)?;
            let base = self.inline_offset(&block, path)?;
            return Some(BlockPoint::new(block, base + position.offset));
        }

        let el = self.element(path)?;
        if el.is_void() {
            if position.offset != 0 {
                return None;
            }
            let before = Position::new(path.parent_handle()?, path.index_in_parent()?);
            return self.block_point(&before);
        }
        if position.offset > el.children().len() {
            return None;
        }
        let preceding: usize = el.children()[..position.offset]
            .iter()
            .map(DomNode::inline_len)
            .sum();
        if el.is_text_block() {
            return Some(BlockPoint::new(path.clone(), preceding));
        }
        if el.is_inline() {
            let block = self.text_block_of(path)?;
            let base = self.inline_offset(&block, path)?;
            return Some(BlockPoint::new(block, base + preceding));
        }

        // Between blocks: snap to the nearest text block inside, then
        // anywhere in the document.
        let boundary = path.child_handle(position.offset);
        let blocks = self.text_blocks();
        let next = |inside: bool| {
            blocks
                .iter()
                .find(|b| **b >= boundary && (!inside || path.is_ancestor_of(b)))
                .map(|b| BlockPoint::new(b.clone(), 0))
        };
        let prev = |inside: bool| {
            blocks
                .iter()
                .rev()
                .find(|b| **b < boundary && (!inside || path.is_ancestor_of(b)))
                .map(|b| BlockPoint::new(b.clone(), self.block_len(b)))
        };
        next(true)
            .or_else(|| prev(true))
            .or_else(|| next(false))
            .or_else(|| prev(false))
    }

    /// Offset of the start of the node at `path` inside `block`.
    fn inline_offset(&self, block: &DomHandle, path: &DomHandle) -> Option<usize> {
        let mut offset = 0;
        for depth in block.depth()..path.depth() {
            let parent = self.element(&path.sub_handle_up_to(depth))?;
            let index = path.raw()[depth];
            offset += parent
                .children()
                .iter()
                .take(index)
                .map(DomNode::inline_len)
                .sum::<usize>();
        }
        Some(offset)
    }

    /// The DOM position for a block point. At a boundary between two
    /// text nodes the earlier one is preferred.
    pub fn position_at(&self, point: &BlockPoint) -> Position {
        match self.element(&point.block) {
            Some(el) => locate(el, &point.block, point.offset),
            None => Position::new(point.block.clone(), 0),
        }
    }

    pub fn resolves(&self, selection: &Selection) -> bool {
        self.block_point(&selection.anchor).is_some()
            && self.block_point(&selection.focus).is_some()
    }

    /// Anchor and focus as block points, in document order.
    pub fn range_points(&self, selection: &Selection) -> Option<(BlockPoint, BlockPoint)> {
        let anchor = self.block_point(&selection.anchor)?;
        let focus = self.block_point(&selection.focus)?;
        if focus < anchor {
            Some((focus, anchor))
        } else {
            Some((anchor, focus))
        }
    }

    pub fn caret_at(&self, point: &BlockPoint) -> Selection {
        Selection::caret(self.position_at(point))
    }

    pub fn selection_between(&self, anchor: &BlockPoint, focus: &BlockPoint) -> Selection {
        Selection::new(self.position_at(anchor), self.position_at(focus))
    }

    pub fn start_point(&self) -> BlockPoint {
        self.text_blocks()
            .into_iter()
            .next()
            .map_or_else(|| BlockPoint::new(DomHandle::root(), 0), |b| BlockPoint::new(b, 0))
    }

    pub fn end_point(&self) -> BlockPoint {
        self.text_blocks().pop().map_or_else(
            || BlockPoint::new(DomHandle::root(), 0),
            |b| {
                let len = self.block_len(&b);
                BlockPoint::new(b, len)
            },
        )
    }

    /// `selection` if it still resolves, otherwise a caret at the end.
    pub fn clamp_selection(&self, selection: &Selection) -> Selection {
        if self.resolves(selection) {
            selection.clone()
        } else {
            self.caret_at(&self.end_point())
        }
    }

    /// Offset of a point counted through the whole document, with one
    /// extra position between consecutive text blocks. Survives edits that
    /// restructure blocks without changing their text.
    pub(crate) fn flat_offset(&self, point: &BlockPoint) -> usize {
        let mut flat = 0;
        for block in self.text_blocks() {
            let len = self.block_len(&block);
            if block == point.block {
                return flat + point.offset.min(len);
            }
            flat += len + 1;
        }
        flat.saturating_sub(1)
    }

    pub(crate) fn point_at_flat(&self, flat: usize) -> BlockPoint {
        let mut remaining = flat;
        for block in self.text_blocks() {
            let len = self.block_len(&block);
            if remaining <= len {
                return BlockPoint::new(block, remaining);
            }
            remaining -= len + 1;
        }
        self.end_point()
    }

    /// The part of each text block covered by `start..end`.
    pub(crate) fn segments(
        &self,
        start: &BlockPoint,
        end: &BlockPoint,
    ) -> Vec<(DomHandle, usize, usize)> {
        self.text_blocks()
            .into_iter()
            .filter(|b| *b >= start.block && *b <= end.block)
            .map(|b| {
                let from = if b == start.block { start.offset } else { 0 };
                let to = if b == end.block {
                    end.offset
                } else {
                    self.block_len(&b)
                };
                (b, from, to)
            })
            .collect()
    }

    /// Text blocks touched by `start..end`.
    pub(crate) fn blocks_in_range(&self, start: &BlockPoint, end: &BlockPoint) -> Vec<DomHandle> {
        self.segments(start, end).into_iter().map(|(b, _, _)| b).collect()
    }

    /// Delete everything between two points, merging the end block into
    /// the start block. Returns the collapsed point.
    pub(crate) fn delete_range(&mut self, start: &BlockPoint, end: &BlockPoint) -> BlockPoint {
        if start.block == end.block {
            let (head, rest) = split_runs(self.runs(&start.block), start.offset);
            let (_, tail) = split_runs(rest, end.offset.saturating_sub(start.offset));
            self.set_runs(&start.block, head.into_iter().chain(tail).collect());
            return start.clone();
        }
        if start.block.is_ancestor_of(&end.block) {
            return self.delete_into_nested(start, end);
        }

        let (head, _) = split_runs(self.runs(&start.block), start.offset);
        let (_, tail) = split_runs(self.runs(&end.block), end.offset);
        // Blocks nested in the end block survive the merge
        let nested: Vec<Run> = tail
            .iter()
            .filter(|r| matches!(r, Run::Block(_)))
            .cloned()
            .collect();
        let tail: Vec<Run> = tail
            .into_iter()
            .filter(|r| !matches!(r, Run::Block(_)))
            .collect();

        let mut doomed: Vec<DomHandle> = self
            .text_blocks()
            .into_iter()
            .filter(|b| *b > start.block && *b <= end.block)
            .collect();
        doomed.retain(|b| !b.is_ancestor_of(&start.block));
        let outermost: Vec<DomHandle> = doomed
            .iter()
            .filter(|b| !doomed.iter().any(|other| other.is_ancestor_of(b)))
            .cloned()
            .collect();

        for handle in outermost.iter().rev() {
            self.remove_node(handle);
            self.prune_empty_ancestors(handle, &start.block);
        }
        let mut merged = head;
        merged.extend(tail);
        merged.extend(nested);
        self.set_runs(&start.block, merged);
        start.clone()
    }

    /// `end` lies in a block nested inside the `start` block. The head of
    /// the nested content goes, and so does the start block's text
    /// between `start` and the nested block. The nested block itself
    /// stays, so no merge happens.
    fn delete_into_nested(&mut self, start: &BlockPoint, end: &BlockPoint) -> BlockPoint {
        let child = end.block.sub_handle_up_to(start.block.depth() + 1);
        let Some(index) = child.index_in_parent() else {
            return start.clone();
        };
        let nested_offset: usize = match self.element(&start.block) {
            Some(el) => el.children()[..index.min(el.children().len())]
                .iter()
                .map(DomNode::inline_len)
                .sum(),
            None => return start.clone(),
        };

        let first = self
            .text_blocks()
            .into_iter()
            .find(|b| child == *b || child.is_ancestor_of(b));
        if let Some(first) = first {
            if first <= end.block {
                self.delete_range(&BlockPoint::new(first, 0), end);
            }
        }

        let (head, rest) = split_runs(self.runs(&start.block), start.offset);
        let (_, tail) =
            split_runs(rest, nested_offset.saturating_sub(start.offset));
        self.set_runs(&start.block, head.into_iter().chain(tail).collect());
        start.clone()
    }

    fn prune_empty_ancestors(&mut self, removed: &DomHandle, keep: &DomHandle) {
        let mut current = removed.parent_handle();
        while let Some(h) = current {
            if h.is_root() || h == *keep || h.is_ancestor_of(keep) {
                break;
            }
            match self.element(&h) {
                Some(el) if el.children().is_empty() => {
                    self.remove_node(&h);
                }
                _ => break,
            }
            current = h.parent_handle();
        }
    }

    /// Split the text block at `point` into two, and every ancestor below
    /// `stop` along with it. Returns the index in `stop` of the right half.
    pub(crate) fn split_block_at(&mut self, point: &BlockPoint, stop: &DomHandle) -> Option<usize> {
        if !stop.is_ancestor_of(&point.block) {
            return None;
        }
        let (left, right) = split_runs(self.runs(&point.block), point.offset);
        let shell = self.element(&point.block)?.shell();
        let left = shell.clone().with_children(crate::dom::runs::build_nodes(left));
        let right = shell.with_children(crate::dom::runs::build_nodes(right));
        let mut split_index = point.block.index_in_parent()? + 1;
        self.replace_node(
            &point.block,
            vec![DomNode::Element(left), DomNode::Element(right)],
        );

        let mut current = point.block.parent_handle()?;
        while current != *stop {
            let el = self.element(&current)?;
            let shell = el.shell();
            let (l, r) = el.children().split_at(split_index.min(el.children().len()));
            let halves = vec![
                DomNode::Element(shell.clone().with_children(l.to_vec())),
                DomNode::Element(shell.with_children(r.to_vec())),
            ];
            split_index = current.index_in_parent()? + 1;
            self.replace_node(&current, halves);
            current = current.parent_handle()?;
        }
        Some(split_index)
    }

    /// Move the inline children of a flow container (list item, cell,
    /// quote) into paragraphs so that blocks can be placed next to them.
    /// Returns where `offset` ended up.
    pub(crate) fn wrap_inline_children(&mut self, block: &DomHandle, offset: usize) -> Option<BlockPoint> {
        let el = self.element_mut(block)?;
        let children = el.take_children();
        let mut out: Vec<DomNode> = Vec::new();
        let mut group: Vec<DomNode> = Vec::new();
        let mut group_len = 0;
        let mut pos = 0;
        let mut target: Option<(usize, usize)> = None;
        for child in children {
            let len = child.inline_len();
            if child.is_block() {
                if target.is_none() && offset <= pos && group.is_empty() {
                    target = Some((out.len(), 0));
                    out.push(DomNode::new_element("p", Vec::new()));
                }
                if !group.is_empty() {
                    out.push(DomNode::new_element("p", std::mem::take(&mut group)));
                    group_len = 0;
                }
                out.push(child);
            } else {
                if target.is_none() && offset <= pos + len {
                    target = Some((out.len(), group_len + offset.saturating_sub(pos)));
                }
                group.push(child);
                group_len += len;
            }
            pos += len;
        }
        if !group.is_empty() || target.is_none() {
            if target.is_none() {
                target = Some((out.len(), group_len));
            }
            out.push(DomNode::new_element("p", group));
        }
        el.set_children(out);
        target.map(|(index, offset)| BlockPoint::new(block.child_handle(index), offset))
    }

    /// Prepare to place blocks at `point`: returns the point to split at
    /// and the container the split stops at.
    pub(crate) fn split_target(
        &mut self,
        point: &BlockPoint,
        keep_list_items: bool,
    ) -> Option<(BlockPoint, DomHandle)> {
        let el = self.element(&point.block)?;
        let wrap = el.is_flow_container()
            && !point.block.is_root()
            && !(keep_list_items && el.is_list_item());
        if wrap {
            let inner = self.wrap_inline_children(&point.block, point.offset)?;
            Some((inner, point.block.clone()))
        } else {
            Some((point.clone(), point.block.parent_handle()?))
        }
    }

    /// Insert a block element at `point`, splitting the enclosing text
    /// block. Returns the start of the text block that follows it.
    pub(crate) fn insert_block_at(&mut self, point: &BlockPoint, node: ElementNode) -> Option<BlockPoint> {
        let (point, stop) = self.split_target(point, false)?;
        let mut index = self.split_block_at(&point, &stop)?;

        let left = stop.child_handle(index - 1);
        if self.element(&left).is_some_and(ElementNode::is_blank) {
            self.remove_node(&left);
            index -= 1;
        }
        let right = stop.child_handle(index);
        if self.element(&right).is_some_and(ElementNode::is_blank) {
            self.remove_node(&right);
        }

        self.insert_nodes(&stop, index, vec![DomNode::Element(node)]);
        let after = stop.child_handle(index + 1);
        if self.lookup(&after).is_none() {
            self.insert_nodes(&stop, index + 1, vec![DomNode::new_element("p", Vec::new())]);
        }
        self.text_blocks()
            .into_iter()
            .find(|b| *b >= after)
            .map(|b| BlockPoint::new(b, 0))
    }

    /// Insert an inline void element at `point`. Returns the point just
    /// after it.
    pub(crate) fn insert_atom_at(&mut self, point: &BlockPoint, node: ElementNode) -> BlockPoint {
        let (mut runs, right) = split_runs(self.runs(&point.block), point.offset);
        runs.push(Run::Atom {
            node,
            attrs: InlineAttrs::default(),
        });
        runs.extend(right);
        self.set_runs(&point.block, runs);
        BlockPoint::new(point.block.clone(), point.offset + 1)
    }

    pub(crate) fn insert_text_at(
        &mut self,
        point: &BlockPoint,
        text: &str,
        attrs: InlineAttrs,
    ) -> BlockPoint {
        let (mut runs, right) = split_runs(self.runs(&point.block), point.offset);
        runs.push(Run::text(text, attrs));
        runs.extend(right);
        self.set_runs(&point.block, runs);
        BlockPoint::new(point.block.clone(), point.offset + text.chars().count())
    }

    /// Formatting that text typed at `point` picks up.
    pub(crate) fn attrs_at(&self, point: &BlockPoint) -> InlineAttrs {
        crate::dom::runs::attrs_at(&self.runs(&point.block), point.offset)
    }
}

fn locate(el: &ElementNode, handle: &DomHandle, offset: usize) -> Position {
    let mut remaining = offset;
    for (i, child) in el.children().iter().enumerate() {
        let child_handle = handle.child_handle(i);
        match child {
            DomNode::Text(t) => {
                let len = t.len();
                if remaining <= len {
                    return Position::new(child_handle, remaining);
                }
                remaining -= len;
            }
            DomNode::Element(e) if e.is_void() || e.is_block() => {
                if remaining == 0 {
                    return Position::new(handle.clone(), i);
                }
                remaining -= 1;
            }
            DomNode::Element(e) => {
                let len = e.inline_len();
                if len > 0 && remaining <= len {
                    return locate(e, &child_handle, remaining);
                }
                remaining -= len.min(remaining);
            }
        }
    }
    Position::new(handle.clone(), el.children().len())
}

#[cfg(test)]
mod test {
    use super::*;

    fn h(path: &[usize]) -> DomHandle {
        DomHandle::from_raw(path.to_vec())
    }

    fn doc(html: &str) -> Document {
        Document::parse(html).unwrap()
    }

    #[test]
    fn text_positions_map_through_formatting() {
        let d = doc("<p>ab<strong>cd</strong>ef</p>");
        let point = d.block_point(&Position::new(h(&[0, 1, 0]), 1)).unwrap();
        assert_eq!(point, BlockPoint::new(h(&[0]), 3));
        assert_eq!(d.position_at(&point), Position::new(h(&[0, 1, 0]), 1));
    }

    #[test]
    fn boundaries_prefer_the_earlier_text_node() {
        let d = doc("<p>ab<strong>cd</strong></p>");
        assert_eq!(
            d.position_at(&BlockPoint::new(h(&[0]), 2)),
            Position::new(h(&[0, 0]), 2)
        );
    }

    #[test]
    fn positions_around_images() {
        let d = doc("<p>ab<img src=\"x\" />cd</p>");
        assert_eq!(
            d.position_at(&BlockPoint::new(h(&[0]), 3)),
            Position::new(h(&[0, 2]), 0)
        );
        assert_eq!(
            d.block_point(&Position::new(h(&[0]), 2)),
            Some(BlockPoint::new(h(&[0]), 3))
        );
    }

    #[test]
    fn out_of_range_positions_do_not_resolve() {
        let d = doc("<p>ab</p>");
        assert_eq!(d.block_point(&Position::new(h(&[0, 0]), 3)), None);
        assert_eq!(d.block_point(&Position::new(h(&[4, 0]), 0)), None);
    }

    #[test]
    fn root_positions_snap_to_blocks() {
        let d = doc("<p>ab</p><p>cd</p>");
        assert_eq!(
            d.block_point(&Position::new(DomHandle::root(), 1)),
            Some(BlockPoint::new(h(&[1]), 0))
        );
        assert_eq!(
            d.block_point(&Position::new(DomHandle::root(), 2)),
            Some(BlockPoint::new(h(&[1]), 2))
        );
    }

    #[test]
    fn deleting_inside_one_block() {
        let mut d = doc("<p>a<b>bcd</b>e</p>");
        d.delete_range(&BlockPoint::new(h(&[0]), 2), &BlockPoint::new(h(&[0]), 4));
        assert_eq!(d.to_html(), "<p>a<b>b</b>e</p>");
    }

    #[test]
    fn deleting_across_blocks_merges_them() {
        let mut d = doc("<p>abc</p><ul><li>de</li><li>fg</li></ul><p>hi</p>");
        let point = d.delete_range(&BlockPoint::new(h(&[0]), 1), &BlockPoint::new(h(&[2]), 1));
        assert_eq!(d.to_html(), "<p>ai</p>");
        assert_eq!(point, BlockPoint::new(h(&[0]), 1));
    }

    #[test]
    fn deleting_into_a_nested_list_keeps_the_nested_item() {
        let mut d = doc("<ul><li>ab<ul><li>xy</li></ul>cd</li></ul>");
        let point = d.delete_range(
            &BlockPoint::new(h(&[0, 0]), 1),
            &BlockPoint::new(h(&[0, 0, 1, 0]), 1),
        );
        assert_eq!(d.to_html(), "<ul><li>a<ul><li>y</li></ul>cd</li></ul>");
        assert_eq!(point, BlockPoint::new(h(&[0, 0]), 1));
    }

    #[test]
    fn deleting_into_a_later_nested_item_merges_inside_the_list() {
        let mut d = doc("<ul><li>ab<ul><li>xy</li><li>zw</li></ul></li></ul>");
        d.delete_range(
            &BlockPoint::new(h(&[0, 0]), 1),
            &BlockPoint::new(h(&[0, 0, 1, 1]), 1),
        );
        assert_eq!(d.to_html(), "<ul><li>a<ul><li>w</li></ul></li></ul>");
    }

    #[test]
    fn splitting_a_nested_block_splits_its_ancestors() {
        let mut d = doc("<blockquote><p>abcd</p></blockquote>");
        let index = d.split_block_at(&BlockPoint::new(h(&[0, 0]), 2), &DomHandle::root());
        assert_eq!(index, Some(1));
        assert_eq!(
            d.to_html(),
            "<blockquote><p>ab</p></blockquote><blockquote><p>cd</p></blockquote>"
        );
    }

    #[test]
    fn flat_offsets_survive_retagging() {
        let d = doc("<p>ab</p><p>cd</p>");
        let flat = d.flat_offset(&BlockPoint::new(h(&[1]), 1));
        assert_eq!(flat, 4);
        let d = doc("<h1>ab</h1><blockquote>cd</blockquote>");
        assert_eq!(d.point_at_flat(flat), BlockPoint::new(h(&[1]), 1));
    }

    #[test]
    fn wrapping_inline_children_keeps_the_caret() {
        let mut d = doc("<ul><li>ab<ul><li>x</li></ul>cd</li></ul>");
        let point = d.wrap_inline_children(&h(&[0, 0]), 4).unwrap();
        assert_eq!(
            d.to_html(),
            "<ul><li><p>ab</p><ul><li>x</li></ul><p>cd</p></li></ul>"
        );
        assert_eq!(point, BlockPoint::new(h(&[0, 0, 2]), 1));
    }

    #[test]
    fn inserting_a_block_splits_the_paragraph() {
        let mut d = doc("<p>Hello world</p>");
        let after = d.insert_block_at(&BlockPoint::new(h(&[0]), 5), ElementNode::new("hr"));
        assert_eq!(d.to_html(), "<p>Hello</p><hr /><p> world</p>");
        assert_eq!(after, Some(BlockPoint::new(h(&[2]), 0)));
    }

    #[test]
    fn inserting_a_block_at_the_end_adds_a_paragraph() {
        let mut d = doc("<p>Hello</p>");
        let after = d.insert_block_at(&BlockPoint::new(h(&[0]), 5), ElementNode::new("hr"));
        assert_eq!(d.to_html(), "<p>Hello</p><hr /><p></p>");
        assert_eq!(after, Some(BlockPoint::new(h(&[2]), 0)));
    }
}
