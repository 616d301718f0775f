// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Typing, as forwarded by the host: text, backspace, delete and enter.

use crate::dom::nodes::DomNode;
use crate::dom::runs::InlineAttrs;
use crate::dom::BlockPoint;
use crate::editor::Record;
use crate::{EditorController, EditorUpdate};

impl EditorController {
    /// Replace the selection with `text`. Newlines split the block.
    pub fn replace_text(&mut self, text: &str) -> EditorUpdate {
        self.history.poll();
        self.edit_past_placeholder(|model| model.insert_text(text))
    }

    pub fn backspace(&mut self) -> EditorUpdate {
        self.history.poll();
        self.edit_past_placeholder(Self::delete_backward)
    }

    pub fn delete(&mut self) -> EditorUpdate {
        self.history.poll();
        self.edit_past_placeholder(Self::delete_forward)
    }

    /// Split the block at the caret. List items split into two items.
    pub fn enter(&mut self) -> EditorUpdate {
        self.history.poll();
        self.edit_past_placeholder(Self::split_at_caret)
    }

    fn insert_text(&mut self, text: &str) -> EditorUpdate {
        let Some(mut point) = self.collapse_selection() else {
            return self.create_update_keep();
        };
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                match self.split_for_enter(&point) {
                    Some(next) => point = next,
                    None => break,
                }
            }
            if !line.is_empty() {
                let attrs = self.typing_attrs(&point);
                point = self.document.insert_text_at(&point, line, attrs);
            }
        }
        self.set_caret(&point);
        self.commit(Record::Coalesced)
    }

    fn delete_backward(&mut self) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let point = if start != end {
            self.document.delete_range(&start, &end)
        } else if start.offset > 0 {
            let from = BlockPoint::new(start.block.clone(), start.offset - 1);
            self.document.delete_range(&from, &start)
        } else {
            let blocks = self.document.text_blocks();
            let Some(prev) = blocks.iter().take_while(|b| **b < start.block).last() else {
                return self.create_update_keep();
            };
            if prev.is_ancestor_of(&start.block) {
                return self.create_update_keep();
            }
            let prev_end = BlockPoint::new(prev.clone(), self.document.block_len(prev));
            self.document.delete_range(&prev_end, &start)
        };
        self.set_caret(&point);
        self.commit(Record::Coalesced)
    }

    fn delete_forward(&mut self) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let point = if start != end {
            self.document.delete_range(&start, &end)
        } else if start.offset < self.document.block_len(&start.block) {
            let to = BlockPoint::new(start.block.clone(), start.offset + 1);
            self.document.delete_range(&start, &to)
        } else {
            let blocks = self.document.text_blocks();
            let Some(next) = blocks.into_iter().find(|b| *b > start.block) else {
                return self.create_update_keep();
            };
            if start.block.is_ancestor_of(&next) {
                return self.create_update_keep();
            }
            self.document
                .delete_range(&start, &BlockPoint::new(next, 0))
        };
        self.set_caret(&point);
        self.commit(Record::Coalesced)
    }

    fn split_at_caret(&mut self) -> EditorUpdate {
        let Some(point) = self.collapse_selection() else {
            return self.create_update_keep();
        };
        let Some(next) = self.split_for_enter(&point) else {
            return self.create_update_keep();
        };
        self.set_caret(&next);
        self.commit(Record::Coalesced)
    }

    /// Delete any selected content and return the caret point.
    fn collapse_selection(&mut self) -> Option<BlockPoint> {
        let (start, end) = self.document.range_points(&self.selection)?;
        if start == end {
            Some(start)
        } else {
            Some(self.document.delete_range(&start, &end))
        }
    }

    fn split_for_enter(&mut self, point: &BlockPoint) -> Option<BlockPoint> {
        if self.document.element(&point.block)?.tag() == "pre" {
            let attrs = self.typing_attrs(point);
            return Some(self.document.insert_text_at(point, "\n", attrs));
        }
        let (point, stop) = self.document.split_target(point, true)?;
        let index = self.document.split_block_at(&point, &stop)?;
        let right = stop.child_handle(index);
        // A new line after a heading is a paragraph
        let plain_after_heading = self
            .document
            .element(&right)
            .is_some_and(|e| e.heading_level().is_some() && e.is_blank());
        if plain_after_heading {
            self.document
                .replace_node(&right, vec![DomNode::new_element("p", Vec::new())]);
        }
        self.document
            .text_blocks()
            .into_iter()
            .find(|b| *b == right || right.is_ancestor_of(b))
            .map(|b| BlockPoint::new(b, 0))
    }

    /// Formatting for text typed at `point`, including pending caret
    /// formats, which are used up.
    pub(crate) fn typing_attrs(&mut self, point: &BlockPoint) -> InlineAttrs {
        let mut attrs = self.document.attrs_at(point);
        for format in std::mem::take(&mut self.pending_formats) {
            let on = !attrs.has_format(format);
            attrs.set_format(format, on);
        }
        attrs
    }
}
