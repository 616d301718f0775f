// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::block_ops::BlockTarget;
use crate::editor::Record;
use crate::{Alignment, EditorController, EditorUpdate};

impl EditorController {
    /// Toggle a quote or code block around the block holding the selection.
    ///
    /// When the selection spans several top-level blocks only the selected
    /// content is moved into the new wrapper.
    pub(crate) fn toggle_block_wrapper(&mut self, tag: &str) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let saved = self.save_selection();
        let common = self
            .selection
            .anchor
            .path
            .common_ancestor(&self.selection.focus.path);

        match self.document.find_block_target(&common) {
            BlockTarget::Block(block) => {
                let same = self.document.element(&block).is_some_and(|e| e.tag() == tag);
                if same {
                    self.document.unwrap_block(&block);
                } else {
                    self.document.wrap_in_block(&block, tag);
                }
            }
            BlockTarget::InsideContainer(container) => {
                self.document.wrap_children_in(&container, tag);
            }
            BlockTarget::None => {
                let Some((first, last)) = self.document.wrap_range_in_block(&start, &end, tag)
                else {
                    return self.create_update_keep();
                };
                self.selection = self.document.selection_between(&first, &last);
                return self.commit(Record::Coalesced);
            }
        }
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }

    pub(crate) fn toggle_list(&mut self, list_tag: &str) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let saved = self.save_selection();
        let blocks = self.document.blocks_in_range(&start, &end);
        self.document.toggle_list(&blocks, list_tag);
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }

    pub(crate) fn align(&mut self, alignment: Alignment) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        for block in self.document.blocks_in_range(&start, &end) {
            if !block.is_root() {
                self.document
                    .restyle_node(&block, "text-align", Some(alignment.as_ref()));
            }
        }
        self.commit(Record::Coalesced)
    }

    pub(crate) fn set_heading(&mut self, level: Option<u8>) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let saved = self.save_selection();
        let blocks = self.document.blocks_in_range(&start, &end);
        self.document.set_heading(&blocks, level);
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }
}
