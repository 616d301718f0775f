// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tracing::warn;

use crate::command::is_valid_color;
use crate::dom::nodes::ElementNode;
use crate::editor::Record;
use crate::{ColorTarget, EditorController, EditorUpdate, InlineFormatType};

impl EditorController {
    pub(crate) fn toggle_inline_format(&mut self, format: InlineFormatType) -> EditorUpdate {
        if self.selection.is_collapsed() {
            self.toggle_pending_format(format);
            self.refresh_format_state();
            return self.create_update_select();
        }

        let saved = self.save_selection();
        let selection = self.selection.clone();
        if let Err(e) = self
            .format_command
            .toggle(&mut self.document, &selection, format)
        {
            warn!(%e, ?format, "could not toggle format");
            return self.create_update_keep();
        }
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }

    /// Flip a caret format so that the next typed text gets (or loses) it.
    fn toggle_pending_format(&mut self, format: InlineFormatType) {
        self.flip_pending(format);
        if self.is_format_active(format) {
            if let Some(other) = format.exclusive_with() {
                if self.is_format_active(other) {
                    self.flip_pending(other);
                }
            }
        }
    }

    fn flip_pending(&mut self, format: InlineFormatType) {
        if !self.pending_formats.remove(&format) {
            self.pending_formats.insert(format);
        }
    }

    fn is_format_active(&self, format: InlineFormatType) -> bool {
        self.format_command
            .query_state(&self.document, &self.selection, format)
            ^ self.pending_formats.contains(&format)
    }

    /// Set a CSS property on the selected inline content. A caret is left
    /// alone.
    pub(crate) fn set_inline_style(&mut self, property: &str, value: &str) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        if start == end {
            return self.create_update_keep();
        }
        let saved = self.save_selection();
        self.document
            .map_inline(&start, &end, |attrs| attrs.style.set(property, value));
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }

    pub(crate) fn set_color(&mut self, target: ColorTarget, color: &str) -> EditorUpdate {
        let color = color.trim();
        if !is_valid_color(color) {
            warn!(color, "ignoring invalid color");
            return self.create_update_keep();
        }
        self.set_inline_style(target.css_property(), color)
    }

    /// Strip formatting from the selection. At a caret this only drops the
    /// pending formats.
    pub(crate) fn clear_format(&mut self) -> EditorUpdate {
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        if start == end {
            self.pending_formats.clear();
            self.refresh_format_state();
            return self.create_update_select();
        }
        let saved = self.save_selection();
        self.document.remove_formatting(&start, &end);
        self.restore_selection(saved);
        self.commit(Record::Coalesced)
    }

    /// Link the selected text to `url`, or insert `url` as linked text at
    /// a caret.
    pub(crate) fn create_link(&mut self, url: &str) -> EditorUpdate {
        let url = url.trim();
        if url.is_empty() {
            return self.create_update_keep();
        }
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let link = ElementNode::new("a").with_attr("href", url);

        if start == end {
            let mut attrs = self.typing_attrs(&start);
            attrs.link = Some(link);
            let after = self.document.insert_text_at(&start, url, attrs);
            self.set_caret(&after);
        } else {
            let saved = self.save_selection();
            self.document
                .map_inline(&start, &end, |attrs| attrs.link = Some(link.clone()));
            self.restore_selection(saved);
        }
        self.commit(Record::Coalesced)
    }
}
