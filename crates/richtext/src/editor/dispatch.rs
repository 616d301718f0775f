// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use tracing::debug;

use crate::command::BlockFormat;
use crate::{Command, EditorController, EditorUpdate, KeyCombo};

impl EditorController {
    /// Apply one command. Toolbar buttons and keyboard shortcuts both end
    /// up here.
    pub fn dispatch(&mut self, command: Command) -> EditorUpdate {
        self.history.poll();
        debug!(?command, "dispatch");

        match command {
            Command::Undo => return self.undo(),
            Command::Redo => return self.redo(),
            _ => {}
        }

        self.edit_past_placeholder(|model| model.apply(command))
    }

    fn apply(&mut self, command: Command) -> EditorUpdate {
        if !self.document.resolves(&self.selection) {
            debug!(selection = ?self.selection, "selection does not resolve, ignoring");
            return self.create_update_keep();
        }

        match command {
            Command::ToggleInlineFormat(format) => self.toggle_inline_format(format),
            Command::ToggleBlockFormat(format) => match format {
                BlockFormat::Quote | BlockFormat::CodeBlock => {
                    self.toggle_block_wrapper(format.tag())
                }
                BlockFormat::BulletList | BlockFormat::NumberedList => {
                    self.toggle_list(format.tag())
                }
            },
            Command::SetFontSize(size) => self.set_inline_style("font-size", size.css_value()),
            Command::SetColor { target, color } => self.set_color(target, &color),
            Command::Align(alignment) => self.align(alignment),
            Command::InsertImage(image) => self.insert_image(image),
            Command::InsertTable { rows, cols } => self.insert_table(rows, cols),
            Command::ClearFormat => self.clear_format(),
            Command::SetHeading(level) => self.set_heading(level),
            Command::CreateLink(url) => self.create_link(&url),
            Command::Undo | Command::Redo => self.create_update_keep(),
        }
    }

    /// Run the command bound to a keyboard shortcut, if there is one.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> Option<EditorUpdate> {
        Command::from_shortcut(combo).map(|command| self.dispatch(command))
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use crate::tests::testutils_editor::{cm, tx};
    use crate::{
        Command, ContentUpdate, DomHandle, InlineFormatType, KeyCombo, Position, Selection,
        ToolbarButton,
    };

    #[test]
    fn commands_on_a_stale_selection_are_ignored() {
        let mut model = cm("<p>abc|</p>");
        model.select(Selection::caret(Position::new(
            DomHandle::from_raw(vec![4, 2]),
            0,
        )));
        let update = model.dispatch(Command::ToggleInlineFormat(InlineFormatType::Bold));
        assert_that!(update.content_update).is_equal_to(ContentUpdate::Keep);
        assert_that!(model.get_content()).is_equal_to("<p>abc</p>".to_owned());
    }

    #[test]
    fn shortcut_and_button_give_the_same_document() {
        let mut by_key = cm("<p>{abc}|</p>");
        let mut by_button = cm("<p>{abc}|</p>");
        by_key.handle_key(&KeyCombo::primary("b"));
        by_button.dispatch(ToolbarButton::Bold.command());
        assert_that!(tx(&by_key)).is_equal_to(tx(&by_button));
        assert_that!(tx(&by_key)).is_equal_to("<p><strong>{abc}|</strong></p>".to_owned());
    }

    #[test]
    fn keys_without_a_binding_do_nothing() {
        let mut model = cm("<p>a|</p>");
        let mut combo = KeyCombo::primary("b");
        combo.ctrl = false;
        assert_that!(model.handle_key(&combo)).is_none();
    }
}
