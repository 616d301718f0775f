// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::{EditorController, EditorUpdate};

impl EditorController {
    pub(crate) fn undo(&mut self) -> EditorUpdate {
        let saved = self.save_selection();
        match self.history.undo().map(str::to_owned) {
            Some(snapshot) => self.materialize(&snapshot, saved),
            None => self.create_update_keep(),
        }
    }

    pub(crate) fn redo(&mut self) -> EditorUpdate {
        let saved = self.save_selection();
        match self.history.redo().map(str::to_owned) {
            Some(snapshot) => self.materialize(&snapshot, saved),
            None => self.create_update_keep(),
        }
    }

    /// Load a history snapshot, keeping the caret near where it was.
    fn materialize(&mut self, snapshot: &str, saved: Option<(usize, usize)>) -> EditorUpdate {
        self.load(snapshot);
        self.pending_formats.clear();
        let caret = saved.map(|(_, focus)| self.document.point_at_flat(focus));
        match caret {
            Some(point) if !self.showing_placeholder => self.set_caret(&point),
            _ => self.set_caret(&self.document.end_point()),
        }
        self.refresh_format_state();
        let html = self.get_content();
        self.notify(&html);
        self.assert_invariants();
        self.create_update_replace_all()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use speculoos::prelude::*;

    use crate::tests::testutils_editor::{cm_with_clock, tx};
    use crate::{Command, ContentUpdate, ImageDescriptor, ManualClock};

    const WINDOW: Duration = Duration::from_millis(1000);

    #[test]
    fn undo_with_nothing_recorded_keeps_the_document() {
        let (mut model, _) = cm_with_clock("<p>a|</p>");
        let update = model.dispatch(Command::Undo);
        assert_that!(update.content_update).is_equal_to(ContentUpdate::Keep);
    }

    #[test]
    fn a_burst_of_typing_is_one_undo_step() {
        let (mut model, clock) = cm_with_clock("<p>|</p>");
        model.replace_text("a");
        clock.advance(Duration::from_millis(300));
        model.replace_text("b");
        clock.advance(Duration::from_millis(300));
        model.replace_text("c");
        clock.advance(WINDOW);
        assert_that!(model.tick()).is_true();
        assert_that!(model.history().len()).is_equal_to(2);

        model.dispatch(Command::Undo);
        assert_that!(model.get_content()).is_equal_to("<p></p>".to_owned());
    }

    #[test]
    fn pauses_split_typing_into_steps() {
        let (mut model, clock) = cm_with_clock("<p>|</p>");
        model.replace_text("a");
        clock.advance(WINDOW);
        model.replace_text("b");
        clock.advance(WINDOW);
        model.tick();

        model.dispatch(Command::Undo);
        assert_that!(model.get_content()).is_equal_to("<p>a</p>".to_owned());
        model.dispatch(Command::Undo);
        assert_that!(model.get_content()).is_equal_to("<p></p>".to_owned());
    }

    #[test]
    fn undo_commits_pending_changes_first() {
        let (mut model, _) = cm_with_clock("<p>|</p>");
        model.replace_text("a");
        assert_that!(model.history().is_pending()).is_true();
        model.dispatch(Command::Undo);
        assert_that!(model.get_content()).is_equal_to("<p></p>".to_owned());
        model.dispatch(Command::Redo);
        assert_that!(tx(&model)).is_equal_to("<p>|a</p>".to_owned());
    }

    #[test]
    fn undo_then_redo_for_every_step() {
        let (mut model, clock) = cm_with_clock("<p>|</p>");
        let mut states = vec![model.get_content()];
        for c in ["a", "b", "c", "d"] {
            model.replace_text(c);
            clock.advance(WINDOW);
            model.tick();
            states.push(model.get_content());
        }
        for expected in states.iter().rev().skip(1) {
            model.dispatch(Command::Undo);
            assert_that!(&model.get_content()).is_equal_to(expected);
        }
        for expected in states.iter().skip(1) {
            model.dispatch(Command::Redo);
            assert_that!(&model.get_content()).is_equal_to(expected);
        }
    }

    #[test]
    fn a_new_edit_discards_redo() {
        let (mut model, clock) = cm_with_clock("<p>|</p>");
        model.replace_text("a");
        clock.advance(WINDOW);
        model.dispatch(Command::Undo);
        model.replace_text("b");
        clock.advance(WINDOW);
        model.tick();
        assert_that!(model.history().can_redo()).is_false();
        let update = model.dispatch(Command::Redo);
        assert_that!(update.content_update).is_equal_to(ContentUpdate::Keep);
        assert_that!(model.get_content()).is_equal_to("<p>b</p>".to_owned());
    }

    #[test]
    fn insertions_are_recorded_straight_away() {
        let (mut model, _) = cm_with_clock("<p>a|</p>");
        model.replace_text("b");
        model.dispatch(Command::InsertImage(ImageDescriptor::new("https://x.io/i.png")));
        assert_that!(model.history().is_pending()).is_false();
        assert_that!(model.history().len()).is_equal_to(3);

        model.dispatch(Command::Undo);
        assert_that!(model.get_content()).is_equal_to("<p>ab</p>".to_owned());
    }

    #[test]
    fn undo_notifies_the_host() {
        let (mut model, _) = cm_with_clock("<p>|</p>");
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        model.on_change(move |html| sink.borrow_mut().push(html.to_owned()));
        model.replace_text("a");
        model.dispatch(Command::Undo);
        assert_that!(*seen.borrow()).is_equal_to(vec!["<p>a</p>".to_owned(), "<p></p>".to_owned()]);
    }

    #[test]
    fn history_is_capped() {
        let clock = ManualClock::new();
        let config = crate::EditorConfig {
            history_limit: 3,
            ..Default::default()
        };
        let mut model = crate::EditorController::mount_with_config("<p></p>", config)
            .with_clock(Box::new(clock.clone()));
        for c in ["a", "b", "c", "d"] {
            model.replace_text(c);
            clock.advance(WINDOW);
            model.tick();
        }
        assert_that!(model.history().len()).is_equal_to(3);
        model.dispatch(Command::Undo);
        model.dispatch(Command::Undo);
        assert_that!(model.history().can_undo()).is_false();
        assert_that!(model.get_content()).is_equal_to("<p>ab</p>".to_owned());
    }
}
