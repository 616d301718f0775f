// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use unicode_segmentation::UnicodeSegmentation;

use crate::EditorController;

/// Word and character counts shown in the editor footer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EditorStats {
    pub words: usize,
    /// Extended grapheme clusters, so an emoji counts once.
    pub chars: usize,
}

impl EditorStats {
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        Self {
            words: trimmed.split_whitespace().count(),
            chars: trimmed.graphemes(true).count(),
        }
    }
}

impl EditorController {
    pub fn get_stats(&self) -> EditorStats {
        if self.showing_placeholder {
            EditorStats::default()
        } else {
            EditorStats::from_text(&self.document.plain_text())
        }
    }
}

#[cfg(test)]
mod test {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn empty_text_has_no_words() {
        assert_that!(EditorStats::from_text("  \n ")).is_equal_to(EditorStats::default());
    }

    #[test]
    fn words_are_split_on_any_whitespace() {
        let stats = EditorStats::from_text("one two\nthree\tfour");
        assert_that!(stats.words).is_equal_to(4);
    }

    #[test]
    fn chars_count_graphemes_of_the_trimmed_text() {
        assert_that!(EditorStats::from_text(" ab ").chars).is_equal_to(2);
        assert_that!(EditorStats::from_text("e\u{301}👍🏽").chars).is_equal_to(2);
    }

    #[test]
    fn blocks_are_separate_words() {
        let model = EditorController::mount("<p>Hello</p><p>world</p>");
        assert_that!(model.get_stats().words).is_equal_to(2);
        assert_that!(model.get_stats().chars).is_equal_to(11);
    }

    #[test]
    fn placeholder_counts_nothing() {
        let model = EditorController::mount("");
        assert_that!(model.get_stats()).is_equal_to(EditorStats::default());
    }
}
