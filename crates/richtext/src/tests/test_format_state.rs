// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use speculoos::prelude::*;

use crate::tests::testutils_editor::cm;
use crate::FormatType;

fn identifiers(html: &str) -> Vec<String> {
    cm(html).format_state().identifiers()
}

#[test]
fn plain_text_has_no_formats() {
    assert_that!(identifiers("<p>ab|c</p>")).is_empty();
}

#[test]
fn caret_reads_the_run_before_it() {
    assert_that!(identifiers("<p><strong>ab|</strong>c</p>")).is_equal_to(vec!["bold".to_owned()]);
    assert_that!(identifiers("<p><strong>ab</strong>|c</p>")).is_equal_to(vec!["bold".to_owned()]);
}

#[test]
fn caret_at_block_start_reads_the_run_after_it() {
    assert_that!(identifiers("<p><em>|ab</em></p>")).is_equal_to(vec!["italic".to_owned()]);
}

#[test]
fn range_needs_every_run_formatted() {
    assert_that!(identifiers("<p>{a<u>b}|</u></p>")).is_empty();
    assert_that!(identifiers("<p><u>{ab}|</u></p>")).is_equal_to(vec!["underline".to_owned()]);
}

#[test]
fn nested_blocks_report_each_kind() {
    let model = cm("<blockquote><ul><li><del>a|</del></li></ul></blockquote>");
    let state = model.format_state();
    assert_that!(state.contains(FormatType::StrikeThrough)).is_true();
    assert_that!(state.contains(FormatType::BulletList)).is_true();
    assert_that!(state.contains(FormatType::Blockquote)).is_true();
    assert_that!(state.contains(FormatType::NumberedList)).is_false();
}

#[test]
fn the_nearest_list_wins() {
    let model = cm("<ol><li>a<ul><li>b|</li></ul></li></ol>");
    assert_that!(model.format_state().contains(FormatType::BulletList)).is_true();
    assert_that!(model.format_state().contains(FormatType::NumberedList)).is_false();
}

#[test]
fn alignment_comes_from_the_nearest_explicit_style() {
    let model = cm(r#"<div style="text-align: right;"><p style="text-align: center;">a|</p></div>"#);
    assert_that!(model.format_state().contains(FormatType::AlignCenter)).is_true();
    assert_that!(model.format_state().contains(FormatType::AlignRight)).is_false();
}

#[test]
fn identifiers_use_toolbar_names() {
    assert_that!(identifiers("<h3><sup>x|</sup></h3>"))
        .is_equal_to(vec!["super".to_owned(), "heading-3".to_owned()]);
}
