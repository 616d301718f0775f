// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use speculoos::prelude::*;

use crate::tests::testutils_editor::{cm, tx};
use crate::{
    Command, FormatCommandError, FormatType, InlineFormatType, NativeFormatCommand,
    PlatformEditing, Selection,
};

/// Bolds every "ab" it is given, like a browser would for that selection.
struct BoldingPlatform;

impl PlatformEditing for BoldingPlatform {
    fn exec_command(
        &mut self,
        command: InlineFormatType,
        html: &str,
        _selection: &Selection,
    ) -> Result<String, FormatCommandError> {
        match command {
            InlineFormatType::Bold => Ok(html.replace("ab", "<b>ab</b>")),
            other => Err(FormatCommandError::Unsupported(other)),
        }
    }

    fn query_command_state(
        &self,
        _command: InlineFormatType,
        _html: &str,
        _selection: &Selection,
    ) -> Option<bool> {
        None
    }
}

/// Returns markup that loses the user's text.
struct LossyPlatform;

impl PlatformEditing for LossyPlatform {
    fn exec_command(
        &mut self,
        _command: InlineFormatType,
        _html: &str,
        _selection: &Selection,
    ) -> Result<String, FormatCommandError> {
        Ok("<p></p>".to_owned())
    }

    fn query_command_state(
        &self,
        command: InlineFormatType,
        _html: &str,
        _selection: &Selection,
    ) -> Option<bool> {
        Some(command == InlineFormatType::Underline)
    }
}

#[test]
fn native_result_is_used_when_it_keeps_the_text() {
    let mut model = cm("<p>{ab}|c</p>")
        .with_format_command(Box::new(NativeFormatCommand::new(BoldingPlatform)));
    model.dispatch(Command::ToggleInlineFormat(InlineFormatType::Bold));
    assert_that!(model.get_content()).is_equal_to("<p><b>ab</b>c</p>".to_owned());
    assert_that!(model.format_state().contains(FormatType::Bold)).is_true();
}

#[test]
fn unsupported_native_formats_fall_back_to_manual() {
    let mut model = cm("<p>{ab}|c</p>")
        .with_format_command(Box::new(NativeFormatCommand::new(BoldingPlatform)));
    model.dispatch(Command::ToggleInlineFormat(InlineFormatType::Italic));
    assert_that!(tx(&model)).is_equal_to("<p><em>{ab}|</em>c</p>".to_owned());
}

#[test]
fn native_results_that_lose_text_are_rejected() {
    let mut model = cm("<p>{ab}|c</p>")
        .with_format_command(Box::new(NativeFormatCommand::new(LossyPlatform)));
    model.dispatch(Command::ToggleInlineFormat(InlineFormatType::StrikeThrough));
    assert_that!(model.get_content()).is_equal_to("<p><del>ab</del>c</p>".to_owned());
}

#[test]
fn platform_state_answers_are_preferred() {
    let model = cm("<p>a|b</p>").with_format_command(Box::new(NativeFormatCommand::new(LossyPlatform)));
    assert_that!(model.format_state().contains(FormatType::Underline)).is_true();
}
