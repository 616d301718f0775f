// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use richtext::{
    BlockFormat, BlockPoint, Command, ContentUpdate, DomHandle, EditorConfig,
    EditorController, FormatType, ImageDescriptor, InlineFormatType, ManualClock,
    Selection,
};

fn select(model: &mut EditorController, block: &[usize], from: usize, to: usize) {
    let handle = DomHandle::from_raw(block.to_vec());
    let selection = model.document().selection_between(
        &BlockPoint::new(handle.clone(), from),
        &BlockPoint::new(handle, to),
    );
    model.select(selection);
}

#[test]
fn can_mount_an_editor_and_format_text() {
    let mut model = EditorController::mount("<p>foo</p>");
    select(&mut model, &[0], 1, 2);

    let update = model.dispatch(Command::ToggleInlineFormat(InlineFormatType::Bold));

    if let ContentUpdate::ReplaceAll { html, selection } = update.content_update {
        assert_eq!(html, "<p>f<strong>o</strong>o</p>");
        assert!(!selection.is_collapsed());
    } else {
        panic!("Expected to receive a ReplaceAll response");
    }
    assert!(update.format_state.contains(FormatType::Bold));
}

#[test]
fn typing_then_undo_with_a_host_clock() {
    let clock = ManualClock::new();
    let mut model = EditorController::mount("").with_clock(Box::new(clock.clone()));
    assert_eq!(model.get_content(), "");

    model.replace_text("Hello");
    clock.advance(Duration::from_secs(2));
    model.tick();
    model.replace_text(" world");
    assert_eq!(model.get_content(), "<p>Hello world</p>");
    assert_eq!(model.get_stats().words, 2);

    model.dispatch(Command::Undo);
    assert_eq!(model.get_content(), "<p>Hello</p>");
    model.dispatch(Command::Redo);
    assert_eq!(model.get_content(), "<p>Hello world</p>");
}

#[test]
fn table_scenario_through_the_public_api() {
    let mut model = EditorController::mount("<p>Hello world</p>");
    select(&mut model, &[0], 5, 5);
    let entries = model.history().len();

    model.dispatch(Command::InsertTable { rows: 2, cols: 2 });

    let content = model.get_content();
    assert!(content.starts_with("<p>Hello</p><table"));
    assert!(content.contains("Header 1"));
    assert!(content.contains("Header 2"));
    assert!(content.contains("Cell 1,1"));
    assert!(content.contains("Cell 1,2"));
    assert!(!content.contains("Cell 2,"));
    assert_eq!(model.history().len(), entries + 1);
}

#[test]
fn images_use_the_configured_asset_server() {
    let config = EditorConfig::default().with_asset_base_url("https://cdn.example.com");
    let mut model = EditorController::mount_with_config("<p>a</p>", config);
    select(&mut model, &[0], 1, 1);
    model.dispatch(Command::InsertImage(ImageDescriptor::new("/img/1.png")));
    assert!(model
        .get_content()
        .contains(r#"<img src="https://cdn.example.com/img/1.png" alt="Uploaded image""#));
}

#[test]
fn block_formats_show_in_the_format_state() {
    let mut model = EditorController::mount("<p>quote me</p>");
    select(&mut model, &[0], 0, 0);
    let update = model.dispatch(Command::ToggleBlockFormat(BlockFormat::Quote));
    assert_eq!(model.get_content(), "<blockquote>quote me</blockquote>");
    assert_eq!(update.format_state.identifiers(), vec!["blockquote".to_owned()]);
}

#[test]
fn invalid_selections_leave_the_document_alone() {
    let mut model = EditorController::mount("<p>abc</p>");
    model.select(Selection::from_paths(vec![3, 0], 0, vec![3, 0], 1));
    let update = model.dispatch(Command::ToggleBlockFormat(BlockFormat::CodeBlock));
    assert_eq!(update.content_update, ContentUpdate::Keep);
    assert_eq!(model.get_content(), "<p>abc</p>");
}
