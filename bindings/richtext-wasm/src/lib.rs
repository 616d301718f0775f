// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Browser bindings for the editing core. The host page owns the
//! contenteditable element and mirrors the updates returned here.

use std::str::FromStr;

use wasm_bindgen::prelude::*;

use richtext::{
    ColorTarget, Command, ContentUpdate, EditorConfig, EditorController, FontSize,
    ImageDescriptor, KeyCombo, Selection, ToolbarButton,
};

#[wasm_bindgen]
pub fn mount(initial_content: &str, asset_base_url: Option<String>) -> RichTextEditor {
    console_error_panic_hook::set_once();
    let config = EditorConfig {
        asset_base_url,
        ..Default::default()
    };
    RichTextEditor {
        inner: EditorController::mount_with_config(initial_content, config),
    }
}

#[wasm_bindgen]
pub struct RichTextEditor {
    inner: EditorController,
}

#[wasm_bindgen]
impl RichTextEditor {
    pub fn get_content(&self) -> String {
        self.inner.get_content()
    }

    pub fn get_rendered_html(&self) -> String {
        self.inner.get_rendered_html()
    }

    pub fn set_content(&mut self, html: &str) -> EditorUpdate {
        self.inner.set_content(html).into()
    }

    /// `callback` receives the serialized content after every change.
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.inner.on_change(move |html| {
            // Exceptions thrown by the host callback are ignored
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(html));
        });
    }

    pub fn select(
        &mut self,
        anchor_path: Vec<u32>,
        anchor_offset: u32,
        focus_path: Vec<u32>,
        focus_offset: u32,
    ) -> EditorUpdate {
        let selection = Selection::from_paths(
            to_usizes(&anchor_path),
            anchor_offset as usize,
            to_usizes(&focus_path),
            focus_offset as usize,
        );
        self.inner.select(selection).into()
    }

    /// Run a toolbar button such as `bold`, `bullet-list` or `undo`.
    pub fn toolbar(&mut self, button: &str) -> Result<EditorUpdate, JsError> {
        let button = ToolbarButton::from_str(button)
            .map_err(|_| JsError::new(&format!("unknown toolbar button: {button}")))?;
        Ok(self.inner.dispatch(button.command()).into())
    }

    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        meta: bool,
        shift: bool,
        alt: bool,
    ) -> Option<EditorUpdate> {
        let combo = KeyCombo {
            key: key.to_owned(),
            ctrl,
            meta,
            shift,
            alt,
        };
        self.inner.handle_key(&combo).map(EditorUpdate::from)
    }

    pub fn set_font_size(&mut self, size: i32) -> EditorUpdate {
        let size = FontSize::new(i64::from(size));
        self.inner.dispatch(Command::SetFontSize(size)).into()
    }

    pub fn set_color(&mut self, color: String, highlight: bool) -> EditorUpdate {
        let target = if highlight {
            ColorTarget::Highlight
        } else {
            ColorTarget::Text
        };
        self.inner.dispatch(Command::SetColor { target, color }).into()
    }

    pub fn set_heading(&mut self, level: Option<u8>) -> EditorUpdate {
        self.inner.dispatch(Command::SetHeading(level)).into()
    }

    pub fn create_link(&mut self, url: String) -> EditorUpdate {
        self.inner.dispatch(Command::CreateLink(url)).into()
    }

    pub fn insert_image(&mut self, url: String, alt_text: Option<String>) -> EditorUpdate {
        let image = ImageDescriptor { url, alt_text };
        self.inner.dispatch(Command::InsertImage(image)).into()
    }

    pub fn insert_table(&mut self, rows: i32, cols: i32) -> EditorUpdate {
        let command = Command::InsertTable {
            rows: i64::from(rows),
            cols: i64::from(cols),
        };
        self.inner.dispatch(command).into()
    }

    pub fn replace_text(&mut self, text: &str) -> EditorUpdate {
        self.inner.replace_text(text).into()
    }

    pub fn backspace(&mut self) -> EditorUpdate {
        self.inner.backspace().into()
    }

    pub fn delete(&mut self) -> EditorUpdate {
        self.inner.delete().into()
    }

    pub fn enter(&mut self) -> EditorUpdate {
        self.inner.enter().into()
    }

    /// Call from a timer so that a pause in typing becomes an undo step.
    pub fn tick(&mut self) -> bool {
        self.inner.tick()
    }

    pub fn to_tree(&self) -> String {
        self.inner.to_tree()
    }
}

#[wasm_bindgen]
pub struct EditorUpdate {
    inner: richtext::EditorUpdate,
}

impl From<richtext::EditorUpdate> for EditorUpdate {
    fn from(inner: richtext::EditorUpdate) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen]
impl EditorUpdate {
    /// The new markup, when the content has to be replaced.
    pub fn html(&self) -> Option<String> {
        match &self.inner.content_update {
            ContentUpdate::ReplaceAll { html, .. } => Some(html.clone()),
            _ => None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn anchor_path(&self) -> Vec<u32> {
        self.selection()
            .map(|s| to_u32s(s.anchor.path.raw()))
            .unwrap_or_default()
    }

    pub fn anchor_offset(&self) -> u32 {
        self.selection().map_or(0, |s| to_u32(s.anchor.offset))
    }

    pub fn focus_path(&self) -> Vec<u32> {
        self.selection()
            .map(|s| to_u32s(s.focus.path.raw()))
            .unwrap_or_default()
    }

    pub fn focus_offset(&self) -> u32 {
        self.selection().map_or(0, |s| to_u32(s.focus.offset))
    }

    pub fn format_state(&self) -> js_sys::Array {
        self.inner
            .format_state
            .identifiers()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    pub fn words(&self) -> u32 {
        to_u32(self.inner.stats.words)
    }

    pub fn chars(&self) -> u32 {
        to_u32(self.inner.stats.chars)
    }
}

impl EditorUpdate {
    fn selection(&self) -> Option<&Selection> {
        match &self.inner.content_update {
            ContentUpdate::ReplaceAll { selection, .. } | ContentUpdate::Select(selection) => {
                Some(selection)
            }
            ContentUpdate::Keep => None,
        }
    }
}

fn to_usizes(values: &[u32]) -> Vec<usize> {
    values.iter().map(|v| *v as usize).collect()
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_u32s(values: &[usize]) -> Vec<u32> {
    values.iter().map(|v| to_u32(*v)).collect()
}
