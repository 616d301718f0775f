// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Inline format toggling behind an interface, so a host can hand the
//! work to a native editing primitive and still get the built-in
//! behaviour when that primitive is missing or fails.

use tracing::warn;

use crate::dom::Document;
use crate::{FormatCommandError, InlineFormatType, Selection};

pub trait FormatCommand {
    /// Toggle `format` over a non-collapsed selection.
    fn toggle(
        &mut self,
        document: &mut Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> Result<(), FormatCommandError>;

    /// Whether `format` is active for the selection. A range is active
    /// when every text run in it carries the format. A caret reads the
    /// run before it, or the run after it at the start of a block.
    fn query_state(
        &self,
        document: &Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> bool;
}

/// Toggles formats by rewriting the document's inline nodes.
#[derive(Clone, Debug, Default)]
pub struct ManualFormatCommand;

impl FormatCommand for ManualFormatCommand {
    fn toggle(
        &mut self,
        document: &mut Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> Result<(), FormatCommandError> {
        let Some((start, end)) = document.range_points(selection) else {
            return Ok(());
        };
        let active = self.query_state(document, selection, format);
        document.map_inline(&start, &end, |attrs| attrs.set_format(format, !active));
        Ok(())
    }

    fn query_state(
        &self,
        document: &Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> bool {
        let Some((start, end)) = document.range_points(selection) else {
            return false;
        };
        if start == end {
            return document.attrs_at(&start).has_format(format);
        }
        let attrs = document.inline_attrs_in(&start, &end);
        !attrs.is_empty() && attrs.iter().all(|a| a.has_format(format))
    }
}

/// A native editing primitive supplied by the host, such as a browser's
/// `execCommand`. It works on serialized markup.
pub trait PlatformEditing {
    /// Apply `command` and return the resulting markup.
    fn exec_command(
        &mut self,
        command: InlineFormatType,
        html: &str,
        selection: &Selection,
    ) -> Result<String, FormatCommandError>;

    /// The primitive's own answer, or None if it cannot tell.
    fn query_command_state(
        &self,
        command: InlineFormatType,
        html: &str,
        selection: &Selection,
    ) -> Option<bool>;
}

/// Delegates to a [PlatformEditing] and falls back to
/// [ManualFormatCommand] when it fails.
pub struct NativeFormatCommand<P: PlatformEditing> {
    platform: P,
    fallback: ManualFormatCommand,
}

impl<P: PlatformEditing> NativeFormatCommand<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            fallback: ManualFormatCommand,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    fn try_native(
        &mut self,
        document: &Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> Result<Document, FormatCommandError> {
        let html = self.platform.exec_command(format, &document.to_html(), selection)?;
        let updated = Document::parse(&html)?;
        if updated.plain_text() != document.plain_text() {
            return Err(FormatCommandError::Platform(
                "formatting changed the text".to_owned(),
            ));
        }
        Ok(updated)
    }
}

impl<P: PlatformEditing> FormatCommand for NativeFormatCommand<P> {
    fn toggle(
        &mut self,
        document: &mut Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> Result<(), FormatCommandError> {
        match self.try_native(document, selection, format) {
            Ok(updated) => {
                *document = updated;
                Ok(())
            }
            Err(e) => {
                warn!(%format, error = %e, "native formatting failed, using manual fallback");
                self.fallback.toggle(document, selection, format)
            }
        }
    }

    fn query_state(
        &self,
        document: &Document,
        selection: &Selection,
        format: InlineFormatType,
    ) -> bool {
        self.platform
            .query_command_state(format, &document.to_html(), selection)
            .unwrap_or_else(|| self.fallback.query_state(document, selection, format))
    }
}
