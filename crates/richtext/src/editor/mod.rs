// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod block_formats;
mod dispatch;
mod formatting;
mod insertion;
mod stats;
mod text_ops;
mod undo_redo;

use std::collections::BTreeSet;

use tracing::debug;

pub use stats::EditorStats;

use crate::dom::nodes::{DomNode, ElementNode, Style};
use crate::dom::{BlockPoint, Document};
use crate::format_command::{FormatCommand, ManualFormatCommand};
use crate::format_state::{self, FormatState, FormatType};
use crate::history::{Clock, History, SystemClock};
use crate::{DomHandle, EditorConfig, InlineFormatType, Position, Selection};

const PLACEHOLDER_STYLE: &str = "color: #999; font-style: italic;";

/// What the host has to do to its rendering after an editor call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentUpdate {
    /// Nothing changed.
    Keep,
    /// Replace the rendered content and selection.
    ReplaceAll { html: String, selection: Selection },
    /// Only the selection moved.
    Select(Selection),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorUpdate {
    pub content_update: ContentUpdate,
    pub format_state: FormatState,
    pub stats: EditorStats,
}

/// How a mutation is written to history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Record {
    Coalesced,
    Immediate,
}

/// Owns one document with its selection and history, and applies
/// [crate::Command]s to them.
pub struct EditorController {
    pub(crate) document: Document,
    pub(crate) selection: Selection,
    pub(crate) history: History,
    /// Inline formats toggled at a collapsed caret, applied to the next
    /// typed text.
    pub(crate) pending_formats: BTreeSet<InlineFormatType>,
    pub(crate) format_state: FormatState,
    pub(crate) showing_placeholder: bool,
    pub(crate) format_command: Box<dyn FormatCommand>,
    pub(crate) config: EditorConfig,
    on_change: Option<Box<dyn FnMut(&str)>>,
}

impl EditorController {
    /// Create an editor for `initial_content`. Empty content shows the
    /// placeholder.
    pub fn mount(initial_content: &str) -> Self {
        Self::mount_with_config(initial_content, EditorConfig::default())
    }

    pub fn mount_with_config(initial_content: &str, config: EditorConfig) -> Self {
        let history = History::new(
            config.history_limit,
            config.coalesce_window,
            Box::new(SystemClock),
        );
        let mut controller = Self {
            document: Document::new(),
            selection: Selection::caret(Position::new(DomHandle::root(), 0)),
            history,
            pending_formats: BTreeSet::new(),
            format_state: FormatState::default(),
            showing_placeholder: false,
            format_command: Box::new(ManualFormatCommand),
            config,
            on_change: None,
        };
        controller.load(initial_content);
        controller.selection = controller.document.caret_at(&controller.document.start_point());
        controller.history.reset(controller.get_content());
        controller.refresh_format_state();
        debug!(placeholder = controller.showing_placeholder, "editor mounted");
        controller
    }

    /// Use `clock` for history timing. History is reseeded.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.history.set_clock(clock);
        self.history.reset(self.get_content());
        self
    }

    pub fn with_format_command(mut self, format_command: Box<dyn FormatCommand>) -> Self {
        self.format_command = format_command;
        self.refresh_format_state();
        self
    }

    /// Register the callback told about every content change the editor
    /// makes.
    pub fn on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// The serialized document, or "" while the placeholder shows.
    pub fn get_content(&self) -> String {
        if self.showing_placeholder {
            String::new()
        } else {
            self.document.to_html()
        }
    }

    /// What the host should render, including the placeholder.
    pub fn get_rendered_html(&self) -> String {
        self.document.to_html()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn format_state(&self) -> &FormatState {
        &self.format_state
    }

    pub fn is_showing_placeholder(&self) -> bool {
        self.showing_placeholder
    }

    pub fn to_tree(&self) -> String {
        self.document.to_tree()
    }

    /// Move the selection. Pending caret formats are dropped.
    pub fn select(&mut self, selection: Selection) -> EditorUpdate {
        self.history.poll();
        self.selection = selection;
        self.pending_formats.clear();
        self.refresh_format_state();
        self.create_update_select()
    }

    /// Replace the whole content from outside, e.g. after loading a saved
    /// post. History starts again from the new content and the host is
    /// not notified.
    pub fn set_content(&mut self, html: &str) -> EditorUpdate {
        self.load(html);
        self.selection = self.document.caret_at(&self.document.end_point());
        self.pending_formats.clear();
        self.history.reset(self.get_content());
        self.refresh_format_state();
        self.create_update_replace_all()
    }

    /// Commit a coalesced history entry whose window has passed. Hosts
    /// call this from a timer; it also happens on every other call.
    pub fn tick(&mut self) -> bool {
        self.history.poll()
    }

    pub(crate) fn load(&mut self, html: &str) {
        if html.trim().is_empty() {
            self.document = self.placeholder_document();
            self.showing_placeholder = true;
        } else {
            self.document = Document::parse_lenient(html);
            self.showing_placeholder = false;
        }
    }

    fn placeholder_document(&self) -> Document {
        let paragraph = ElementNode::new("p")
            .with_style(Style::parse(PLACEHOLDER_STYLE))
            .with_children(vec![DomNode::new_text(self.config.placeholder.clone())]);
        Document::from_children(vec![DomNode::Element(paragraph)])
    }

    /// Run `edit` against an empty paragraph in place of the placeholder.
    /// If it ends without committing, the placeholder comes back so the
    /// content and its history entry stay "".
    pub(crate) fn edit_past_placeholder(
        &mut self,
        edit: impl FnOnce(&mut Self) -> EditorUpdate,
    ) -> EditorUpdate {
        if !self.showing_placeholder {
            return edit(self);
        }
        self.clear_placeholder();
        let update = edit(self);
        match update.content_update {
            ContentUpdate::ReplaceAll { .. } => update,
            ContentUpdate::Keep => {
                self.restore_placeholder();
                self.create_update_keep()
            }
            ContentUpdate::Select(_) => {
                self.restore_placeholder();
                self.create_update_select()
            }
        }
    }

    /// Swap the placeholder for an empty paragraph. Pending caret formats
    /// carry over, since the caret stays at the start of the document.
    fn clear_placeholder(&mut self) {
        if self.showing_placeholder {
            self.document = Document::new();
            self.showing_placeholder = false;
            self.selection = self.document.caret_at(&self.document.start_point());
        }
    }

    fn restore_placeholder(&mut self) {
        self.load("");
        self.selection = self.document.caret_at(&self.document.start_point());
        self.refresh_format_state();
    }

    pub(crate) fn refresh_format_state(&mut self) {
        self.format_state = if self.showing_placeholder {
            self.pending_formats.iter().copied().map(FormatType::from).collect()
        } else {
            format_state::compute(
                &self.document,
                &self.selection,
                self.format_command.as_ref(),
                &self.pending_formats,
            )
        };
    }

    /// The selection as flat offsets, to be restored after an edit that
    /// restructures blocks.
    pub(crate) fn save_selection(&self) -> Option<(usize, usize)> {
        let anchor = self.document.block_point(&self.selection.anchor)?;
        let focus = self.document.block_point(&self.selection.focus)?;
        Some((
            self.document.flat_offset(&anchor),
            self.document.flat_offset(&focus),
        ))
    }

    pub(crate) fn restore_selection(&mut self, saved: Option<(usize, usize)>) {
        self.selection = match saved {
            Some((anchor, focus)) => self.document.selection_between(
                &self.document.point_at_flat(anchor),
                &self.document.point_at_flat(focus),
            ),
            None => self.document.caret_at(&self.document.end_point()),
        };
    }

    pub(crate) fn set_caret(&mut self, point: &BlockPoint) {
        self.selection = self.document.caret_at(point);
    }

    /// Finish a content change: record it, recompute state, tell the host.
    pub(crate) fn commit(&mut self, record: Record) -> EditorUpdate {
        self.document.ensure_block();
        self.selection = self.document.clamp_selection(&self.selection);
        let html = self.get_content();
        match record {
            Record::Coalesced => self.history.record_change(html.clone()),
            Record::Immediate => self.history.record_now(html.clone()),
        }
        self.refresh_format_state();
        self.notify(&html);
        self.assert_invariants();
        self.create_update_replace_all()
    }

    pub(crate) fn notify(&mut self, html: &str) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(html);
        }
    }

    pub(crate) fn create_update_keep(&self) -> EditorUpdate {
        self.create_update(ContentUpdate::Keep)
    }

    pub(crate) fn create_update_select(&self) -> EditorUpdate {
        self.create_update(ContentUpdate::Select(self.selection.clone()))
    }

    pub(crate) fn create_update_replace_all(&self) -> EditorUpdate {
        self.create_update(ContentUpdate::ReplaceAll {
            html: self.get_rendered_html(),
            selection: self.selection.clone(),
        })
    }

    fn create_update(&self, content_update: ContentUpdate) -> EditorUpdate {
        EditorUpdate {
            content_update,
            format_state: self.format_state.clone(),
            stats: self.get_stats(),
        }
    }

    #[cfg(feature = "assert-invariants")]
    pub(crate) fn assert_invariants(&self) {
        assert!(
            self.document.root().children().iter().any(DomNode::is_block),
            "document has no block"
        );
        assert!(
            self.document.resolves(&self.selection),
            "selection {:?} does not resolve",
            self.selection
        );
        if !self.history.is_pending() {
            if let Some(entry) = self.history.current() {
                assert_eq!(entry.snapshot, self.get_content(), "history is behind the document");
            }
        }
    }

    #[cfg(not(feature = "assert-invariants"))]
    pub(crate) fn assert_invariants(&self) {}
}
