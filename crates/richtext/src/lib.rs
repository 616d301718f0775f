// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Rich-text editing core: an owned HTML document model, a selection over
//! it, formatting commands, a format-state evaluator and a coalescing
//! undo/redo history, driven through [EditorController].

mod command;
mod config;
mod dom;
mod editor;
mod error;
mod format_command;
mod format_state;
mod history;
mod inline_format_type;
mod selection;

#[cfg(test)]
mod tests;

pub use crate::command::Alignment;
pub use crate::command::BlockFormat;
pub use crate::command::ColorTarget;
pub use crate::command::Command;
pub use crate::command::FontSize;
pub use crate::command::ImageDescriptor;
pub use crate::command::KeyCombo;
pub use crate::command::ToolbarButton;
pub use crate::command::UploadedAsset;
pub use crate::config::EditorConfig;
pub use crate::dom::BlockPoint;
pub use crate::dom::Document;
pub use crate::dom::DomHandle;
pub use crate::dom::DomNode;
pub use crate::dom::ElementNode;
pub use crate::dom::NodeKind;
pub use crate::dom::Style;
pub use crate::dom::TextNode;
pub use crate::editor::ContentUpdate;
pub use crate::editor::EditorController;
pub use crate::editor::EditorStats;
pub use crate::editor::EditorUpdate;
pub use crate::error::FormatCommandError;
pub use crate::error::HtmlParseError;
pub use crate::format_command::FormatCommand;
pub use crate::format_command::ManualFormatCommand;
pub use crate::format_command::NativeFormatCommand;
pub use crate::format_command::PlatformEditing;
pub use crate::format_state::FormatState;
pub use crate::format_state::FormatType;
pub use crate::history::Clock;
pub use crate::history::DelayedTask;
pub use crate::history::History;
pub use crate::history::HistoryEntry;
pub use crate::history::ManualClock;
pub use crate::history::SystemClock;
pub use crate::inline_format_type::InlineFormatType;
pub use crate::selection::Position;
pub use crate::selection::Selection;
