// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::dom::DomHandle;

/// A DOM boundary point. Inside a text node `offset` counts chars; inside
/// an element it is a child index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub path: DomHandle,
    pub offset: usize,
}

impl Position {
    pub fn new(path: DomHandle, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// The user's caret (when collapsed) or range. The anchor is where the
/// selection started and the focus where it ends, so the focus may come
/// first in the document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn caret(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    pub fn from_paths(
        anchor_path: Vec<usize>,
        anchor_offset: usize,
        focus_path: Vec<usize>,
        focus_offset: usize,
    ) -> Self {
        Self::new(
            Position::new(DomHandle::from_raw(anchor_path), anchor_offset),
            Position::new(DomHandle::from_raw(focus_path), focus_offset),
        )
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}
