// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod block_ops;
pub mod document;
pub mod dom_handle;
pub mod nodes;
pub mod parser;
pub mod points;
pub(crate) mod runs;

pub use document::Document;
pub use dom_handle::DomHandle;
pub use nodes::{DomNode, ElementNode, NodeKind, Style, TextNode};
pub use points::BlockPoint;
