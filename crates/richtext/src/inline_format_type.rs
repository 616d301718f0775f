// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Character-level formats that can be toggled on a selection.
///
/// The declaration order is the nesting order used when a formatted run is
/// serialized, outermost first.
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[strum(serialize_all = "kebab-case")]
pub enum InlineFormatType {
    Bold,
    Italic,
    Underline,
    #[strum(serialize = "strike")]
    StrikeThrough,
    #[strum(serialize = "sub")]
    Subscript,
    #[strum(serialize = "super")]
    Superscript,
}

impl InlineFormatType {
    /// The tag written when this format is applied.
    pub fn tag(&self) -> &'static str {
        match self {
            InlineFormatType::Bold => "strong",
            InlineFormatType::Italic => "em",
            InlineFormatType::Underline => "u",
            InlineFormatType::StrikeThrough => "del",
            InlineFormatType::Subscript => "sub",
            InlineFormatType::Superscript => "sup",
        }
    }

    /// Recognise a format from any of the tags browsers produce for it.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "b" | "strong" => Some(InlineFormatType::Bold),
            "i" | "em" => Some(InlineFormatType::Italic),
            "u" => Some(InlineFormatType::Underline),
            "s" | "del" | "strike" => Some(InlineFormatType::StrikeThrough),
            "sub" => Some(InlineFormatType::Subscript),
            "sup" => Some(InlineFormatType::Superscript),
            _ => None,
        }
    }

    /// The format that cannot be active at the same time as this one.
    pub(crate) fn exclusive_with(&self) -> Option<Self> {
        match self {
            InlineFormatType::Subscript => Some(InlineFormatType::Superscript),
            InlineFormatType::Superscript => Some(InlineFormatType::Subscript),
            _ => None,
        }
    }
}
