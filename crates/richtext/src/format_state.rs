// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::BTreeSet;

use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::dom::Document;
use crate::format_command::FormatCommand;
use crate::{InlineFormatType, Selection};

/// Identifiers a toolbar shows as active.
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
pub enum FormatType {
    Bold,
    Italic,
    Underline,
    #[strum(serialize = "strike")]
    StrikeThrough,
    #[strum(serialize = "sub")]
    Subscript,
    #[strum(serialize = "super")]
    Superscript,
    BulletList,
    NumberedList,
    AlignLeft,
    AlignCenter,
    AlignRight,
    Blockquote,
    CodeBlock,
    #[strum(serialize = "heading-1")]
    Heading1,
    #[strum(serialize = "heading-2")]
    Heading2,
    #[strum(serialize = "heading-3")]
    Heading3,
    #[strum(serialize = "heading-4")]
    Heading4,
    #[strum(serialize = "heading-5")]
    Heading5,
    #[strum(serialize = "heading-6")]
    Heading6,
    Link,
}

impl From<InlineFormatType> for FormatType {
    fn from(format: InlineFormatType) -> Self {
        match format {
            InlineFormatType::Bold => FormatType::Bold,
            InlineFormatType::Italic => FormatType::Italic,
            InlineFormatType::Underline => FormatType::Underline,
            InlineFormatType::StrikeThrough => FormatType::StrikeThrough,
            InlineFormatType::Subscript => FormatType::Subscript,
            InlineFormatType::Superscript => FormatType::Superscript,
        }
    }
}

impl FormatType {
    fn heading(level: u8) -> Option<Self> {
        match level {
            1 => Some(FormatType::Heading1),
            2 => Some(FormatType::Heading2),
            3 => Some(FormatType::Heading3),
            4 => Some(FormatType::Heading4),
            5 => Some(FormatType::Heading5),
            6 => Some(FormatType::Heading6),
            _ => None,
        }
    }
}

/// The formats active at the current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatState(BTreeSet<FormatType>);

impl FormatState {
    pub fn contains(&self, format: FormatType) -> bool {
        self.0.contains(&format)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FormatType> + '_ {
        self.0.iter().copied()
    }

    /// Identifiers as strings, e.g. `["bold", "bullet-list"]`.
    pub fn identifiers(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<FormatType> for FormatState {
    fn from_iter<T: IntoIterator<Item = FormatType>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compute the format state for `selection`.
///
/// Inline formats come from `format_command`, flipped by any `pending`
/// caret toggles. Block formats come from the anchor's ancestors.
pub fn compute(
    document: &Document,
    selection: &Selection,
    format_command: &dyn FormatCommand,
    pending: &BTreeSet<InlineFormatType>,
) -> FormatState {
    let mut active = BTreeSet::new();
    if !document.resolves(selection) {
        return FormatState(active);
    }

    for format in InlineFormatType::iter() {
        let on = format_command.query_state(document, selection, format);
        if on != pending.contains(&format) {
            active.insert(FormatType::from(format));
        }
    }

    let mut found_list = false;
    let mut found_heading = false;
    let mut found_align = false;
    let anchor = &selection.anchor.path;
    let own = document.element(anchor).map(|e| (anchor.clone(), e));
    let chain = own
        .into_iter()
        .filter(|(h, _)| !h.is_root())
        .chain(document.ancestors(anchor));
    for (_, el) in chain {
        match el.tag() {
            "blockquote" => {
                active.insert(FormatType::Blockquote);
            }
            "pre" => {
                active.insert(FormatType::CodeBlock);
            }
            "a" => {
                active.insert(FormatType::Link);
            }
            "ul" if !found_list => {
                found_list = true;
                active.insert(FormatType::BulletList);
            }
            "ol" if !found_list => {
                found_list = true;
                active.insert(FormatType::NumberedList);
            }
            _ => {}
        }
        if !found_heading {
            if let Some(heading) = el.heading_level().and_then(FormatType::heading) {
                found_heading = true;
                active.insert(heading);
            }
        }
        if !found_align {
            if let Some(align) = el.style().get("text-align") {
                found_align = true;
                match align {
                    "left" | "start" => active.insert(FormatType::AlignLeft),
                    "center" => active.insert(FormatType::AlignCenter),
                    "right" | "end" => active.insert(FormatType::AlignRight),
                    _ => false,
                };
            }
        }
    }
    FormatState(active)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::DomHandle;
    use crate::{ManualFormatCommand, Position};

    fn state_at(html: &str, path: &[usize], offset: usize) -> FormatState {
        let doc = Document::parse(html).unwrap();
        let sel = Selection::caret(Position::new(DomHandle::from_raw(path.to_vec()), offset));
        compute(&doc, &sel, &ManualFormatCommand, &BTreeSet::new())
    }

    #[test]
    fn plain_text_has_no_formats() {
        assert!(state_at("<p>abc</p>", &[0, 0], 1).is_empty());
    }

    #[test]
    fn inline_and_block_formats_are_reported() {
        let state = state_at(
            "<blockquote><ol><li><strong>ab</strong></li></ol></blockquote>",
            &[0, 0, 0, 0, 0],
            1,
        );
        assert_eq!(state.identifiers(), vec!["bold", "numbered-list", "blockquote"]);
    }

    #[test]
    fn nearest_list_wins() {
        let state = state_at(
            "<ul><li>a<ol><li>b</li></ol></li></ul>",
            &[0, 0, 1, 0, 0],
            1,
        );
        assert!(state.contains(FormatType::NumberedList));
        assert!(!state.contains(FormatType::BulletList));
    }

    #[test]
    fn alignment_and_headings() {
        let state = state_at(r#"<h2 style="text-align: center;">ab</h2>"#, &[0, 0], 1);
        assert!(state.contains(FormatType::AlignCenter));
        assert!(state.contains(FormatType::Heading2));
    }

    #[test]
    fn code_blocks_and_links() {
        let state = state_at(r#"<pre><a href="u">x</a></pre>"#, &[0, 0, 0], 1);
        assert!(state.contains(FormatType::CodeBlock));
        assert!(state.contains(FormatType::Link));
    }

    #[test]
    fn pending_toggles_flip_inline_formats() {
        let doc = Document::parse("<p><em>ab</em></p>").unwrap();
        let sel = Selection::caret(Position::new(DomHandle::from_raw(vec![0, 0, 0]), 2));
        let pending = BTreeSet::from([InlineFormatType::Italic, InlineFormatType::Bold]);
        let state = compute(&doc, &sel, &ManualFormatCommand, &pending);
        assert!(state.contains(FormatType::Bold));
        assert!(!state.contains(FormatType::Italic));
    }

    #[test]
    fn unresolvable_selections_have_no_formats() {
        assert!(state_at("<p><b>ab</b></p>", &[5, 0], 0).is_empty());
    }
}
