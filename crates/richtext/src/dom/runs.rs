// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Flat view of a text block's inline content.
//!
//! Inline edits are done by flattening the children of a text block into a
//! list of runs, each carrying the formatting that applied to it, editing
//! the list, and building fresh children from it. Building always nests
//! the layers in the same order (opaque wrappers, link, styled span, then
//! formats in [InlineFormatType] order), so equal formatting always
//! serializes to equal markup.

use std::collections::BTreeMap;

use crate::dom::nodes::{DomNode, ElementNode, Style};
use crate::InlineFormatType;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InlineAttrs {
    /// Inline elements with no editing meaning, e.g. `code` or `font`.
    pub wrappers: Vec<ElementNode>,
    pub link: Option<ElementNode>,
    pub style: Style,
    /// Active formats and the tag each one was written with.
    pub formats: BTreeMap<InlineFormatType, String>,
}

impl InlineAttrs {
    fn entering(&self, element: &ElementNode) -> InlineAttrs {
        let mut attrs = self.clone();
        if let Some(format) = InlineFormatType::from_tag(element.tag()) {
            attrs.formats.insert(format, element.tag().to_owned());
            if !element.style().is_empty() || !element.attributes().is_empty()
            {
                let mut shell = element.shell();
                shell.set_tag("span");
                attrs.absorb_span(&shell);
            }
        } else if element.tag() == "a" {
            attrs.link = Some(element.shell());
        } else if element.tag() == "span" {
            attrs.absorb_span(element);
        } else {
            attrs.wrappers.push(element.shell());
        }
        attrs
    }

    fn absorb_span(&mut self, span: &ElementNode) {
        if span.attributes().is_empty() {
            self.style.merge(span.style());
        } else {
            self.wrappers.push(span.shell());
        }
    }

    pub fn has_format(&self, format: InlineFormatType) -> bool {
        self.formats.contains_key(&format)
    }

    pub fn set_format(&mut self, format: InlineFormatType, on: bool) {
        if on {
            if let Some(other) = format.exclusive_with() {
                self.formats.remove(&other);
            }
            self.formats
                .entry(format)
                .or_insert_with(|| format.tag().to_owned());
        } else {
            self.formats.remove(&format);
        }
    }

    /// Shells to nest, outermost first.
    fn layers(&self) -> Vec<ElementNode> {
        let mut layers = self.wrappers.clone();
        if let Some(link) = &self.link {
            layers.push(link.clone());
        }
        if !self.style.is_empty() {
            layers.push(ElementNode::new("span").with_style(self.style.clone()));
        }
        layers.extend(self.formats.values().map(|tag| ElementNode::new(tag)));
        layers
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Run {
    Text { text: String, attrs: InlineAttrs },
    /// A void inline element such as `img` or `br`.
    Atom { node: ElementNode, attrs: InlineAttrs },
    /// A block nested inside a text block, kept as-is.
    Block(DomNode),
}

impl Run {
    pub fn text(text: impl Into<String>, attrs: InlineAttrs) -> Self {
        Run::Text {
            text: text.into(),
            attrs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Run::Text { text, .. } => text.chars().count(),
            Run::Atom { .. } | Run::Block(_) => 1,
        }
    }

    pub fn attrs(&self) -> Option<&InlineAttrs> {
        match self {
            Run::Text { attrs, .. } | Run::Atom { attrs, .. } => Some(attrs),
            Run::Block(_) => None,
        }
    }

    pub fn attrs_mut(&mut self) -> Option<&mut InlineAttrs> {
        match self {
            Run::Text { attrs, .. } | Run::Atom { attrs, .. } => Some(attrs),
            Run::Block(_) => None,
        }
    }

    fn layers(&self) -> Vec<ElementNode> {
        self.attrs().map(InlineAttrs::layers).unwrap_or_default()
    }

    fn into_leaf(self) -> DomNode {
        match self {
            Run::Text { text, .. } => DomNode::new_text(text),
            Run::Atom { node, .. } => DomNode::Element(node),
            Run::Block(node) => node,
        }
    }
}

pub(crate) fn runs_len(runs: &[Run]) -> usize {
    runs.iter().map(Run::len).sum()
}

/// Flatten inline children into runs.
pub(crate) fn collect_runs(children: &[DomNode]) -> Vec<Run> {
    let mut runs = Vec::new();
    walk(children, &InlineAttrs::default(), &mut runs);
    runs
}

fn walk(children: &[DomNode], attrs: &InlineAttrs, out: &mut Vec<Run>) {
    for child in children {
        match child {
            DomNode::Text(t) => {
                if !t.is_empty() {
                    out.push(Run::text(t.text(), attrs.clone()));
                }
            }
            DomNode::Element(e) if e.is_void() && !e.is_block() => {
                out.push(Run::Atom {
                    node: e.clone(),
                    attrs: attrs.clone(),
                })
            }
            DomNode::Element(e) if e.is_block() => {
                out.push(Run::Block(child.clone()))
            }
            DomNode::Element(e) => walk(e.children(), &attrs.entering(e), out),
        }
    }
}

/// Merge neighbouring text runs with equal formatting and drop empty ones.
pub(crate) fn normalize_runs(runs: Vec<Run>) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        if let Run::Text { text, attrs } = run {
            if text.is_empty() {
                continue;
            }
            if let Some(Run::Text {
                text: prev,
                attrs: prev_attrs,
            }) = out.last_mut()
            {
                if *prev_attrs == attrs {
                    prev.push_str(&text);
                    continue;
                }
            }
            out.push(Run::Text { text, attrs });
        } else {
            out.push(run);
        }
    }
    out
}

/// Build inline nodes for a list of runs.
pub(crate) fn build_nodes(runs: Vec<Run>) -> Vec<DomNode> {
    let items = normalize_runs(runs)
        .into_iter()
        .map(|run| (run.layers(), run))
        .collect();
    build_level(items, 0)
}

fn build_level(items: Vec<(Vec<ElementNode>, Run)>, depth: usize) -> Vec<DomNode> {
    let mut out = Vec::new();
    let mut group: Vec<(Vec<ElementNode>, Run)> = Vec::new();
    let mut group_shell: Option<ElementNode> = None;

    for (layers, run) in items {
        match layers.get(depth) {
            None => {
                flush_group(&mut out, &mut group, &mut group_shell, depth);
                out.push(run.into_leaf());
            }
            Some(shell) => {
                if group_shell.as_ref() != Some(shell) {
                    flush_group(&mut out, &mut group, &mut group_shell, depth);
                    group_shell = Some(shell.clone());
                }
                group.push((layers, run));
            }
        }
    }
    flush_group(&mut out, &mut group, &mut group_shell, depth);
    out
}

fn flush_group(
    out: &mut Vec<DomNode>,
    group: &mut Vec<(Vec<ElementNode>, Run)>,
    shell: &mut Option<ElementNode>,
    depth: usize,
) {
    if let Some(shell) = shell.take() {
        let children = build_level(std::mem::take(group), depth + 1);
        out.push(DomNode::Element(shell.with_children(children)));
    }
}

/// Split runs at an offset. Offsets past the end put everything left.
pub(crate) fn split_runs(runs: Vec<Run>, offset: usize) -> (Vec<Run>, Vec<Run>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for run in runs {
        let len = run.len();
        if pos + len <= offset {
            left.push(run);
        } else if pos >= offset {
            right.push(run);
        } else if let Run::Text { text, attrs } = run {
            let (a, b) = split_at_char(&text, offset - pos);
            left.push(Run::text(a, attrs.clone()));
            right.push(Run::text(b, attrs));
        } else {
            right.push(run);
        }
        pos += len;
    }
    (left, right)
}

/// Apply `f` to the formatting of every run between `start` and `end`.
pub(crate) fn map_range(
    runs: Vec<Run>,
    start: usize,
    end: usize,
    mut f: impl FnMut(&mut InlineAttrs),
) -> Vec<Run> {
    let (head, rest) = split_runs(runs, start);
    let (mut middle, tail) = split_runs(rest, end.saturating_sub(start));
    for run in middle.iter_mut() {
        if let Some(attrs) = run.attrs_mut() {
            f(attrs);
        }
    }
    head.into_iter().chain(middle).chain(tail).collect()
}

/// Text runs overlapping `start..end`, or touching the caret when the
/// range is empty.
pub(crate) fn text_attrs_in_range(
    runs: &[Run],
    start: usize,
    end: usize,
) -> Vec<&InlineAttrs> {
    let mut found = Vec::new();
    let mut pos = 0;
    for run in runs {
        let len = run.len();
        let overlaps = pos < end && pos + len > start;
        if overlaps {
            if let Run::Text { attrs, .. } = run {
                found.push(attrs);
            }
        }
        pos += len;
    }
    found
}

/// Formatting that text typed at `offset` would pick up: the text run
/// before the caret, or the one after it at the start of a block.
pub(crate) fn attrs_at(runs: &[Run], offset: usize) -> InlineAttrs {
    let mut pos = 0;
    let mut after: Option<&InlineAttrs> = None;
    for run in runs {
        let len = run.len();
        if let Run::Text { attrs, .. } = run {
            if pos < offset && offset <= pos + len {
                let mut attrs = attrs.clone();
                if offset == pos + len {
                    attrs.link = None;
                }
                return attrs;
            }
            if pos == offset && after.is_none() {
                after = Some(attrs);
            }
        }
        pos += len;
    }
    let mut attrs = after.cloned().unwrap_or_default();
    attrs.link = None;
    attrs
}

pub(crate) fn split_at_char(text: &str, chars: usize) -> (String, String) {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => (text[..byte].to_owned(), text[byte..].to_owned()),
        None => (text.to_owned(), String::new()),
    }
}
