// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Build an editor from HTML with selection markers, and print it back.
//!
//! `|` is the caret. A range is written `{...}|` when the focus is at
//! the end and `|{...}` when it is at the start.

use crate::dom::nodes::{DomNode, ElementNode};
use crate::dom::{BlockPoint, Document, DomHandle};
use crate::{EditorController, ManualClock, Position};

const MARKERS: [char; 3] = ['|', '{', '}'];

pub fn cm(text: &str) -> EditorController {
    let (html, found) = strip_markers(text);
    let mut model = EditorController::mount(&html);
    place_selection(&mut model, &found);
    model
}

/// Like [cm], with history driven by the returned clock.
pub fn cm_with_clock(text: &str) -> (EditorController, ManualClock) {
    let clock = ManualClock::new();
    let (html, found) = strip_markers(text);
    let mut model = EditorController::mount(&html).with_clock(Box::new(clock.clone()));
    place_selection(&mut model, &found);
    (model, clock)
}

pub fn tx(model: &EditorController) -> String {
    let document = model.document();
    let selection = model.selection();
    let anchor = &selection.anchor;
    let focus = &selection.focus;
    let markers = if selection.is_collapsed() {
        vec![(anchor.path.clone(), anchor.offset, "|")]
    } else {
        let forward = match (document.block_point(anchor), document.block_point(focus)) {
            (Some(a), Some(f)) => a <= f,
            _ => true,
        };
        if forward {
            vec![
                (anchor.path.clone(), anchor.offset, "{"),
                (focus.path.clone(), focus.offset, "}|"),
            ]
        } else {
            vec![
                (focus.path.clone(), focus.offset, "|{"),
                (anchor.path.clone(), anchor.offset, "}"),
            ]
        }
    };
    document.to_marked_html(&markers)
}

fn strip_markers(text: &str) -> (String, Vec<(char, BlockPoint)>) {
    let mut document = Document::parse_lenient(text);
    let mut found = Vec::new();
    while let Some((handle, index, marker)) = find_marker(document.root(), &DomHandle::root()) {
        let point = document
            .block_point(&Position::new(handle.clone(), index))
            .expect("marker should be inside a text block");
        if let Some(DomNode::Text(t)) = document.lookup_mut(&handle) {
            let mut chars: Vec<char> = t.text().chars().collect();
            chars.remove(index);
            t.set_text(chars.into_iter().collect::<String>());
        }
        found.push((marker, point));
    }
    (document.to_html(), found)
}

fn find_marker(el: &ElementNode, handle: &DomHandle) -> Option<(DomHandle, usize, char)> {
    for (i, child) in el.children().iter().enumerate() {
        let child_handle = handle.child_handle(i);
        match child {
            DomNode::Text(t) => {
                let hit = t.text().chars().enumerate().find(|(_, c)| MARKERS.contains(c));
                if let Some((index, marker)) = hit {
                    return Some((child_handle, index, marker));
                }
            }
            DomNode::Element(e) => {
                if let Some(found) = find_marker(e, &child_handle) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn place_selection(model: &mut EditorController, found: &[(char, BlockPoint)]) {
    let get = |marker: char| {
        found
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, point)| point.clone())
    };
    let document = model.document();
    let selection = match (get('{'), get('}'), get('|')) {
        (Some(start), Some(end), caret) => {
            if caret.as_ref() == Some(&start) && start != end {
                document.selection_between(&end, &start)
            } else {
                document.selection_between(&start, &end)
            }
        }
        (None, None, Some(caret)) => document.caret_at(&caret),
        _ => return,
    };
    model.select(selection);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn caret_round_trips() {
        assert_eq!(tx(&cm("<p>ab|c</p>")), "<p>ab|c</p>");
        assert_eq!(tx(&cm("<p>|</p>")), "<p>|</p>");
    }

    #[test]
    fn forward_and_backward_ranges_round_trip() {
        assert_eq!(tx(&cm("<p>a{b</p><p>c}|d</p>")), "<p>a{b</p><p>c}|d</p>");
        assert_eq!(tx(&cm("<p>|{ab}</p>")), "<p>|{ab}</p>");
    }

    #[test]
    fn markers_inside_formatting() {
        let model = cm("<p>a<em>b|c</em></p>");
        assert_eq!(model.selection().anchor, Position::new(DomHandle::from_raw(vec![0, 1, 0]), 1));
        assert_eq!(tx(&model), "<p>a<em>b|c</em></p>");
    }

    #[test]
    fn backward_selection_keeps_its_direction() {
        let model = cm("<p>|{ab}</p>");
        assert!(model.selection().anchor.offset > model.selection().focus.offset);
    }
}
