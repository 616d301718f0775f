// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Images and tables. Each insertion is its own history entry.

use tracing::{debug, warn};

use crate::dom::nodes::{DomNode, ElementNode, Style};
use crate::editor::Record;
use crate::{EditorController, EditorUpdate, ImageDescriptor};

const IMAGE_STYLE: &str =
    "max-width: 100%; height: auto; border-radius: 8px; margin: 16px 0; display: block;";
const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%; margin: 16px 0;";
const CELL_STYLE: &str = "border: 1px solid #ddd; padding: 8px; min-width: 100px;";

impl EditorController {
    /// Insert an image at the caret, or in place of the selected content.
    pub(crate) fn insert_image(&mut self, image: ImageDescriptor) -> EditorUpdate {
        let url = image.url.trim();
        if url.is_empty() {
            warn!("ignoring image without a url");
            return self.create_update_keep();
        }
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let point = if start == end {
            start
        } else {
            self.document.delete_range(&start, &end)
        };

        let src = self.config.resolve_asset_url(url);
        let img = ElementNode::new("img")
            .with_attr("src", &src)
            .with_attr("alt", image.alt())
            .with_style(Style::parse(IMAGE_STYLE));
        let after = self.document.insert_atom_at(&point, img);
        self.set_caret(&after);
        debug!(src, "inserted image");
        self.commit(Record::Immediate)
    }

    /// Insert a `rows` x `cols` table, splitting the block at the caret.
    /// The first row is a header row. Sizes are clamped to the configured
    /// maximum.
    pub(crate) fn insert_table(&mut self, rows: i64, cols: i64) -> EditorUpdate {
        let rows = self.clamp_table_size(rows);
        let cols = self.clamp_table_size(cols);
        let Some((start, end)) = self.document.range_points(&self.selection) else {
            return self.create_update_keep();
        };
        let point = if start == end {
            start
        } else {
            self.document.delete_range(&start, &end)
        };

        match self.document.insert_block_at(&point, build_table(rows, cols)) {
            Some(after) => self.set_caret(&after),
            None => {
                warn!(?point, "could not place a table here");
                return self.create_update_keep();
            }
        }
        debug!(rows, cols, "inserted table");
        self.commit(Record::Immediate)
    }

    fn clamp_table_size(&self, size: i64) -> usize {
        let max = self.config.max_table_size.max(1);
        usize::try_from(size).map_or(1, |s| s.clamp(1, max))
    }
}

fn build_table(rows: usize, cols: usize) -> ElementNode {
    let cell = |tag: &str, text: String| {
        DomNode::Element(
            ElementNode::new(tag)
                .with_style(Style::parse(CELL_STYLE))
                .with_children(vec![DomNode::new_text(text)]),
        )
    };

    let header: Vec<DomNode> = (1..=cols).map(|c| cell("th", format!("Header {c}"))).collect();
    let mut sections = vec![DomNode::new_element(
        "thead",
        vec![DomNode::new_element("tr", header)],
    )];
    if rows > 1 {
        let body = (1..rows)
            .map(|r| {
                let cells = (1..=cols).map(|c| cell("td", format!("Cell {r},{c}"))).collect();
                DomNode::new_element("tr", cells)
            })
            .collect();
        sections.push(DomNode::new_element("tbody", body));
    }
    ElementNode::new("table")
        .with_style(Style::parse(TABLE_STYLE))
        .with_children(sections)
}
