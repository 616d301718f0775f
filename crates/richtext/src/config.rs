// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::time::Duration;

use url::Url;

/// Number of snapshots kept by the undo/redo history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Idle time after which a burst of edits becomes one history entry.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(1000);

/// Largest row or column count accepted by a table insertion.
pub const DEFAULT_MAX_TABLE_SIZE: usize = 50;

pub const DEFAULT_PLACEHOLDER: &str = "Start writing...";

/// Settings supplied by the host when mounting an editor.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    /// Prefix for relative image URLs returned by the upload collaborator,
    /// e.g. `https://api.example.com`.
    pub asset_base_url: Option<String>,
    pub placeholder: String,
    pub history_limit: usize,
    pub coalesce_window: Duration,
    pub max_table_size: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            asset_base_url: None,
            placeholder: DEFAULT_PLACEHOLDER.to_owned(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            coalesce_window: DEFAULT_COALESCE_WINDOW,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }
}

impl EditorConfig {
    pub fn with_asset_base_url(mut self, base: impl Into<String>) -> Self {
        self.asset_base_url = Some(base.into());
        self
    }

    /// Resolve an uploaded asset URL for use in an `img` element.
    ///
    /// Absolute `http(s)` URLs are kept as they are. Anything else is
    /// treated as a path on the asset server and joined onto
    /// [EditorConfig::asset_base_url] when one is configured.
    pub fn resolve_asset_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            return url.to_owned();
        }
        let Some(base) = &self.asset_base_url else {
            return url.to_owned();
        };
        match Url::parse(base).and_then(|b| b.join(url)) {
            Ok(joined) => joined.to_string(),
            Err(_) => format!("{base}{url}"),
        }
    }
}
