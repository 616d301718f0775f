// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

use crate::dom::Document;
use crate::InlineFormatType;

/// HTML was accepted by the parser only after error recovery.
///
/// The recovered tree is still available through
/// [HtmlParseError::into_recovered], which is what the editor uses when
/// mounting or replacing content.
#[derive(Debug, Error)]
#[error("HTML contained {} parse error(s): {}", .parse_errors.len(), .parse_errors.join("; "))]
pub struct HtmlParseError {
    pub parse_errors: Vec<String>,
    pub(crate) recovered: Document,
}

impl HtmlParseError {
    pub fn into_recovered(self) -> Document {
        self.recovered
    }
}

#[derive(Debug, Error)]
pub enum FormatCommandError {
    #[error("the platform editing primitive is unavailable")]
    Unavailable,
    #[error("the platform does not support {0}")]
    Unsupported(InlineFormatType),
    #[error("the platform editing primitive failed: {0}")]
    Platform(String),
    #[error("the platform produced unusable markup")]
    InvalidMarkup(#[from] HtmlParseError),
}
