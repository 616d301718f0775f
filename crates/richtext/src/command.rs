// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::InlineFormatType;

pub const DEFAULT_IMAGE_ALT: &str = "Uploaded image";

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());
static FUNCTIONAL_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(rgb|rgba|hsl|hsla)\(\s*[0-9.%]+\s*(,\s*[0-9.%]+\s*){2,3}\)$").unwrap()
});
static NAMED_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").unwrap());

/// A single user action on the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleInlineFormat(InlineFormatType),
    ToggleBlockFormat(BlockFormat),
    SetFontSize(FontSize),
    SetColor { target: ColorTarget, color: String },
    Align(Alignment),
    InsertImage(ImageDescriptor),
    InsertTable { rows: i64, cols: i64 },
    ClearFormat,
    Undo,
    Redo,
    /// A heading level 1..6, or None for a normal paragraph.
    SetHeading(Option<u8>),
    CreateLink(String),
}

#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum BlockFormat {
    #[strum(serialize = "blockquote")]
    Quote,
    CodeBlock,
    BulletList,
    NumberedList,
}

impl BlockFormat {
    pub(crate) fn tag(&self) -> &'static str {
        match self {
            BlockFormat::Quote => "blockquote",
            BlockFormat::CodeBlock => "pre",
            BlockFormat::BulletList => "ul",
            BlockFormat::NumberedList => "ol",
        }
    }
}

#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ColorTarget {
    Text,
    Highlight,
}

impl ColorTarget {
    pub(crate) fn css_property(&self) -> &'static str {
        match self {
            ColorTarget::Text => "color",
            ColorTarget::Highlight => "background-color",
        }
    }
}

/// A size on the legacy 1..7 font scale.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FontSize(u8);

impl FontSize {
    /// Out-of-range values are clamped onto the scale.
    pub fn new(size: i64) -> Self {
        Self(u8::try_from(size.clamp(1, 7)).unwrap_or(3))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn css_value(&self) -> &'static str {
        match self.0 {
            1 => "x-small",
            2 => "small",
            3 => "medium",
            4 => "large",
            5 => "x-large",
            6 => "xx-large",
            _ => "xxx-large",
        }
    }
}

/// True for hex, `rgb()`/`hsl()` style and named CSS colours.
pub fn is_valid_color(color: &str) -> bool {
    let color = color.trim();
    HEX_COLOR.is_match(color) || FUNCTIONAL_COLOR.is_match(color) || NAMED_COLOR.is_match(color)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub url: String,
    pub alt_text: Option<String>,
}

impl ImageDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: None,
        }
    }

    pub fn alt(&self) -> &str {
        self.alt_text
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_IMAGE_ALT)
    }
}

/// What the upload collaborator returns for a stored image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedAsset {
    pub url: String,
    pub original_name: Option<String>,
    pub size: u64,
}

impl From<UploadedAsset> for ImageDescriptor {
    fn from(asset: UploadedAsset) -> Self {
        Self {
            url: asset.url,
            alt_text: asset.original_name,
        }
    }
}

/// A key press with its modifiers. `key` is the key's character, matched
/// case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyCombo {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyCombo {
    /// Ctrl (or Cmd) plus `key`.
    pub fn primary(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Parameterless toolbar buttons.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ToolbarButton {
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
    Quote,
    CodeBlock,
    AlignLeft,
    AlignCenter,
    AlignRight,
    ClearFormat,
    Undo,
    Redo,
}

impl ToolbarButton {
    pub fn command(&self) -> Command {
        match self {
            ToolbarButton::Bold => Command::ToggleInlineFormat(InlineFormatType::Bold),
            ToolbarButton::Italic => Command::ToggleInlineFormat(InlineFormatType::Italic),
            ToolbarButton::Underline => Command::ToggleInlineFormat(InlineFormatType::Underline),
            ToolbarButton::StrikeThrough => {
                Command::ToggleInlineFormat(InlineFormatType::StrikeThrough)
            }
            ToolbarButton::Subscript => Command::ToggleInlineFormat(InlineFormatType::Subscript),
            ToolbarButton::Superscript => {
                Command::ToggleInlineFormat(InlineFormatType::Superscript)
            }
            ToolbarButton::BulletList => Command::ToggleBlockFormat(BlockFormat::BulletList),
            ToolbarButton::NumberedList => Command::ToggleBlockFormat(BlockFormat::NumberedList),
            ToolbarButton::Quote => Command::ToggleBlockFormat(BlockFormat::Quote),
            ToolbarButton::CodeBlock => Command::ToggleBlockFormat(BlockFormat::CodeBlock),
            ToolbarButton::AlignLeft => Command::Align(Alignment::Left),
            ToolbarButton::AlignCenter => Command::Align(Alignment::Center),
            ToolbarButton::AlignRight => Command::Align(Alignment::Right),
            ToolbarButton::ClearFormat => Command::ClearFormat,
            ToolbarButton::Undo => Command::Undo,
            ToolbarButton::Redo => Command::Redo,
        }
    }
}

impl Command {
    /// The command bound to a keyboard shortcut, if any.
    pub fn from_shortcut(combo: &KeyCombo) -> Option<Command> {
        if !(combo.ctrl || combo.meta) || combo.alt {
            return None;
        }
        let button = match (combo.key.to_ascii_lowercase().as_str(), combo.shift) {
            ("z", false) => ToolbarButton::Undo,
            ("z", true) | ("y", false) => ToolbarButton::Redo,
            ("b", false) => ToolbarButton::Bold,
            ("i", false) => ToolbarButton::Italic,
            ("u", false) => ToolbarButton::Underline,
            _ => return None,
        };
        Some(button.command())
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn shortcuts_build_the_same_commands_as_buttons() {
        let pairs = [
            (KeyCombo::primary("b"), ToolbarButton::Bold),
            (KeyCombo::primary("I"), ToolbarButton::Italic),
            (KeyCombo::primary("u"), ToolbarButton::Underline),
            (KeyCombo::primary("z"), ToolbarButton::Undo),
            (KeyCombo::primary("z").with_shift(), ToolbarButton::Redo),
            (KeyCombo::primary("y"), ToolbarButton::Redo),
        ];
        for (combo, button) in pairs {
            assert_eq!(Command::from_shortcut(&combo), Some(button.command()));
        }
    }

    #[test]
    fn meta_works_like_ctrl() {
        let combo = KeyCombo {
            key: "b".to_owned(),
            meta: true,
            ..Default::default()
        };
        assert_eq!(Command::from_shortcut(&combo), Some(ToolbarButton::Bold.command()));
    }

    #[test]
    fn unbound_keys_have_no_command() {
        assert_eq!(Command::from_shortcut(&KeyCombo::primary("q")), None);
        let plain = KeyCombo {
            key: "b".to_owned(),
            ..Default::default()
        };
        assert_eq!(Command::from_shortcut(&plain), None);
    }

    #[test]
    fn every_button_has_a_command() {
        assert_eq!(ToolbarButton::iter().map(|b| b.command()).count(), 16);
    }

    #[test]
    fn font_sizes_are_clamped_onto_the_legacy_scale() {
        assert_eq!(FontSize::new(0).value(), 1);
        assert_eq!(FontSize::new(9).css_value(), "xxx-large");
        assert_eq!(FontSize::new(4).css_value(), "large");
    }

    #[test]
    fn colour_validation() {
        assert!(is_valid_color("#ff0000"));
        assert!(is_valid_color("#abc"));
        assert!(is_valid_color("rgb(255, 0, 0)"));
        assert!(is_valid_color("red"));
        assert!(!is_valid_color("#12"));
        assert!(!is_valid_color("red; background: url(x)"));
        assert!(!is_valid_color(""));
    }

    #[test]
    fn uploaded_assets_become_image_descriptors() {
        let asset = UploadedAsset {
            url: "/uploads/cat.png".to_owned(),
            original_name: Some("cat.png".to_owned()),
            size: 1024,
        };
        let descriptor = ImageDescriptor::from(asset);
        assert_eq!(descriptor.alt(), "cat.png");
        assert_eq!(ImageDescriptor::new("x").alt(), "Uploaded image");
    }
}
