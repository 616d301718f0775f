// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt::{Display, Formatter};

const VOID_TAGS: &[&str] = &["img", "br", "hr", "wbr"];

const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "ul",
    "ol",
    "li",
    "table",
    "thead",
    "tbody",
    "tfoot",
    "tr",
    "td",
    "th",
    "hr",
    "section",
    "article",
    "figure",
];

/// Blocks whose children are other blocks, never text.
const STRUCTURAL_TAGS: &[&str] =
    &["ul", "ol", "table", "thead", "tbody", "tfoot", "tr"];

/// Blocks that may hold either inline content or nested blocks.
const FLOW_CONTAINER_TAGS: &[&str] =
    &["div", "blockquote", "li", "td", "th", "section", "article", "figure"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
}

/// Ordered CSS declarations of an element's `style` attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn parse(css: &str) -> Self {
        let declarations = css
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_owned()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { declarations }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, property: &str, value: &str) {
        match self.declarations.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_owned(),
            None => self
                .declarations
                .push((property.to_owned(), value.to_owned())),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.declarations.iter().position(|(k, _)| k == property)?;
        Some(self.declarations.remove(index).1)
    }

    /// Copy every declaration of `other` over this one.
    pub fn merge(&mut self, other: &Style) {
        for (k, v) in &other.declarations {
            self.set(k, v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}: {v};")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextNode {
    text: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Length in chars, the unit of text offsets.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementNode {
    tag: String,
    attributes: Vec<(String, String)>,
    style: Style,
    children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// The editor root. It has no tag and is never serialized itself.
    pub(crate) fn new_root(children: Vec<DomNode>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_ascii_lowercase();
    }

    pub fn is_root(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute. `style` is routed to the parsed [Style].
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if name == "style" {
            self.style = Style::parse(value);
            return;
        }
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => self.attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }

    pub fn retain_attrs(&mut self, keep: impl Fn(&str) -> bool) {
        self.attributes.retain(|(n, _)| keep(n));
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn children(&self) -> &Vec<DomNode> {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<DomNode> {
        &mut self.children
    }

    pub fn take_children(&mut self) -> Vec<DomNode> {
        std::mem::take(&mut self.children)
    }

    pub fn set_children(&mut self, children: Vec<DomNode>) {
        self.children = children;
    }

    pub fn get_child(&self, index: usize) -> Option<&DomNode> {
        self.children.get(index)
    }

    pub fn append_child(&mut self, child: DomNode) {
        self.children.push(child);
    }

    /// A copy of this element with the same tag, attributes and style but
    /// no children.
    pub fn shell(&self) -> ElementNode {
        ElementNode {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            style: self.style.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_block(&self) -> bool {
        self.is_root() || BLOCK_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    pub fn is_structural(&self) -> bool {
        self.is_root() || STRUCTURAL_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_flow_container(&self) -> bool {
        self.is_root() || FLOW_CONTAINER_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_list(&self) -> bool {
        self.tag == "ul" || self.tag == "ol"
    }

    pub fn is_list_item(&self) -> bool {
        self.tag == "li"
    }

    pub fn is_table_cell(&self) -> bool {
        self.tag == "td" || self.tag == "th"
    }

    pub fn heading_level(&self) -> Option<u8> {
        HEADING_TAGS
            .iter()
            .position(|t| *t == self.tag)
            .and_then(|i| u8::try_from(i + 1).ok())
    }

    /// A block that directly holds inline content (or nothing at all).
    /// Caret positions live inside text blocks.
    pub fn is_text_block(&self) -> bool {
        self.is_block()
            && !self.is_void()
            && !self.is_structural()
            && (self.children.is_empty()
                || self.children.iter().any(|c| c.is_inline()))
    }

    /// Length of the inline content below this element, counting each
    /// void or block element as one position.
    pub fn inline_len(&self) -> usize {
        self.children.iter().map(DomNode::inline_len).sum()
    }

    /// Contains no visible text and no image or rule.
    pub fn is_blank(&self) -> bool {
        self.children.iter().all(|c| match c {
            DomNode::Text(t) => t.is_empty(),
            DomNode::Element(e) => match e.tag() {
                "br" => true,
                "img" | "hr" => false,
                _ => e.is_blank(),
            },
        })
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(DomNode::text_content).collect()
    }

    pub(crate) fn write_open_tag(&self, buf: &mut String) {
        buf.push('<');
        buf.push_str(&self.tag);
        for (name, value) in &self.attributes {
            buf.push(' ');
            buf.push_str(name);
            buf.push_str("=\"");
            buf.push_str(&html_escape::encode_double_quoted_attribute(value));
            buf.push('"');
        }
        if !self.style.is_empty() {
            buf.push_str(" style=\"");
            buf.push_str(&html_escape::encode_double_quoted_attribute(
                &self.style.to_string(),
            ));
            buf.push('"');
        }
        if self.is_void() {
            buf.push_str(" />");
        } else {
            buf.push('>');
        }
    }

    pub(crate) fn write_close_tag(&self, buf: &mut String) {
        if !self.is_void() {
            buf.push_str("</");
            buf.push_str(&self.tag);
            buf.push('>');
        }
    }

    fn tree_label(&self) -> String {
        let mut label = self.tag.clone();
        for (name, value) in &self.attributes {
            label.push_str(&format!(" {name}=\"{value}\""));
        }
        if !self.style.is_empty() {
            label.push_str(&format!(" style=\"{}\"", self.style));
        }
        label
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomNode {
    Text(TextNode),
    Element(ElementNode),
}

impl DomNode {
    pub fn new_text(text: impl Into<String>) -> Self {
        DomNode::Text(TextNode::new(text))
    }

    pub fn new_element(tag: &str, children: Vec<DomNode>) -> Self {
        DomNode::Element(ElementNode::new(tag).with_children(children))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            DomNode::Text(_) => NodeKind::Text,
            DomNode::Element(_) => NodeKind::Element,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DomNode::Text(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, DomNode::Element(e) if e.is_block())
    }

    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            DomNode::Text(t) => Some(t),
            DomNode::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        }
    }

    /// See [ElementNode::inline_len].
    pub fn inline_len(&self) -> usize {
        match self {
            DomNode::Text(t) => t.len(),
            DomNode::Element(e) if e.is_void() || e.is_block() => 1,
            DomNode::Element(e) => e.inline_len(),
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            DomNode::Text(t) => t.text().to_owned(),
            DomNode::Element(e) => e.text_content(),
        }
    }

    pub fn to_html(&self) -> String {
        let mut buf = String::new();
        self.write_html(&mut buf);
        buf
    }

    pub(crate) fn write_html(&self, buf: &mut String) {
        match self {
            DomNode::Text(t) => buf.push_str(&html_escape::encode_text(t.text())),
            DomNode::Element(e) => {
                if !e.is_root() {
                    e.write_open_tag(buf);
                }
                for child in e.children() {
                    child.write_html(buf);
                }
                if !e.is_root() {
                    e.write_close_tag(buf);
                }
            }
        }
    }

    pub(crate) fn write_tree(&self, buf: &mut String, prefix: &str, is_last: bool) {
        buf.push_str(prefix);
        buf.push_str(if is_last { "└>" } else { "├>" });
        let child_prefix =
            format!("{prefix}{}", if is_last { "  " } else { "│ " });
        match self {
            DomNode::Text(t) => {
                buf.push_str(&format!("\"{}\"\n", t.text()));
            }
            DomNode::Element(e) => {
                buf.push_str(&e.tree_label());
                buf.push('\n');
                write_tree_children(e, buf, &child_prefix);
            }
        }
    }
}

pub(crate) fn write_tree_children(node: &ElementNode, buf: &mut String, prefix: &str) {
    let count = node.children().len();
    for (i, child) in node.children().iter().enumerate() {
        child.write_tree(buf, prefix, i + 1 == count);
    }
}
