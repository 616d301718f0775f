// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::padom::{PaDom, PaDomHandle, PaDomNode};
use super::padom_creator::PaDomCreator;
use crate::dom::nodes::{DomNode, ElementNode};
use crate::dom::Document;
use crate::HtmlParseError;

/// Elements whose content never belongs in an editable document.
const DROPPED_TAGS: &[&str] = &["script", "style", "template", "head", "title"];

static SURROUNDING_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*\n\s*)+|(\s*\n\s*)+$").unwrap());
static INTERNAL_INDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());

/// Parse an HTML fragment into a [Document].
///
/// html5ever recovers from any input, so the error case still carries a
/// usable tree; see [parse_lenient].
pub(crate) fn parse(html: &str) -> Result<Document, HtmlParseError> {
    let creation = PaDomCreator::parse(html);
    let children = convert_children(
        &creation.dom,
        &creation.dom.document_handle(),
        false,
    );
    let document = Document::from_children(children);
    if creation.parse_errors.is_empty() {
        Ok(document)
    } else {
        Err(HtmlParseError {
            parse_errors: creation.parse_errors,
            recovered: document,
        })
    }
}

/// Parse an HTML fragment, using the recovered tree if it was malformed.
pub(crate) fn parse_lenient(html: &str) -> Document {
    match parse(html) {
        Ok(document) => document,
        Err(e) => {
            warn!(errors = ?e.parse_errors, "recovered from malformed HTML");
            e.into_recovered()
        }
    }
}

fn convert_children(
    dom: &PaDom,
    handle: &PaDomHandle,
    in_pre: bool,
) -> Vec<DomNode> {
    let mut out = Vec::new();
    let Some(children) = dom.get_node(handle).children() else {
        return out;
    };
    for child in children {
        match dom.get_node(child) {
            PaDomNode::Document(_) => {
                out.extend(convert_children(dom, child, in_pre))
            }
            PaDomNode::Container(c) => {
                let tag = c.name.local.as_ref().to_ascii_lowercase();
                if tag == "html" || tag == "body" {
                    out.extend(convert_children(dom, child, in_pre));
                    continue;
                }
                if DROPPED_TAGS.contains(&tag.as_str()) {
                    continue;
                }
                let mut element = ElementNode::new(&tag);
                for (name, value) in &c.attrs {
                    element.set_attr(name, value);
                }
                let children =
                    convert_children(dom, child, in_pre || tag == "pre");
                element.set_children(children);
                out.push(DomNode::Element(element));
            }
            PaDomNode::Text(t) => {
                if in_pre {
                    out.push(DomNode::new_text(t.content.clone()));
                } else {
                    let trimmed = SURROUNDING_INDENT.replace_all(&t.content, "");
                    let collapsed = INTERNAL_INDENT.replace_all(&trimmed, " ");
                    if !collapsed.is_empty() {
                        out.push(DomNode::new_text(collapsed.into_owned()));
                    }
                }
            }
            PaDomNode::Comment => {}
        }
    }
    if !in_pre && out.iter().any(DomNode::is_block) {
        out.retain(|n| match n {
            DomNode::Text(t) => !t.text().trim().is_empty(),
            DomNode::Element(_) => true,
        });
    }
    out
}

#[cfg(test)]
mod test {
    use indoc::indoc;
    use speculoos::prelude::*;

    use super::*;

    fn roundtrip(html: &str) -> String {
        parse(html).unwrap().to_html()
    }

    #[test]
    fn parse_plain_text_into_a_paragraph() {
        assert_eq!(roundtrip("Hello"), "<p>Hello</p>");
    }

    #[test]
    fn parse_empty_string_gives_one_empty_paragraph() {
        assert_eq!(roundtrip(""), "<p></p>");
    }

    #[test]
    fn parse_keeps_formatting_and_attributes() {
        assert_eq!(
            roundtrip(r#"<p>a <strong>b</strong> <a href="https://x.org">c</a></p>"#),
            r#"<p>a <strong>b</strong> <a href="https://x.org">c</a></p>"#
        );
    }

    #[test]
    fn parse_moves_style_to_the_end_of_the_attributes() {
        assert_eq!(
            roundtrip(r#"<p style="text-align:center" class="x">a</p>"#),
            r#"<p class="x" style="text-align: center;">a</p>"#
        );
    }

    #[test]
    fn parse_wraps_loose_inline_content_between_blocks() {
        assert_eq!(
            roundtrip("a<p>b</p>c <em>d</em>"),
            "<p>a</p><p>b</p><p>c <em>d</em></p>"
        );
    }

    #[test]
    fn parse_drops_indentation_between_blocks() {
        let html = indoc! {r#"
            <ul>
                <li>one</li>
                <li>two</li>
            </ul>
        "#};
        assert_eq!(roundtrip(html), "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn parse_keeps_whitespace_in_code_blocks() {
        assert_eq!(
            roundtrip("<pre>a\n  b</pre>"),
            "<pre>a\n  b</pre>"
        );
    }

    #[test]
    fn parse_matches_tag_names_without_case() {
        assert_eq!(
            roundtrip("<BLOCKQUOTE><PRE>a\n  b</PRE></BLOCKQUOTE>"),
            "<blockquote><pre>a\n  b</pre></blockquote>"
        );
        assert_eq!(roundtrip("<BODY><P>x</P></BODY>"), "<p>x</p>");
    }

    #[test]
    fn parse_drops_scripts_and_comments() {
        assert_eq!(
            roundtrip("<p>a<!-- x --><script>alert(1)</script>b</p>"),
            "<p>ab</p>"
        );
    }

    #[test]
    fn parse_builds_a_tree() {
        let doc = parse("<blockquote><p>Hi <b>there</b></p></blockquote>").unwrap();
        assert_eq!(
            doc.to_tree(),
            indoc! {r#"

            └>blockquote
              └>p
                ├>"Hi "
                └>b
                  └>"there"
            "#}
        );
    }

    #[test]
    fn malformed_html_is_recovered() {
        let result = parse("<p><b><i>x</b>y</i></p>");
        assert_that!(result.is_err()).is_true();
        let doc = parse_lenient("<p><b><i>x</b>y</i></p>");
        assert_that!(doc.to_html()).contains("x");
        assert_that!(doc.to_html()).contains("y");
    }

    #[test]
    fn tables_get_their_implied_body() {
        assert_eq!(
            roundtrip("<table><tr><td>a</td></tr></table>"),
            "<table><tbody><tr><td>a</td></tr></tbody></table>"
        );
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn formatting_survives_a_parse() {
        for html in [
            "<p>foo <strong>bar</strong> baz</p>",
            "<p>foo <em>bar</em> baz</p>",
            "<p>foo <u>bar</u> baz</p>",
            "<p>foo <code>bar</code> baz</p>",
        ] {
            let doc = parse(html).unwrap_or_else(|e| e.into_recovered());
            assert_eq!(doc.to_html(), html);
        }
    }

    #[wasm_bindgen_test]
    fn malformed_html_is_still_usable() {
        let doc = parse_lenient("<p><b><i>x</b>y</i></p>");
        assert!(doc.to_html().contains('y'));
    }
}
