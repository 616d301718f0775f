// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::borrow::Cow;
use std::cell::{Ref, RefCell};

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{parse_fragment, Attribute, QualName};

use super::padom::{
    paqual_name, PaDom, PaDomHandle, PaDomNode, PaNodeContainer, PaNodeText,
};

/// A parsed arena DOM plus the errors html5ever recovered from.
#[derive(Clone, Debug, Default)]
pub(crate) struct PaDomCreation {
    pub(crate) dom: PaDom,
    pub(crate) parse_errors: Vec<String>,
}

pub(crate) struct PaDomCreator {
    state: RefCell<PaDomCreation>,
}

impl PaDomCreator {
    pub fn parse(html: &str) -> PaDomCreation {
        parse_fragment(
            PaDomCreator::default(),
            Default::default(),
            paqual_name(""),
            vec![],
        )
        .from_utf8()
        .one(html.as_bytes())
    }

    fn insert_child(
        &self,
        parent: &PaDomHandle,
        index: Option<usize>,
        child: NodeOrText<PaDomHandle>,
    ) {
        let dom = &mut self.state.borrow_mut().dom;
        let child = match child {
            NodeOrText::AppendNode(child) => child,
            NodeOrText::AppendText(tendril) => {
                // Text next to existing text extends it
                let neighbour = dom.get_node(parent).children().and_then(|c| {
                    match index {
                        Some(0) => None,
                        Some(i) => c.get(i - 1).copied(),
                        None => c.last().copied(),
                    }
                });
                if let Some(neighbour) = neighbour {
                    if let PaDomNode::Text(t) = dom.get_mut_node(&neighbour) {
                        t.content += tendril.as_ref();
                        return;
                    }
                }
                dom.add_node(PaDomNode::Text(PaNodeText {
                    content: tendril.as_ref().to_owned(),
                }))
            }
        };
        if let Some(children) = dom.get_mut_node(parent).children_mut() {
            match index {
                Some(i) if i <= children.len() => children.insert(i, child),
                _ => children.push(child),
            }
        }
    }
}

impl Default for PaDomCreator {
    fn default() -> Self {
        Self {
            state: RefCell::new(PaDomCreation::default()),
        }
    }
}

impl TreeSink for PaDomCreator {
    type Handle = PaDomHandle;
    type Output = PaDomCreation;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        self.state.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.state.borrow_mut().parse_errors.push(String::from(msg));
    }

    fn get_document(&self) -> Self::Handle {
        self.state.borrow().dom.document_handle()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        Ref::map(self.state.borrow(), |state| state.dom.get_node(target).name())
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        flags: ElementFlags,
    ) -> Self::Handle {
        self.state
            .borrow_mut()
            .dom
            .create_element(name, attrs, flags)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.state.borrow_mut().dom.add_node(PaDomNode::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.state.borrow_mut().dom.add_node(PaDomNode::Comment)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        self.insert_child(parent, None, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = self.state.borrow().dom.find_parent(element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // Doctypes have no place in editor content
    }

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(
        &self,
        sibling: &Self::Handle,
        new_node: NodeOrText<Self::Handle>,
    ) {
        let parent = self.state.borrow().dom.find_parent(sibling);
        if let Some((parent, index)) = parent {
            self.insert_child(&parent, Some(index), new_node);
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let dom = &mut self.state.borrow_mut().dom;
        if let PaDomNode::Container(PaNodeContainer { attrs: existing, .. }) =
            dom.get_mut_node(target)
        {
            for attr in attrs {
                let name = attr.name.local.as_ref();
                if !existing.iter().any(|(n, _)| n == name) {
                    existing.push((name.to_owned(), attr.value.as_ref().to_owned()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let dom = &mut self.state.borrow_mut().dom;
        if let Some((parent, index)) = dom.find_parent(target) {
            if let Some(children) = dom.get_mut_node(&parent).children_mut() {
                children.remove(index);
            }
        }
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let dom = &mut self.state.borrow_mut().dom;
        let moved = dom
            .get_mut_node(node)
            .children_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        if let Some(children) = dom.get_mut_node(new_parent).children_mut() {
            children.extend(moved);
        }
    }

    fn set_current_line(&self, _line_number: u64) {}
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(creation: &PaDomCreation, handle: &PaDomHandle) -> String {
        let dom = &creation.dom;
        match dom.get_node(handle) {
            PaDomNode::Text(t) => format!("'{}'", t.content),
            PaDomNode::Comment => "#comment".to_owned(),
            node => {
                let children = node
                    .children()
                    .map(|c| {
                        c.iter()
                            .map(|h| names(creation, h))
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default();
                format!("{}({})", node.name().local, children)
            }
        }
    }

    fn parse(html: &str) -> String {
        let creation = PaDomCreator::parse(html);
        names(&creation, &creation.dom.document_handle())
    }

    #[test]
    fn parsing_an_empty_string_creates_an_empty_fragment() {
        assert_eq!(parse(""), "(html())");
    }

    #[test]
    fn parsing_nested_structures_produces_them() {
        assert_eq!(
            parse("A<i>B<b>C</b>D</i>E"),
            "(html('A',i('B',b('C'),'D'),'E'))"
        );
    }

    #[test]
    fn parsing_keeps_attributes() {
        let creation = PaDomCreator::parse("<span class='foo'>txt</span>");
        let span = creation.dom.nodes.iter().find_map(|n| match n {
            PaDomNode::Container(c) if &*c.name.local == "span" => Some(c),
            _ => None,
        });
        assert_eq!(span.and_then(|s| s.get_attr("class")), Some("foo"));
    }

    #[test]
    fn parsing_decodes_entities() {
        assert_eq!(parse("a&lt;b&gt;c"), "(html('a<b>c'))");
    }

    #[test]
    fn comments_are_kept_out_of_text() {
        assert_eq!(parse("a<!-- x -->b"), "(html('a',#comment,'b'))");
    }

    #[test]
    fn misnested_tags_are_recovered() {
        let creation = PaDomCreator::parse("<b><i>x</b>y</i>");
        assert!(!creation.parse_errors.is_empty());
    }
}
