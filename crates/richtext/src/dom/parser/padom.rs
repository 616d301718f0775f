// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Arena DOM filled in by the html5ever tree sink.

use html5ever::tree_builder::ElementFlags;
use html5ever::{Attribute, LocalName, Namespace, QualName};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PaDomHandle(pub(crate) usize);

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaNodeContainer {
    pub(crate) name: QualName,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<PaDomHandle>,
}

impl PaNodeContainer {
    pub(crate) fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _v)| n == name)
            .map(|(_n, v)| v.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaNodeText {
    pub(crate) content: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PaDomNode {
    Document(PaNodeContainer),
    Container(PaNodeContainer),
    Text(PaNodeText),
    Comment,
}

impl PaDomNode {
    pub(crate) fn name(&self) -> &QualName {
        match self {
            PaDomNode::Document(c) | PaDomNode::Container(c) => &c.name,
            PaDomNode::Text(_) | PaDomNode::Comment => &NO_NAME,
        }
    }

    pub(crate) fn children(&self) -> Option<&Vec<PaDomHandle>> {
        match self {
            PaDomNode::Document(c) | PaDomNode::Container(c) => Some(&c.children),
            PaDomNode::Text(_) | PaDomNode::Comment => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<PaDomHandle>> {
        match self {
            PaDomNode::Document(c) | PaDomNode::Container(c) => {
                Some(&mut c.children)
            }
            PaDomNode::Text(_) | PaDomNode::Comment => None,
        }
    }
}

static NO_NAME: once_cell::sync::Lazy<QualName> =
    once_cell::sync::Lazy::new(|| paqual_name(""));

pub(crate) fn paqual_name(name: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from(name),
    )
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaDom {
    pub(crate) nodes: Vec<PaDomNode>,
    pub(crate) document_handle: PaDomHandle,
}

impl PaDom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![PaDomNode::Document(PaNodeContainer {
                name: paqual_name(""),
                attrs: Vec::new(),
                children: Vec::new(),
            })],
            document_handle: PaDomHandle(0),
        }
    }

    pub(crate) fn document_handle(&self) -> PaDomHandle {
        self.document_handle
    }

    pub(crate) fn add_node(&mut self, node: PaDomNode) -> PaDomHandle {
        self.nodes.push(node);
        PaDomHandle(self.nodes.len() - 1)
    }

    pub(crate) fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> PaDomHandle {
        self.add_node(PaDomNode::Container(PaNodeContainer {
            name,
            attrs: attrs
                .into_iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect(),
            children: Vec::new(),
        }))
    }

    pub(crate) fn get_node(&self, handle: &PaDomHandle) -> &PaDomNode {
        &self.nodes[handle.0]
    }

    pub(crate) fn get_mut_node(&mut self, handle: &PaDomHandle) -> &mut PaDomNode {
        &mut self.nodes[handle.0]
    }

    /// The node whose children include `child`, with its index there.
    pub(crate) fn find_parent(
        &self,
        child: &PaDomHandle,
    ) -> Option<(PaDomHandle, usize)> {
        self.nodes.iter().enumerate().find_map(|(i, node)| {
            node.children()
                .and_then(|c| c.iter().position(|h| h == child))
                .map(|pos| (PaDomHandle(i), pos))
        })
    }
}

impl Default for PaDom {
    fn default() -> Self {
        Self::new()
    }
}
