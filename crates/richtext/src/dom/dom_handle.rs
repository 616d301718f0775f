// Copyright 2024 New Vector Ltd.
// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// Path from the document root to a node, as a list of child indices.
///
/// Handles order lexicographically, which is document (preorder) order: an
/// ancestor sorts before its descendants, and those before its following
/// siblings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomHandle {
    path: Vec<usize>,
}

impl DomHandle {
    pub fn root() -> Self {
        Self { path: Vec::new() }
    }

    pub fn from_raw(path: Vec<usize>) -> Self {
        Self { path }
    }

    pub fn raw(&self) -> &Vec<usize> {
        &self.path
    }

    pub fn into_raw(self) -> Vec<usize> {
        self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The handle of this node's parent, or None for the root.
    pub fn parent_handle(&self) -> Option<DomHandle> {
        if self.path.is_empty() {
            None
        } else {
            Some(Self::from_raw(self.path[..self.path.len() - 1].to_vec()))
        }
    }

    pub fn child_handle(&self, index: usize) -> DomHandle {
        let mut path = self.path.clone();
        path.push(index);
        Self::from_raw(path)
    }

    pub fn index_in_parent(&self) -> Option<usize> {
        self.path.last().copied()
    }

    pub fn next_sibling(&self) -> Option<DomHandle> {
        let index = self.index_in_parent()?;
        self.parent_handle().map(|p| p.child_handle(index + 1))
    }

    pub fn prev_sibling(&self) -> Option<DomHandle> {
        let index = self.index_in_parent()?.checked_sub(1)?;
        self.parent_handle().map(|p| p.child_handle(index))
    }

    /// True if `other` lies strictly inside the subtree of this node.
    pub fn is_ancestor_of(&self, other: &DomHandle) -> bool {
        other.path.len() > self.path.len() && other.path.starts_with(&self.path)
    }

    /// The ancestor-or-self of this handle that sits at `depth`.
    pub fn sub_handle_up_to(&self, depth: usize) -> DomHandle {
        Self::from_raw(self.path[..depth.min(self.path.len())].to_vec())
    }

    /// Deepest handle that is an ancestor-or-self of both handles.
    pub fn common_ancestor(&self, other: &DomHandle) -> DomHandle {
        let shared = self
            .path
            .iter()
            .zip(other.path.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.sub_handle_up_to(shared)
    }
}

#[cfg(test)]
mod test {
    use super::DomHandle;

    #[test]
    fn parent_of_root_is_none() {
        assert_eq!(DomHandle::root().parent_handle(), None);
    }

    #[test]
    fn child_and_parent_are_inverse() {
        let handle = DomHandle::from_raw(vec![1, 2]);
        assert_eq!(handle.child_handle(3).parent_handle(), Some(handle));
    }

    #[test]
    fn ordering_is_document_order() {
        let a = DomHandle::from_raw(vec![0]);
        let a_child = DomHandle::from_raw(vec![0, 4]);
        let b = DomHandle::from_raw(vec![1]);
        assert!(a < a_child);
        assert!(a_child < b);
    }

    #[test]
    fn ancestry_is_strict() {
        let a = DomHandle::from_raw(vec![0, 1]);
        assert!(a.is_ancestor_of(&DomHandle::from_raw(vec![0, 1, 0])));
        assert!(!a.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&DomHandle::from_raw(vec![0, 2, 0])));
    }

    #[test]
    fn common_ancestor_of_cousins() {
        let a = DomHandle::from_raw(vec![0, 1, 2]);
        let b = DomHandle::from_raw(vec![0, 3]);
        assert_eq!(a.common_ancestor(&b), DomHandle::from_raw(vec![0]));
    }

    #[test]
    fn siblings() {
        let a = DomHandle::from_raw(vec![2, 0]);
        assert_eq!(a.prev_sibling(), None);
        assert_eq!(a.next_sibling(), Some(DomHandle::from_raw(vec![2, 1])));
    }
}
