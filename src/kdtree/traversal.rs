//! Utilities to traverse the KDTree structure.

use crate::error::{KDStoreError, Result};
use crate::point::Point;
use crate::r#type::StorableValue;

/// Which child of a node to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Keys whose axis value is less than or equal to the node's
    #[default]
    Left,
    /// Keys whose axis value is strictly greater than the node's
    Right,
}

/// A node in the KDTree.
///
/// A node owns its key, its value and both of its subtrees. It does not know its own depth, so the
/// axis it splits on is always supplied by whoever is traversing the tree.
#[derive(Debug, Clone)]
pub struct Node<V: StorableValue> {
    key: Point,
    value: V,

    pub(crate) left: Option<Box<Node<V>>>,
    pub(crate) right: Option<Box<Node<V>>>,
}

impl<V: StorableValue> Node<V> {
    /// Create a new leaf node. Fails if `key` has any unspecified coordinate.
    pub fn try_new(key: Point, value: V) -> Result<Self> {
        if key.is_partial() {
            return Err(KDStoreError::PartialKeyRejected);
        }
        Ok(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }

    /// The key stored at this node.
    pub fn key(&self) -> &Point {
        &self.key
    }

    /// A copy of the value stored at this node.
    pub fn value(&self) -> V {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: V) {
        self.value = value;
    }

    /// The key's value on `axis`.
    ///
    /// Stored keys are always fully specified, so this only falls back to `0` for an axis beyond
    /// the key's arity.
    #[inline]
    pub fn axis_value(&self, axis: usize) -> u64 {
        self.key.value_at(axis).unwrap_or(0)
    }

    /// The child node representing the "left" half.
    pub fn left(&self) -> Option<&Node<V>> {
        self.left.as_deref()
    }

    /// The child node representing the "right" half.
    pub fn right(&self) -> Option<&Node<V>> {
        self.right.as_deref()
    }

    /// The child node on `side`.
    #[inline]
    pub fn child(&self, side: Side) -> Option<&Node<V>> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    #[inline]
    pub(crate) fn child_slot_mut(&mut self, side: Side) -> &mut Option<Box<Node<V>>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of bytes this node accounts for in the tree's size counter.
    pub fn byte_size(&self) -> u64 {
        (self.key.arity() * std::mem::size_of::<u64>() + V::BYTES_PER_ELEMENT) as u64
    }
}

/// Exact-match descent from `root`.
///
/// Returns the depth of the matching node and the sides taken to reach it. At each level the
/// search goes right only if the node's axis value is strictly smaller than the key's, the same
/// rule insertion uses. A partial key never matches.
pub(crate) fn search_path<V: StorableValue>(
    root: Option<&Node<V>>,
    key: &Point,
    arity: usize,
) -> Option<(usize, Vec<Side>)> {
    let mut path = Vec::new();
    let mut current = root;
    let mut depth = 0;

    while let Some(node) = current {
        if node.key.is_equal(key) {
            return Some((depth, path));
        }

        let axis = depth % arity;
        let side = if node.axis_value(axis) < key.value_at(axis)? {
            Side::Right
        } else {
            Side::Left
        };
        path.push(side);
        current = node.child(side);
        depth += 1;
    }

    None
}

/// Like [`search_path`] but returns the matching node itself.
pub(crate) fn search<'a, V: StorableValue>(
    root: Option<&'a Node<V>>,
    key: &Point,
    arity: usize,
) -> Option<&'a Node<V>> {
    let mut current = root;
    let mut depth = 0;

    while let Some(node) = current {
        if node.key.is_equal(key) {
            return Some(node);
        }

        let axis = depth % arity;
        current = if node.axis_value(axis) < key.value_at(axis)? {
            node.right()
        } else {
            node.left()
        };
        depth += 1;
    }

    None
}

/// Path from a subtree root to the node with the smallest value on `axis`.
///
/// Every node of the subtree is a candidate, since the axes of the levels below cycle
/// independently of `axis`. On ties the node itself is preferred over its subtrees, and the left
/// subtree over the right one.
pub(crate) fn min_path<V: StorableValue>(node: &Node<V>, axis: usize) -> Vec<Side> {
    let (_, mut path) = min_in_subtree(node, axis);
    path.reverse();
    path
}

/// Returns the minimal axis value together with the reversed path that leads to it.
fn min_in_subtree<V: StorableValue>(node: &Node<V>, axis: usize) -> (u64, Vec<Side>) {
    let mut best = (node.axis_value(axis), Vec::new());

    for side in [Side::Left, Side::Right] {
        if let Some(child) = node.child(side) {
            let (value, mut path) = min_in_subtree(child, axis);
            if value < best.0 {
                path.push(side);
                best = (value, path);
            }
        }
    }

    best
}

/// Path from a subtree root to the node with the largest value on `axis`.
///
/// The maxima of both subtrees are compared directly, and the left one only wins when strictly
/// greater. The node itself is checked last and has no tie advantage.
pub(crate) fn max_path<V: StorableValue>(node: &Node<V>, axis: usize) -> Vec<Side> {
    let (_, mut path) = max_in_subtree(node, axis);
    path.reverse();
    path
}

fn max_in_subtree<V: StorableValue>(node: &Node<V>, axis: usize) -> (u64, Vec<Side>) {
    let left = node.left().map(|n| max_in_subtree(n, axis));
    let right = node.right().map(|n| max_in_subtree(n, axis));

    let children = match (left, right) {
        (None, None) => None,
        (Some(l), None) => Some((l, Side::Left)),
        (None, Some(r)) => Some((r, Side::Right)),
        (Some(l), Some(r)) => {
            if l.0 > r.0 {
                Some((l, Side::Left))
            } else {
                Some((r, Side::Right))
            }
        }
    };

    match children {
        Some(((value, mut path), side)) if value >= node.axis_value(axis) => {
            path.push(side);
            (value, path)
        }
        _ => (node.axis_value(axis), Vec::new()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn leaf(coords: [u64; 2]) -> Box<Node<u8>> {
        Box::new(Node::try_new(Point::from(coords), 0).unwrap())
    }

    #[test]
    fn rejects_partial_keys() {
        let err = Node::try_new(Point::partial([Some(1), None]), 0u8).unwrap_err();
        assert_eq!(err, KDStoreError::PartialKeyRejected);
    }

    #[test]
    fn byte_size_counts_key_and_value() {
        let node = Node::try_new(Point::from([1, 2, 3]), [0u8; 10]).unwrap();
        assert_eq!(node.byte_size(), 3 * 8 + 10);
    }

    #[test]
    fn minimum_prefers_self_on_ties() {
        let mut root = leaf([5, 0]);
        root.left = Some(leaf([5, 1]));
        root.right = Some(leaf([7, 2]));

        assert_eq!(min_path(&root, 0), vec![]);
        assert_eq!(min_path(&root, 1), vec![]);
    }

    #[test]
    fn minimum_searches_every_level() {
        let mut inner = leaf([4, 9]);
        inner.right = Some(leaf([1, 9]));
        let mut root = leaf([5, 0]);
        root.left = Some(inner);

        assert_eq!(min_path(&root, 0), vec![Side::Left, Side::Right]);
        assert_eq!(min_path(&root, 1), vec![]);
    }

    #[test]
    fn maximum_compares_subtrees_directly() {
        let mut root = leaf([1, 0]);
        root.left = Some(leaf([6, 0]));
        root.right = Some(leaf([6, 0]));
        // equal subtree maxima go right
        assert_eq!(max_path(&root, 0), vec![Side::Right]);

        root.left = Some(leaf([7, 0]));
        assert_eq!(max_path(&root, 0), vec![Side::Left]);

        // the node itself only wins when strictly greater
        let mut root = leaf([9, 3]);
        root.left = Some(leaf([2, 3]));
        assert_eq!(max_path(&root, 0), vec![]);
        assert_eq!(max_path(&root, 1), vec![Side::Left]);
    }
}
