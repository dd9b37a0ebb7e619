use tracing::{debug, trace};

use crate::error::{KDStoreError, Result};
use crate::kdtree::builder::DEFAULT_MAX_SIZE;
use crate::kdtree::r#trait::check_arity;
use crate::kdtree::traversal::{max_path, min_path, search_path, Node, Side};
use crate::point::Point;
use crate::r#type::{StorableValue, Value};

/// Bytes accounted for the tree itself before any node is inserted.
const TREE_HEADER_SIZE: u64 = 4 * 8;

/// A mutable, unbalanced k-d tree mapping fully specified keys to fixed-width values.
///
/// Read-only queries live on the [`KDTreeIndex`][crate::kdtree::KDTreeIndex] trait. The tree is a
/// plain owned structure without internal synchronization, so concurrent use needs an external
/// lock around the whole tree.
#[derive(Debug, Clone)]
pub struct KDTree<V: StorableValue = Value> {
    pub(crate) root: Option<Box<Node<V>>>,
    pub(crate) arity: usize,
    /// Advisory running byte count. Grows on insert and on delete alike.
    pub(crate) size: u64,
    /// Advisory byte budget. Stored but never enforced.
    pub(crate) max_size: u64,
}

impl<V: StorableValue> KDTree<V> {
    /// Create an empty tree over keys with `arity` coordinates.
    pub fn new(arity: usize, max_size: u64) -> Result<Self> {
        if arity < 1 {
            return Err(KDStoreError::InvalidArity(arity));
        }
        debug!(arity, max_size, "created kd-tree");
        Ok(Self {
            root: None,
            arity,
            size: TREE_HEADER_SIZE,
            max_size,
        })
    }

    /// Create an empty tree with the default byte budget.
    pub fn with_arity(arity: usize) -> Result<Self> {
        Self::new(arity, DEFAULT_MAX_SIZE)
    }

    /// The advisory number of bytes accounted to this tree.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The advisory byte budget this tree was configured with.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Returns `true` if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert `value` under the fully specified `key`.
    ///
    /// Duplicate keys are not rejected, but only the first inserted one is reachable by exact
    /// search afterwards.
    pub fn put(&mut self, key: Point, value: V) -> Result<()> {
        check_arity(self.arity, &key)?;
        let node = Box::new(Node::try_new(key, value)?);
        let byte_size = node.byte_size();

        let arity = self.arity;
        let mut slot = &mut self.root;
        let mut depth = 0;
        while let Some(current) = slot {
            let axis = depth % arity;
            let side = if current.axis_value(axis) < node.axis_value(axis) {
                Side::Right
            } else {
                Side::Left
            };
            slot = current.child_slot_mut(side);
            depth += 1;
        }
        *slot = Some(node);

        self.size += byte_size;
        debug!(depth, size = self.size, "inserted key");
        Ok(())
    }

    /// Replace the value stored under an existing, fully specified `key`.
    pub fn upsert(&mut self, key: &Point, value: V) -> Result<()> {
        check_arity(self.arity, key)?;
        if key.is_partial() {
            return Err(KDStoreError::PartialKeyRejected);
        }
        let (_, path) =
            search_path(self.root.as_deref(), key, self.arity).ok_or(KDStoreError::KeyNotFound)?;

        let mut node = self.root.as_deref_mut().ok_or(KDStoreError::KeyNotFound)?;
        for side in path {
            node = node
                .child_slot_mut(side)
                .as_deref_mut()
                .ok_or(KDStoreError::KeyNotFound)?;
        }
        node.set_value(value);

        debug!("upserted key");
        Ok(())
    }

    /// Remove the node stored under `key`.
    ///
    /// A removed inner node is replaced by the extreme node of one of its subtrees on the removed
    /// node's axis: the minimum of the right subtree if there is one, otherwise the maximum of the
    /// left subtree. Keys are assumed to be unique.
    ///
    /// Unique keys can still tie on a single axis. Any other key in the right subtree with the
    /// same value as the promoted minimum on the removed node's axis then sits to the right of an
    /// equal value, so [`get`][crate::kdtree::KDTreeIndex::get] no longer finds it. Such keys stay
    /// stored and are still reported by [`scan`][crate::kdtree::KDTreeIndex::scan].
    pub fn delete(&mut self, key: &Point) -> Result<()> {
        check_arity(self.arity, key)?;
        let (depth, path) =
            search_path(self.root.as_deref(), key, self.arity).ok_or(KDStoreError::KeyNotFound)?;

        remove_at(&mut self.root, &path, 0, self.arity, &mut self.size)
            .ok_or(KDStoreError::KeyNotFound)?;

        debug!(depth, size = self.size, "deleted key");
        Ok(())
    }
}

/// Walk `path` down from `slot` and remove the node at its end.
fn remove_at<V: StorableValue>(
    slot: &mut Option<Box<Node<V>>>,
    path: &[Side],
    depth: usize,
    arity: usize,
    size: &mut u64,
) -> Option<Box<Node<V>>> {
    match path.split_first() {
        None => remove_node(slot, depth, arity, size),
        Some((side, rest)) => {
            let node = slot.as_mut()?;
            remove_at(node.child_slot_mut(*side), rest, depth + 1, arity, size)
        }
    }
}

/// Detach the node held in `slot`, splicing a replacement into its place when it has children.
fn remove_node<V: StorableValue>(
    slot: &mut Option<Box<Node<V>>>,
    depth: usize,
    arity: usize,
    size: &mut u64,
) -> Option<Box<Node<V>>> {
    let node = slot.as_mut()?;
    let axis = depth % arity;

    let replacement = if let Some(right) = node.right.as_deref() {
        let path = min_path(right, axis);
        trace!(
            depth,
            axis,
            replacement_depth = depth + 1 + path.len(),
            "replacing with right subtree minimum"
        );
        remove_at(&mut node.right, &path, depth + 1, arity, size)
    } else if let Some(left) = node.left.as_deref() {
        let path = max_path(left, axis);
        trace!(
            depth,
            axis,
            replacement_depth = depth + 1 + path.len(),
            "replacing with left subtree maximum"
        );
        remove_at(&mut node.left, &path, depth + 1, arity, size)
    } else {
        None
    };

    let removed = match replacement {
        Some(mut replacement) => {
            replacement.left = node.left.take();
            replacement.right = node.right.take();
            slot.replace(replacement)
        }
        None => slot.take(),
    }?;

    *size += removed.byte_size();
    Some(removed)
}
