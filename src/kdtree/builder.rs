use tracing::debug;

use crate::error::{KDStoreError, Result};
use crate::kdtree::KDTree;
use crate::point::Point;
use crate::r#type::{StorableValue, Value};

/// The advisory byte budget used when none is given.
pub const DEFAULT_MAX_SIZE: u64 = 2048;

/// A builder to create a [`KDTree`].
///
/// The builder collects entries and inserts them in the order they were added when
/// [`finish`][Self::finish] is called. Since the tree does not rebalance, that order decides its
/// shape.
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<V: StorableValue = Value> {
    arity: usize,
    max_size: u64,

    entries: Vec<(Point, V)>,
}

impl<V: StorableValue> KDTreeBuilder<V> {
    /// Create a new builder for keys of `arity` coordinates and the default byte budget.
    pub fn new(arity: usize) -> Self {
        Self::new_with_max_size(arity, DEFAULT_MAX_SIZE)
    }

    /// Create a new builder for keys of `arity` coordinates and the provided byte budget.
    pub fn new_with_max_size(arity: usize, max_size: u64) -> Self {
        Self {
            arity,
            max_size,
            entries: vec![],
        }
    }

    /// Set the advisory byte budget of the tree.
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Add an entry to the index. Returns its insertion position.
    pub fn add(&mut self, key: Point, value: V) -> usize {
        let index = self.entries.len();
        self.entries.push((key, value));
        index
    }

    /// Consume this builder, inserting every entry into a new [`KDTree`].
    ///
    /// Fails on an invalid arity, or on the first entry that cannot be stored.
    pub fn finish(self) -> Result<KDTree<V>> {
        let mut tree = KDTree::new(self.arity, self.max_size)?;

        let num_items = self.entries.len();
        for (index, (key, value)) in self.entries.into_iter().enumerate() {
            tree.put(key, value).map_err(|err| {
                debug!(index, %err, "rejected entry while building kd-tree");
                err
            })?;
        }

        debug!(num_items, size = tree.size(), "built kd-tree");
        Ok(tree)
    }
}

impl<V: StorableValue> Extend<(Point, V)> for KDTreeBuilder<V> {
    fn extend<T: IntoIterator<Item = (Point, V)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl<V: StorableValue> TryFrom<KDTreeBuilder<V>> for KDTree<V> {
    type Error = KDStoreError;

    fn try_from(builder: KDTreeBuilder<V>) -> Result<Self> {
        builder.finish()
    }
}
