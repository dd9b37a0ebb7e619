use num_traits::ToPrimitive;
use tinyvec::TinyVec;

use crate::error::{KDStoreError, Result};
use crate::kdtree::traversal::{search, Node};
use crate::kdtree::KDTree;
use crate::point::{KeyRange, Point};
use crate::r#type::StorableValue;

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<V: StorableValue>: Sized {
    /// The number of coordinates of every key in this tree
    fn arity(&self) -> usize;

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> Option<&Node<V>>;

    /// Look up the values stored under `key`.
    ///
    /// A fully specified key returns exactly one value or fails with
    /// [`KeyNotFound`][KDStoreError::KeyNotFound]. A partial key returns every value whose key
    /// matches on the specified axes, possibly none, with left subtrees reported before right
    /// subtrees.
    fn get(&self, key: &Point) -> Result<Vec<V>> {
        check_arity(self.arity(), key)?;

        if key.is_partial() {
            return Ok(self.partial_search(key));
        }

        search(self.root(), key, self.arity())
            .map(|node| vec![node.value()])
            .ok_or(KDStoreError::KeyNotFound)
    }

    /// Returns `true` if a node is stored under the fully specified `key`.
    fn contains_key(&self, key: &Point) -> bool {
        key.arity() == self.arity() && search(self.root(), key, self.arity()).is_some()
    }

    /// Search the index for every value whose key matches the wildcard pattern `key`.
    fn partial_search(&self, key: &Point) -> Vec<V> {
        let arity = self.arity();

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[(usize, Option<&Node<V>>); 33]> = TinyVec::new();
        stack.push((0, self.root()));

        let mut result = vec![];

        while let Some((depth, node)) = stack.pop() {
            let Some(node) = node else {
                continue;
            };

            if node.key().is_partially_equal(key) {
                result.push(node.value());
            }

            let axis = depth % arity;
            let node_value = node.axis_value(axis);
            let wanted = key.value_at(axis);

            // Note: these are pushed in backwards order to what gets popped
            if wanted.map_or(true, |w| node_value < w) {
                stack.push((depth + 1, node.right()));
            }
            if wanted.map_or(true, |w| node_value >= w) {
                stack.push((depth + 1, node.left()));
            }
        }

        result
    }

    /// Search the index for values whose keys lie within the box spanned by `from` and `to`.
    ///
    /// A missing bound, or an unspecified axis in a bound, leaves that side open. A node is only
    /// reported when both of its subtrees were eligible for the search, which can leave out nodes
    /// sitting exactly on the edge of the box.
    fn scan(&self, from: Option<&Point>, to: Option<&Point>) -> Result<Vec<V>> {
        for bound in [from, to].into_iter().flatten() {
            check_arity(self.arity(), bound)?;
        }

        let mut result = vec![];
        scan_node(self.root(), from, to, 0, self.arity(), &mut result);
        Ok(result)
    }

    /// [`scan`][Self::scan] over a [`KeyRange`].
    fn scan_range(&self, range: &KeyRange) -> Result<Vec<V>> {
        self.scan(range.min(), range.max())
    }

    /// Find the value whose key is closest to `key` by Euclidean distance.
    ///
    /// Unspecified axes of `key` are ignored when measuring distances.
    fn nearest_neighbor(&self, key: &Point) -> Result<V> {
        let root = self.root().ok_or(KDStoreError::EmptyTree)?;
        check_arity(self.arity(), key)?;

        Ok(nearest(root, key, 0, self.arity()).value())
    }

    /// The number of nodes currently stored, found by visiting every node.
    fn node_count(&self) -> usize {
        let mut stack: TinyVec<[Option<&Node<V>>; 33]> = TinyVec::new();
        stack.push(self.root());

        let mut count = 0;
        while let Some(node) = stack.pop() {
            if let Some(node) = node {
                count += 1;
                stack.push(node.right());
                stack.push(node.left());
            }
        }
        count
    }
}

impl<V: StorableValue> KDTreeIndex<V> for KDTree<V> {
    fn arity(&self) -> usize {
        self.arity
    }

    fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }
}

pub(crate) fn check_arity(expected: usize, key: &Point) -> Result<()> {
    if key.arity() != expected {
        return Err(KDStoreError::ArityMismatch {
            expected,
            actual: key.arity(),
        });
    }
    Ok(())
}

fn scan_node<V: StorableValue>(
    node: Option<&Node<V>>,
    from: Option<&Point>,
    to: Option<&Point>,
    depth: usize,
    arity: usize,
    result: &mut Vec<V>,
) {
    let Some(node) = node else {
        return;
    };

    let axis = depth % arity;
    let node_value = node.axis_value(axis);
    let lower = from.and_then(|p| p.value_at(axis)).unwrap_or(0);
    let upper = to.and_then(|p| p.value_at(axis)).unwrap_or(u64::MAX);

    let visit_left = node_value >= lower;
    if visit_left {
        scan_node(node.left(), from, to, depth + 1, arity, result);
    }

    let visit_right = node_value <= upper;
    if visit_right {
        scan_node(node.right(), from, to, depth + 1, arity, result);
    }

    if visit_left && visit_right && node.key().is_within(from, to) {
        result.push(node.value());
    }
}

fn nearest<'a, V: StorableValue>(
    node: &'a Node<V>,
    key: &Point,
    depth: usize,
    arity: usize,
) -> &'a Node<V> {
    let axis = depth % arity;
    let node_value = node.axis_value(axis);
    let query_value = key.value_at(axis);

    let (next, alternative) = match query_value {
        Some(q) if q > node_value => (node.right(), node.left()),
        _ => (node.left(), node.right()),
    };

    let descend = |child: Option<&'a Node<V>>| child.map(|c| nearest(c, key, depth + 1, arity));
    let mut best = closest(key, descend(next), node);

    // the splitting plane may be closer than the best match so far
    if key.distance_unchecked(best.key()) >= axis_dist(query_value, node_value) {
        best = closest(key, descend(alternative), best);
    }

    best
}

/// Returns `candidate` only if it is strictly closer to `key` than `best`.
#[inline]
fn closest<'a, V: StorableValue>(
    key: &Point,
    candidate: Option<&'a Node<V>>,
    best: &'a Node<V>,
) -> &'a Node<V> {
    match candidate {
        Some(c) if key.distance_unchecked(c.key()) < key.distance_unchecked(best.key()) => c,
        _ => best,
    }
}

/// Distance from a query coordinate to a splitting plane. An open axis is always at distance 0.
#[inline]
fn axis_dist(query: Option<u64>, plane: u64) -> f64 {
    query
        .map(|q| q.abs_diff(plane).to_f64().unwrap_or(f64::INFINITY))
        .unwrap_or(0.0)
}
