//! An implementation of a mutable K-D Tree over fixed-arity integer keys.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
mod traversal;

pub use builder::{KDTreeBuilder, DEFAULT_MAX_SIZE};
pub use index::KDTree;
pub use r#trait::KDTreeIndex;
pub use traversal::{Node, Side};
