#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod point;
mod r#type;

pub use error::{KDStoreError, Result};
pub use kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
pub use point::{KeyRange, Point};
pub use r#type::{Coordinate, StorableValue, Value, VALUE_SIZE};
